pub mod calendar;
pub mod error;
pub mod rendez_vous;
pub mod session;
pub mod user;
