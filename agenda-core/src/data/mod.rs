pub mod rendez_vous_repository;
pub mod user_repository;
