pub mod agenda_service;
pub mod auth_service;
pub mod calendar_view;
