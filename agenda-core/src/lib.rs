pub mod application;
pub mod data;
pub mod domain;
pub mod infrastructure;

pub use application::agenda_service::{AgendaService, AgendaStats, GlobalStats};
pub use application::auth_service::AuthService;
pub use application::calendar_view::CalendarView;
pub use data::rendez_vous_repository::{RendezVousRepository, SqliteRendezVousRepository};
pub use data::user_repository::{SqliteUserRepository, UserRepository};
pub use domain::error::DomainError;
pub use domain::session::Session;
