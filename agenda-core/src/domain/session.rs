use uuid::Uuid;

use crate::domain::{error::DomainError, user::User};

/// The authenticated principal of one client session. Anonymous until a
/// successful login or registration.
#[derive(Debug, Clone, Default)]
pub struct Session {
    current: Option<User>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.current.is_some()
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.current.as_ref().map(|user| user.id)
    }

    /// The current user, or `Unauthorized` for an anonymous session.
    pub fn require_user(&self) -> Result<&User, DomainError> {
        self.current.as_ref().ok_or(DomainError::Unauthorized)
    }

    pub(crate) fn sign_in(&mut self, user: User) {
        self.current = Some(user);
    }

    pub(crate) fn sign_out(&mut self) -> Option<User> {
        self.current.take()
    }
}
