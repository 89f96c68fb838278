use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::data::user_repository::UserRepository;
use crate::domain::{error::DomainError, session::Session, user::Registration, user::User};
use crate::infrastructure::security::PasswordHasher;

#[derive(Clone)]
pub struct AuthService<R: UserRepository + 'static> {
    repo: Arc<R>,
    hasher: Arc<dyn PasswordHasher>,
}

impl<R> AuthService<R>
where
    R: UserRepository + 'static,
{
    pub fn new(repo: Arc<R>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { repo, hasher }
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::UserNotFound(id))
    }

    pub async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        self.repo.find_all().await
    }

    /// Signs `username` in. Unknown users, wrong passwords, inactive accounts
    /// and an already authenticated session all yield `Ok(false)`.
    #[instrument(skip(self, session, password))]
    pub async fn login(
        &self,
        session: &mut Session,
        username: &str,
        password: &str,
    ) -> Result<bool, DomainError> {
        if session.is_logged_in() {
            warn!("login refused: session already authenticated");
            return Ok(false);
        }
        if username.trim().is_empty() || password.trim().is_empty() {
            return Ok(false);
        }

        let Some(mut user) = self.repo.find_by_username(username).await? else {
            return Ok(false);
        };
        if !self.hasher.verify(password, &user.password_hash) {
            return Ok(false);
        }
        if !user.is_active {
            warn!(user_id = %user.id, "login refused: inactive account");
            return Ok(false);
        }

        user.last_login_at = Some(Utc::now());
        self.repo.update(&user).await?;

        info!(user_id = %user.id, "user logged in");
        session.sign_in(user);
        Ok(true)
    }

    /// Creates an active account and signs it in. Blank credentials and an
    /// already used username or email yield `Ok(false)`.
    #[instrument(skip(self, session, registration), fields(username = %registration.username))]
    pub async fn register(
        &self,
        session: &mut Session,
        registration: Registration,
    ) -> Result<bool, DomainError> {
        if registration.has_blank_credentials() {
            return Ok(false);
        }
        if self.repo.exists_by_username(&registration.username).await? {
            return Ok(false);
        }
        if self.repo.exists_by_email(&registration.email).await? {
            return Ok(false);
        }

        let hash = self.hasher.hash(&registration.password)?;
        let mut user = User::new(registration.username, registration.email, hash);
        user.last_name = filled(registration.last_name);
        user.first_name = filled(registration.first_name);
        user.phone = filled(registration.phone);

        match self.repo.create(user).await {
            Ok(user) => {
                info!(user_id = %user.id, "user registered");
                session.sign_in(user);
                Ok(true)
            }
            Err(DomainError::UserAlreadyExists(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Re-attaches a previously authenticated user to a fresh session, without
    /// a password. Returns `Ok(false)` if the account vanished or was disabled.
    pub async fn resume(&self, session: &mut Session, username: &str) -> Result<bool, DomainError> {
        match self.repo.find_by_username(username).await? {
            Some(user) if user.is_active => {
                session.sign_in(user);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn logout(&self, session: &mut Session) {
        if let Some(user) = session.sign_out() {
            info!(user_id = %user.id, "user logged out");
        }
    }
}

fn filled(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
