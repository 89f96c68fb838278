use serde::Deserialize;

use crate::infrastructure::security::HasherKind;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub password_hasher: HasherKind,
    pub session_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://agenda.db".into(),
            max_connections: 5,
            password_hasher: HasherKind::Sha256,
            session_file: ".agenda_session".into(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database_url = lookup("AGENDA_DATABASE_URL").unwrap_or(defaults.database_url);
        let max_connections = match lookup("AGENDA_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid AGENDA_MAX_CONNECTIONS: {}", e))?,
            None => defaults.max_connections,
        };
        if max_connections == 0 {
            anyhow::bail!("AGENDA_MAX_CONNECTIONS must be at least 1");
        }
        let password_hasher = match lookup("AGENDA_PASSWORD_HASHER") {
            Some(raw) => raw.parse()?,
            None => defaults.password_hasher,
        };
        let session_file = lookup("AGENDA_SESSION_FILE").unwrap_or(defaults.session_file);

        Ok(Self {
            database_url,
            max_connections,
            password_hasher,
            session_file,
        })
    }
}
