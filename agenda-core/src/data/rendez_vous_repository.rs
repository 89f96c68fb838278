use crate::domain::error::DomainError;
use crate::domain::rendez_vous::RendezVous;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::SqlitePool;
use tracing::{error, info};
use uuid::Uuid;

const RDV_COLUMNS: &str =
    "id, user_id, title, description, location, client, start_at, end_at, status";

#[async_trait]
pub trait RendezVousRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<RendezVous>, DomainError>;
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<RendezVous>, DomainError>;
    /// Appointments starting within `[date 00:00, date+1 00:00)`.
    async fn find_by_user_and_date(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<RendezVous>, DomainError>;
    /// Appointments starting within `[from, to]`.
    async fn find_by_user_and_range(
        &self,
        user_id: Uuid,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<RendezVous>, DomainError>;
    /// Appointments of every user.
    async fn count(&self) -> Result<u64, DomainError>;
    async fn create(&self, rendez_vous: RendezVous) -> Result<RendezVous, DomainError>;
    async fn update(&self, rendez_vous: &RendezVous) -> Result<(), DomainError>;
    /// Returns `false` when no appointment had this id.
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}

#[derive(Clone)]
pub struct SqliteRendezVousRepository {
    pool: SqlitePool,
}

impl SqliteRendezVousRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_between(
        &self,
        user_id: Uuid,
        condition: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<RendezVous>, DomainError> {
        sqlx::query_as::<_, RendezVous>(&format!(
            "SELECT {} FROM rendez_vous WHERE user_id = ? AND {} ORDER BY start_at",
            RDV_COLUMNS, condition
        ))
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("db error while fetching rendez-vous of {}: {}", user_id, e);
            DomainError::Internal(e.to_string())
        })
    }
}

#[async_trait]
impl RendezVousRepository for SqliteRendezVousRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<RendezVous>, DomainError> {
        sqlx::query_as::<_, RendezVous>(&format!(
            "SELECT {} FROM rendez_vous WHERE id = ?",
            RDV_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("db error find_by_id {}: {}", id, e);
            DomainError::Internal(e.to_string())
        })
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<RendezVous>, DomainError> {
        sqlx::query_as::<_, RendezVous>(&format!(
            "SELECT {} FROM rendez_vous WHERE user_id = ? ORDER BY start_at",
            RDV_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("db error while fetching rendez-vous of {}: {}", user_id, e);
            DomainError::Internal(e.to_string())
        })
    }

    async fn find_by_user_and_date(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<RendezVous>, DomainError> {
        let start = date.and_time(NaiveTime::MIN);
        let end = start + Duration::days(1);
        self.fetch_between(user_id, "start_at >= ? AND start_at < ?", start, end)
            .await
    }

    async fn find_by_user_and_range(
        &self,
        user_id: Uuid,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<RendezVous>, DomainError> {
        self.fetch_between(user_id, "start_at >= ? AND start_at <= ?", from, to)
            .await
    }

    async fn count(&self) -> Result<u64, DomainError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM rendez_vous")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to count rendez-vous: {}", e);
                DomainError::Internal(format!("database error: {}", e))
            })?;
        Ok(count as u64)
    }

    async fn create(&self, rendez_vous: RendezVous) -> Result<RendezVous, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO rendez_vous (id, user_id, title, description, location, client,
                                     start_at, end_at, status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(rendez_vous.id)
        .bind(rendez_vous.user_id)
        .bind(&rendez_vous.title)
        .bind(&rendez_vous.description)
        .bind(&rendez_vous.location)
        .bind(&rendez_vous.client)
        .bind(rendez_vous.start_at)
        .bind(rendez_vous.end_at)
        .bind(rendez_vous.status)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to create rendez-vous: {}", e);
            let missing_owner = e
                .as_database_error()
                .map(|db| db.is_foreign_key_violation())
                .unwrap_or(false);
            if missing_owner {
                DomainError::UserNotFound(rendez_vous.user_id)
            } else {
                DomainError::Internal(format!("database error: {}", e))
            }
        })?;

        info!(rdv_id = %rendez_vous.id, user_id = %rendez_vous.user_id, "rendez-vous created");
        Ok(rendez_vous)
    }

    async fn update(&self, rendez_vous: &RendezVous) -> Result<(), DomainError> {
        let updated = sqlx::query(
            r#"
            UPDATE rendez_vous
            SET title = ?, description = ?, location = ?, client = ?,
                start_at = ?, end_at = ?, status = ?
            WHERE id = ?
            "#,
        )
        .bind(&rendez_vous.title)
        .bind(&rendez_vous.description)
        .bind(&rendez_vous.location)
        .bind(&rendez_vous.client)
        .bind(rendez_vous.start_at)
        .bind(rendez_vous.end_at)
        .bind(rendez_vous.status)
        .bind(rendez_vous.id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to update rendez-vous {}: {}", rendez_vous.id, e);
            DomainError::Internal(e.to_string())
        })?;

        if updated.rows_affected() == 0 {
            return Err(DomainError::RendezVousNotFound(rendez_vous.id));
        }
        info!(rdv_id = %rendez_vous.id, "rendez-vous updated");
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let deleted = sqlx::query("DELETE FROM rendez_vous WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let removed = deleted.rows_affected() > 0;
        if removed {
            info!(rdv_id = %id, "rendez-vous deleted");
        }
        Ok(removed)
    }
}
