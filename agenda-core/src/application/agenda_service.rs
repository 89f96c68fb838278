use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::data::rendez_vous_repository::RendezVousRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::calendar::CalendarMonth;
use crate::domain::error::DomainError;
use crate::domain::rendez_vous::{NewRendezVous, RendezVous, RendezVousUpdate};
use crate::domain::session::Session;

/// Counters shown on the home screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AgendaStats {
    pub total: usize,
    pub today: usize,
}

/// Counters across every account, shown on the features screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GlobalStats {
    pub users: u64,
    pub events: u64,
}

pub fn ensure_owner(rendez_vous: &RendezVous, user_id: Uuid) -> Result<(), DomainError> {
    if rendez_vous.user_id != user_id {
        Err(DomainError::Forbidden)
    } else {
        Ok(())
    }
}

#[derive(Clone)]
pub struct AgendaService<R, U>
where
    R: RendezVousRepository + 'static,
    U: UserRepository + 'static,
{
    repo: Arc<R>,
    users: Arc<U>,
}

impl<R, U> AgendaService<R, U>
where
    R: RendezVousRepository + 'static,
    U: UserRepository + 'static,
{
    pub fn new(repo: Arc<R>, users: Arc<U>) -> Self {
        Self { repo, users }
    }

    #[instrument(skip(self, session, draft), fields(title = %draft.title))]
    pub async fn create(
        &self,
        session: &Session,
        draft: NewRendezVous,
    ) -> Result<RendezVous, DomainError> {
        let user_id = session.require_user()?.id;
        let owner = self
            .users
            .find_by_id(user_id)
            .await?
            .filter(|user| user.is_active)
            .ok_or(DomainError::UserNotFound(user_id))?;

        let rendez_vous = RendezVous::new(owner.id, draft.normalized());
        rendez_vous.validate()?;
        self.repo.create(rendez_vous).await
    }

    pub async fn get(&self, session: &Session, id: Uuid) -> Result<RendezVous, DomainError> {
        let user_id = session.require_user()?.id;
        let rendez_vous = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::RendezVousNotFound(id))?;
        ensure_owner(&rendez_vous, user_id)?;
        Ok(rendez_vous)
    }

    #[instrument(skip(self, session, update))]
    pub async fn update(
        &self,
        session: &Session,
        id: Uuid,
        update: RendezVousUpdate,
    ) -> Result<RendezVous, DomainError> {
        let mut rendez_vous = self.get(session, id).await?;
        rendez_vous.apply(update.normalized());
        rendez_vous.validate()?;
        self.repo.update(&rendez_vous).await?;
        Ok(rendez_vous)
    }

    #[instrument(skip(self, session))]
    pub async fn delete(&self, session: &Session, id: Uuid) -> Result<(), DomainError> {
        self.get(session, id).await?;
        if !self.repo.delete(id).await? {
            return Err(DomainError::RendezVousNotFound(id));
        }
        Ok(())
    }

    pub async fn all_for_user(&self, session: &Session) -> Result<Vec<RendezVous>, DomainError> {
        let user_id = session.require_user()?.id;
        self.repo.find_by_user(user_id).await
    }

    pub async fn for_day(
        &self,
        session: &Session,
        date: NaiveDate,
    ) -> Result<Vec<RendezVous>, DomainError> {
        let user_id = session.require_user()?.id;
        self.repo.find_by_user_and_date(user_id, date).await
    }

    /// Appointments starting between `from` and `to`, both inclusive.
    pub async fn for_range(
        &self,
        session: &Session,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<RendezVous>, DomainError> {
        let user_id = session.require_user()?.id;
        if to < from {
            return Err(DomainError::validation("range end is before its start"));
        }
        self.repo.find_by_user_and_range(user_id, from, to).await
    }

    /// Distinct days of `month` on which at least one appointment starts.
    pub async fn dates_in_month(
        &self,
        session: &Session,
        month: CalendarMonth,
    ) -> Result<HashSet<NaiveDate>, DomainError> {
        Ok(self
            .all_for_user(session)
            .await?
            .iter()
            .map(RendezVous::day)
            .filter(|day| month.contains(*day))
            .collect())
    }

    /// Total and same-day counts. Anonymous sessions and failed queries read as zero.
    pub async fn statistics(&self, session: &Session, today: NaiveDate) -> AgendaStats {
        if !session.is_logged_in() {
            return AgendaStats::default();
        }
        let counts = async {
            let total = self.all_for_user(session).await?.len();
            let same_day = self.for_day(session, today).await?.len();
            Ok::<_, DomainError>(AgendaStats {
                total,
                today: same_day,
            })
        };
        counts.await.unwrap_or_else(|err| {
            warn!("failed to load statistics: {}", err);
            AgendaStats::default()
        })
    }

    /// Number of users and of appointments of all users. Failed queries read as zero.
    pub async fn global_statistics(&self) -> GlobalStats {
        let counts = async {
            Ok::<_, DomainError>(GlobalStats {
                users: self.users.count().await?,
                events: self.repo.count().await?,
            })
        };
        counts.await.unwrap_or_else(|err| {
            warn!("failed to load global statistics: {}", err);
            GlobalStats::default()
        })
    }
}
