use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::warn;

use crate::application::agenda_service::AgendaService;
use crate::data::rendez_vous_repository::RendezVousRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::calendar::{CalendarGrid, CalendarMonth};
use crate::domain::error::DomainError;
use crate::domain::rendez_vous::RendezVous;
use crate::domain::session::Session;

/// State behind the calendar screen: displayed month, selected day and the
/// appointments loaded for them. Load failures leave the lists empty.
#[derive(Debug, Clone)]
pub struct CalendarView {
    today: NaiveDate,
    month: CalendarMonth,
    selected: NaiveDate,
    appointment_dates: HashSet<NaiveDate>,
    day_appointments: Vec<RendezVous>,
}

impl CalendarView {
    /// Fails only when `today` sits at the very edge of the supported calendar.
    pub fn new(today: NaiveDate) -> Result<Self, DomainError> {
        Ok(Self {
            today,
            month: CalendarMonth::of(today)?,
            selected: today,
            appointment_dates: HashSet::new(),
            day_appointments: Vec::new(),
        })
    }

    /// A view opened on `today` with its data loaded.
    pub async fn open<R, U>(
        agenda: &AgendaService<R, U>,
        session: &Session,
        today: NaiveDate,
    ) -> Result<Self, DomainError>
    where
        R: RendezVousRepository + 'static,
        U: UserRepository + 'static,
    {
        let mut view = Self::new(today)?;
        view.refresh(agenda, session).await;
        Ok(view)
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn month(&self) -> CalendarMonth {
        self.month
    }

    pub fn selected(&self) -> NaiveDate {
        self.selected
    }

    pub fn appointment_dates(&self) -> &HashSet<NaiveDate> {
        &self.appointment_dates
    }

    pub fn day_appointments(&self) -> &[RendezVous] {
        &self.day_appointments
    }

    pub fn title(&self) -> String {
        self.month.title()
    }

    pub fn grid(&self) -> CalendarGrid {
        CalendarGrid::build(self.month, self.selected, self.today, &self.appointment_dates)
    }

    pub fn day_summary(&self) -> String {
        match self.day_appointments.len() {
            0 => "Aucun rendez-vous aujourd'hui".to_string(),
            1 => "1 rendez-vous aujourd'hui".to_string(),
            n => format!("{} rendez-vous aujourd'hui", n),
        }
    }

    /// Reloads the month markers and the selected day's appointments.
    pub async fn refresh<R, U>(&mut self, agenda: &AgendaService<R, U>, session: &Session)
    where
        R: RendezVousRepository + 'static,
        U: UserRepository + 'static,
    {
        self.load_month(agenda, session).await;
        self.load_day(agenda, session).await;
    }

    pub async fn select<R, U>(&mut self, agenda: &AgendaService<R, U>, session: &Session, date: NaiveDate)
    where
        R: RendezVousRepository + 'static,
        U: UserRepository + 'static,
    {
        self.selected = date;
        self.refresh(agenda, session).await;
    }

    pub async fn next_month<R, U>(&mut self, agenda: &AgendaService<R, U>, session: &Session)
    where
        R: RendezVousRepository + 'static,
        U: UserRepository + 'static,
    {
        match self.month.next() {
            Some(month) => self.show_month(agenda, session, month).await,
            None => warn!(month = %self.month, "no month after the displayed one"),
        }
    }

    pub async fn previous_month<R, U>(&mut self, agenda: &AgendaService<R, U>, session: &Session)
    where
        R: RendezVousRepository + 'static,
        U: UserRepository + 'static,
    {
        match self.month.previous() {
            Some(month) => self.show_month(agenda, session, month).await,
            None => warn!(month = %self.month, "no month before the displayed one"),
        }
    }

    /// Displays `month`; a selection outside of it moves to the month's first day.
    pub async fn show_month<R, U>(
        &mut self,
        agenda: &AgendaService<R, U>,
        session: &Session,
        month: CalendarMonth,
    ) where
        R: RendezVousRepository + 'static,
        U: UserRepository + 'static,
    {
        self.month = month;
        if !month.contains(self.selected) {
            self.selected = month.first_day();
        }
        self.refresh(agenda, session).await;
    }

    async fn load_month<R, U>(&mut self, agenda: &AgendaService<R, U>, session: &Session)
    where
        R: RendezVousRepository + 'static,
        U: UserRepository + 'static,
    {
        self.appointment_dates = if session.is_logged_in() {
            agenda
                .dates_in_month(session, self.month)
                .await
                .unwrap_or_else(|err| {
                    warn!(month = %self.month, "failed to load appointment dates: {}", err);
                    HashSet::new()
                })
        } else {
            HashSet::new()
        };
    }

    async fn load_day<R, U>(&mut self, agenda: &AgendaService<R, U>, session: &Session)
    where
        R: RendezVousRepository + 'static,
        U: UserRepository + 'static,
    {
        self.day_appointments = if session.is_logged_in() {
            agenda
                .for_day(session, self.selected)
                .await
                .unwrap_or_else(|err| {
                    warn!(date = %self.selected, "failed to load appointments: {}", err);
                    Vec::new()
                })
        } else {
            Vec::new()
        };
    }
}
