use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
pub enum AppointmentStatus {
    #[default]
    #[serde(rename = "Confirmé")]
    #[sqlx(rename = "Confirmé")]
    Confirmed,
    #[serde(rename = "En attente")]
    #[sqlx(rename = "En attente")]
    Pending,
    #[serde(rename = "Annulé")]
    #[sqlx(rename = "Annulé")]
    Cancelled,
    #[serde(rename = "Terminé")]
    #[sqlx(rename = "Terminé")]
    Completed,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 4] = [
        AppointmentStatus::Confirmed,
        AppointmentStatus::Pending,
        AppointmentStatus::Cancelled,
        AppointmentStatus::Completed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AppointmentStatus::Confirmed => "Confirmé",
            AppointmentStatus::Pending => "En attente",
            AppointmentStatus::Cancelled => "Annulé",
            AppointmentStatus::Completed => "Terminé",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AppointmentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DomainError::validation(format!("unknown status: {}", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RendezVous {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub client: Option<String>,
    pub start_at: NaiveDateTime,
    pub end_at: NaiveDateTime,
    pub status: AppointmentStatus,
}

impl RendezVous {
    pub fn new(user_id: Uuid, draft: NewRendezVous) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: draft.title,
            description: draft.description,
            location: draft.location,
            client: draft.client,
            start_at: draft.start_at,
            end_at: draft.end_at,
            status: draft.status,
        }
    }

    pub fn day(&self) -> NaiveDate {
        self.start_at.date()
    }

    pub fn apply(&mut self, update: RendezVousUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(location) = update.location {
            self.location = location;
        }
        if let Some(client) = update.client {
            self.client = client;
        }
        if let Some(start_at) = update.start_at {
            self.start_at = start_at;
        }
        if let Some(end_at) = update.end_at {
            self.end_at = end_at;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
    }

    /// Checks the record invariants: non-blank title and end strictly after start.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::validation("title is required"));
        }
        if self.end_at <= self.start_at {
            return Err(DomainError::validation("end must be after start"));
        }
        Ok(())
    }
}

impl fmt::Display for RendezVous {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}-{} {} [{}]",
            self.start_at.format("%Y-%m-%d"),
            self.start_at.format("%H:%M"),
            self.end_at.format("%H:%M"),
            self.title,
            self.status
        )?;
        if let Some(location) = &self.location {
            write!(f, " @ {}", location)?;
        }
        if let Some(client) = &self.client {
            write!(f, " (client: {})", client)?;
        }
        write!(f, " {}", self.id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRendezVous {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub client: Option<String>,
    pub start_at: NaiveDateTime,
    pub end_at: NaiveDateTime,
    #[serde(default)]
    pub status: AppointmentStatus,
}

impl NewRendezVous {
    pub fn new(title: impl Into<String>, start_at: NaiveDateTime, end_at: NaiveDateTime) -> Self {
        Self {
            title: title.into(),
            description: None,
            location: None,
            client: None,
            start_at,
            end_at,
            status: AppointmentStatus::default(),
        }
    }

    /// Trims text fields; blank optional fields become `None`.
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: clean(self.description),
            location: clean(self.location),
            client: clean(self.client),
            ..self
        }
    }
}

/// Partial update. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RendezVousUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub location: Option<Option<String>>,
    pub client: Option<Option<String>>,
    pub start_at: Option<NaiveDateTime>,
    pub end_at: Option<NaiveDateTime>,
    pub status: Option<AppointmentStatus>,
}

impl RendezVousUpdate {
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.map(|t| t.trim().to_string()),
            description: self.description.map(clean),
            location: self.location.map(clean),
            client: self.client.map(clean),
            ..self
        }
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn status_defaults_to_confirmed() {
        let draft = NewRendezVous::new("Dentist", at(10, 9), at(10, 10));
        assert_eq!(draft.status, AppointmentStatus::Confirmed);
        assert_eq!(draft.status.to_string(), "Confirmé");
    }

    #[test]
    fn status_parses_labels() {
        assert_eq!(
            "En attente".parse::<AppointmentStatus>().unwrap(),
            AppointmentStatus::Pending
        );
        assert_eq!(
            " Annulé ".parse::<AppointmentStatus>().unwrap(),
            AppointmentStatus::Cancelled
        );
        assert!("maybe".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn status_serializes_as_label() {
        let json = serde_json::to_string(&AppointmentStatus::Completed).unwrap();
        assert_eq!(json, "\"Terminé\"");
    }

    #[test]
    fn validate_rejects_end_not_after_start() {
        let user = Uuid::new_v4();
        let ok = RendezVous::new(user, NewRendezVous::new("A", at(10, 9), at(10, 10)));
        assert!(ok.validate().is_ok());

        let same = RendezVous::new(user, NewRendezVous::new("A", at(10, 9), at(10, 9)));
        assert!(matches!(same.validate(), Err(DomainError::Validation(_))));

        let reversed = RendezVous::new(user, NewRendezVous::new("A", at(10, 10), at(10, 9)));
        assert!(matches!(reversed.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn display_line() {
        let mut draft = NewRendezVous::new("Dentist", at(10, 9), at(10, 10));
        draft.location = Some("Lyon".into());
        let rdv = RendezVous::new(Uuid::nil(), draft);
        assert_eq!(
            rdv.to_string(),
            format!("2024-03-10 09:00-10:00 Dentist [Confirmé] @ Lyon {}", rdv.id)
        );
    }

    #[test]
    fn validate_rejects_blank_title() {
        let rdv = RendezVous::new(
            Uuid::new_v4(),
            NewRendezVous::new("   ", at(10, 9), at(10, 10)),
        );
        assert!(rdv.validate().is_err());
    }

    #[test]
    fn normalized_trims_and_drops_blank_fields() {
        let mut draft = NewRendezVous::new("  Dentist ", at(10, 9), at(10, 10));
        draft.location = Some("  ".into());
        draft.client = Some(" Bob ".into());
        let draft = draft.normalized();
        assert_eq!(draft.title, "Dentist");
        assert_eq!(draft.location, None);
        assert_eq!(draft.client.as_deref(), Some("Bob"));
    }

    #[test]
    fn apply_overwrites_only_given_fields() {
        let mut draft = NewRendezVous::new("Dentist", at(10, 9), at(10, 10));
        draft.location = Some("Paris".into());
        let mut rdv = RendezVous::new(Uuid::new_v4(), draft);

        rdv.apply(RendezVousUpdate {
            title: Some("Doctor".into()),
            location: Some(None),
            end_at: Some(at(10, 11)),
            ..Default::default()
        });

        assert_eq!(rdv.title, "Doctor");
        assert_eq!(rdv.location, None);
        assert_eq!(rdv.start_at, at(10, 9));
        assert_eq!(rdv.end_at, at(10, 11));
        assert_eq!(rdv.day(), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    }
}
