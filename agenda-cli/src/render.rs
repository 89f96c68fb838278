use std::fmt::Write;

use agenda_core::CalendarView;
use agenda_core::domain::calendar::{CalendarCell, CellClass, WEEKDAY_HEADERS_FR};
use agenda_core::domain::user::User;
use chrono::Local;

const NOT_PROVIDED: &str = "Non renseigné";

/// Text rendering of the calendar screen: month grid, legend and the
/// selected day's appointments.
pub fn calendar(view: &CalendarView) -> String {
    let grid = view.grid();
    let mut out = String::new();

    let _ = writeln!(out, "{:^42}", view.title());
    for header in WEEKDAY_HEADERS_FR {
        let _ = write!(out, "{:^6}", header);
    }
    out.push('\n');
    for week in grid.weeks() {
        for cell in week {
            out.push_str(&cell_label(cell));
        }
        out.push('\n');
    }
    out.push_str("[dd] selected  <dd> today  dd* rendez-vous  .dd other month\n\n");

    let _ = writeln!(out, "{}", view.selected().format("%Y-%m-%d"));
    let _ = writeln!(out, "{}", view.day_summary());
    for rdv in view.day_appointments() {
        let _ = writeln!(out, "- {}", rdv);
    }
    out
}

/// Account settings screen: identity, optional contact fields and last login
/// in local time.
pub fn profile(user: &User) -> String {
    let optional = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(NOT_PROVIDED)
            .to_string()
    };
    let last_login = user
        .last_login_at
        .map(|at| at.with_timezone(&Local).format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_else(|| "Jamais".to_string());

    let mut out = String::new();
    let _ = writeln!(out, "Bonjour {} !", user.display_name());
    let _ = writeln!(out, "Utilisateur: {}", user.username);
    let _ = writeln!(out, "Email: {}", user.email);
    let _ = writeln!(out, "Nom: {}", optional(&user.last_name));
    let _ = writeln!(out, "Prénom: {}", optional(&user.first_name));
    let _ = writeln!(out, "Téléphone: {}", optional(&user.phone));
    let _ = writeln!(out, "Dernière connexion: {}", last_login);
    out
}

fn cell_label(cell: &CalendarCell) -> String {
    let day = cell.day();
    match cell.class {
        CellClass::Muted => format!(" .{:>2}  ", day),
        CellClass::Selected => format!(" [{:>2}] ", day),
        CellClass::TodayWithAppointments => format!(" <{:>2}>*", day),
        CellClass::Today => format!(" <{:>2}> ", day),
        CellClass::HasAppointments => format!("  {:>2}* ", day),
        CellClass::Plain => format!("  {:>2}  ", day),
    }
}
