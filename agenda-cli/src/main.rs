mod render;
mod session_file;

use std::sync::Arc;

use agenda_core::domain::calendar::CalendarMonth;
use agenda_core::domain::rendez_vous::{AppointmentStatus, NewRendezVous, RendezVousUpdate};
use agenda_core::domain::user::Registration;
use agenda_core::infrastructure::config::AppConfig;
use agenda_core::infrastructure::database::{create_pool, ensure_schema};
use agenda_core::infrastructure::logging::init_logging;
use agenda_core::{
    AgendaService, AuthService, CalendarView, Session, SqliteRendezVousRepository,
    SqliteUserRepository,
};
use anyhow::Context;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Parser, Subcommand};
use session_file::SessionFile;
use tracing::debug;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[clap(name = "agenda", about = "Appointment book backed by a local SQLite database")]
struct Cli {
    /// Overrides AGENDA_DATABASE_URL.
    #[clap(short, long)]
    database: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Register {
        #[clap(long)]
        username: String,
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
        #[clap(long)]
        first_name: Option<String>,
        #[clap(long)]
        last_name: Option<String>,
        #[clap(long)]
        phone: Option<String>,
    },
    Login {
        #[clap(long)]
        username: String,
        #[clap(long)]
        password: String,
    },
    Logout,
    Whoami,
    Add {
        #[clap(long)]
        title: String,
        /// "YYYY-MM-DD HH:MM"
        #[clap(long, value_parser = parse_datetime)]
        start: NaiveDateTime,
        #[clap(long, value_parser = parse_datetime)]
        end: NaiveDateTime,
        #[clap(long)]
        description: Option<String>,
        #[clap(long)]
        location: Option<String>,
        #[clap(long)]
        client: Option<String>,
        #[clap(long, default_value = "Confirmé")]
        status: AppointmentStatus,
    },
    Update {
        id: Uuid,
        #[clap(long)]
        title: Option<String>,
        #[clap(long, value_parser = parse_datetime)]
        start: Option<NaiveDateTime>,
        #[clap(long, value_parser = parse_datetime)]
        end: Option<NaiveDateTime>,
        #[clap(long)]
        description: Option<String>,
        #[clap(long)]
        location: Option<String>,
        #[clap(long)]
        client: Option<String>,
        #[clap(long)]
        status: Option<AppointmentStatus>,
    },
    Delete {
        id: Uuid,
    },
    List {
        #[clap(long, conflicts_with_all = ["from", "to"])]
        date: Option<NaiveDate>,
        #[clap(long, requires = "to")]
        from: Option<NaiveDate>,
        #[clap(long, requires = "from")]
        to: Option<NaiveDate>,
    },
    Calendar {
        /// "YYYY-MM", defaults to the current month.
        #[clap(long)]
        month: Option<CalendarMonth>,
        #[clap(long)]
        select: Option<NaiveDate>,
    },
    Stats {
        /// Counts every account instead of the current user's agenda.
        #[clap(long)]
        all: bool,
    },
    Users,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Cli::parse();

    let mut config = AppConfig::from_env()?;
    if let Some(database) = args.database {
        config.database_url = database;
    }
    debug!(database = %config.database_url, "starting");

    let pool = create_pool(&config.database_url, config.max_connections)
        .await
        .context("failed to open database")?;
    ensure_schema(&pool)
        .await
        .context("failed to prepare database schema")?;

    let user_repo = Arc::new(SqliteUserRepository::new(pool.clone()));
    let rdv_repo = Arc::new(SqliteRendezVousRepository::new(pool.clone()));
    let auth_service = AuthService::new(Arc::clone(&user_repo), config.password_hasher.build());
    let agenda_service = AgendaService::new(Arc::clone(&rdv_repo), Arc::clone(&user_repo));

    let session_file = SessionFile::new(&config.session_file);
    let mut session = Session::anonymous();
    if let Some(username) = session_file.load()? {
        if !auth_service.resume(&mut session, &username).await? {
            session_file.clear()?;
        }
    }

    let today = Local::now().date_naive();

    match args.command {
        Command::Register {
            username,
            email,
            password,
            first_name,
            last_name,
            phone,
        } => {
            let registration = Registration {
                username,
                email,
                password,
                first_name,
                last_name,
                phone,
            };
            if auth_service.register(&mut session, registration).await? {
                remember(&session_file, &session)?;
                println!("Successfully registered!");
            } else {
                anyhow::bail!("registration refused: username or email already taken");
            }
        }
        Command::Login { username, password } => {
            if let Some(current) = session.current_user() {
                anyhow::bail!("already logged in as {}; logout first", current.username);
            }
            if auth_service.login(&mut session, &username, &password).await? {
                remember(&session_file, &session)?;
                println!("Successfully logged in!");
            } else {
                anyhow::bail!("invalid credentials");
            }
        }
        Command::Logout => {
            auth_service.logout(&mut session);
            session_file.clear()?;
            println!("Logged out.");
        }
        Command::Whoami => match session.user_id() {
            Some(id) => {
                let user = auth_service.get_user(id).await?;
                print!("{}", render::profile(&user));
            }
            None => println!("Not logged in."),
        },
        Command::Add {
            title,
            start,
            end,
            description,
            location,
            client,
            status,
        } => {
            let draft = NewRendezVous {
                title,
                description,
                location,
                client,
                start_at: start,
                end_at: end,
                status,
            };
            let rdv = agenda_service.create(&session, draft).await?;
            println!("Rendez-vous created! ID: {}", rdv.id);
        }
        Command::Update {
            id,
            title,
            start,
            end,
            description,
            location,
            client,
            status,
        } => {
            let update = RendezVousUpdate {
                title,
                description: description.map(Some),
                location: location.map(Some),
                client: client.map(Some),
                start_at: start,
                end_at: end,
                status,
            };
            let rdv = agenda_service.update(&session, id, update).await?;
            println!("Rendez-vous updated: {}", rdv);
        }
        Command::Delete { id } => {
            agenda_service.delete(&session, id).await?;
            println!("Rendez-vous deleted!");
        }
        Command::List { date, from, to } => {
            let list = match (date, from, to) {
                (Some(date), _, _) => agenda_service.for_day(&session, date).await?,
                (None, Some(from), Some(to)) => {
                    let end = to.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default());
                    agenda_service
                        .for_range(&session, from.and_time(NaiveTime::MIN), end)
                        .await?
                }
                _ => agenda_service.all_for_user(&session).await?,
            };
            println!("Rendez-vous ({})", list.len());
            for rdv in list {
                println!("- {}", rdv);
            }
        }
        Command::Calendar { month, select } => {
            let mut view = CalendarView::open(&agenda_service, &session, today).await?;
            if let Some(month) = month {
                view.show_month(&agenda_service, &session, month).await;
            }
            if let Some(date) = select {
                view.select(&agenda_service, &session, date).await;
            }
            print!("{}", render::calendar(&view));
        }
        Command::Stats { all: true } => {
            let stats = agenda_service.global_statistics().await;
            println!("Utilisateurs: {}", stats.users);
            println!("Rendez-vous: {}", stats.events);
        }
        Command::Stats { all: false } => {
            let stats = agenda_service.statistics(&session, today).await;
            println!("Total: {}", stats.total);
            println!("Aujourd'hui: {}", stats.today);
        }
        Command::Users => {
            for user in auth_service.list_users().await? {
                let state = if user.is_active { "active" } else { "inactive" };
                println!("- {} <{}> ({}) {}", user.username, user.email, state, user.id);
            }
        }
    }

    Ok(())
}

fn remember(session_file: &SessionFile, session: &Session) -> anyhow::Result<()> {
    match session.current_user() {
        Some(user) => session_file.save(&user.username),
        None => Ok(()),
    }
}

fn parse_datetime(raw: &str) -> anyhow::Result<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
    ];
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw.trim(), format).ok())
        .ok_or_else(|| anyhow::anyhow!("expected \"YYYY-MM-DD HH:MM\", got {:?}", raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_datetimes() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(parse_datetime("2024-03-10 09:30").unwrap(), expected);
        assert_eq!(parse_datetime("2024-03-10T09:30").unwrap(), expected);
        assert_eq!(parse_datetime("2024-03-10 09:30:00").unwrap(), expected);
        assert!(parse_datetime("10/03/2024").is_err());
    }

    #[test]
    fn cli_parses_add_command() {
        let cli = Cli::try_parse_from([
            "agenda",
            "add",
            "--title",
            "Dentist",
            "--start",
            "2024-03-10 09:00",
            "--end",
            "2024-03-10 10:00",
            "--status",
            "En attente",
        ])
        .unwrap();
        match cli.command {
            Command::Add { title, status, .. } => {
                assert_eq!(title, "Dentist");
                assert_eq!(status, AppointmentStatus::Pending);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn cli_parses_stats_scope() {
        let cli = Cli::try_parse_from(["agenda", "stats", "--all"]).unwrap();
        assert!(matches!(cli.command, Command::Stats { all: true }));
        let cli = Cli::try_parse_from(["agenda", "stats"]).unwrap();
        assert!(matches!(cli.command, Command::Stats { all: false }));
    }

    #[test]
    fn cli_rejects_edge_months() {
        assert!(Cli::try_parse_from(["agenda", "calendar", "--month", "262142-12"]).is_err());
        assert!(Cli::try_parse_from(["agenda", "calendar", "--month", "2024-03"]).is_ok());
    }

    #[test]
    fn cli_rejects_half_ranges() {
        assert!(Cli::try_parse_from(["agenda", "list", "--from", "2024-03-01"]).is_err());
        assert!(
            Cli::try_parse_from([
                "agenda",
                "list",
                "--date",
                "2024-03-01",
                "--from",
                "2024-03-01",
                "--to",
                "2024-03-02",
            ])
            .is_err()
        );
    }
}
