//! Repository behaviour against an in-memory SQLite database.

mod common;

use agenda_core::domain::rendez_vous::{AppointmentStatus, NewRendezVous, RendezVous};
use agenda_core::domain::user::User;
use agenda_core::{DomainError, RendezVousRepository, UserRepository};
use common::{at, date, spawn_app};
use uuid::Uuid;

fn user(name: &str) -> User {
    User::new(name.into(), format!("{}@x.com", name), "hash".into())
}

#[tokio::test]
async fn user_lookups() {
    let app = spawn_app().await;
    let alice = app.users.create(user("alice")).await.unwrap();

    let by_id = app.users.find_by_id(alice.id).await.unwrap().unwrap();
    assert_eq!(by_id.username, "alice");
    assert!(by_id.is_active);
    assert_eq!(by_id.created_at.timestamp(), alice.created_at.timestamp());

    assert!(app.users.find_by_username("alice").await.unwrap().is_some());
    assert!(app.users.find_by_email("alice@x.com").await.unwrap().is_some());
    assert!(app.users.find_by_username("bob").await.unwrap().is_none());
    assert!(app.users.find_by_id(Uuid::new_v4()).await.unwrap().is_none());

    assert!(app.users.exists_by_username("alice").await.unwrap());
    assert!(app.users.exists_by_email("alice@x.com").await.unwrap());
    assert!(!app.users.exists_by_email("bob@x.com").await.unwrap());
}

#[tokio::test]
async fn user_uniqueness_is_enforced_by_the_store() {
    let app = spawn_app().await;
    app.users.create(user("alice")).await.unwrap();

    let same_name = User::new("alice".into(), "other@x.com".into(), "hash".into());
    assert!(matches!(
        app.users.create(same_name).await,
        Err(DomainError::UserAlreadyExists(_))
    ));

    let same_email = User::new("other".into(), "alice@x.com".into(), "hash".into());
    assert!(matches!(
        app.users.create(same_email).await,
        Err(DomainError::UserAlreadyExists(_))
    ));
}

#[tokio::test]
async fn user_update_all_and_delete() {
    let app = spawn_app().await;
    let mut alice = app.users.create(user("alice")).await.unwrap();
    app.users.create(user("bob")).await.unwrap();

    alice.phone = Some("0601020304".into());
    alice.is_active = false;
    app.users.update(&alice).await.unwrap();
    let stored = app.users.find_by_id(alice.id).await.unwrap().unwrap();
    assert_eq!(stored.phone.as_deref(), Some("0601020304"));
    assert!(!stored.is_active);

    assert_eq!(app.users.find_all().await.unwrap().len(), 2);

    assert!(app.users.delete(alice.id).await.unwrap());
    assert!(!app.users.delete(alice.id).await.unwrap());
    assert_eq!(app.users.find_all().await.unwrap().len(), 1);

    let ghost = user("ghost");
    assert!(matches!(
        app.users.update(&ghost).await,
        Err(DomainError::UserNotFound(_))
    ));
}

#[tokio::test]
async fn rendez_vous_by_day_uses_half_open_bounds() {
    let app = spawn_app().await;
    let alice = app.users.create(user("alice")).await.unwrap();

    let starts = [
        at(2024, 3, 9, 23, 59),
        at(2024, 3, 10, 0, 0),
        at(2024, 3, 10, 18, 30),
        at(2024, 3, 10, 9, 0),
        at(2024, 3, 11, 0, 0),
    ];
    for start in starts {
        let draft = NewRendezVous::new("slot", start, start + chrono::Duration::minutes(30));
        app.rendez_vous
            .create(RendezVous::new(alice.id, draft))
            .await
            .unwrap();
    }

    let day = app
        .rendez_vous
        .find_by_user_and_date(alice.id, date(2024, 3, 10))
        .await
        .unwrap();
    let found: Vec<_> = day.iter().map(|r| r.start_at).collect();
    assert_eq!(
        found,
        vec![at(2024, 3, 10, 0, 0), at(2024, 3, 10, 9, 0), at(2024, 3, 10, 18, 30)]
    );

    let all = app.rendez_vous.find_by_user(alice.id).await.unwrap();
    assert_eq!(all.len(), 5);
    assert!(all.windows(2).all(|w| w[0].start_at <= w[1].start_at));
}

#[tokio::test]
async fn rendez_vous_by_range_is_inclusive() {
    let app = spawn_app().await;
    let alice = app.users.create(user("alice")).await.unwrap();
    let bob = app.users.create(user("bob")).await.unwrap();

    for (owner, start) in [
        (alice.id, at(2024, 3, 1, 8, 0)),
        (alice.id, at(2024, 3, 15, 8, 0)),
        (alice.id, at(2024, 3, 31, 8, 0)),
        (bob.id, at(2024, 3, 15, 9, 0)),
    ] {
        let draft = NewRendezVous::new("slot", start, start + chrono::Duration::hours(1));
        app.rendez_vous.create(RendezVous::new(owner, draft)).await.unwrap();
    }

    let range = app
        .rendez_vous
        .find_by_user_and_range(alice.id, at(2024, 3, 1, 8, 0), at(2024, 3, 15, 8, 0))
        .await
        .unwrap();
    assert_eq!(range.len(), 2);
    assert!(range.iter().all(|r| r.user_id == alice.id));
}

#[tokio::test]
async fn rendez_vous_round_trip_update_and_delete() {
    let app = spawn_app().await;
    let alice = app.users.create(user("alice")).await.unwrap();

    let mut draft = NewRendezVous::new("Dentist", at(2024, 3, 10, 9, 0), at(2024, 3, 10, 10, 0));
    draft.location = Some("Lyon".into());
    draft.status = AppointmentStatus::Pending;
    let created = app
        .rendez_vous
        .create(RendezVous::new(alice.id, draft))
        .await
        .unwrap();

    let mut stored = app.rendez_vous.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(stored, created);

    stored.status = AppointmentStatus::Completed;
    stored.title = "Dentiste".into();
    app.rendez_vous.update(&stored).await.unwrap();
    let reloaded = app.rendez_vous.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(reloaded.status, AppointmentStatus::Completed);
    assert_eq!(reloaded.title, "Dentiste");

    assert!(app.rendez_vous.delete(created.id).await.unwrap());
    assert!(!app.rendez_vous.delete(created.id).await.unwrap());
    assert!(matches!(
        app.rendez_vous.update(&reloaded).await,
        Err(DomainError::RendezVousNotFound(_))
    ));
}

#[tokio::test]
async fn rendez_vous_requires_an_existing_owner() {
    let app = spawn_app().await;
    let draft = NewRendezVous::new("orphan", at(2024, 3, 10, 9, 0), at(2024, 3, 10, 10, 0));
    let result = app
        .rendez_vous
        .create(RendezVous::new(Uuid::new_v4(), draft))
        .await;
    assert!(matches!(result, Err(DomainError::UserNotFound(_))));
}

#[tokio::test]
async fn deleting_a_user_removes_their_rendez_vous() {
    let app = spawn_app().await;
    let alice = app.users.create(user("alice")).await.unwrap();
    let draft = NewRendezVous::new("slot", at(2024, 3, 10, 9, 0), at(2024, 3, 10, 10, 0));
    let rdv = app.rendez_vous.create(RendezVous::new(alice.id, draft)).await.unwrap();

    app.users.delete(alice.id).await.unwrap();
    assert!(app.rendez_vous.find_by_id(rdv.id).await.unwrap().is_none());
}

#[tokio::test]
async fn counts_span_every_owner() {
    let app = spawn_app().await;
    assert_eq!(app.users.count().await.unwrap(), 0);
    assert_eq!(app.rendez_vous.count().await.unwrap(), 0);

    let alice = app.users.create(user("alice")).await.unwrap();
    let bob = app.users.create(user("bob")).await.unwrap();
    for (owner, d) in [(alice.id, 10), (alice.id, 11), (bob.id, 10)] {
        let draft = NewRendezVous::new("slot", at(2024, 3, d, 9, 0), at(2024, 3, d, 10, 0));
        app.rendez_vous.create(RendezVous::new(owner, draft)).await.unwrap();
    }

    assert_eq!(app.users.count().await.unwrap(), 2);
    assert_eq!(app.rendez_vous.count().await.unwrap(), 3);
}
