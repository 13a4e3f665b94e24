//! SQLite rental read model tests

use readysetfly_chat_relay::rentals::{Rental, RentalDb, RentalStatus, RentalStatusSource};
use tempfile::TempDir;

async fn open_db(dir: &TempDir) -> RentalDb {
    let db_path = dir.path().join("relay.db");
    RentalDb::new(db_path.to_str().unwrap())
        .await
        .expect("database should open")
}

fn sample_rental(id: &str) -> Rental {
    Rental::new(
        id.to_string(),
        "renter-1".to_string(),
        "owner-1".to_string(),
        "n12345".to_string(),
    )
}

#[tokio::test]
async fn status_round_trip() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir).await;

    db.insert_rental(&sample_rental("r1")).await.unwrap();
    assert_eq!(
        db.rental_status("r1").await.unwrap(),
        Some(RentalStatus::Pending)
    );

    db.set_status("r1", RentalStatus::Active).await.unwrap();
    assert_eq!(
        db.rental_status("r1").await.unwrap(),
        Some(RentalStatus::Active)
    );

    db.set_status("r1", RentalStatus::Completed).await.unwrap();
    assert_eq!(
        db.rental_status("r1").await.unwrap(),
        Some(RentalStatus::Completed)
    );
}

#[tokio::test]
async fn unknown_rental_is_none() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir).await;
    assert_eq!(db.rental_status("missing").await.unwrap(), None);
}

#[tokio::test]
async fn get_rental_returns_full_row() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir).await;

    let rental = sample_rental("r2");
    db.insert_rental(&rental).await.unwrap();

    let fetched = db.get_rental("r2").await.unwrap().expect("rental exists");
    assert_eq!(fetched.id, "r2");
    assert_eq!(fetched.renter_id, "renter-1");
    assert_eq!(fetched.owner_id, "owner-1");
    assert_eq!(fetched.aircraft_id, "n12345");
    assert_eq!(fetched.status_enum(), RentalStatus::Pending);
    assert_eq!(fetched.created_at, rental.created_at);
}

#[tokio::test]
async fn set_status_touches_updated_at() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir).await;

    let rental = sample_rental("r3");
    db.insert_rental(&rental).await.unwrap();
    db.set_status("r3", RentalStatus::Active).await.unwrap();

    let fetched = db.get_rental("r3").await.unwrap().unwrap();
    assert_eq!(fetched.status_enum(), RentalStatus::Active);
    assert!(fetched.updated_at >= rental.updated_at);
}

#[tokio::test]
async fn reopening_database_preserves_rows() {
    let dir = TempDir::new().unwrap();
    {
        let db = open_db(&dir).await;
        db.insert_rental(&sample_rental("r4")).await.unwrap();
        db.set_status("r4", RentalStatus::Active).await.unwrap();
    }

    // Migrations are idempotent; existing rows survive a reopen
    let db = open_db(&dir).await;
    assert_eq!(
        db.rental_status("r4").await.unwrap(),
        Some(RentalStatus::Active)
    );
}
