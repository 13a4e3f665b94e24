//! SQLite-backed rental lookups
//!
//! Connects to the platform database and reads rental rows. Inserts and
//! status updates exist for the read model's seed and test paths; the
//! marketplace application owns rental writes in production.

use crate::error::AppError;
use crate::rentals::models::{Rental, RentalStatus};
use crate::rentals::source::RentalStatusSource;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info};

/// Database connection pool for rental lookups
pub struct RentalDb {
    pool: SqlitePool,
}

impl RentalDb {
    /// Initialize database connection pool
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file
    ///
    /// # Returns
    /// * `Ok(RentalDb)` if successful
    /// * `Err(AppError)` if connection failed
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        // Ensure parent directory exists
        if let Some(parent) = PathBuf::from(db_path).parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Failed to create db directory: {}", e))
            })?;
        }

        // SQLite connection string format: sqlite://path/to/db.db
        let connection_string = if db_path.starts_with("sqlite:") {
            db_path.to_string()
        } else {
            format!("sqlite:{}", db_path)
        };

        let options = SqliteConnectOptions::from_str(&connection_string)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid database path: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        info!("Connected to SQLite database at: {}", db_path);

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Run database migrations
    async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations...");

        let migration_sql = include_str!("../../migrations/001_create_rentals.sql");

        // Strip comment lines and inline comments, then split into statements
        let mut cleaned_sql = String::new();
        for line in migration_sql.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with("--") {
                continue;
            }
            let without_comments = if let Some(comment_pos) = trimmed.find("--") {
                &trimmed[..comment_pos]
            } else {
                trimmed
            };
            cleaned_sql.push_str(without_comments.trim());
            cleaned_sql.push(' ');
        }

        let statements: Vec<&str> = cleaned_sql
            .split(';')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::Internal(anyhow::anyhow!(
                        "Migration failed: {} - Statement: {}",
                        e,
                        statement.chars().take(100).collect::<String>()
                    ))
                })?;
        }

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Get a rental by ID
    pub async fn get_rental(&self, id: &str) -> Result<Option<Rental>, AppError> {
        let rental = sqlx::query_as::<_, Rental>(
            "SELECT id, renter_id, owner_id, aircraft_id, status, created_at, updated_at FROM rentals WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(rental)
    }

    /// Insert a rental row
    pub async fn insert_rental(&self, rental: &Rental) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO rentals (id, renter_id, owner_id, aircraft_id, status, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&rental.id)
        .bind(&rental.renter_id)
        .bind(&rental.owner_id)
        .bind(&rental.aircraft_id)
        .bind(&rental.status)
        .bind(rental.created_at)
        .bind(rental.updated_at)
        .execute(&self.pool)
        .await?;

        debug!("Inserted rental: {}", rental.id);
        Ok(())
    }

    /// Update a rental's status and its updated_at timestamp
    pub async fn set_status(&self, id: &str, status: RentalStatus) -> Result<(), AppError> {
        let updated_at = chrono::Utc::now().timestamp();
        sqlx::query("UPDATE rentals SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(updated_at)
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!("Updated rental {} to status {}", id, status.as_str());
        Ok(())
    }

    /// Get the database pool (for advanced operations if needed)
    #[allow(dead_code)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl RentalStatusSource for RentalDb {
    async fn rental_status(&self, rental_id: &str) -> Result<Option<RentalStatus>, AppError> {
        let status: Option<(String,)> = sqlx::query_as("SELECT status FROM rentals WHERE id = ?")
            .bind(rental_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(status.map(|(s,)| RentalStatus::from(s.as_str())))
    }
}
