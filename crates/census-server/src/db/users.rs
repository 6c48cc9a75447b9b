//! Postgres storage for the `users` table
//!
//! ```sql
//! users(id SERIAL PRIMARY KEY, name TEXT NOT NULL, age TEXT NULL,
//!       address JSONB NULL, additional_info JSONB NOT NULL)
//! ```

use async_trait::async_trait;
use sqlx::PgPool;

use crate::ingest::{PersistedUser, SinkError, UserSink};

/// [`UserSink`] backed by a Postgres pool
#[derive(Debug, Clone)]
pub struct PgUserSink {
    pool: PgPool,
}

impl PgUserSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserSink for PgUserSink {
    async fn insert_user(&self, user: &PersistedUser) -> Result<(), SinkError> {
        sqlx::query(
            r#"
            INSERT INTO users (name, age, address, additional_info)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&user.name)
        .bind(&user.age)
        .bind(&user.address)
        .bind(&user.additional_info)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn select_all_ages(&self) -> Result<Vec<String>, SinkError> {
        let ages = sqlx::query_scalar::<_, String>("SELECT COALESCE(age, '') FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(ages)
    }
}
