//! Database integration tests for the Postgres sink
//!
//! These use `#[sqlx::test]`, which creates a scratch database per test and
//! applies `migrations/`. They need `DATABASE_URL` and are ignored by
//! default:
//!
//! ```text
//! DATABASE_URL=postgresql://localhost/census cargo test -p census-server -- --ignored
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used)]

use census_server::db::{self, PgUserSink};
use census_server::ingest::{IngestPipeline, MalformedRecordPolicy, PersistedUser, UserSink};
use serde_json::{json, Value};
use sqlx::{PgPool, Row};

mod helpers;

use helpers::{ingest_config, source_file};

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_insert_and_read_back(pool: PgPool) -> sqlx::Result<()> {
    let sink = PgUserSink::new(pool.clone());
    let user = PersistedUser {
        name: "Ada Lovelace".to_string(),
        age: Some("36".to_string()),
        address: Some(json!({"city": "London"})),
        additional_info: json!({"address": {"city": "London"}, "gender": "female"}),
    };

    sink.insert_user(&user).await.unwrap();

    let row = sqlx::query("SELECT name, age, address, additional_info FROM users")
        .fetch_one(&pool)
        .await?;

    assert_eq!(row.get::<String, _>("name"), "Ada Lovelace");
    assert_eq!(row.get::<Option<String>, _>("age").as_deref(), Some("36"));
    assert_eq!(
        row.get::<Option<Value>, _>("address"),
        Some(json!({"city": "London"}))
    );
    assert_eq!(row.get::<Value, _>("additional_info")["gender"], "female");

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_null_age_reads_as_empty(pool: PgPool) -> sqlx::Result<()> {
    let sink = PgUserSink::new(pool);
    for (name, age) in [("Ada Lovelace", Some("36")), ("Grace Hopper", None)] {
        let user = PersistedUser {
            name: name.to_string(),
            age: age.map(str::to_string),
            address: None,
            additional_info: json!({}),
        };
        sink.insert_user(&user).await.unwrap();
    }

    let ages = sink.select_all_ages().await.unwrap();
    assert_eq!(ages, ["36", ""]);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_pipeline_into_postgres(pool: PgPool) -> sqlx::Result<()> {
    let file = source_file(
        "name.firstName,name.lastName,age,address.city\n\
         Ada,Lovelace,36,London\n\
         Alan,Turing,41,Wilmslow\n",
    );
    let sink = PgUserSink::new(pool.clone());

    let report = IngestPipeline::new(&ingest_config(file.path(), MalformedRecordPolicy::Abort))
        .run(&sink)
        .await
        .unwrap();
    assert_eq!(report.rows_written, 2);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await?;
    assert_eq!(count, 2);

    db::health_check(&pool).await.unwrap();

    Ok(())
}
