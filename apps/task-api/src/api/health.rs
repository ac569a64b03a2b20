//! Readiness probe backed by the task store.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};
use sea_orm::DatabaseConnection;

/// `/ready`: pings PostgreSQL when it backs the store.
///
/// The in-memory store has nothing to lose contact with and is always ready.
pub async fn ready_handler(State(db): State<Option<DatabaseConnection>>) -> Response {
    let check: HealthCheckFuture<'_> = match &db {
        Some(db) => Box::pin(async move {
            database::postgres::check_health(db)
                .await
                .map_err(|e| e.to_string())
        }),
        None => Box::pin(async { Ok(()) }),
    };

    run_health_checks(vec![("database", check)])
        .await
        .into_response()
}
