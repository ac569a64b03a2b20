use axum::{Router, routing::get};
use axum_helpers::{cors_layer, create_router, health_router};
use domain_tasks::{InMemoryTaskRepository, PgTaskRepository, TaskService};
use sea_orm::DatabaseConnection;
use std::io;

use crate::config::Config;
use crate::openapi::ApiDoc;

pub mod health;

/// API routes without the `/api` prefix, which `create_router` adds.
///
/// Tasks are stored in PostgreSQL when a connection is given, in memory otherwise.
pub fn routes(db: Option<&DatabaseConnection>) -> Router {
    let tasks = match db {
        Some(db) => domain_tasks::handlers::router(TaskService::new(PgTaskRepository::new(
            db.clone(),
        ))),
        None => domain_tasks::handlers::router(TaskService::new(InMemoryTaskRepository::new())),
    };

    Router::new().nest("/tasks", tasks)
}

/// `/ready` with the store connection as state, mergeable into the stateless app router.
pub fn ready_router(db: Option<DatabaseConnection>) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(db)
}

/// The complete application: task API, docs, `/health` and `/ready`.
pub fn app(config: &Config, db: Option<DatabaseConnection>) -> io::Result<Router> {
    let cors = cors_layer(&config.cors, config.environment)?;

    Ok(create_router::<ApiDoc>(routes(db.as_ref()), cors)
        .merge(health_router(config.app))
        .merge(ready_router(db)))
}
