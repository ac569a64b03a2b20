//! Tasks Domain
//!
//! CRUD management of tasks: a title, optional description, status, priority
//! and optional deadline, with priority ordering and a derived "overdue" flag.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← axum routes, request validation
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Defaults, blank-title checks, priority ordering
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Persistence (in-memory or PostgreSQL)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs, enums
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_tasks::{CreateTask, InMemoryTaskRepository, TaskService};
//!
//! # async fn example() -> Result<(), domain_tasks::TaskError> {
//! let service = TaskService::new(InMemoryTaskRepository::new());
//!
//! let task = service.create_task(CreateTask::new("Write release notes")).await?;
//! assert!(!task.is_overdue());
//! # Ok(())
//! # }
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{TaskError, TaskResult};
pub use handlers::ApiDoc;
pub use models::{
    CreateTask, Task, TaskDraft, TaskListQuery, TaskPriority, TaskResponse, TaskSort, TaskStats,
    TaskStatus, UpdateTask, UpdateTaskStatus,
};
pub use postgres::PgTaskRepository;
pub use repository::{InMemoryTaskRepository, TaskRepository};
pub use service::TaskService;
