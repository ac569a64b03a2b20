use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{TaskError, TaskResult};
use crate::models::{Task, TaskDraft, TaskStatus};

/// Repository trait for Task persistence
///
/// Implementations own identifier assignment and timestamping: `save` stamps
/// `created_at` on insert and `updated_at` on every write.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Insert a draft without id, or overwrite the task named by its id
    async fn save(&self, draft: TaskDraft) -> TaskResult<Task>;

    /// Get a task by ID
    async fn find_by_id(&self, id: Uuid) -> TaskResult<Option<Task>>;

    /// All tasks in store order
    async fn find_all(&self) -> TaskResult<Vec<Task>>;

    async fn exists_by_id(&self, id: Uuid) -> TaskResult<bool>;

    /// Delete a task by ID, returning false when nothing was removed
    async fn delete_by_id(&self, id: Uuid) -> TaskResult<bool>;

    /// Tasks whose deadline is before `now` and which are not done
    async fn find_overdue(&self, now: DateTime<Utc>) -> TaskResult<Vec<Task>>;

    async fn count_by_status(&self, status: TaskStatus) -> TaskResult<u64>;
}

/// In-memory implementation of TaskRepository (for development/testing)
///
/// Tasks are kept in insertion order.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTaskRepository {
    tasks: Arc<RwLock<Vec<Task>>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn save(&self, draft: TaskDraft) -> TaskResult<Task> {
        let mut tasks = self.tasks.write().await;
        let now = Utc::now();

        match draft.id {
            Some(id) => {
                let existing = tasks
                    .iter_mut()
                    .find(|t| t.id == id)
                    .ok_or(TaskError::NotFound(id))?;

                existing.title = draft.title;
                existing.description = draft.description;
                existing.status = draft.status;
                existing.priority = draft.priority;
                existing.deadline = draft.deadline;
                existing.updated_at = now.max(existing.created_at);

                tracing::info!(task_id = %id, "Updated task");
                Ok(existing.clone())
            }
            None => {
                let task = Task {
                    id: Uuid::now_v7(),
                    title: draft.title,
                    description: draft.description,
                    status: draft.status,
                    priority: draft.priority,
                    deadline: draft.deadline,
                    created_at: now,
                    updated_at: now,
                };
                tasks.push(task.clone());

                tracing::info!(task_id = %task.id, "Created task");
                Ok(task)
            }
        }
    }

    async fn find_by_id(&self, id: Uuid) -> TaskResult<Option<Task>> {
        let tasks = self.tasks.read().await;
        tracing::debug!(task_id = %id, "Looking up task");
        Ok(tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn find_all(&self) -> TaskResult<Vec<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.clone())
    }

    async fn exists_by_id(&self, id: Uuid) -> TaskResult<bool> {
        let tasks = self.tasks.read().await;
        Ok(tasks.iter().any(|t| t.id == id))
    }

    async fn delete_by_id(&self, id: Uuid) -> TaskResult<bool> {
        let mut tasks = self.tasks.write().await;

        match tasks.iter().position(|t| t.id == id) {
            Some(index) => {
                tasks.remove(index);
                tracing::info!(task_id = %id, "Deleted task");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_overdue(&self, now: DateTime<Utc>) -> TaskResult<Vec<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.iter().filter(|t| t.is_overdue_at(now)).cloned().collect())
    }

    async fn count_by_status(&self, status: TaskStatus) -> TaskResult<u64> {
        let tasks = self.tasks.read().await;
        Ok(tasks.iter().filter(|t| t.status == status).count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskPriority;
    use chrono::Duration;

    fn draft(title: &str) -> TaskDraft {
        TaskDraft {
            id: None,
            title: title.to_string(),
            description: None,
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            deadline: None,
        }
    }

    #[tokio::test]
    async fn test_save_assigns_id_and_timestamps() {
        let repo = InMemoryTaskRepository::new();

        let task = repo.save(draft("First task")).await.unwrap();
        assert_eq!(task.title, "First task");
        assert_eq!(task.created_at, task.updated_at);

        let fetched = repo.find_by_id(task.id).await.unwrap();
        assert_eq!(fetched, Some(task));
    }

    #[tokio::test]
    async fn test_save_existing_keeps_created_at() {
        let repo = InMemoryTaskRepository::new();
        let task = repo.save(draft("Original")).await.unwrap();

        let mut changed: TaskDraft = task.clone().into();
        changed.status = TaskStatus::InProgress;
        let updated = repo.save(changed).await.unwrap();

        assert_eq!(updated.id, task.id);
        assert_eq!(updated.created_at, task.created_at);
        assert!(updated.updated_at >= task.updated_at);
        assert_eq!(updated.status, TaskStatus::InProgress);
        assert_eq!(repo.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_save_unknown_id_is_not_found() {
        let repo = InMemoryTaskRepository::new();
        let id = Uuid::now_v7();

        let result = repo
            .save(TaskDraft {
                id: Some(id),
                ..draft("Ghost")
            })
            .await;

        assert!(matches!(result, Err(TaskError::NotFound(missing)) if missing == id));
    }

    #[tokio::test]
    async fn test_find_all_keeps_insertion_order() {
        let repo = InMemoryTaskRepository::new();
        for title in ["one", "two", "three"] {
            repo.save(draft(title)).await.unwrap();
        }

        let titles: Vec<String> = repo
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_delete_by_id() {
        let repo = InMemoryTaskRepository::new();
        let task = repo.save(draft("Remove me")).await.unwrap();

        assert!(repo.exists_by_id(task.id).await.unwrap());
        assert!(repo.delete_by_id(task.id).await.unwrap());
        assert!(!repo.exists_by_id(task.id).await.unwrap());
        assert!(!repo.delete_by_id(task.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_find_overdue_and_counts() {
        let repo = InMemoryTaskRepository::new();
        let yesterday = Some(Utc::now() - Duration::days(1));

        let late = repo
            .save(TaskDraft {
                deadline: yesterday,
                ..draft("Late")
            })
            .await
            .unwrap();
        repo.save(TaskDraft {
            deadline: yesterday,
            status: TaskStatus::Done,
            ..draft("Finished late")
        })
        .await
        .unwrap();
        repo.save(draft("No deadline")).await.unwrap();

        let overdue = repo.find_overdue(Utc::now()).await.unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].id, late.id);

        assert_eq!(repo.count_by_status(TaskStatus::Todo).await.unwrap(), 2);
        assert_eq!(repo.count_by_status(TaskStatus::Done).await.unwrap(), 1);
        assert_eq!(repo.count_by_status(TaskStatus::InProgress).await.unwrap(), 0);
    }
}
