use chrono::Utc;
use std::cmp::Reverse;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{TaskError, TaskResult};
use crate::models::{CreateTask, Task, TaskDraft, TaskStats, TaskStatus, UpdateTask};
use crate::repository::TaskRepository;

/// Service layer for Task business logic
#[derive(Clone)]
pub struct TaskService<R: TaskRepository> {
    repository: Arc<R>,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new task, applying status/priority defaults
    #[instrument(skip(self, input), fields(task_title = %input.title))]
    pub async fn create_task(&self, input: CreateTask) -> TaskResult<Task> {
        ensure_title(&input.title)?;

        let draft = TaskDraft {
            id: None,
            title: input.title,
            description: input.description,
            status: input.status.unwrap_or_default(),
            priority: input.priority.unwrap_or_default(),
            deadline: input.deadline,
        };

        self.repository.save(draft).await
    }

    /// Get a task by ID
    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn get_task(&self, id: Uuid) -> TaskResult<Task> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(TaskError::NotFound(id))
    }

    /// All tasks in store order
    pub async fn get_all_tasks(&self) -> TaskResult<Vec<Task>> {
        self.repository.find_all().await
    }

    /// Order tasks by descending priority rank. Ties keep their input order.
    pub fn sort_by_priority(&self, mut tasks: Vec<Task>) -> Vec<Task> {
        tasks.sort_by_key(|t| Reverse(t.priority.rank()));
        tasks
    }

    /// Overwrite only the status of a task
    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn update_task_status(&self, id: Uuid, status: TaskStatus) -> TaskResult<Task> {
        let mut task = self.get_task(id).await?;
        task.status = status;
        self.repository.save(task.into()).await
    }

    /// Merge the fields present in `input` into an existing task
    #[instrument(skip(self, input), fields(task_id = %id))]
    pub async fn update_task(&self, id: Uuid, input: UpdateTask) -> TaskResult<Task> {
        let mut task = self.get_task(id).await?;
        task.apply_update(input);
        ensure_title(&task.title)?;
        self.repository.save(task.into()).await
    }

    /// Delete a task; unknown ids are an error
    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn delete_task(&self, id: Uuid) -> TaskResult<()> {
        if !self.repository.exists_by_id(id).await? {
            return Err(TaskError::NotFound(id));
        }

        if !self.repository.delete_by_id(id).await? {
            tracing::warn!(task_id = %id, "Task disappeared before it could be deleted");
        }

        Ok(())
    }

    /// Tasks past their deadline that are not done
    pub async fn list_overdue_tasks(&self) -> TaskResult<Vec<Task>> {
        self.repository.find_overdue(Utc::now()).await
    }

    /// Task counts per status
    pub async fn task_stats(&self) -> TaskResult<TaskStats> {
        let todo = self.repository.count_by_status(TaskStatus::Todo).await?;
        let in_progress = self
            .repository
            .count_by_status(TaskStatus::InProgress)
            .await?;
        let done = self.repository.count_by_status(TaskStatus::Done).await?;

        Ok(TaskStats {
            todo,
            in_progress,
            done,
            total: todo + in_progress + done,
        })
    }
}

fn ensure_title(title: &str) -> TaskResult<()> {
    if title.trim().is_empty() {
        return Err(TaskError::InvalidInput("Title is required".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskPriority;
    use crate::repository::MockTaskRepository;
    use chrono::Duration;
    use mockall::predicate::eq;

    fn persisted(draft: TaskDraft) -> Task {
        let mut task = Task::with_priority(draft.title, draft.priority);
        if let Some(id) = draft.id {
            task.id = id;
        }
        task.description = draft.description;
        task.status = draft.status;
        task.deadline = draft.deadline;
        task
    }

    #[tokio::test]
    async fn test_create_task_applies_defaults() {
        let mut mock_repo = MockTaskRepository::new();
        mock_repo
            .expect_save()
            .withf(|d| {
                d.id.is_none()
                    && d.status == TaskStatus::Todo
                    && d.priority == TaskPriority::Medium
            })
            .times(1)
            .returning(|d| Ok(persisted(d)));

        let service = TaskService::new(mock_repo);
        let task = service.create_task(CreateTask::new("New Task")).await.unwrap();

        assert_eq!(task.title, "New Task");
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, TaskPriority::Medium);
    }

    #[tokio::test]
    async fn test_create_task_keeps_supplied_status_and_priority() {
        let mut mock_repo = MockTaskRepository::new();
        mock_repo
            .expect_save()
            .times(1)
            .returning(|d| Ok(persisted(d)));

        let service = TaskService::new(mock_repo);
        let task = service
            .create_task(CreateTask {
                status: Some(TaskStatus::InProgress),
                priority: Some(TaskPriority::High),
                ..CreateTask::new("Urgent fix")
            })
            .await
            .unwrap();

        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.priority, TaskPriority::High);
    }

    #[tokio::test]
    async fn test_create_task_rejects_blank_title_without_saving() {
        let mut mock_repo = MockTaskRepository::new();
        mock_repo.expect_save().never();

        let service = TaskService::new(mock_repo);

        for title in ["", "   ", "\t\n"] {
            let result = service.create_task(CreateTask::new(title)).await;
            assert!(matches!(result, Err(TaskError::InvalidInput(_))));
        }
    }

    #[tokio::test]
    async fn test_get_task_not_found() {
        let mut mock_repo = MockTaskRepository::new();
        let id = Uuid::now_v7();
        mock_repo
            .expect_find_by_id()
            .with(eq(id))
            .returning(|_| Ok(None));

        let service = TaskService::new(mock_repo);
        let result = service.get_task(id).await;

        assert!(matches!(result, Err(TaskError::NotFound(missing)) if missing == id));
    }

    #[tokio::test]
    async fn test_update_task_status_only_changes_status() {
        let mut mock_repo = MockTaskRepository::new();
        let mut existing = Task::with_priority("Keep fields", TaskPriority::High);
        existing.description = Some("untouched".to_string());
        let id = existing.id;

        mock_repo
            .expect_find_by_id()
            .with(eq(id))
            .returning(move |_| Ok(Some(existing.clone())));
        mock_repo
            .expect_save()
            .withf(move |d| d.id == Some(id))
            .times(1)
            .returning(|d| Ok(persisted(d)));

        let service = TaskService::new(mock_repo);
        let task = service
            .update_task_status(id, TaskStatus::Done)
            .await
            .unwrap();

        assert_eq!(task.status, TaskStatus::Done);
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.title, "Keep fields");
        assert_eq!(task.description.as_deref(), Some("untouched"));
    }

    #[tokio::test]
    async fn test_update_task_status_unknown_id_does_not_save() {
        let mut mock_repo = MockTaskRepository::new();
        mock_repo.expect_find_by_id().returning(|_| Ok(None));
        mock_repo.expect_save().never();

        let service = TaskService::new(mock_repo);
        let result = service
            .update_task_status(Uuid::now_v7(), TaskStatus::Done)
            .await;

        assert!(matches!(result, Err(TaskError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_task_merges_present_fields() {
        let mut mock_repo = MockTaskRepository::new();
        let existing = Task::with_priority("Before", TaskPriority::Low);
        let id = existing.id;

        mock_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        mock_repo
            .expect_save()
            .times(1)
            .returning(|d| Ok(persisted(d)));

        let service = TaskService::new(mock_repo);
        let task = service
            .update_task(
                id,
                UpdateTask {
                    title: Some("After".to_string()),
                    priority: Some(TaskPriority::High),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(task.title, "After");
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.status, TaskStatus::Todo);
    }

    #[tokio::test]
    async fn test_update_task_rejects_blank_title() {
        let mut mock_repo = MockTaskRepository::new();
        let existing = Task::new("Before");
        let id = existing.id;

        mock_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        mock_repo.expect_save().never();

        let service = TaskService::new(mock_repo);
        let result = service
            .update_task(
                id,
                UpdateTask {
                    title: Some("   ".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(TaskError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_delete_task_unknown_id() {
        let mut mock_repo = MockTaskRepository::new();
        mock_repo.expect_exists_by_id().returning(|_| Ok(false));
        mock_repo.expect_delete_by_id().never();

        let service = TaskService::new(mock_repo);
        let result = service.delete_task(Uuid::now_v7()).await;

        assert!(matches!(result, Err(TaskError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_task_checks_existence_first() {
        let mut mock_repo = MockTaskRepository::new();
        let id = Uuid::now_v7();
        let mut seq = mockall::Sequence::new();

        mock_repo
            .expect_exists_by_id()
            .with(eq(id))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(true));
        mock_repo
            .expect_delete_by_id()
            .with(eq(id))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(true));

        let service = TaskService::new(mock_repo);
        service.delete_task(id).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_task_tolerates_concurrent_removal() {
        let mut mock_repo = MockTaskRepository::new();
        mock_repo.expect_exists_by_id().returning(|_| Ok(true));
        mock_repo.expect_delete_by_id().returning(|_| Ok(false));

        let service = TaskService::new(mock_repo);
        assert!(service.delete_task(Uuid::now_v7()).await.is_ok());
    }

    #[test]
    fn test_sort_by_priority() {
        let service = TaskService::new(MockTaskRepository::new());
        let tasks = vec![
            Task::with_priority("low", TaskPriority::Low),
            Task::with_priority("medium", TaskPriority::Medium),
            Task::with_priority("high", TaskPriority::High),
        ];

        let sorted = service.sort_by_priority(tasks);
        let priorities: Vec<TaskPriority> = sorted.iter().map(|t| t.priority).collect();
        assert_eq!(
            priorities,
            vec![TaskPriority::High, TaskPriority::Medium, TaskPriority::Low]
        );
    }

    #[test]
    fn test_sort_by_priority_is_stable_and_idempotent() {
        let service = TaskService::new(MockTaskRepository::new());
        let tasks = vec![
            Task::with_priority("a", TaskPriority::Medium),
            Task::with_priority("b", TaskPriority::High),
            Task::with_priority("c", TaskPriority::Medium),
            Task::with_priority("d", TaskPriority::High),
            Task::with_priority("e", TaskPriority::Low),
        ];

        let sorted = service.sort_by_priority(tasks.clone());
        let titles: Vec<&str> = sorted.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "d", "a", "c", "e"]);

        let resorted = service.sort_by_priority(sorted.clone());
        assert_eq!(resorted, sorted);
        assert_eq!(sorted.len(), tasks.len());
    }

    #[test]
    fn test_sort_by_priority_empty() {
        let service = TaskService::new(MockTaskRepository::new());
        assert!(service.sort_by_priority(Vec::new()).is_empty());
    }

    #[tokio::test]
    async fn test_list_overdue_tasks_delegates_to_store() {
        let mut mock_repo = MockTaskRepository::new();
        let mut late = Task::new("Late");
        late.deadline = Some(Utc::now() - Duration::days(1));
        let expected = late.clone();

        mock_repo
            .expect_find_overdue()
            .times(1)
            .returning(move |_| Ok(vec![late.clone()]));

        let service = TaskService::new(mock_repo);
        let overdue = service.list_overdue_tasks().await.unwrap();

        assert_eq!(overdue, vec![expected]);
        assert!(overdue.iter().all(Task::is_overdue));
    }

    #[tokio::test]
    async fn test_task_stats() {
        let mut mock_repo = MockTaskRepository::new();
        mock_repo
            .expect_count_by_status()
            .with(eq(TaskStatus::Todo))
            .returning(|_| Ok(3));
        mock_repo
            .expect_count_by_status()
            .with(eq(TaskStatus::InProgress))
            .returning(|_| Ok(2));
        mock_repo
            .expect_count_by_status()
            .with(eq(TaskStatus::Done))
            .returning(|_| Ok(1));

        let service = TaskService::new(mock_repo);
        let stats = service.task_stats().await.unwrap();

        assert_eq!(
            stats,
            TaskStats {
                todo: 3,
                in_progress: 2,
                done: 1,
                total: 6
            }
        );
    }
}
