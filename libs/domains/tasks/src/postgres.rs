use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};
use uuid::Uuid;

use crate::{
    entity,
    error::{TaskError, TaskResult},
    models::{Task, TaskDraft, TaskStatus},
    repository::TaskRepository,
};

/// PostgreSQL-backed TaskRepository
#[derive(Debug, Clone)]
pub struct PgTaskRepository {
    db: DatabaseConnection,
}

impl PgTaskRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn insert(&self, draft: TaskDraft) -> TaskResult<Task> {
        let now = Utc::now();
        let active_model = entity::ActiveModel {
            id: Set(Uuid::now_v7()),
            title: Set(draft.title),
            description: Set(draft.description),
            status: Set(draft.status),
            priority: Set(draft.priority),
            deadline: Set(draft.deadline.map(Into::into)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let model = active_model.insert(&self.db).await?;

        tracing::info!(task_id = %model.id, "Created task");
        Ok(model.into())
    }

    async fn overwrite(&self, id: Uuid, draft: TaskDraft) -> TaskResult<Task> {
        let active_model = entity::ActiveModel {
            id: Set(id),
            title: Set(draft.title),
            description: Set(draft.description),
            status: Set(draft.status),
            priority: Set(draft.priority),
            deadline: Set(draft.deadline.map(Into::into)),
            created_at: NotSet,
            updated_at: Set(Utc::now().into()),
        };

        let model = active_model.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated | DbErr::RecordNotFound(_) => TaskError::NotFound(id),
            other => other.into(),
        })?;

        tracing::info!(task_id = %id, "Updated task");
        Ok(model.into())
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn save(&self, draft: TaskDraft) -> TaskResult<Task> {
        match draft.id {
            Some(id) => self.overwrite(id, draft).await,
            None => self.insert(draft).await,
        }
    }

    async fn find_by_id(&self, id: Uuid) -> TaskResult<Option<Task>> {
        tracing::debug!(task_id = %id, "Looking up task");
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn find_all(&self) -> TaskResult<Vec<Task>> {
        let models = entity::Entity::find()
            .order_by_asc(entity::Column::CreatedAt)
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn exists_by_id(&self, id: Uuid) -> TaskResult<bool> {
        let count = entity::Entity::find_by_id(id).count(&self.db).await?;
        Ok(count > 0)
    }

    async fn delete_by_id(&self, id: Uuid) -> TaskResult<bool> {
        let result = entity::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected > 0 {
            tracing::info!(task_id = %id, "Deleted task");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn find_overdue(&self, now: DateTime<Utc>) -> TaskResult<Vec<Task>> {
        let models = entity::Entity::find()
            .filter(entity::Column::Deadline.lt(now))
            .filter(entity::Column::Status.ne(TaskStatus::Done))
            .order_by_asc(entity::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn count_by_status(&self, status: TaskStatus) -> TaskResult<u64> {
        let count = entity::Entity::find()
            .filter(entity::Column::Status.eq(status))
            .count(&self.db)
            .await?;

        Ok(count)
    }
}
