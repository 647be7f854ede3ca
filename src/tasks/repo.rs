use anyhow::Context;
use sqlx::SqlitePool;
use time::OffsetDateTime;

use crate::tasks::repo_types::{Task, TaskChanges};

impl Task {
    pub async fn list_by_owner(db: &SqlitePool, owner_id: i64) -> anyhow::Result<Vec<Task>> {
        let rows = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, text, completed, category, priority, owner_id, created_at, updated_at
            FROM Tasks
            WHERE owner_id = ?
            ORDER BY id
            "#,
        )
        .bind(owner_id)
        .fetch_all(db)
        .await
        .context("list tasks by owner")?;
        Ok(rows)
    }

    /// Insert a task for `owner_id`. New tasks always start incomplete.
    pub async fn create(
        db: &SqlitePool,
        owner_id: i64,
        text: &str,
        category: &str,
        priority: &str,
    ) -> anyhow::Result<Task> {
        let now = OffsetDateTime::now_utc();
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO Tasks (text, completed, category, priority, owner_id, created_at, updated_at)
            VALUES (?, 0, ?, ?, ?, ?, ?)
            RETURNING id, text, completed, category, priority, owner_id, created_at, updated_at
            "#,
        )
        .bind(text)
        .bind(category)
        .bind(priority)
        .bind(owner_id)
        .bind(now)
        .bind(now)
        .fetch_one(db)
        .await
        .context("insert task")?;
        Ok(task)
    }

    /// Write the given fields of the task, matching on id and owner together.
    /// Fields that are present are always written; absent ones keep their value.
    /// `None` when no such task belongs to `owner_id`.
    pub async fn update_owned(
        db: &SqlitePool,
        owner_id: i64,
        task_id: i64,
        changes: &TaskChanges<'_>,
    ) -> anyhow::Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE Tasks
               SET text = COALESCE(?, text),
                   completed = COALESCE(?, completed),
                   category = COALESCE(?, category),
                   priority = COALESCE(?, priority),
                   updated_at = ?
             WHERE id = ? AND owner_id = ?
            RETURNING id, text, completed, category, priority, owner_id, created_at, updated_at
            "#,
        )
        .bind(changes.text)
        .bind(changes.completed)
        .bind(changes.category)
        .bind(changes.priority)
        .bind(OffsetDateTime::now_utc())
        .bind(task_id)
        .bind(owner_id)
        .fetch_optional(db)
        .await
        .context("update task")?;
        Ok(task)
    }

    /// Delete the task if it belongs to `owner_id`. Returns whether a row went away.
    pub async fn delete_owned(db: &SqlitePool, owner_id: i64, task_id: i64) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            DELETE FROM Tasks
             WHERE id = ? AND owner_id = ?
            "#,
        )
        .bind(task_id)
        .bind(owner_id)
        .execute(db)
        .await
        .context("delete task")?;
        Ok(res.rows_affected() > 0)
    }
}
