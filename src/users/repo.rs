use anyhow::Context;
use sqlx::SqlitePool;
use time::OffsetDateTime;

use crate::users::repo_types::User;

impl User {
    /// Find a user by the identity provider's subject id.
    pub async fn find_by_google_id(db: &SqlitePool, google_id: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, google_id, email, name, created_at, updated_at
            FROM Users
            WHERE google_id = ?
            "#,
        )
        .bind(google_id)
        .fetch_optional(db)
        .await
        .context("find user by google_id")?;
        Ok(user)
    }

    /// Insert a new user. Fails if `google_id` is already taken.
    pub async fn create(
        db: &SqlitePool,
        google_id: &str,
        email: &str,
        name: &str,
    ) -> anyhow::Result<User> {
        let now = OffsetDateTime::now_utc();
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO Users (google_id, email, name, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, google_id, email, name, created_at, updated_at
            "#,
        )
        .bind(google_id)
        .bind(email)
        .bind(name)
        .bind(now)
        .bind(now)
        .fetch_one(db)
        .await
        .context("insert user")?;
        Ok(user)
    }

    /// Return the existing user for `google_id` untouched, or create one from `email`/`name`.
    /// The flag is true when a row was inserted.
    pub async fn find_or_create(
        db: &SqlitePool,
        google_id: &str,
        email: &str,
        name: &str,
    ) -> anyhow::Result<(User, bool)> {
        if let Some(user) = Self::find_by_google_id(db, google_id).await? {
            return Ok((user, false));
        }
        let user = Self::create(db, google_id, email, name).await?;
        Ok((user, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[tokio::test]
    async fn find_or_create_keeps_first_profile() {
        let db = db::memory().await;

        let (first, created) = User::find_or_create(&db, "u1", "a@x.com", "A")
            .await
            .expect("create");
        assert!(created);
        assert_eq!(first.id, 1);

        let (again, created) = User::find_or_create(&db, "u1", "b@x.com", "B")
            .await
            .expect("find");
        assert!(!created);
        assert_eq!(again, first);
        assert_eq!(again.email, "a@x.com");
        assert_eq!(again.name, "A");
    }

    #[tokio::test]
    async fn find_by_unknown_subject_is_none() {
        let db = db::memory().await;
        let found = User::find_by_google_id(&db, "nobody").await.expect("query");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn duplicate_google_id_is_rejected_by_storage() {
        let db = db::memory().await;
        User::create(&db, "dup", "a@x.com", "A").await.expect("first insert");
        let err = User::create(&db, "dup", "b@x.com", "B").await.unwrap_err();
        assert!(err.to_string().contains("insert user"));
    }

    #[tokio::test]
    async fn distinct_subjects_get_distinct_ids() {
        let db = db::memory().await;
        let a = User::create(&db, "a", "a@x.com", "A").await.expect("a");
        let b = User::create(&db, "b", "b@x.com", "B").await.expect("b");
        assert_ne!(a.id, b.id);
    }
}
