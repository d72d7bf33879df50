use async_trait::async_trait;
use sqlx::FromRow;
use tracing::instrument;

use super::{dto::PhotoSummary, model::User, model::UserDraft};
use crate::{db::PgStore, error::RepoError};

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Inserts a user; `draft.password` must already be hashed.
    async fn create(&self, draft: &UserDraft) -> Result<User, RepoError>;
    async fn find_by_id(&self, id: &str) -> Result<User, RepoError>;
    async fn find_by_email(&self, email: &str) -> Result<User, RepoError>;
    /// User by email joined with their latest photo, if any.
    async fn find_with_photo(&self, email: &str) -> Result<(User, PhotoSummary), RepoError>;
    /// Overwrites only the non-empty fields of `changes`.
    async fn update(&self, id: &str, changes: &UserDraft) -> Result<User, RepoError>;
    /// Removes the user; their photo goes with them.
    async fn delete(&self, id: &str) -> Result<(), RepoError>;
}

#[derive(Debug, FromRow)]
struct UserWithPhotoRow {
    #[sqlx(flatten)]
    user: User,
    title: Option<String>,
    caption: Option<String>,
    photo_url: Option<String>,
}

const USER_COLUMNS: &str = "id, username, email, password, created_at, updated_at";

#[async_trait]
impl UserRepo for PgStore {
    #[instrument(skip(self, draft), fields(user_id = %draft.id))]
    async fn create(&self, draft: &UserDraft) -> Result<User, RepoError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, username, email, password)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&draft.id)
        .bind(&draft.username)
        .bind(&draft.email)
        .bind(&draft.password)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> Result<User, RepoError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<User, RepoError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_with_photo(&self, email: &str) -> Result<(User, PhotoSummary), RepoError> {
        let row = sqlx::query_as::<_, UserWithPhotoRow>(
            r#"
            SELECT u.id, u.username, u.email, u.password, u.created_at, u.updated_at,
                   p.title, p.caption, p.photo_url
              FROM users u
              LEFT JOIN photos p ON p.user_id = u.id
             WHERE u.email = $1
             ORDER BY p.id DESC NULLS LAST
             LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        let photo = PhotoSummary {
            title: row.title.unwrap_or_default(),
            caption: row.caption.unwrap_or_default(),
            photo_url: row.photo_url.unwrap_or_default(),
        };
        Ok((row.user, photo))
    }

    #[instrument(skip(self, changes))]
    async fn update(&self, id: &str, changes: &UserDraft) -> Result<User, RepoError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
               SET username   = COALESCE(NULLIF($2, ''), username),
                   email      = COALESCE(NULLIF($3, ''), email),
                   password   = COALESCE(NULLIF($4, ''), password),
                   updated_at = now()
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&changes.username)
        .bind(&changes.email)
        .bind(&changes.password)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<(), RepoError> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
