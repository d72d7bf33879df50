use async_trait::async_trait;
use tracing::instrument;

use super::model::{PhotoDraft, PhotoRow};
use crate::{db::PgStore, error::RepoError};

#[async_trait]
pub trait PhotoRepo: Send + Sync {
    async fn list(&self, limit: i64) -> Result<Vec<PhotoRow>, RepoError>;
    async fn find_by_id(&self, id: i32) -> Result<PhotoRow, RepoError>;
    /// Newest photo belonging to `user_id`.
    async fn find_latest_by_user(&self, user_id: &str) -> Result<PhotoRow, RepoError>;
    async fn create(&self, draft: &PhotoDraft) -> Result<PhotoRow, RepoError>;
    /// Overwrites only the non-empty fields of `changes`.
    async fn update(&self, id: i32, changes: &PhotoDraft) -> Result<PhotoRow, RepoError>;
    async fn delete(&self, id: i32) -> Result<(), RepoError>;
}

#[async_trait]
impl PhotoRepo for PgStore {
    async fn list(&self, limit: i64) -> Result<Vec<PhotoRow>, RepoError> {
        let rows = sqlx::query_as::<_, PhotoRow>(
            r#"
            SELECT id, title, caption, photo_url, user_id
              FROM photos
             ORDER BY id ASC
             LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: i32) -> Result<PhotoRow, RepoError> {
        let row = sqlx::query_as::<_, PhotoRow>(
            "SELECT id, title, caption, photo_url, user_id FROM photos WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_latest_by_user(&self, user_id: &str) -> Result<PhotoRow, RepoError> {
        let row = sqlx::query_as::<_, PhotoRow>(
            r#"
            SELECT id, title, caption, photo_url, user_id
              FROM photos
             WHERE user_id = $1
             ORDER BY id DESC
             LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    #[instrument(skip(self, draft), fields(user_id = %draft.user_id))]
    async fn create(&self, draft: &PhotoDraft) -> Result<PhotoRow, RepoError> {
        let row = sqlx::query_as::<_, PhotoRow>(
            r#"
            INSERT INTO photos (title, caption, photo_url, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, caption, photo_url, user_id
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.caption)
        .bind(&draft.photo_url)
        .bind(&draft.user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    #[instrument(skip(self, changes))]
    async fn update(&self, id: i32, changes: &PhotoDraft) -> Result<PhotoRow, RepoError> {
        let row = sqlx::query_as::<_, PhotoRow>(
            r#"
            UPDATE photos
               SET title     = COALESCE(NULLIF($2, ''), title),
                   caption   = COALESCE(NULLIF($3, ''), caption),
                   photo_url = COALESCE(NULLIF($4, ''), photo_url),
                   user_id   = COALESCE(NULLIF($5, ''), user_id)
             WHERE id = $1
            RETURNING id, title, caption, photo_url, user_id
            "#,
        )
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.caption)
        .bind(&changes.photo_url)
        .bind(&changes.user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let res = sqlx::query("DELETE FROM photos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
