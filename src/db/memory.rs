//! In-process store for handler tests. Mirrors the Postgres constraints:
//! unique user id and email, cascading photo deletion.

use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    error::RepoError,
    photos::{
        model::{PhotoDraft, PhotoRow},
        repo::PhotoRepo,
    },
    users::{
        dto::PhotoSummary,
        model::{User, UserDraft},
        repo::UserRepo,
    },
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    photos: Vec<PhotoRow>,
    next_photo_id: i32,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn photo_count_for(&self, user_id: &str) -> usize {
        let t = self.tables.lock().unwrap();
        t.photos.iter().filter(|p| p.user_id == user_id).count()
    }
}

fn overwrite(target: &mut String, incoming: &str) {
    if !incoming.is_empty() {
        *target = incoming.to_string();
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn create(&self, draft: &UserDraft) -> Result<User, RepoError> {
        let mut t = self.tables.lock().unwrap();
        if t.users.iter().any(|u| u.id == draft.id) {
            return Err(RepoError::DuplicateId);
        }
        if t.users.iter().any(|u| u.email == draft.email) {
            return Err(RepoError::DuplicateEmail);
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: draft.id.clone(),
            username: draft.username.clone(),
            email: draft.email.clone(),
            password: draft.password.clone(),
            created_at: now,
            updated_at: now,
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> Result<User, RepoError> {
        let t = self.tables.lock().unwrap();
        t.users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn find_by_email(&self, email: &str) -> Result<User, RepoError> {
        let t = self.tables.lock().unwrap();
        t.users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn find_with_photo(&self, email: &str) -> Result<(User, PhotoSummary), RepoError> {
        let t = self.tables.lock().unwrap();
        let user = t
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(RepoError::NotFound)?;
        let photo = t
            .photos
            .iter()
            .filter(|p| p.user_id == user.id)
            .max_by_key(|p| p.id)
            .map(|p| PhotoSummary {
                title: p.title.clone(),
                caption: p.caption.clone(),
                photo_url: p.photo_url.clone(),
            })
            .unwrap_or_default();
        Ok((user, photo))
    }

    async fn update(&self, id: &str, changes: &UserDraft) -> Result<User, RepoError> {
        let mut t = self.tables.lock().unwrap();
        if !changes.email.is_empty()
            && t.users.iter().any(|u| u.id != id && u.email == changes.email)
        {
            return Err(RepoError::DuplicateEmail);
        }
        let user = t
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(RepoError::NotFound)?;
        overwrite(&mut user.username, &changes.username);
        overwrite(&mut user.email, &changes.email);
        overwrite(&mut user.password, &changes.password);
        user.updated_at = OffsetDateTime::now_utc();
        Ok(user.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), RepoError> {
        let mut t = self.tables.lock().unwrap();
        let before = t.users.len();
        t.users.retain(|u| u.id != id);
        if t.users.len() == before {
            return Err(RepoError::NotFound);
        }
        t.photos.retain(|p| p.user_id != id);
        Ok(())
    }
}

#[async_trait]
impl PhotoRepo for MemoryStore {
    async fn list(&self, limit: i64) -> Result<Vec<PhotoRow>, RepoError> {
        let t = self.tables.lock().unwrap();
        Ok(t.photos
            .iter()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<PhotoRow, RepoError> {
        let t = self.tables.lock().unwrap();
        t.photos
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn find_latest_by_user(&self, user_id: &str) -> Result<PhotoRow, RepoError> {
        let t = self.tables.lock().unwrap();
        t.photos
            .iter()
            .filter(|p| p.user_id == user_id)
            .max_by_key(|p| p.id)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn create(&self, draft: &PhotoDraft) -> Result<PhotoRow, RepoError> {
        let mut t = self.tables.lock().unwrap();
        if !t.users.iter().any(|u| u.id == draft.user_id) {
            return Err(RepoError::Database(sqlx::Error::Protocol(
                "foreign key violation on photos.user_id".into(),
            )));
        }
        t.next_photo_id += 1;
        let row = PhotoRow {
            id: t.next_photo_id,
            title: draft.title.clone(),
            caption: draft.caption.clone(),
            photo_url: draft.photo_url.clone(),
            user_id: draft.user_id.clone(),
        };
        t.photos.push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: i32, changes: &PhotoDraft) -> Result<PhotoRow, RepoError> {
        let mut t = self.tables.lock().unwrap();
        let row = t
            .photos
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepoError::NotFound)?;
        overwrite(&mut row.title, &changes.title);
        overwrite(&mut row.caption, &changes.caption);
        overwrite(&mut row.photo_url, &changes.photo_url);
        overwrite(&mut row.user_id, &changes.user_id);
        Ok(row.clone())
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let mut t = self.tables.lock().unwrap();
        let before = t.photos.len();
        t.photos.retain(|p| p.id != id);
        if t.photos.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
