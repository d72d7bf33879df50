use serde::Serialize;
use sqlx::FromRow;

use super::dto::PhotoRequest;
use crate::{
    users::model::User,
    validation::{sanitize, Action, Validate, ValidationError},
};

/// Row of the `photos` table.
#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct PhotoRow {
    pub id: i32,
    pub title: String,
    pub caption: String,
    pub photo_url: String,
    pub user_id: String,
}

/// Display view of the owning user, always read from the live user row.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Owner {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl From<&User> for Owner {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.clone(),
            username: u.username.clone(),
            email: u.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Photo {
    pub id: i32,
    pub title: String,
    pub caption: String,
    pub photo_url: String,
    pub user_id: String,
    pub owner: Owner,
}

impl PhotoRow {
    pub fn with_owner(self, owner: Owner) -> Photo {
        Photo {
            id: self.id,
            title: self.title,
            caption: self.caption,
            photo_url: self.photo_url,
            user_id: self.user_id,
            owner,
        }
    }
}

/// Candidate photo fields from a request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoDraft {
    pub title: String,
    pub caption: String,
    pub photo_url: String,
    pub user_id: String,
}

impl PhotoDraft {
    /// Upload candidate: sanitized fields owned by `user_id`.
    pub fn from_request(req: PhotoRequest, user_id: &str) -> Self {
        Self {
            title: sanitize(&req.title),
            caption: sanitize(&req.caption),
            photo_url: sanitize(&req.photo_url),
            user_id: user_id.to_string(),
        }
    }

    /// Edit of an existing photo; fields are stored as sent.
    pub fn changes(req: PhotoRequest) -> Self {
        Self {
            title: req.title,
            caption: req.caption,
            photo_url: req.photo_url,
            user_id: String::new(),
        }
    }
}

impl Validate for PhotoDraft {
    fn validate(&self, action: Action) -> Result<(), ValidationError> {
        match action {
            Action::Upload => {
                if self.title.is_empty() {
                    Err(ValidationError::TitleRequired)
                } else if self.caption.is_empty() {
                    Err(ValidationError::CaptionRequired)
                } else if self.user_id.is_empty() {
                    Err(ValidationError::UserIdRequired)
                } else {
                    Ok(())
                }
            }
            Action::Change => {
                if self.title.is_empty() {
                    Err(ValidationError::TitleRequired)
                } else if self.caption.is_empty() {
                    Err(ValidationError::CaptionRequired)
                } else if self.photo_url.is_empty() {
                    Err(ValidationError::PhotoUrlRequired)
                } else {
                    Ok(())
                }
            }
            Action::Login | Action::Register | Action::Update => Ok(()),
        }
    }
}
