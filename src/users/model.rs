use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::{LoginRequest, RegisterRequest, UpdateUserRequest};
use crate::validation::{
    is_valid_email, sanitize, Action, Validate, ValidationError, MIN_PASSWORD_LEN,
};

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String, // argon2 PHC string
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Candidate user fields as received from a client, before persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDraft {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

impl UserDraft {
    /// New registration: fresh id, sanitized username and email.
    pub fn register(req: RegisterRequest) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username: sanitize(&req.username),
            email: sanitize(&req.email),
            password: req.password,
        }
    }

    pub fn login(req: LoginRequest) -> Self {
        Self {
            email: sanitize(&req.email),
            password: req.password,
            ..Self::default()
        }
    }

    /// Update of an existing user; the id always comes from the path.
    pub fn update(id: &str, req: UpdateUserRequest) -> Self {
        Self {
            id: id.to_string(),
            username: req.username,
            email: req.email,
            password: req.password,
        }
    }
}

impl Validate for UserDraft {
    fn validate(&self, action: Action) -> Result<(), ValidationError> {
        match action {
            Action::Login => {
                if self.email.is_empty() {
                    return Err(ValidationError::EmailRequired);
                }
                if self.password.is_empty() {
                    return Err(ValidationError::PasswordRequired);
                }
                if !is_valid_email(&self.email) {
                    return Err(ValidationError::EmailInvalid);
                }
                Ok(())
            }
            Action::Register | Action::Update => {
                if self.id.is_empty() {
                    Err(ValidationError::IdRequired)
                } else if self.email.is_empty() {
                    Err(ValidationError::EmailRequired)
                } else if !is_valid_email(&self.email) {
                    Err(ValidationError::EmailInvalid)
                } else if self.username.is_empty() {
                    Err(ValidationError::UsernameRequired)
                } else if self.password.is_empty() {
                    Err(ValidationError::PasswordRequired)
                } else if self.password.len() < MIN_PASSWORD_LEN {
                    Err(ValidationError::PasswordTooShort)
                } else {
                    Ok(())
                }
            }
            Action::Upload | Action::Change => Ok(()),
        }
    }
}
