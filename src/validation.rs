use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

/// The operation a candidate record is being checked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Login,
    Register,
    Update,
    Upload,
    Change,
}

impl Action {
    /// Case-insensitive lookup of an action tag. Unknown tags yield `None`.
    #[cfg(test)]
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "login" => Some(Action::Login),
            "register" => Some(Action::Register),
            "update" => Some(Action::Update),
            "upload" => Some(Action::Upload),
            "change" => Some(Action::Change),
            _ => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ID is required")]
    IdRequired,
    #[error("Email is required")]
    EmailRequired,
    #[error("Email is invalid")]
    EmailInvalid,
    #[error("Username is required")]
    UsernameRequired,
    #[error("Password is required")]
    PasswordRequired,
    #[error("Password must be at least 8 characters")]
    PasswordTooShort,
    #[error("Title is required")]
    TitleRequired,
    #[error("Caption is required")]
    CaptionRequired,
    #[error("UserID is required")]
    UserIdRequired,
    #[error("PhotoUrl is required")]
    PhotoUrlRequired,
}

pub const MIN_PASSWORD_LEN: usize = 8;

/// Ordered field checks; the first violated rule is returned.
pub trait Validate {
    fn validate(&self, action: Action) -> Result<(), ValidationError>;

    /// Same as [`Validate::validate`] but keyed by a raw tag. Unknown tags pass.
    #[cfg(test)]
    fn validate_tag(&self, tag: &str) -> Result<(), ValidationError> {
        match Action::parse(tag) {
            Some(action) => self.validate(action),
            None => Ok(()),
        }
    }
}

/// Format check only: dot-atom local part, RFC 1035 style domain labels.
pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
        )
        .unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Trims surrounding whitespace and escapes HTML-significant characters.
pub fn sanitize(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut out = String::with_capacity(trimmed.len());
    for c in trimmed.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&#39;"),
            '"' => out.push_str("&#34;"),
            _ => out.push(c),
        }
    }
    out
}
