use serde::{Deserialize, Serialize};

/// JWT payload identifying the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub username: String,
    pub email: String,
    pub exp: usize, // expires at (unix timestamp)
}
