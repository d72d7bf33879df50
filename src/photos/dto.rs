use serde::Deserialize;

/// Body of POST /photos and PUT /photos/:photoId.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PhotoRequest {
    pub title: String,
    pub caption: String,
    pub photo_url: String,
}

/// Maximum number of rows returned by the photo listing.
pub const LIST_LIMIT: i64 = 100;
