use axum::{
    extract::{rejection::JsonRejection, Path, State},
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{PhotoRequest, LIST_LIMIT},
    model::{Owner, Photo, PhotoDraft, PhotoRow},
};
use crate::{
    auth::{extractors::AuthUser, middleware::require_bearer},
    envelope::Envelope,
    error::{ApiError, RepoError},
    state::AppState,
    users::model::User,
    validation::{Action, Validate},
};

/// Public listing plus the bearer-protected write group.
pub fn photo_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/photos", post(create_photo))
        .route("/photos/:photo_id", put(update_photo).delete(delete_photo))
        .route_layer(middleware::from_fn_with_state(state, require_bearer));

    Router::new()
        .route("/photos", get(list_photos))
        .merge(protected)
}

#[instrument(skip(state))]
pub async fn list_photos(
    State(state): State<AppState>,
) -> Result<Json<Envelope<Vec<Photo>>>, ApiError> {
    let rows = state.photos.list(LIST_LIMIT).await?;

    let mut photos = Vec::with_capacity(rows.len());
    for row in rows {
        let owner = state.users.find_by_id(&row.user_id).await?;
        photos.push(row.with_owner(Owner::from(&owner)));
    }

    Ok(Json(Envelope::success("Data retrieved successfully", photos)))
}

/// Creates the caller's photo, or replaces it when one already exists.
#[instrument(skip(state, caller, payload), fields(email = %caller.email))]
pub async fn create_photo(
    State(state): State<AppState>,
    caller: AuthUser,
    payload: Result<Json<PhotoRequest>, JsonRejection>,
) -> Result<Json<Envelope<Photo>>, ApiError> {
    let user = caller_account(&state, &caller).await?;

    let Json(payload) = payload?;
    let draft = PhotoDraft::from_request(payload, &user.id);
    draft.validate(Action::Upload)?;

    let (row, message) = match state.photos.find_latest_by_user(&user.id).await {
        Err(RepoError::NotFound) => {
            let row = state.photos.create(&draft).await?;
            info!(photo_id = row.id, user_id = %user.id, "photo created");
            (row, "Photo uploaded successfully")
        }
        Ok(existing) => {
            let row = state.photos.update(existing.id, &draft).await?;
            info!(photo_id = row.id, user_id = %user.id, "photo replaced");
            (row, "Photo changed successfully")
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Json(Envelope::success(
        message,
        row.with_owner(Owner::from(&user)),
    )))
}

#[instrument(skip(state, caller, payload), fields(email = %caller.email))]
pub async fn update_photo(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(photo_id): Path<String>,
    payload: Result<Json<PhotoRequest>, JsonRejection>,
) -> Result<Json<Envelope<Photo>>, ApiError> {
    let user = caller_account(&state, &caller).await?;

    let Json(payload) = payload?;
    let mut changes = PhotoDraft::changes(payload);
    changes.validate(Action::Change)?;

    let photo = find_photo(&state, &photo_id).await?;
    ensure_owner(&photo, &user, "You can't change photo of another user")?;

    changes.user_id = user.id.clone();
    let row = state.photos.update(photo.id, &changes).await?;

    info!(photo_id = row.id, user_id = %user.id, "photo updated");
    Ok(Json(Envelope::success(
        "Photo updated successfully",
        row.with_owner(Owner::from(&user)),
    )))
}

#[instrument(skip(state, caller), fields(email = %caller.email))]
pub async fn delete_photo(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(photo_id): Path<String>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let user = caller_account(&state, &caller).await?;

    let photo = find_photo(&state, &photo_id).await?;
    ensure_owner(&photo, &user, "You can't delete photo of another user")?;

    state.photos.delete(photo.id).await?;

    info!(photo_id = photo.id, user_id = %user.id, "photo deleted");
    Ok(Json(Envelope::empty("Photo deleted successfully")))
}

/// Resolves the token's email to a live user row.
async fn caller_account(state: &AppState, caller: &AuthUser) -> Result<User, ApiError> {
    let email = &caller.email;
    match state.users.find_by_email(email).await {
        Ok(user) => Ok(user),
        Err(RepoError::NotFound) => {
            warn!(%email, "token refers to a missing user");
            Err(ApiError::NotFound(format!("User with email {email} not found")))
        }
        Err(e) => Err(e.into()),
    }
}

async fn find_photo(state: &AppState, raw_id: &str) -> Result<PhotoRow, ApiError> {
    let not_found = || ApiError::NotFound(format!("Photo with id {raw_id} not found"));
    let id: i32 = raw_id.parse().map_err(|_| not_found())?;
    match state.photos.find_by_id(id).await {
        Ok(row) => Ok(row),
        Err(RepoError::NotFound) => Err(not_found()),
        Err(e) => Err(e.into()),
    }
}

fn ensure_owner(photo: &PhotoRow, user: &User, message: &str) -> Result<(), ApiError> {
    if photo.user_id != user.id {
        warn!(photo_id = photo.id, user_id = %user.id, "photo ownership check failed");
        return Err(ApiError::Forbidden(message.into()));
    }
    Ok(())
}
