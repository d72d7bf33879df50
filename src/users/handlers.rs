use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{post, put},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use super::{
    dto::{LoginRequest, LoginResponse, RegisterRequest, UpdateUserRequest, UserProfile},
    model::UserDraft,
};
use crate::{
    auth::password::{hash_password, verify_password},
    envelope::Envelope,
    error::{ApiError, RepoError},
    state::AppState,
    validation::{Action, Validate},
};

type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/login", post(login))
        .route("/users/register", post(register))
        .route("/users/:user_id", put(update_user).delete(delete_user))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(payload) = payload?;
    let candidate = UserDraft::login(payload);
    candidate.validate(Action::Login)?;

    let (user, photos) = match state.users.find_with_photo(&candidate.email).await {
        Ok(found) => found,
        Err(RepoError::NotFound) => {
            warn!(email = %candidate.email, "login unknown email");
            return Err(ApiError::NotFound("Email is not registered".into()));
        }
        Err(e) => return Err(e.into()),
    };

    let ok = verify_password(&user.password, &candidate.password).map_err(|e| {
        error!(error = %e, user_id = %user.id, "password check failed");
        ApiError::from(e)
    })?;
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.jwt.issue(&user.email, &user.username)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(Envelope::success(
        "Login successfully",
        LoginResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            token,
            photos,
        },
    )))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<UserProfile> {
    let Json(payload) = payload?;
    let mut candidate = UserDraft::register(payload);
    candidate.validate(Action::Register)?;

    candidate.password = hash_password(&candidate.password)?;
    let user = state.users.create(&candidate).await?;

    info!(user_id = %user.id, "user registered");
    Ok(Json(Envelope::success(
        "User registered successfully",
        UserProfile::from(user),
    )))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<UserProfile> {
    let existing = find_user(&state, &user_id).await?;

    let Json(payload) = payload?;
    let mut candidate = UserDraft::update(&existing.id, payload);
    candidate.validate(Action::Update)?;

    candidate.password = hash_password(&candidate.password)?;
    let user = state.users.update(&existing.id, &candidate).await?;

    info!(user_id = %user.id, "user updated");
    Ok(Json(Envelope::success(
        "User updated successfully",
        UserProfile::from(user),
    )))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let existing = find_user(&state, &user_id).await?;
    state.users.delete(&existing.id).await?;

    info!(user_id = %existing.id, "user deleted");
    Ok(Json(Envelope::empty("User deleted successfully")))
}

async fn find_user(state: &AppState, user_id: &str) -> Result<super::model::User, ApiError> {
    match state.users.find_by_id(user_id).await {
        Ok(user) => Ok(user),
        Err(RepoError::NotFound) => Err(ApiError::NotFound(format!(
            "User with id {user_id} not found"
        ))),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    use crate::{app::build_app, state::AppState};

    fn server() -> TestServer {
        let (state, _) = AppState::fake();
        TestServer::new(build_app(state)).unwrap()
    }

    async fn register(server: &TestServer, username: &str, email: &str) -> Value {
        let res = server
            .post("/users/register")
            .json(&json!({ "username": username, "email": email, "password": "longpassword" }))
            .await;
        assert_eq!(res.status_code(), StatusCode::OK);
        res.json::<Value>()
    }

    #[tokio::test]
    async fn register_then_login() {
        let server = server();
        let body = register(&server, "alice", "a@x.com").await;
        assert_eq!(body["status"], "Success");
        assert_eq!(body["data"]["email"], "a@x.com");
        assert_eq!(body["data"]["username"], "alice");
        assert!(body["data"].get("password").is_none());

        let res = server
            .post("/users/login")
            .json(&json!({ "email": "a@x.com", "password": "longpassword" }))
            .await;
        assert_eq!(res.status_code(), StatusCode::OK);
        let body = res.json::<Value>();
        assert_eq!(body["message"], "Login successfully");
        assert!(!body["data"]["token"].as_str().unwrap().is_empty());
        assert_eq!(body["data"]["photos"]["title"], "");
    }

    #[tokio::test]
    async fn issued_token_validates() {
        let (state, _) = AppState::fake();
        let jwt = state.jwt.clone();
        let server = TestServer::new(build_app(state)).unwrap();
        register(&server, "alice", "a@x.com").await;
        let body = server
            .post("/users/login")
            .json(&json!({ "email": "a@x.com", "password": "longpassword" }))
            .await
            .json::<Value>();
        let token = body["data"]["token"].as_str().unwrap();
        assert_eq!(jwt.extract_email(token).unwrap(), "a@x.com");
    }

    #[tokio::test]
    async fn register_ids_are_fresh() {
        let server = server();
        let a = register(&server, "alice", "a@x.com").await;
        let b = register(&server, "bob", "b@x.com").await;
        assert_ne!(a["data"]["id"], b["data"]["id"]);
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email() {
        let server = server();
        register(&server, "alice", "a@x.com").await;
        let res = server
            .post("/users/register")
            .json(&json!({ "username": "other", "email": "a@x.com", "password": "longpassword" }))
            .await;
        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.json::<Value>()["message"], "Email already exist");
    }

    #[tokio::test]
    async fn register_validation_messages() {
        let server = server();
        let res = server
            .post("/users/register")
            .json(&json!({ "username": "alice", "email": "a@x.com", "password": "short" }))
            .await;
        assert_eq!(res.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = res.json::<Value>();
        assert_eq!(body["status"], "Error");
        assert_eq!(body["message"], "Password must be at least 8 characters");
        assert!(body["data"].is_null());

        let res = server
            .post("/users/register")
            .json(&json!({ "username": "alice", "email": "nope" }))
            .await;
        assert_eq!(res.json::<Value>()["message"], "Email is invalid");
    }

    #[tokio::test]
    async fn malformed_body_is_unprocessable() {
        let server = server();
        let res = server
            .post("/users/register")
            .content_type("application/json")
            .bytes("{not json".into())
            .await;
        assert_eq!(res.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(res.json::<Value>()["status"], "Error");
    }

    #[tokio::test]
    async fn login_failures() {
        let server = server();
        register(&server, "alice", "a@x.com").await;

        let res = server
            .post("/users/login")
            .json(&json!({ "email": "a@x.com", "password": "wrongpassword" }))
            .await;
        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(res.json::<Value>()["message"], "Password is incorrect");

        let res = server
            .post("/users/login")
            .json(&json!({ "email": "ghost@x.com", "password": "longpassword" }))
            .await;
        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(res.json::<Value>()["message"], "Email is not registered");

        let res = server
            .post("/users/login")
            .json(&json!({ "email": "a@x.com" }))
            .await;
        assert_eq!(res.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(res.json::<Value>()["message"], "Password is required");
    }

    #[tokio::test]
    async fn update_user_applies_changes_and_rehashes() {
        let server = server();
        let id = register(&server, "alice", "a@x.com").await["data"]["id"]
            .as_str()
            .unwrap()
            .to_string();

        let res = server
            .put(&format!("/users/{id}"))
            .json(&json!({ "username": "alice2", "email": "a2@x.com", "password": "newpassword" }))
            .await;
        assert_eq!(res.status_code(), StatusCode::OK);
        let body = res.json::<Value>();
        assert_eq!(body["status"], "Success");
        assert_eq!(body["data"]["id"], id.as_str());
        assert_eq!(body["data"]["username"], "alice2");

        let res = server
            .post("/users/login")
            .json(&json!({ "email": "a2@x.com", "password": "newpassword" }))
            .await;
        assert_eq!(res.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn update_user_requires_full_field_set() {
        let server = server();
        let id = register(&server, "alice", "a@x.com").await["data"]["id"]
            .as_str()
            .unwrap()
            .to_string();
        let res = server
            .put(&format!("/users/{id}"))
            .json(&json!({ "username": "alice2" }))
            .await;
        assert_eq!(res.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(res.json::<Value>()["message"], "Email is required");
    }

    #[tokio::test]
    async fn unknown_user_is_bad_request() {
        let server = server();
        let res = server
            .put("/users/missing")
            .json(&json!({ "username": "x", "email": "x@x.com", "password": "longpassword" }))
            .await;
        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(res.json::<Value>()["message"], "User with id missing not found");

        let res = server.delete("/users/missing").await;
        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_user() {
        let server = server();
        let id = register(&server, "alice", "a@x.com").await["data"]["id"]
            .as_str()
            .unwrap()
            .to_string();
        let res = server.delete(&format!("/users/{id}")).await;
        assert_eq!(res.status_code(), StatusCode::OK);
        let body = res.json::<Value>();
        assert_eq!(body["status"], "Success");
        assert!(body["data"].is_null());

        let res = server
            .post("/users/login")
            .json(&json!({ "email": "a@x.com", "password": "longpassword" }))
            .await;
        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    }
}
