//! In-memory Strapi-compatible server.
//!
//! Implements the users-permissions auth routes and generic content-type
//! collections under `/api`, answering with Strapi's response and error
//! envelopes. Reads are public; writes require a bearer token issued by one
//! of the auth routes.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

const DEFAULT_PAGE_SIZE: usize = 25;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub provider: String,
    pub confirmed: bool,
    pub blocked: bool,
    #[serde(skip_serializing, default)]
    password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    pub id: u64,
    pub attributes: Map<String, Value>,
}

#[derive(Deserialize)]
pub struct LoginBody {
    pub identifier: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterBody {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordBody {
    pub code: String,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Deserialize)]
pub struct EmailBody {
    pub email: String,
}

#[derive(Deserialize)]
pub struct CallbackParams {
    pub access_token: Option<String>,
}

#[derive(Debug, Default)]
pub struct Store {
    users: Vec<User>,
    sessions: HashMap<String, u64>,
    reset_codes: HashMap<String, u64>,
    confirmations: Vec<String>,
    collections: HashMap<String, BTreeMap<u64, Entry>>,
    next_user_id: u64,
    next_entry_id: u64,
}

impl Store {
    /// Latest reset code issued by `/auth/forgot-password` for `email`.
    pub fn reset_code_for(&self, email: &str) -> Option<String> {
        let user_id = self.users.iter().find(|u| u.email.eq_ignore_ascii_case(email))?.id;
        self.reset_codes
            .iter()
            .find(|(_, id)| **id == user_id)
            .map(|(code, _)| code.clone())
    }

    /// Emails that asked for a confirmation mail, in order.
    pub fn confirmations(&self) -> &[String] {
        &self.confirmations
    }

    pub fn is_session(&self, jwt: &str) -> bool {
        self.sessions.contains_key(jwt)
    }

    fn insert_user(&mut self, username: String, email: String, password: String, provider: &str) -> User {
        self.next_user_id += 1;
        let user = User {
            id: self.next_user_id,
            username,
            email,
            provider: provider.to_string(),
            confirmed: true,
            blocked: false,
            password,
        };
        self.users.push(user.clone());
        user
    }

    fn issue_session(&mut self, user: &User) -> Value {
        let jwt = Uuid::new_v4().to_string();
        self.sessions.insert(jwt.clone(), user.id);
        json!({ "jwt": jwt, "user": user })
    }

    fn session_user(&self, headers: &HeaderMap) -> Option<&User> {
        let jwt = headers
            .get(header::AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?;
        let id = self.sessions.get(jwt)?;
        self.users.iter().find(|u| u.id == *id)
    }
}

pub type Db = Arc<RwLock<Store>>;

/// Strapi-shaped error: `{ data: null, error: { status, name, message, details } }`.
#[derive(Debug)]
pub struct StrapiError {
    status: StatusCode,
    name: &'static str,
    message: String,
}

impl StrapiError {
    fn new(status: StatusCode, name: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            name,
            message: message.into(),
        }
    }

    fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "ValidationError", message)
    }

    fn application(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "ApplicationError", message)
    }

    fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UnauthorizedError", "Missing or invalid credentials")
    }

    fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "ForbiddenError", "Forbidden")
    }

    fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "NotFoundError", "Not Found")
    }
}

impl IntoResponse for StrapiError {
    fn into_response(self) -> Response {
        let body = json!({
            "data": null,
            "error": {
                "status": self.status.as_u16(),
                "name": self.name,
                "message": self.message,
                "details": {}
            }
        });
        (self.status, Json(body)).into_response()
    }
}

pub fn app() -> Router {
    app_with_db(Db::default())
}

pub fn app_with_db(db: Db) -> Router {
    let api = Router::new()
        .route("/auth/local", post(login))
        .route("/auth/local/register", post(register))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
        .route("/auth/send-email-confirmation", post(send_email_confirmation))
        .route("/auth/{provider}/callback", get(provider_callback))
        .route("/users/me", get(me))
        .route("/{content_type}", get(find).post(create))
        .route(
            "/{content_type}/{id}",
            get(find_one).put(update).delete(delete),
        );
    Router::new().nest("/api", api).with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_db(listener, Db::default()).await
}

pub async fn run_with_db(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_db(db)).await
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

async fn login(State(db): State<Db>, Json(input): Json<LoginBody>) -> Result<Json<Value>, StrapiError> {
    let mut store = db.write().await;
    let user = store
        .users
        .iter()
        .find(|u| {
            (u.email.eq_ignore_ascii_case(&input.identifier) || u.username == input.identifier)
                && u.password == input.password
        })
        .cloned()
        .ok_or_else(|| StrapiError::validation("Invalid identifier or password"))?;
    if user.blocked {
        return Err(StrapiError::application("Your account has been blocked by an administrator"));
    }
    info!(user = user.id, "login");
    Ok(Json(store.issue_session(&user)))
}

async fn register(State(db): State<Db>, Json(input): Json<RegisterBody>) -> Result<Json<Value>, StrapiError> {
    if input.username.is_empty() || input.email.is_empty() || input.password.is_empty() {
        return Err(StrapiError::validation("username, email and password are required"));
    }
    if !input.email.contains('@') {
        return Err(StrapiError::validation("email must be a valid email"));
    }

    let mut store = db.write().await;
    let taken = store
        .users
        .iter()
        .any(|u| u.username == input.username || u.email.eq_ignore_ascii_case(&input.email));
    if taken {
        return Err(StrapiError::application("Email or Username are already taken"));
    }

    let user = store.insert_user(input.username, input.email.to_lowercase(), input.password, "local");
    info!(user = user.id, "registered");
    Ok(Json(store.issue_session(&user)))
}

async fn forgot_password(State(db): State<Db>, Json(input): Json<EmailBody>) -> Json<Value> {
    let mut store = db.write().await;
    let user_id = store
        .users
        .iter()
        .find(|u| u.email.eq_ignore_ascii_case(&input.email))
        .map(|u| u.id);
    if let Some(user_id) = user_id {
        store.reset_codes.retain(|_, id| *id != user_id);
        store.reset_codes.insert(Uuid::new_v4().simple().to_string(), user_id);
        info!(user = user_id, "reset code issued");
    }
    Json(json!({ "ok": true }))
}

async fn reset_password(
    State(db): State<Db>,
    Json(input): Json<ResetPasswordBody>,
) -> Result<Json<Value>, StrapiError> {
    if input.password != input.password_confirmation {
        return Err(StrapiError::validation("Passwords do not match"));
    }

    let mut store = db.write().await;
    let user_id = store
        .reset_codes
        .remove(&input.code)
        .ok_or_else(|| StrapiError::validation("Incorrect code provided"))?;
    let user = store
        .users
        .iter_mut()
        .find(|u| u.id == user_id)
        .ok_or_else(|| StrapiError::validation("Incorrect code provided"))?;
    user.password = input.password;
    let user = user.clone();

    info!(user = user.id, "password reset");
    Ok(Json(store.issue_session(&user)))
}

async fn send_email_confirmation(
    State(db): State<Db>,
    Json(input): Json<EmailBody>,
) -> Result<Json<Value>, StrapiError> {
    if !input.email.contains('@') {
        return Err(StrapiError::validation("email must be a valid email"));
    }
    db.write().await.confirmations.push(input.email.clone());
    Ok(Json(json!({ "email": input.email, "sent": true })))
}

async fn provider_callback(
    State(db): State<Db>,
    Path(provider): Path<String>,
    Query(params): Query<CallbackParams>,
) -> Result<Json<Value>, StrapiError> {
    let access_token = params
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| StrapiError::validation("access_token is required"))?;

    let mut store = db.write().await;
    let username = format!("{provider}-{access_token}");
    let existing = store
        .users
        .iter()
        .find(|u| u.provider == provider && u.username == username)
        .cloned();
    let user = match existing {
        Some(user) => user,
        None => {
            let email = format!("{username}@{provider}.invalid");
            store.insert_user(username, email, String::new(), &provider)
        }
    };

    info!(user = user.id, provider = %provider, "provider login");
    Ok(Json(store.issue_session(&user)))
}

async fn me(State(db): State<Db>, headers: HeaderMap) -> Result<Json<User>, StrapiError> {
    let store = db.read().await;
    store
        .session_user(&headers)
        .cloned()
        .map(Json)
        .ok_or_else(StrapiError::unauthorized)
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

async fn find(
    State(db): State<Db>,
    Path(content_type): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StrapiError> {
    let page = parse_positive(&params, "pagination[page]")?.unwrap_or(1);
    let page_size = parse_positive(&params, "pagination[pageSize]")?.unwrap_or(DEFAULT_PAGE_SIZE);

    let filters: Vec<(&str, &str)> = params
        .iter()
        .filter_map(|(key, value)| {
            let field = key.strip_prefix("filters[")?.strip_suffix("][$eq]")?;
            Some((field, value.as_str()))
        })
        .collect();

    let store = db.read().await;
    let matching: Vec<&Entry> = store
        .collections
        .get(&content_type)
        .into_iter()
        .flat_map(|entries| entries.values())
        .filter(|entry| filters.iter().all(|(field, value)| attribute_eq(entry, field, value)))
        .collect();

    let total = matching.len();
    // An offset past usize::MAX is past every entry too.
    let offset = (page - 1).checked_mul(page_size).unwrap_or(usize::MAX);
    let data: Vec<&Entry> = matching
        .into_iter()
        .skip(offset)
        .take(page_size)
        .collect();

    debug!(content_type = %content_type, total, "find");
    Ok(Json(json!({
        "data": data,
        "meta": {
            "pagination": {
                "page": page,
                "pageSize": page_size,
                "pageCount": total.div_ceil(page_size),
                "total": total
            }
        }
    })))
}

async fn find_one(
    State(db): State<Db>,
    Path((content_type, id)): Path<(String, u64)>,
) -> Result<Json<Value>, StrapiError> {
    let store = db.read().await;
    let entry = store
        .collections
        .get(&content_type)
        .and_then(|entries| entries.get(&id))
        .ok_or_else(StrapiError::not_found)?;
    Ok(Json(json!({ "data": entry, "meta": {} })))
}

async fn create(
    State(db): State<Db>,
    Path(content_type): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StrapiError> {
    let attributes = data_payload(body)?;

    let mut store = db.write().await;
    if store.session_user(&headers).is_none() {
        return Err(StrapiError::forbidden());
    }
    store.next_entry_id += 1;
    let entry = Entry {
        id: store.next_entry_id,
        attributes,
    };
    store
        .collections
        .entry(content_type.clone())
        .or_default()
        .insert(entry.id, entry.clone());

    debug!(content_type = %content_type, id = entry.id, "create");
    Ok(Json(json!({ "data": entry, "meta": {} })))
}

async fn update(
    State(db): State<Db>,
    Path((content_type, id)): Path<(String, u64)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StrapiError> {
    let attributes = data_payload(body)?;

    let mut store = db.write().await;
    if store.session_user(&headers).is_none() {
        return Err(StrapiError::forbidden());
    }
    let entry = store
        .collections
        .get_mut(&content_type)
        .and_then(|entries| entries.get_mut(&id))
        .ok_or_else(StrapiError::not_found)?;
    entry.attributes.extend(attributes);

    debug!(content_type = %content_type, id, "update");
    Ok(Json(json!({ "data": entry, "meta": {} })))
}

async fn delete(
    State(db): State<Db>,
    Path((content_type, id)): Path<(String, u64)>,
    headers: HeaderMap,
) -> Result<Json<Value>, StrapiError> {
    let mut store = db.write().await;
    if store.session_user(&headers).is_none() {
        return Err(StrapiError::forbidden());
    }
    let entry = store
        .collections
        .get_mut(&content_type)
        .and_then(|entries| entries.remove(&id))
        .ok_or_else(StrapiError::not_found)?;

    debug!(content_type = %content_type, id, "delete");
    Ok(Json(json!({ "data": entry, "meta": {} })))
}

fn data_payload(body: Value) -> Result<Map<String, Value>, StrapiError> {
    match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Object(data)) => Ok(data),
            _ => Err(StrapiError::validation("Missing \"data\" payload in the request body")),
        },
        _ => Err(StrapiError::validation("Missing \"data\" payload in the request body")),
    }
}

fn parse_positive(params: &HashMap<String, String>, key: &str) -> Result<Option<usize>, StrapiError> {
    match params.get(key) {
        None => Ok(None),
        Some(raw) => match raw.parse::<usize>() {
            Ok(n) if n > 0 => Ok(Some(n)),
            _ => Err(StrapiError::validation(format!("{key} must be a positive integer"))),
        },
    }
}

fn attribute_eq(entry: &Entry, field: &str, expected: &str) -> bool {
    if field == "id" {
        return entry.id.to_string() == expected;
    }
    match entry.attributes.get(field) {
        Some(Value::String(s)) => s == expected,
        Some(other) => other.to_string() == expected,
        None => false,
    }
}
