//! Client behaviour against a recording transport.
//!
//! # Design
//! `MockTransport` records every `HttpRequest` it receives and answers from a
//! queue of canned responses, so tests can assert what was sent (URL, body,
//! `Authorization` header) and in which order, alongside the session state
//! and the storage backends.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde::Deserialize;
use serde_json::{json, Value};
use strapi_core::{
    ApiError, ClientOptions, CookieJar, CookieOptions, HttpMethod, HttpRequest, HttpResponse, Interactive, KeyValueStore,
    MemoryCookieJar, MemoryStore, StoreOptions, StrapiClient, StrapiResponse, Transport, TransportError,
};
use url::Url;

#[derive(Clone, Default)]
struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    responses: VecDeque<Result<HttpResponse, String>>,
    requests: Vec<HttpRequest>,
}

impl MockTransport {
    fn respond(&self, status: u16, body: Value) {
        self.state.lock().unwrap().responses.push_back(Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }));
    }

    fn fail(&self, message: &str) {
        self.state.lock().unwrap().responses.push_back(Err(message.to_string()));
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    fn last(&self) -> HttpRequest {
        self.requests().pop().expect("no request recorded")
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request);
        match state.responses.pop_front().expect("no canned response left") {
            Ok(response) => Ok(response),
            Err(message) => Err(TransportError::new(message)),
        }
    }
}

struct Fixture {
    transport: MockTransport,
    cookies: Arc<MemoryCookieJar>,
    local: Arc<MemoryStore>,
    env: Arc<Interactive>,
}

impl Fixture {
    fn new() -> Self {
        let cookies = Arc::new(MemoryCookieJar::new());
        let local = Arc::new(MemoryStore::new());
        let env = Arc::new(
            Interactive::new()
                .with_cookies(cookies.clone())
                .with_local_storage(local.clone()),
        );
        Self {
            transport: MockTransport::default(),
            cookies,
            local,
            env,
        }
    }

    fn client(&self, options: ClientOptions) -> StrapiClient<MockTransport> {
        StrapiClient::with_environment(self.transport.clone(), options, self.env.clone()).unwrap()
    }
}

fn local_storage_options() -> ClientOptions {
    ClientOptions {
        store: Some(StoreOptions {
            use_local_storage: Some(true),
            ..StoreOptions::default()
        }),
        ..ClientOptions::default()
    }
}

fn user() -> Value {
    json!({"id": 1, "username": "ada", "email": "ada@example.com"})
}

fn body(req: &HttpRequest) -> Value {
    serde_json::from_str(req.body.as_deref().expect("request has no body")).unwrap()
}

fn query(req: &HttpRequest) -> Vec<(String, String)> {
    Url::parse(&req.url)
        .unwrap()
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

fn server_error(status: u16, name: &str, message: &str) -> Value {
    json!({
        "data": null,
        "error": {"status": status, "name": name, "message": message, "details": {}}
    })
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

#[test]
fn stored_cookie_token_is_attached_at_construction() {
    let fx = Fixture::new();
    fx.cookies.set("strapi_jwt", "stored", &Default::default());

    let client = fx.client(ClientOptions::default());
    assert_eq!(client.token(), Some("stored"));
    assert_eq!(client.authorization_header().as_deref(), Some("Bearer stored"));

    fx.transport.respond(200, json!({"data": [], "meta": {}}));
    client.find::<Vec<Value>>("articles", None).unwrap();
    assert_eq!(fx.transport.last().header("authorization"), Some("Bearer stored"));
    assert!(fx.transport.requests().len() == 1);
}

/// Cookie jar and key-value store that count writes.
#[derive(Default)]
struct CountingStorage {
    cookies: MemoryCookieJar,
    local: MemoryStore,
    writes: AtomicUsize,
}

impl CookieJar for CountingStorage {
    fn get(&self, name: &str) -> Option<String> {
        self.cookies.get(name)
    }

    fn set(&self, name: &str, value: &str, options: &CookieOptions) {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.cookies.set(name, value, options);
    }

    fn remove(&self, name: &str, options: &CookieOptions) {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.cookies.remove(name, options);
    }
}

impl KeyValueStore for CountingStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.local.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.local.set_item(key, value);
    }

    fn remove_item(&self, key: &str) {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.local.remove_item(key);
    }
}

#[test]
fn restoring_a_stored_token_does_not_rewrite_storage() {
    let storage = Arc::new(CountingStorage::default());
    storage.cookies.set("strapi_jwt", "in-cookie", &CookieOptions::default());
    storage.local.set_item("strapi_jwt", "in-local");
    let env = Arc::new(
        Interactive::new()
            .with_cookies(storage.clone())
            .with_local_storage(storage.clone()),
    );

    let client: StrapiClient<MockTransport> =
        StrapiClient::with_environment(MockTransport::default(), ClientOptions::default(), env.clone()).unwrap();
    assert_eq!(client.token(), Some("in-cookie"));

    let client: StrapiClient<MockTransport> =
        StrapiClient::with_environment(MockTransport::default(), local_storage_options(), env).unwrap();
    assert_eq!(client.token(), Some("in-local"));

    assert_eq!(storage.writes.load(Ordering::SeqCst), 0);
    assert_eq!(storage.cookies.get("strapi_jwt").as_deref(), Some("in-cookie"));
    assert_eq!(storage.local.get_item("strapi_jwt").as_deref(), Some("in-local"));
}

#[test]
fn stored_local_token_is_read_from_configured_key() {
    let fx = Fixture::new();
    fx.local.set_item("custom_key", "stored");
    fx.cookies.set("custom_key", "from-cookie", &Default::default());

    let options = ClientOptions {
        store: Some(StoreOptions {
            key: Some("custom_key".to_string()),
            use_local_storage: Some(true),
            cookie_options: None,
        }),
        ..ClientOptions::default()
    };
    let client = fx.client(options);
    assert_eq!(client.token(), Some("stored"));
    assert_eq!(client.config().store.cookie_options.path.as_deref(), Some("/"));
}

#[test]
fn headless_client_never_touches_storage() {
    let transport = MockTransport::default();
    let mut client: StrapiClient<MockTransport> =
        StrapiClient::new(transport.clone(), ClientOptions::default()).unwrap();
    assert!(client.token().is_none());

    transport.respond(200, json!({"jwt": "T", "user": user()}));
    client.login("ada", "secret").unwrap();
    assert_eq!(client.token(), Some("T"));
    assert_eq!(transport.last().url, "http://localhost:1337/api/auth/local");
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[test]
fn login_stores_token_in_cookie_and_user() {
    let fx = Fixture::new();
    let mut client = fx.client(ClientOptions::default());

    fx.transport.respond(200, json!({"jwt": "T", "user": user()}));
    let auth = client.login("ada@example.com", "secret").unwrap();

    assert_eq!(auth.jwt, "T");
    assert_eq!(auth.user, user());
    assert_eq!(client.user(), Some(&user()));
    assert_eq!(client.authorization_header().as_deref(), Some("Bearer T"));

    let cookie = fx.cookies.cookie("strapi_jwt").unwrap();
    assert_eq!(cookie.value, "T");
    assert_eq!(cookie.options.path.as_deref(), Some("/"));
    assert!(fx.local.is_empty());

    let req = fx.transport.last();
    assert_eq!(req.method, HttpMethod::Post);
    assert_eq!(req.url, "http://localhost:1337/api/auth/local");
    assert_eq!(body(&req), json!({"identifier": "ada@example.com", "password": "secret"}));
}

#[test]
fn login_with_local_storage_writes_only_local_storage() {
    let fx = Fixture::new();
    let mut client = fx.client(local_storage_options());

    fx.transport.respond(200, json!({"jwt": "T", "user": user()}));
    client.login("ada", "secret").unwrap();

    assert_eq!(fx.local.get_item("strapi_jwt").as_deref(), Some("T"));
    assert!(fx.cookies.get("strapi_jwt").is_none());
}

#[test]
fn register_posts_credentials() {
    let fx = Fixture::new();
    let mut client = fx.client(ClientOptions::default());

    fx.transport.respond(200, json!({"jwt": "T", "user": user()}));
    let auth = client.register("ada", "ada@example.com", "secret").unwrap();
    assert_eq!(auth.jwt, "T");

    let req = fx.transport.last();
    assert_eq!(req.url, "http://localhost:1337/api/auth/local/register");
    assert_eq!(
        body(&req),
        json!({"username": "ada", "email": "ada@example.com", "password": "secret"})
    );
    assert_eq!(fx.cookies.get("strapi_jwt").as_deref(), Some("T"));
}

#[test]
fn reset_password_starts_session() {
    let fx = Fixture::new();
    let mut client = fx.client(ClientOptions::default());

    fx.transport.respond(200, json!({"jwt": "T", "user": user()}));
    client.reset_password("code-123", "new-secret", "new-secret").unwrap();

    let req = fx.transport.last();
    assert_eq!(req.url, "http://localhost:1337/api/auth/reset-password");
    assert_eq!(
        body(&req),
        json!({"code": "code-123", "password": "new-secret", "passwordConfirmation": "new-secret"})
    );
    assert_eq!(client.token(), Some("T"));
    assert_eq!(fx.cookies.get("strapi_jwt").as_deref(), Some("T"));
}

#[test]
fn existing_token_is_cleared_before_login_is_sent() {
    let fx = Fixture::new();
    let mut client = fx.client(ClientOptions::default());
    client.set_token("old");
    assert_eq!(fx.cookies.get("strapi_jwt").as_deref(), Some("old"));

    fx.transport.respond(200, json!({"jwt": "new", "user": user()}));
    client.login("ada", "secret").unwrap();

    let req = fx.transport.last();
    assert_eq!(req.header("authorization"), None);
    assert_eq!(client.token(), Some("new"));
}

#[test]
fn failed_login_leaves_no_stale_token() {
    let fx = Fixture::new();
    let mut client = fx.client(ClientOptions::default());
    client.set_token("old");

    let error = server_error(400, "ValidationError", "Invalid identifier or password");
    fx.transport.respond(400, error.clone());
    let err = client.login("ada", "wrong").unwrap_err();

    assert_eq!(err.body(), Some(&error));
    assert!(client.token().is_none());
    assert!(client.authorization_header().is_none());
    assert!(fx.cookies.get("strapi_jwt").is_none());
}

#[test]
fn forgot_password_clears_token_and_returns_nothing() {
    let fx = Fixture::new();
    let mut client = fx.client(ClientOptions::default());
    client.set_token("old");

    fx.transport.respond(200, json!({"ok": true}));
    client.forgot_password("ada@example.com").unwrap();

    let req = fx.transport.last();
    assert_eq!(req.url, "http://localhost:1337/api/auth/forgot-password");
    assert_eq!(req.header("authorization"), None);
    assert_eq!(body(&req), json!({"email": "ada@example.com"}));
    assert!(client.token().is_none());
    assert!(fx.cookies.get("strapi_jwt").is_none());
}

#[test]
fn send_email_confirmation_keeps_token() {
    let fx = Fixture::new();
    let mut client = fx.client(ClientOptions::default());
    client.set_token("T");

    fx.transport.respond(200, json!({"email": "ada@example.com", "sent": true}));
    client.send_email_confirmation("ada@example.com").unwrap();

    let req = fx.transport.last();
    assert_eq!(req.url, "http://localhost:1337/api/auth/send-email-confirmation");
    assert_eq!(req.header("authorization"), Some("Bearer T"));
    assert_eq!(client.token(), Some("T"));
    assert_eq!(fx.cookies.get("strapi_jwt").as_deref(), Some("T"));
}

#[test]
fn authenticate_provider_with_explicit_token() {
    let fx = Fixture::new();
    let mut client = fx.client(ClientOptions::default());

    fx.transport.respond(200, json!({"jwt": "T", "user": user()}));
    let auth = client.authenticate_provider("github", Some("gh-access")).unwrap();
    assert_eq!(auth.jwt, "T");

    let req = fx.transport.last();
    assert_eq!(req.method, HttpMethod::Get);
    assert!(req.url.starts_with("http://localhost:1337/api/auth/github/callback?"));
    assert_eq!(query(&req), vec![("access_token".to_string(), "gh-access".to_string())]);
    assert!(req.body.is_none());
    assert_eq!(fx.cookies.get("strapi_jwt").as_deref(), Some("T"));
}

#[test]
fn authenticate_provider_reads_token_from_location() {
    let fx = Fixture::new();
    fx.env.set_location(
        Url::parse("https://app.example.com/connect/google/redirect?id_token=x&access_token=from%20page").unwrap(),
    );
    let mut client = fx.client(ClientOptions::default());

    fx.transport.respond(200, json!({"jwt": "T", "user": user()}));
    client.authenticate_provider("google", None).unwrap();

    let req = fx.transport.last();
    assert_eq!(query(&req), vec![("access_token".to_string(), "from page".to_string())]);
}

#[test]
fn explicit_access_token_wins_over_location() {
    let fx = Fixture::new();
    fx.env.set_location(Url::parse("https://app.example.com/connect/github/redirect?access_token=from-page").unwrap());
    let mut client = fx.client(ClientOptions::default());

    fx.transport.respond(200, json!({"jwt": "T", "user": user()}));
    client.authenticate_provider("github", Some("explicit")).unwrap();
    assert_eq!(query(&fx.transport.last()), vec![("access_token".to_string(), "explicit".to_string())]);
}

#[test]
fn authenticate_provider_without_token_fails_before_sending() {
    let transport = MockTransport::default();
    let mut client: StrapiClient<MockTransport> =
        StrapiClient::new(transport.clone(), ClientOptions::default()).unwrap();
    client.set_token("old");

    let err = client.authenticate_provider("github", None).unwrap_err();
    assert!(matches!(err, ApiError::MissingAccessToken { ref provider } if provider == "github"));
    assert!(transport.requests().is_empty());
    assert!(client.token().is_none());
}

#[test]
fn provider_authentication_url_makes_no_call() {
    let fx = Fixture::new();
    let options = ClientOptions {
        url: Some("https://cms.example.com".to_string()),
        ..ClientOptions::default()
    };
    let client = fx.client(options);
    assert_eq!(
        client.get_provider_authentication_url("github").unwrap(),
        "https://cms.example.com/connect/github"
    );
    assert!(fx.transport.requests().is_empty());
}

#[test]
fn typed_user_schema() {
    #[derive(Debug, Clone, Deserialize, PartialEq)]
    struct User {
        id: u64,
        username: String,
    }

    let transport = MockTransport::default();
    let mut client: StrapiClient<MockTransport, User> =
        StrapiClient::new(transport.clone(), ClientOptions::default()).unwrap();

    transport.respond(200, json!({"jwt": "T", "user": user()}));
    let auth = client.login("ada", "secret").unwrap();
    assert_eq!(auth.user.username, "ada");
    assert_eq!(client.user().map(|u| u.id), Some(1));
}

// ---------------------------------------------------------------------------
// Logout and current user
// ---------------------------------------------------------------------------

#[test]
fn logout_clears_everything() {
    let fx = Fixture::new();
    let mut client = fx.client(local_storage_options());

    fx.transport.respond(200, json!({"jwt": "T", "user": user()}));
    client.login("ada", "secret").unwrap();
    client.logout();

    assert!(client.user().is_none());
    assert!(client.token().is_none());
    assert!(client.authorization_header().is_none());
    assert!(fx.local.get_item("strapi_jwt").is_none());
    assert_eq!(fx.transport.requests().len(), 1);
}

#[test]
fn fetch_user_updates_current_user() {
    let fx = Fixture::new();
    fx.cookies.set("strapi_jwt", "T", &Default::default());
    let mut client = fx.client(ClientOptions::default());

    fx.transport.respond(200, user());
    assert_eq!(client.fetch_user(), Some(user()));
    assert_eq!(client.user(), Some(&user()));

    let req = fx.transport.last();
    assert_eq!(req.url, "http://localhost:1337/api/users/me");
    assert_eq!(req.header("authorization"), Some("Bearer T"));
}

#[test]
fn fetch_user_server_error_logs_out() {
    let fx = Fixture::new();
    fx.cookies.set("strapi_jwt", "expired", &Default::default());
    let mut client = fx.client(ClientOptions::default());
    client.set_user(Some(user()));

    fx.transport.respond(401, server_error(401, "UnauthorizedError", "Missing or invalid credentials"));
    assert_eq!(client.fetch_user(), None);

    assert!(client.user().is_none());
    assert!(client.authorization_header().is_none());
    assert!(fx.cookies.get("strapi_jwt").is_none());
}

#[test]
fn fetch_user_transport_failure_logs_out() {
    let fx = Fixture::new();
    let mut client = fx.client(local_storage_options());
    client.set_token("T");

    fx.transport.fail("connection reset");
    assert_eq!(client.fetch_user(), None);
    assert!(client.token().is_none());
    assert!(fx.local.get_item("strapi_jwt").is_none());
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn transport_failure_is_unknown_error() {
    let fx = Fixture::new();
    let client = fx.client(ClientOptions::default());

    fx.transport.fail("connection refused");
    let err = client.find::<Vec<Value>>("articles", None).unwrap_err();
    assert_eq!(err.status(), 500);
    assert_eq!(err.name(), "UnknownError");
    let envelope = err.envelope();
    assert_eq!(envelope.error.message, "connection refused");
}

#[test]
fn server_error_body_is_passed_through() {
    let fx = Fixture::new();
    let client = fx.client(ClientOptions::default());

    let error = json!({
        "data": null,
        "error": {
            "status": 403,
            "name": "ForbiddenError",
            "message": "Forbidden",
            "details": {"policy": "is-owner"}
        }
    });
    fx.transport.respond(403, error.clone());
    let err = client.find_one::<Value>("articles", 7, None).unwrap_err();
    match err {
        ApiError::HttpError { status, body } => {
            assert_eq!(status, 403);
            assert_eq!(body, error);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

#[test]
fn find_passes_params_without_wrapping() {
    let fx = Fixture::new();
    let client = fx.client(ClientOptions::default());

    fx.transport.respond(
        200,
        json!({
            "data": [{"id": 1, "attributes": {"title": "Hello"}}],
            "meta": {"pagination": {"page": 1, "pageSize": 25, "pageCount": 1, "total": 1}}
        }),
    );
    let params = json!({"filters": {"title": {"$eq": "Hello"}}, "pagination": {"page": 1}});
    let resp: StrapiResponse<Vec<Value>> = client.find("articles", Some(&params)).unwrap();
    assert_eq!(resp.data.len(), 1);
    assert_eq!(resp.meta.unwrap()["pagination"]["total"], 1);

    let req = fx.transport.last();
    assert_eq!(req.method, HttpMethod::Get);
    assert!(req.body.is_none());
    assert_eq!(
        query(&req),
        vec![
            ("filters[title][$eq]".to_string(), "Hello".to_string()),
            ("pagination[page]".to_string(), "1".to_string()),
        ]
    );
}

#[test]
fn find_one_selects_fields() {
    #[derive(Debug, Deserialize)]
    struct Article {
        id: u64,
        attributes: Value,
    }

    let fx = Fixture::new();
    let client = fx.client(ClientOptions::default());

    fx.transport.respond(200, json!({"data": {"id": 3, "attributes": {"title": "Hi"}}, "meta": {}}));
    let params = json!({"fields": ["title"]});
    let resp: StrapiResponse<Article> = client.find_one("articles", 3, Some(&params)).unwrap();
    assert_eq!(resp.data.id, 3);
    assert_eq!(resp.data.attributes["title"], "Hi");

    let req = fx.transport.last();
    assert!(req.url.starts_with("http://localhost:1337/api/articles/3?"));
    assert_eq!(query(&req), vec![("fields[0]".to_string(), "title".to_string())]);
    assert!(req.body.is_none());
}

#[test]
fn create_wraps_payload_under_data() {
    let fx = Fixture::new();
    let client = fx.client(ClientOptions::default());

    fx.transport.respond(200, json!({"data": {"id": 9, "attributes": {"title": "New"}}, "meta": {}}));
    let resp: StrapiResponse = client
        .create("articles", &json!({"title": "New"}), Some(&json!({"populate": "*"})))
        .unwrap();
    assert_eq!(resp.data["id"], 9);

    let req = fx.transport.last();
    assert_eq!(req.method, HttpMethod::Post);
    assert_eq!(req.header("content-type"), Some("application/json"));
    assert_eq!(body(&req), json!({"data": {"title": "New"}}));
    assert_eq!(query(&req), vec![("populate".to_string(), "*".to_string())]);
}

#[test]
fn update_wraps_payload_under_data() {
    let fx = Fixture::new();
    let client = fx.client(ClientOptions::default());

    fx.transport.respond(200, json!({"data": {"id": 9, "attributes": {"title": "Edited"}}, "meta": {}}));
    client
        .update::<Value, _>("articles", 9, &json!({"title": "Edited"}), None)
        .unwrap();

    let req = fx.transport.last();
    assert_eq!(req.method, HttpMethod::Put);
    assert_eq!(req.url, "http://localhost:1337/api/articles/9");
    assert_eq!(body(&req), json!({"data": {"title": "Edited"}}));
}

#[test]
fn delete_sends_no_body() {
    let fx = Fixture::new();
    let mut client = fx.client(ClientOptions::default());
    client.set_token("T");

    fx.transport.respond(200, json!({"data": {"id": 9, "attributes": {}}, "meta": {}}));
    client.delete::<Value>("articles", 9, None).unwrap();

    let req = fx.transport.last();
    assert_eq!(req.method, HttpMethod::Delete);
    assert_eq!(req.url, "http://localhost:1337/api/articles/9");
    assert!(req.body.is_none());
    assert_eq!(req.header("authorization"), Some("Bearer T"));
    assert_eq!(client.token(), Some("T"));
}

#[test]
fn ids_cannot_escape_the_content_type() {
    let fx = Fixture::new();
    let mut client = fx.client(ClientOptions::default());
    client.set_token("T");

    fx.transport.respond(200, json!({"data": null}));
    client.delete::<Value>("articles", "../users/me", None).unwrap();
    assert_eq!(fx.transport.last().url, "http://localhost:1337/api/articles/..%2Fusers%2Fme");

    fx.transport.respond(200, json!({"data": null}));
    client.find_one::<Value>("articles", "5?populate=*", None).unwrap();
    let req = fx.transport.last();
    assert_eq!(req.url, "http://localhost:1337/api/articles/5%3Fpopulate=*");
    assert!(query(&req).is_empty());

    fx.transport.respond(200, json!({"data": null}));
    let params = json!({"populate": "*"});
    client.update::<Value, _>("articles", "a#b", &json!({}), Some(&params)).unwrap();
    let req = fx.transport.last();
    assert_eq!(req.url, "http://localhost:1337/api/articles/a%23b?populate=*");
    assert_eq!(query(&req), vec![("populate".to_string(), "*".to_string())]);

    let err = client.delete::<Value>("articles", "..", None).unwrap_err();
    assert!(matches!(err, ApiError::InvalidPathSegment(_)));
    assert_eq!(fx.transport.requests().len(), 3);
}

#[test]
fn custom_prefix_and_url() {
    let fx = Fixture::new();
    let options = ClientOptions {
        url: Some("https://cms.example.com".to_string()),
        prefix: Some("/v2".to_string()),
        ..ClientOptions::default()
    };
    let client = fx.client(options);
    assert_eq!(client.api_url(), "https://cms.example.com/v2");

    fx.transport.respond(200, json!({"data": []}));
    client.find::<Vec<Value>>("restaurants", None).unwrap();
    assert_eq!(fx.transport.last().url, "https://cms.example.com/v2/restaurants");
}
