//! Stateful Strapi API client.
//!
//! # Design
//! `StrapiClient` owns a `Transport`, the merged `ClientConfig` and the
//! session (token + current user). Every operation goes through
//! `request`, which is split the same way as the rest of the crate:
//! `build_request` turns a method, path and `RequestOptions` into a plain
//! `HttpRequest`, the transport executes it once, and `parse_response`
//! decodes the body or produces an `ApiError`.
//!
//! The bearer token lives on the client and is attached per request; the
//! durable copy is written to the single `TokenStore` selected at
//! construction. Operations that change the session take `&mut self`, so
//! two authentications can never interleave on one client.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use crate::config::{ClientConfig, ClientOptions};
use crate::environment::{Environment, Headless};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::query;
use crate::storage::{select_token_store, TokenStore};
use crate::types::{
    AuthResponse, DataPayload, EmailRequest, LoginRequest, RegisterRequest, ResetPasswordRequest,
    StrapiResponse,
};

const AUTHORIZATION: &str = "Authorization";
const CONTENT_TYPE: &str = "Content-Type";

/// Per-call overrides for `StrapiClient::request`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Query parameters, serialized in bracket notation (see `query`).
    pub params: Option<Value>,
    /// Extra headers; they replace defaults with the same name.
    pub headers: Vec<(String, String)>,
    /// JSON body.
    pub body: Option<Value>,
}

impl RequestOptions {
    pub fn json<B: Serialize + ?Sized>(body: &B) -> Result<Self, ApiError> {
        let body = serde_json::to_value(body).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(Self {
            body: Some(body),
            ..Self::default()
        })
    }

    pub fn with_params(mut self, params: Option<&Value>) -> Self {
        self.params = params.cloned();
        self
    }
}

/// Client for a Strapi REST API.
///
/// `U` is the caller's user schema; it defaults to untyped JSON.
pub struct StrapiClient<T, U = Value> {
    config: ClientConfig,
    api_url: String,
    transport: T,
    environment: Arc<dyn Environment>,
    token_store: Option<Box<dyn TokenStore>>,
    token: Option<String>,
    user: Option<U>,
}

impl<T, U> fmt::Debug for StrapiClient<T, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrapiClient")
            .field("api_url", &self.api_url)
            .field("interactive", &self.environment.is_interactive())
            .field("persisted", &self.token_store.is_some())
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}

#[cfg(feature = "ureq")]
impl<U: DeserializeOwned + Clone> StrapiClient<crate::transport::UreqTransport, U> {
    /// Build a client backed by ureq, configured from `options.transport`.
    pub fn connect(options: ClientOptions, environment: Arc<dyn Environment>) -> Result<Self, ApiError> {
        let config = ClientConfig::from_options(&options)?;
        let transport = crate::transport::UreqTransport::new(&config.transport);
        Self::from_config(transport, config, environment)
    }
}

impl<T: Transport, U: DeserializeOwned + Clone> StrapiClient<T, U> {
    /// Client for a non-interactive context: the token is kept in memory only.
    pub fn new(transport: T, options: ClientOptions) -> Result<Self, ApiError> {
        Self::with_environment(transport, options, Arc::new(Headless))
    }

    pub fn with_environment(
        transport: T,
        options: ClientOptions,
        environment: Arc<dyn Environment>,
    ) -> Result<Self, ApiError> {
        let config = ClientConfig::from_options(&options)?;
        Self::from_config(transport, config, environment)
    }

    pub fn from_config(
        transport: T,
        config: ClientConfig,
        environment: Arc<dyn Environment>,
    ) -> Result<Self, ApiError> {
        let api_url = config.api_url()?;
        let token_store = select_token_store(&config.store, environment.as_ref());
        let mut client = Self {
            config,
            api_url,
            transport,
            environment,
            token_store,
            token: None,
            user: None,
        };
        client.sync_token();
        Ok(client)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `prefix` resolved against `url`; every request path is appended to it.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&U> {
        self.user.as_ref()
    }

    pub fn set_user(&mut self, user: Option<U>) {
        self.user = user;
    }

    /// Value of the `Authorization` header attached to requests, if any.
    pub fn authorization_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {t}"))
    }

    // -----------------------------------------------------------------------
    // Generic request
    // -----------------------------------------------------------------------

    /// Perform one call against the API and decode the response body.
    ///
    /// `path` is appended to `api_url` as-is, query and all. Content calls
    /// go through `endpoint` instead so caller values stay single segments.
    pub fn request<R: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        options: RequestOptions,
    ) -> Result<R, ApiError> {
        let url = Url::parse(&format!("{}{}", self.api_url, path))?;
        self.send(method, url, options)
    }

    fn send<R: DeserializeOwned>(
        &self,
        method: HttpMethod,
        url: Url,
        options: RequestOptions,
    ) -> Result<R, ApiError> {
        let request = self.build_request_for(method, url, options)?;
        debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.transport.execute(request).map_err(|e| {
            debug!(error = %e, "transport failure");
            ApiError::Transport(e)
        })?;
        parse_response(response)
    }

    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        options: RequestOptions,
    ) -> Result<HttpRequest, ApiError> {
        let url = Url::parse(&format!("{}{}", self.api_url, path))?;
        self.build_request_for(method, url, options)
    }

    /// `api_url` followed by `segments`, each percent-encoded as exactly one
    /// path segment. Empty, `.` and `..` segments are rejected.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.api_url)?;
        append_segments(&mut url, segments)?;
        Ok(url)
    }

    fn build_request_for(
        &self,
        method: HttpMethod,
        mut url: Url,
        options: RequestOptions,
    ) -> Result<HttpRequest, ApiError> {
        if let Some(params) = &options.params {
            let pairs = query::stringify(params);
            if !pairs.is_empty() {
                url.query_pairs_mut().extend_pairs(pairs);
            }
        }

        let mut headers: Vec<(String, String)> = self
            .config
            .transport
            .headers
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if let Some(auth) = self.authorization_header() {
            set_header(&mut headers, AUTHORIZATION, auth);
        }

        let body = match options.body {
            Some(body) => {
                set_header(&mut headers, CONTENT_TYPE, "application/json".to_string());
                Some(serde_json::to_string(&body).map_err(|e| ApiError::SerializationError(e.to_string()))?)
            }
            None => None,
        };

        for (name, value) in options.headers {
            set_header(&mut headers, &name, value);
        }

        Ok(HttpRequest {
            method,
            url: url.into(),
            headers,
            body,
        })
    }

    // -----------------------------------------------------------------------
    // Authentication
    // -----------------------------------------------------------------------

    /// `POST /auth/local`.
    pub fn login(&mut self, identifier: &str, password: &str) -> Result<AuthResponse<U>, ApiError> {
        self.remove_token();
        let options = RequestOptions::json(&LoginRequest {
            identifier: identifier.to_string(),
            password: password.to_string(),
        })?;
        let response = self.request(HttpMethod::Post, "/auth/local", options)?;
        Ok(self.start_session(response))
    }

    /// `POST /auth/local/register`.
    pub fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse<U>, ApiError> {
        self.remove_token();
        let options = RequestOptions::json(&RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        })?;
        let response = self.request(HttpMethod::Post, "/auth/local/register", options)?;
        Ok(self.start_session(response))
    }

    /// `POST /auth/forgot-password`. Clears the current token first.
    pub fn forgot_password(&mut self, email: &str) -> Result<(), ApiError> {
        self.remove_token();
        let options = RequestOptions::json(&EmailRequest {
            email: email.to_string(),
        })?;
        self.request::<Value>(HttpMethod::Post, "/auth/forgot-password", options)?;
        Ok(())
    }

    /// `POST /auth/reset-password`.
    pub fn reset_password(
        &mut self,
        code: &str,
        password: &str,
        password_confirmation: &str,
    ) -> Result<AuthResponse<U>, ApiError> {
        self.remove_token();
        let options = RequestOptions::json(&ResetPasswordRequest {
            code: code.to_string(),
            password: password.to_string(),
            password_confirmation: password_confirmation.to_string(),
        })?;
        let response = self.request(HttpMethod::Post, "/auth/reset-password", options)?;
        Ok(self.start_session(response))
    }

    /// `POST /auth/send-email-confirmation`. Leaves the session untouched.
    pub fn send_email_confirmation(&self, email: &str) -> Result<(), ApiError> {
        let options = RequestOptions::json(&EmailRequest {
            email: email.to_string(),
        })?;
        self.request::<Value>(HttpMethod::Post, "/auth/send-email-confirmation", options)?;
        Ok(())
    }

    /// `GET /auth/{provider}/callback?access_token=...`.
    ///
    /// An explicit `access_token` always wins. Without one, an interactive
    /// environment's current location is searched for an `access_token`
    /// query parameter.
    pub fn authenticate_provider(
        &mut self,
        provider: &str,
        access_token: Option<&str>,
    ) -> Result<AuthResponse<U>, ApiError> {
        self.remove_token();
        let access_token = access_token
            .map(str::to_string)
            .or_else(|| self.location_access_token())
            .ok_or_else(|| ApiError::MissingAccessToken {
                provider: provider.to_string(),
            })?;
        let options = RequestOptions {
            params: Some(json!({ "access_token": access_token })),
            ..RequestOptions::default()
        };
        let url = self.endpoint(&["auth", provider, "callback"])?;
        let response = self.send(HttpMethod::Get, url, options)?;
        Ok(self.start_session(response))
    }

    /// Where to send the user to start a provider login. No request is made.
    pub fn get_provider_authentication_url(&self, provider: &str) -> Result<String, ApiError> {
        let mut url = Url::parse(&self.config.url)?;
        url.set_query(None);
        url.set_fragment(None);
        url.set_path("");
        append_segments(&mut url, &["connect", provider])?;
        Ok(url.into())
    }

    pub fn logout(&mut self) {
        self.user = None;
        self.remove_token();
    }

    fn start_session(&mut self, response: AuthResponse<U>) -> AuthResponse<U> {
        self.set_token(&response.jwt);
        self.user = Some(response.user.clone());
        response
    }

    fn location_access_token(&self) -> Option<String> {
        if !self.environment.is_interactive() {
            return None;
        }
        let query = self.environment.location_query()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == "access_token")
            .map(|(_, value)| value.into_owned())
    }

    // -----------------------------------------------------------------------
    // Content
    // -----------------------------------------------------------------------

    /// `GET /{content_type}`.
    pub fn find<D: DeserializeOwned>(
        &self,
        content_type: &str,
        params: Option<&Value>,
    ) -> Result<StrapiResponse<D>, ApiError> {
        let options = RequestOptions::default().with_params(params);
        self.send(HttpMethod::Get, self.endpoint(&[content_type])?, options)
    }

    /// `GET /{content_type}/{id}`.
    pub fn find_one<D: DeserializeOwned>(
        &self,
        content_type: &str,
        id: impl fmt::Display,
        params: Option<&Value>,
    ) -> Result<StrapiResponse<D>, ApiError> {
        let options = RequestOptions::default().with_params(params);
        self.send(HttpMethod::Get, self.endpoint(&[content_type, &id.to_string()])?, options)
    }

    /// `POST /{content_type}` with `{ "data": data }`.
    pub fn create<D: DeserializeOwned, P: Serialize + ?Sized>(
        &self,
        content_type: &str,
        data: &P,
        params: Option<&Value>,
    ) -> Result<StrapiResponse<D>, ApiError> {
        let options = RequestOptions::json(&DataPayload { data })?.with_params(params);
        self.send(HttpMethod::Post, self.endpoint(&[content_type])?, options)
    }

    /// `PUT /{content_type}/{id}` with `{ "data": data }`.
    pub fn update<D: DeserializeOwned, P: Serialize + ?Sized>(
        &self,
        content_type: &str,
        id: impl fmt::Display,
        data: &P,
        params: Option<&Value>,
    ) -> Result<StrapiResponse<D>, ApiError> {
        let options = RequestOptions::json(&DataPayload { data })?.with_params(params);
        self.send(HttpMethod::Put, self.endpoint(&[content_type, &id.to_string()])?, options)
    }

    /// `DELETE /{content_type}/{id}`.
    pub fn delete<D: DeserializeOwned>(
        &self,
        content_type: &str,
        id: impl fmt::Display,
        params: Option<&Value>,
    ) -> Result<StrapiResponse<D>, ApiError> {
        let options = RequestOptions::default().with_params(params);
        self.send(HttpMethod::Delete, self.endpoint(&[content_type, &id.to_string()])?, options)
    }

    // -----------------------------------------------------------------------
    // Session
    // -----------------------------------------------------------------------

    /// `GET /users/me`. Any failure is treated as an invalid session: the
    /// client logs out and returns `None`.
    pub fn fetch_user(&mut self) -> Option<U> {
        match self.request::<U>(HttpMethod::Get, "/users/me", RequestOptions::default()) {
            Ok(user) => {
                self.user = Some(user.clone());
                Some(user)
            }
            Err(e) => {
                warn!(status = e.status(), name = e.name(), "fetching current user failed, logging out");
                self.logout();
                None
            }
        }
    }

    pub fn set_token(&mut self, token: &str) {
        self.token = Some(token.to_string());
        if let Some(store) = &self.token_store {
            store.write(token);
        }
        debug!(persisted = self.token_store.is_some(), "session token set");
    }

    pub fn remove_token(&mut self) {
        self.token = None;
        if let Some(store) = &self.token_store {
            store.clear();
        }
        debug!(persisted = self.token_store.is_some(), "session token removed");
    }

    fn sync_token(&mut self) {
        if let Some(token) = self.token_store.as_ref().and_then(|store| store.read()) {
            debug!("restored session token from storage");
            self.token = Some(token);
        }
    }
}

/// Decode a 2xx body into `R`, or turn any other status into
/// `ApiError::HttpError` carrying the body untouched.
pub fn parse_response<R: DeserializeOwned>(response: HttpResponse) -> Result<R, ApiError> {
    if !response.is_success() {
        let body = serde_json::from_str(&response.body).unwrap_or(Value::String(response.body));
        return Err(ApiError::HttpError {
            status: response.status,
            body,
        });
    }
    let raw = if response.body.trim().is_empty() {
        "null"
    } else {
        response.body.as_str()
    };
    serde_json::from_str(raw).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

fn append_segments(base: &mut Url, segments: &[&str]) -> Result<(), ApiError> {
    if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
        return Err(ApiError::InvalidPathSegment(bad.to_string()));
    }
    base.path_segments_mut()
        .map_err(|()| ApiError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
        .pop_if_empty()
        .extend(segments);
    Ok(())
}

fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: String) {
    headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    headers.push((name.to_string(), value));
}
