//! Client SDK for the Strapi headless-CMS REST API.
//!
//! # Overview
//! `StrapiClient` authenticates against Strapi's users-permissions endpoints,
//! keeps the session token in sync with a storage backend, and wraps the
//! content-type collection endpoints in typed CRUD calls.
//!
//! # Design
//! - Requests and responses are plain data (`HttpRequest`, `HttpResponse`);
//!   the `Transport` trait performs the exchange. `UreqTransport` (feature
//!   `ureq`, on by default) is the bundled implementation.
//! - The bearer token is client state attached per request; its durable copy
//!   goes to one `TokenStore` (cookie jar or key-value store) chosen at
//!   construction from `ClientConfig::store`.
//! - The `Environment` decides whether storage and the current location are
//!   available at all. `Headless` keeps everything in memory.
//! - Server errors are returned with their JSON body untouched; transport
//!   failures are normalized to status 500 / `UnknownError`.

pub mod client;
pub mod config;
pub mod environment;
pub mod error;
pub mod http;
pub mod query;
pub mod storage;
#[cfg(feature = "ureq")]
pub mod transport;
pub mod types;

pub use client::{parse_response, RequestOptions, StrapiClient};
pub use config::{ClientConfig, ClientOptions, CookieOptions, SameSite, StoreConfig, StoreOptions, TransportOptions};
pub use environment::{Environment, Headless, Interactive};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};
pub use storage::{CookieJar, FileStore, KeyValueStore, MemoryCookieJar, MemoryStore, TokenStore};
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{
    AuthResponse, EmailRequest, ErrorDetail, ErrorEnvelope, LoginRequest, RegisterRequest, ResetPasswordRequest,
    StrapiResponse,
};
