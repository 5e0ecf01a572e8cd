//! Request payloads and response envelopes of the Strapi REST API.
//!
//! # Design
//! Payload structs serialize with Strapi's camelCase field names. Response
//! envelopes are generic over the caller's entity and user types, so the
//! client never needs to know a content-type schema.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /auth/local`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

/// Body of `POST /auth/local/register`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/reset-password`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub code: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Body of `POST /auth/forgot-password` and `POST /auth/send-email-confirmation`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmailRequest {
    pub email: String,
}

/// Successful authentication: the issued JWT and the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthResponse<U = Value> {
    pub user: U,
    pub jwt: String,
}

/// Standard `{ data, meta }` envelope around content returned by Strapi.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrapiResponse<D = Value> {
    pub data: D,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

/// Body wrapper for create and update: Strapi expects the payload under `data`.
#[derive(Debug, Serialize)]
pub(crate) struct DataPayload<'a, T: Serialize + ?Sized> {
    pub data: &'a T,
}

/// Strapi's error body: `{ data: null, error: { status, name, message, details } }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub data: Option<Value>,
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorDetail {
    pub status: u16,
    pub name: String,
    pub message: String,
    #[serde(default)]
    pub details: Value,
}
