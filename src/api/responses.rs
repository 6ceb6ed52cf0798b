//! API response envelope
//!
//! The uniform shape every operation result is rendered into for the
//! transport layer: `{"success": bool, "data": ...}` where `data` carries a
//! record, a list, a message list, or a field→messages error map depending
//! on the outcome. Internally the envelope is a tagged union, so callers
//! match on variants instead of probing a polymorphic field.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::services::post::PostServiceError;
use crate::services::tag::TagServiceError;
use crate::services::validator::FieldErrors;

/// Message carried by the not-found envelope.
pub const NOT_FOUND_MESSAGE: &str = "Not found.";

/// Uniform response envelope produced by the record services.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    /// A single record
    Record(T),
    /// A list of records
    List(Vec<T>),
    /// Success with no payload (deletes)
    Empty,
    /// Lookup found nothing
    NotFound,
    /// One or more field-level rule violations
    Invalid(FieldErrors),
}

impl<T> ApiResponse<T> {
    /// Whether the envelope reports success.
    pub fn success(&self) -> bool {
        matches!(
            self,
            ApiResponse::Record(_) | ApiResponse::List(_) | ApiResponse::Empty
        )
    }
}

impl<T: Serialize> Serialize for ApiResponse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ApiResponse", 2)?;
        state.serialize_field("success", &self.success())?;
        match self {
            ApiResponse::Record(record) => state.serialize_field("data", record)?,
            ApiResponse::List(list) => state.serialize_field("data", list)?,
            ApiResponse::Empty => state.serialize_field("data", &Vec::<String>::new())?,
            ApiResponse::NotFound => state.serialize_field("data", &[NOT_FOUND_MESSAGE])?,
            ApiResponse::Invalid(errors) => state.serialize_field("data", errors)?,
        }
        state.end()
    }
}

/// Service failures an envelope can express.
///
/// Infrastructure errors are not expressible and pass through for the host
/// to treat as fatal.
pub trait IntoEnvelope: Sized {
    /// Convert the failure into an envelope, or return the inner error.
    fn into_envelope<T>(self) -> anyhow::Result<ApiResponse<T>>;
}

impl IntoEnvelope for PostServiceError {
    fn into_envelope<T>(self) -> anyhow::Result<ApiResponse<T>> {
        match self {
            PostServiceError::NotFound => Ok(ApiResponse::NotFound),
            PostServiceError::Validation(errors) => Ok(ApiResponse::Invalid(errors)),
            PostServiceError::Internal(err) => Err(err),
        }
    }
}

impl IntoEnvelope for TagServiceError {
    fn into_envelope<T>(self) -> anyhow::Result<ApiResponse<T>> {
        match self {
            TagServiceError::NotFound => Ok(ApiResponse::NotFound),
            TagServiceError::Validation(errors) => Ok(ApiResponse::Invalid(errors)),
            TagServiceError::Internal(err) => Err(err),
        }
    }
}

/// Envelope for a single-record operation result.
pub fn record<T, E: IntoEnvelope>(result: Result<T, E>) -> anyhow::Result<ApiResponse<T>> {
    match result {
        Ok(value) => Ok(ApiResponse::Record(value)),
        Err(err) => err.into_envelope(),
    }
}

/// Envelope for a list operation result.
pub fn list<T, E: IntoEnvelope>(result: Result<Vec<T>, E>) -> anyhow::Result<ApiResponse<T>> {
    match result {
        Ok(values) => Ok(ApiResponse::List(values)),
        Err(err) => err.into_envelope(),
    }
}

/// Envelope for a delete operation result.
pub fn deleted<T, E: IntoEnvelope>(result: Result<(), E>) -> anyhow::Result<ApiResponse<T>> {
    match result {
        Ok(()) => Ok(ApiResponse::Empty),
        Err(err) => err.into_envelope(),
    }
}
