//! API handlers for Bookshelf REST endpoints

pub mod books;
pub mod health;
pub mod openapi;

use serde::Serialize;
use utoipa::ToSchema;

/// Envelope discriminator. `fail` is a client fault, `error` a server fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Fail,
    Error,
}

/// Body shape shared by every endpoint
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: ResponseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: None,
            data: Some(data),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    /// Success without a payload
    pub fn acknowledged(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Fail,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// Schema of the envelope as documented in OpenAPI; `data` varies per endpoint
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub status: ResponseStatus,
    pub message: Option<String>,
}
