//! Outcome envelope returned by every transport operation

use reqwest::StatusCode;
use serde::Serialize;

/// Status reported when the caller cancelled the operation. There is no
/// standard code for this; 499 is the conventional "client closed request".
pub const CLIENT_CLOSED_REQUEST: u16 = 499;

/// Result envelope of one request.
///
/// The URL and body are filled in before the request is sent, so they are
/// available for diagnostics on every path. A 404 or 400 response is data,
/// not an error: `status` and `description` carry it and `payload` stays
/// `None` (exists checks put `Some(false)` there instead).
#[derive(Debug, Clone, Serialize)]
pub struct Outcome<T> {
    #[serde(serialize_with = "serialize_status")]
    pub status: StatusCode,
    pub request_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<T>,
}

fn serialize_status<S: serde::Serializer>(
    status: &StatusCode,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u16(status.as_u16())
}

impl<T> Outcome<T> {
    /// A fresh envelope for a request that has not completed yet
    pub fn new(request_url: impl Into<String>, request_body: Option<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            request_url: request_url.into(),
            request_body,
            description: None,
            payload: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }

    pub fn is_cancelled(&self) -> bool {
        self.status.as_u16() == CLIENT_CLOSED_REQUEST
    }

    /// Mark the envelope as cancelled by the caller
    pub(crate) fn cancelled(mut self) -> Self {
        self.status = client_closed_request();
        self.description = Some("request cancelled".to_string());
        self
    }

    /// Transform the payload, keeping the envelope
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            status: self.status,
            request_url: self.request_url,
            request_body: self.request_body,
            description: self.description,
            payload: self.payload.map(f),
        }
    }

    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    pub fn into_payload(self) -> Option<T> {
        self.payload
    }
}

pub(crate) fn client_closed_request() -> StatusCode {
    // 499 is within the valid 100..=999 range
    StatusCode::from_u16(CLIENT_CLOSED_REQUEST).unwrap_or(StatusCode::REQUEST_TIMEOUT)
}
