//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into consistent JSON responses and status
//! codes.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        let mut redacted = Error::internal("Internal server error");
        if let Some(id) = error.trace_id() {
            redacted = redacted.with_trace_id(id.to_owned());
        }
        redacted
    } else {
        error.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(self.code(), ErrorCode::InternalError) {
            error!(message = self.message(), trace_id = ?self.trace_id(), "internal error");
        }
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }

        builder.json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Self::internal("Internal server error")
    }
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use rstest::{fixture, rstest};
    use serde_json::json;

    use super::*;

    const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

    #[fixture]
    fn internal_error() -> Error {
        Error::internal("connection string postgres://secret")
            .with_trace_id(TRACE_ID)
            .with_details(json!({"secret": "x"}))
    }

    #[rstest]
    #[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
    #[case(Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED)]
    #[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
    #[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
    #[case(Error::conflict("taken"), StatusCode::CONFLICT)]
    #[case(Error::service_unavailable("db down"), StatusCode::SERVICE_UNAVAILABLE)]
    #[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn status_code_matches_error_code(#[case] error: Error, #[case] status: StatusCode) {
        assert_eq!(ResponseError::status_code(&error), status);
    }

    async fn decode(response: HttpResponse) -> Error {
        let bytes = to_bytes(response.into_body())
            .await
            .expect("reading response body succeeds");
        serde_json::from_slice(&bytes).expect("error JSON deserialises")
    }

    #[rstest]
    #[actix_web::test]
    async fn internal_errors_are_redacted(internal_error: Error) {
        let response = ResponseError::error_response(&internal_error);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let header = response
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        assert_eq!(header.as_deref(), Some(TRACE_ID));

        let payload = decode(response).await;
        assert_eq!(payload.code(), ErrorCode::InternalError);
        assert_eq!(payload.message(), "Internal server error");
        assert_eq!(payload.trace_id(), Some(TRACE_ID));
        assert!(payload.details().is_none());
    }

    #[rstest]
    #[actix_web::test]
    async fn client_errors_keep_their_details() {
        let error = Error::invalid_request("bad").with_details(json!({"field": "score"}));
        let response = ResponseError::error_response(&error);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get(TRACE_ID_HEADER).is_none());

        let payload = decode(response).await;
        assert_eq!(payload.message(), "bad");
        assert_eq!(payload.details(), Some(&json!({"field": "score"})));
    }

    #[rstest]
    fn from_actix_error_is_redacted_internal_error() {
        let err: Error = actix_web::error::ErrorBadRequest("boom").into();
        assert_eq!(err.code(), ErrorCode::InternalError);
        assert_eq!(err.message(), "Internal server error");
    }
}
