//! Error responses and the validating JSON extractor.
//!
//! Every handler error becomes one of four shapes:
//! - `400 {error, fields:[{field, message}]}` for bad input
//! - `401 {error}` with a generic message
//! - `404 {error}`
//! - `500 {error}` with a generic message; the detail is only logged

use axum::async_trait;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use ob_domain::error::{Error, FieldError};
use ob_domain::Validate;
use serde::de::DeserializeOwned;

/// Build a standardized JSON error response: `{ "error": "<message>" }`.
pub fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn not_found(what: &str) -> Self {
        Self(Error::NotFound(format!("{what} not found")))
    }

    pub fn from_query(rejection: QueryRejection) -> Self {
        Self(Error::invalid("query", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            Error::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": "validation failed",
                    "fields": fields,
                })),
            )
                .into_response(),
            Error::Auth(_) => api_error(StatusCode::UNAUTHORIZED, "unauthorized"),
            Error::NotFound(what) => api_error(StatusCode::NOT_FOUND, what),
            other => {
                tracing::error!(error = %other, "request failed");
                api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// JSON body extractor that turns deserialization failures and
/// [`Validate`] problems into a `400` with field errors.
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;
        let problems = value.validate();
        if !problems.is_empty() {
            return Err(ApiError(Error::Validation(problems)));
        }
        Ok(Self(value))
    }
}

fn rejection_to_error(rejection: JsonRejection) -> ApiError {
    let field = match rejection {
        JsonRejection::MissingJsonContentType(_) => "content-type",
        _ => "body",
    };
    ApiError(Error::Validation(vec![FieldError::new(
        field,
        rejection.body_text(),
    )]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_lists_fields() {
        let resp = ApiError(Error::invalid("title", "must not be empty")).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert_eq!(body["fields"][0]["field"], "title");
    }

    #[tokio::test]
    async fn internal_errors_do_not_leak() {
        let resp = ApiError(Error::Database("disk I/O error at /var/db".into())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp).await;
        assert_eq!(body["error"], "internal error");
    }

    #[tokio::test]
    async fn auth_message_is_generic() {
        let resp = ApiError(Error::Auth("token expired for user 42".into())).into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(resp).await["error"], "unauthorized");
    }
}
