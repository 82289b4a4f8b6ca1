//! Body extractor accepting either JSON or URL-encoded form data.

use crate::errors::AppError;
use axum::{
    extract::{
        Form, FromRequest, Json, Request,
        rejection::{FormRejection, JsonRejection},
    },
    http::header,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Deserializes the body by `Content-Type`.
///
/// `application/x-www-form-urlencoded` goes through [`Form`]; everything
/// else goes through [`Json`], which requires a JSON content type. A missing
/// or foreign content type is rejected as a 400 `MALFORMED_BODY`.
///
/// ```ignore
/// async fn create(JsonOrForm(payload): JsonOrForm<UserPayload>) -> impl IntoResponse {
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct JsonOrForm<T>(pub T);

#[derive(Debug, Error)]
pub enum JsonOrFormRejection {
    #[error(transparent)]
    Json(#[from] JsonRejection),
    #[error(transparent)]
    Form(#[from] FormRejection),
}

impl From<JsonOrFormRejection> for AppError {
    fn from(rejection: JsonOrFormRejection) -> Self {
        match rejection {
            JsonOrFormRejection::Json(e) => AppError::JsonExtractorRejection(e),
            JsonOrFormRejection::Form(e) => AppError::BadRequest(e.body_text()),
        }
    }
}

impl IntoResponse for JsonOrFormRejection {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

impl<T, S> FromRequest<S> for JsonOrForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = JsonOrFormRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&req) {
            let Form(value) = Form::<T>::from_request(req, state).await?;
            Ok(Self(value))
        } else {
            let Json(value) = Json::<T>::from_request(req, state).await?;
            Ok(Self(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        routing::post,
    };
    use http_body_util::BodyExt;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct Item {
        name: String,
    }

    fn app() -> Router {
        Router::new().route(
            "/items",
            post(|JsonOrForm(item): JsonOrForm<Item>| async move { item.name }),
        )
    }

    async fn send(content_type: &str, body: &'static str) -> (StatusCode, String) {
        let response = app()
            .oneshot(
                HttpRequest::post("/items")
                    .header(header::CONTENT_TYPE, content_type)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_accepts_json() {
        let (status, body) = send("application/json", r#"{"name":"till"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "till");
    }

    #[tokio::test]
    async fn test_accepts_form() {
        let (status, body) = send("application/x-www-form-urlencoded", "name=receipt+printer").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "receipt printer");
    }

    #[tokio::test]
    async fn test_malformed_json_is_400() {
        let (status, body) = send("application/json", "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("MALFORMED_BODY"));
    }

    #[tokio::test]
    async fn test_unknown_content_type_is_400() {
        let (status, body) = send("text/plain", "name=till").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("MALFORMED_BODY"));
    }

    #[tokio::test]
    async fn test_missing_content_type_is_rejected() {
        let response = app()
            .oneshot(
                HttpRequest::post("/items")
                    .body(Body::from(r#"{"name":"till"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(String::from_utf8_lossy(&bytes).contains("MALFORMED_BODY"));
    }
}
