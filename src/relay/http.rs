//! The axum surface over [`RelayService`].
//!
//! One POST endpoint dispatched on an `action` query parameter, matching
//! the client the viewer already ships. Origin is checked before any
//! session or nonce work; a mismatch gets a bare HTML 403.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::post,
    Json, Router,
};
use rand::RngCore;
use serde::Deserialize;

use crate::relay::service::{RelayResponse, RelayService, UploadFile, UploadRequest};

const SESSION_COOKIE: &str = "relievo_session";

/// Builds the relay router. The body limit tracks the configured upload
/// ceiling with headroom for multipart framing.
pub fn router(service: Arc<RelayService>) -> Router {
    let body_limit = service.config().max_upload_bytes as usize + 64 * 1024;
    Router::new()
        .route("/api", post(handle))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
struct ActionParams {
    action: Option<String>,
}

async fn handle(
    State(service): State<Arc<RelayService>>,
    Query(params): Query<ActionParams>,
    headers: HeaderMap,
    multipart: Option<Multipart>,
) -> Response {
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok());
    if !service.origin_allowed(origin) {
        tracing::warn!(origin = origin.unwrap_or("<none>"), "rejected origin");
        return (StatusCode::FORBIDDEN, Html("<h1>403 Forbidden</h1>")).into_response();
    }

    let (session, fresh_session) = match session_from(&headers) {
        Some(session) => (session, false),
        None => (new_session_id(), true),
    };

    let body = match params.action.as_deref() {
        Some("getShareNonce") => RelayResponse::success(service.issue_nonce(&session)),
        Some("uploadImage") => match multipart {
            Some(multipart) => match read_upload(multipart).await {
                Ok(request) => service.upload(&session, request).await,
                Err(response) => response,
            },
            None => RelayResponse::error("No file uploaded"),
        },
        _ => RelayResponse::error("Unknown action"),
    };

    let mut response = Json(body).into_response();
    if fresh_session {
        let cookie = format!("{SESSION_COOKIE}={session}; Path=/; HttpOnly; SameSite=Lax");
        if let Ok(value) = cookie.parse() {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
    }
    response
}

/// Pulls the nonce and file out of the multipart form. Unknown fields are
/// skipped; a transport error mid-stream becomes an error envelope.
async fn read_upload(mut multipart: Multipart) -> Result<UploadRequest, RelayResponse> {
    let mut nonce = String::new();
    let mut file = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(_) => return Err(RelayResponse::error("Malformed upload")),
        };

        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("nonce") => {
                nonce = field
                    .text()
                    .await
                    .map_err(|_| RelayResponse::error("Malformed upload"))?;
            }
            Some("image") => {
                let name = field.file_name().unwrap_or("upload").to_string();
                let mime = field.content_type().unwrap_or("").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| RelayResponse::error("Malformed upload"))?;
                file = Some(UploadFile {
                    name,
                    mime,
                    size: bytes.len() as u64,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    Ok(UploadRequest { nonce, file })
}

fn session_from(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == SESSION_COOKIE).then(|| value.to_string())
    })
}

fn new_session_id() -> String {
    let mut raw = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut raw);
    hex::encode(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RelievoError;
    use crate::relay::config::RelayConfig;
    use crate::relay::upstream::Upstream;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    struct StubUpstream;

    #[async_trait]
    impl Upstream for StubUpstream {
        async fn upload(&self, _file: UploadFile) -> Result<String, RelievoError> {
            Ok("https://files.example/ok.png".to_string())
        }
    }

    const ORIGIN: &str = "http://localhost:8080";

    fn test_router() -> Router {
        let service = Arc::new(RelayService::new(
            RelayConfig::default(),
            Arc::new(StubUpstream),
        ));
        router(service)
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn wrong_origin_gets_403_html() {
        let response = test_router()
            .oneshot(
                Request::post("/api?action=getShareNonce")
                    .header(header::ORIGIN, "https://evil.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn missing_origin_gets_403() {
        let response = test_router()
            .oneshot(
                Request::post("/api?action=getShareNonce")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn share_nonce_sets_session_cookie() {
        let response = test_router()
            .oneshot(
                Request::post("/api?action=getShareNonce")
                    .header(header::ORIGIN, ORIGIN)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("relievo_session="));

        let body = json_body(response).await;
        assert_eq!(body["state"], "success");
        assert_eq!(body["data"].as_str().unwrap().len(), 64);
    }

    #[tokio::test]
    async fn unknown_action_is_an_error_envelope() {
        let response = test_router()
            .oneshot(
                Request::post("/api")
                    .header(header::ORIGIN, ORIGIN)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["state"], "error");
        assert_eq!(body["data"], "Unknown action");
    }

    #[tokio::test]
    async fn nonce_then_upload_round_trip() {
        let app = test_router();

        let response = app
            .clone()
            .oneshot(
                Request::post("/api?action=getShareNonce")
                    .header(header::ORIGIN, ORIGIN)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let session_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();
        let nonce = json_body(response).await["data"].as_str().unwrap().to_string();

        let boundary = "XRELIEVOBOUNDARY";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"nonce\"\r\n\r\n{nonce}\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; \
                 filename=\"p.png\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(&[1, 2, 3, 4]);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let response = app
            .oneshot(
                Request::post("/api?action=uploadImage")
                    .header(header::ORIGIN, ORIGIN)
                    .header(header::COOKIE, session_cookie)
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["state"], "success");
        assert_eq!(body["data"], "https://files.example/ok.png");
    }
}
