pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::limit::RequestBodyLimitLayer;

use crate::cv::handlers;
use crate::optimize::handlers::handle_optimize;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // CV text pipeline
        .route("/api/v1/cv/upload", post(handlers::handle_upload))
        .route("/api/v1/cv/parse", post(handlers::handle_parse))
        .route("/api/v1/cv/preview", post(handlers::handle_preview))
        .route("/api/v1/cv/export", post(handlers::handle_export))
        // LLM optimization
        .route("/api/v1/cv/optimize", post(handle_optimize))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tokio::sync::Notify;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::layout::{default_page_config, paginate};
    use crate::llm_client::stub::{StubFactory, StubProvider};
    use crate::render::write_pdf;
    use crate::text::{parse_cv, LocationMatcher};

    const CV: &str = "JANE DOE\njane@x.com | +1 555 0100\n\n\
                      PROFESSIONAL SUMMARY\nBackend engineer.\n\n\
                      EXPERIENCE\nEngineer Tel Aviv, Israel • 2020 - Present\n- Shipped billing";

    fn app_with(provider: StubProvider) -> (Router, AppState) {
        let config = Config {
            openai_api_key: Some("sk-test".into()),
            ..Config::default()
        };
        let state =
            AppState::with_providers(config, Arc::new(StubFactory::new(provider))).unwrap();
        (build_router(state.clone()), state)
    }

    fn app() -> Router {
        app_with(StubProvider::replying(CV)).0
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn upload(content_type: &str, data: &[u8]) -> Request<Body> {
        upload_files(&[(content_type, data)])
    }

    /// One `file` part per entry.
    fn upload_files(files: &[(&str, &[u8])]) -> Request<Body> {
        let boundary = "XBOUNDARYX";
        let mut body = Vec::new();
        for (content_type, data) in files {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"cv.pdf\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/v1/cv/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn rendered_pdf(raw: &str) -> Vec<u8> {
        let config = default_page_config();
        let parsed = parse_cv(raw, &LocationMatcher::default());
        write_pdf(&paginate(&parsed.sections, &config), &config).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_parse_returns_tagged_lines() {
        let response = app()
            .oneshot(post_json("/api/v1/cv/parse", json!({ "text": CV })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let sections = body["sections"].as_array().unwrap();
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0]["lines"][0]["kind"], "NameLine");
        assert_eq!(sections[2]["lines"][1]["kind"], "PositionHeading");
        assert_eq!(sections[2]["lines"][2]["kind"], "BulletItem");
    }

    #[tokio::test]
    async fn test_preview_is_html() {
        let response = app()
            .oneshot(post_json("/api/v1/cv/preview", json!({ "text": CV })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/html"));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("<h2>PROFESSIONAL SUMMARY</h2>"));
    }

    #[tokio::test]
    async fn test_preview_of_blank_text_is_empty_input() {
        let response = app()
            .oneshot(post_json("/api/v1/cv/preview", json!({ "text": " \n\t " })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "EMPTY_INPUT");
    }

    #[tokio::test]
    async fn test_export_is_a_pdf_attachment() {
        let response = app()
            .oneshot(post_json("/api/v1/cv/export", json!({ "text": CV })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment; filename=\"optimized-cv-"));
        assert!(disposition.ends_with(".pdf\""));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_upload_extracts_text() {
        let pdf = rendered_pdf(CV);
        let response = app().oneshot(upload("application/pdf", &pdf)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["page_count"], 1);
        let clean = body["clean_text"].as_str().unwrap();
        assert!(clean.starts_with("JANE DOE"));
        assert!(clean.contains("PROFESSIONAL SUMMARY"));
        assert!(clean.contains("• Shipped billing"));
    }

    #[tokio::test]
    async fn test_upload_with_two_files_is_rejected() {
        let pdf = rendered_pdf(CV);
        let part = ("application/pdf", pdf.as_slice());
        let response = app().oneshot(upload_files(&[part, part])).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_upload_rejects_non_pdf() {
        let response = app()
            .oneshot(upload("text/plain", b"JANE DOE"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(json_body(response).await["error"]["code"], "INVALID_FILE_TYPE");
    }

    #[tokio::test]
    async fn test_upload_of_corrupt_pdf_is_parse_error() {
        let response = app()
            .oneshot(upload("application/pdf", b"%PDF-1.4\nnot really a pdf"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json_body(response).await["error"]["code"], "PDF_PARSE_ERROR");
    }

    #[tokio::test]
    async fn test_optimize_returns_parsed_document() {
        let response = app()
            .oneshot(post_json(
                "/api/v1/cv/optimize",
                json!({ "cv_text": "jane doe, engineer", "job_description": "Rust" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["provider"], "openai");
        assert_eq!(body["document"]["sections"].as_array().unwrap().len(), 3);
        assert!(body["optimized_text"].as_str().unwrap().contains("• Shipped billing"));
    }

    #[tokio::test]
    async fn test_concurrent_optimize_on_one_session_conflicts() {
        let release = Arc::new(Notify::new());
        let (router, state) = app_with(StubProvider::replying(CV).held_by(release.clone()));
        let request = || {
            let mut req = post_json(
                "/api/v1/cv/optimize",
                json!({ "cv_text": "cv", "job_description": "jd" }),
            );
            req.headers_mut()
                .insert("x-session-id", "tab-1".parse().unwrap());
            req
        };

        let first = tokio::spawn(router.clone().oneshot(request()));
        while !state.sessions.is_busy("tab-1") {
            tokio::task::yield_now().await;
        }

        let second = router.clone().oneshot(request()).await.unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);
        assert_eq!(json_body(second).await["error"]["code"], "OPTIMIZE_IN_PROGRESS");

        release.notify_one();
        let first = first.await.unwrap().unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        assert!(!state.sessions.is_busy("tab-1"));
    }

    #[tokio::test]
    async fn test_optimize_without_job_description_is_empty_input() {
        let response = app()
            .oneshot(post_json(
                "/api/v1/cv/optimize",
                json!({ "cv_text": "cv", "job_description": "" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "EMPTY_INPUT");
    }
}
