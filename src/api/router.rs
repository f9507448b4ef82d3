//! Route table for the alignment server.
//!
//! Returns a composable `Router`; the caller decides how to serve it.
//! Handlers use `State<ApiContext>`; the scaffold endpoint also needs
//! `ConnectInfo`, so serve with `into_make_service_with_connect_info`.

use axum::routing::{get, post};
use axum::Router;

use crate::api::endpoints;
use crate::api::types::ApiContext;

pub fn api_router(ctx: ApiContext) -> Router {
    Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/analyze", post(endpoints::analyze::analyze))
        .route(
            "/analyze-and-scaffold",
            post(endpoints::scaffold::analyze_and_scaffold),
        )
        .with_state(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use axum::body::Body;
    use axum::extract::connect_info::MockConnectInfo;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::align::{AlignmentGenerator, MockLlmClient};
    use crate::analysis::testing::MockAnalyzer;
    use crate::analysis::{Analyzer, Readiness};
    use crate::cache::AlignmentCache;
    use crate::config::Config;
    use crate::db::open_memory_database;
    use crate::models::AnalysisRow;
    use crate::pipeline::Pipeline;
    use crate::quota::QuotaGate;
    use crate::translate::testing::MockTranslator;
    use crate::translate::Translator;

    const COMPLETION: &str = r#"{
      "lexical": [
        {"source": ["s0"], "target": ["t0"], "label": "Kaixo → Hello (core meaning)"}
      ],
      "grammatical_relations": [],
      "features": []
    }"#;

    fn row(word: &str, lemma: &str, upos: &str, feats: &str) -> AnalysisRow {
        AnalysisRow {
            word: word.into(),
            lemma: lemma.into(),
            upos: upos.into(),
            feats: feats.into(),
        }
    }

    fn mock_analyzer() -> MockAnalyzer {
        MockAnalyzer::new()
            .with_rows(
                "eu",
                vec![
                    row("Kaixo", "kaixo", "INTJ", ""),
                    row("mundua", "mundu", "NOUN", "Case=Abs|Definite=Def|Number=Sing"),
                ],
            )
            .with_rows(
                "en",
                vec![
                    row("Hello", "hello", "INTJ", ""),
                    row("world", "world", "NOUN", "Number=Sing"),
                ],
            )
    }

    fn test_config(itzuli_key: Option<&str>, claude_key: Option<&str>, limit: i64) -> Config {
        Config {
            itzuli_api_key: itzuli_key.map(String::from),
            claude_api_key: claude_key.map(String::from),
            itzuli_api_url: "http://localhost:1".into(),
            stanza_api_url: "http://localhost:1".into(),
            claude_model: "claude-sonnet-4-5".into(),
            db_path: ":memory:".into(),
            daily_limit: limit,
            host: "127.0.0.1".into(),
            port: 0,
        }
    }

    struct TestContextBuilder {
        translator: Arc<dyn Translator>,
        limit: i64,
        itzuli_key: Option<&'static str>,
        claude_key: Option<&'static str>,
    }

    impl TestContextBuilder {
        fn new() -> Self {
            Self {
                translator: Arc::new(MockTranslator::new("Hello world")),
                limit: 10,
                itzuli_key: Some("test-key"),
                claude_key: Some("test-claude-key"),
            }
        }

        fn translator(mut self, translator: impl Translator + 'static) -> Self {
            self.translator = Arc::new(translator);
            self
        }

        fn limit(mut self, limit: i64) -> Self {
            self.limit = limit;
            self
        }

        fn without_itzuli_key(mut self) -> Self {
            self.itzuli_key = None;
            self
        }

        fn without_claude_key(mut self) -> Self {
            self.claude_key = None;
            self
        }

        fn build(self) -> ApiContext {
            let conn = Arc::new(Mutex::new(open_memory_database().unwrap()));
            let analyzer: Arc<dyn Analyzer> = Arc::new(mock_analyzer());
            let generator = Arc::new(AlignmentGenerator::new(Box::new(MockLlmClient::new(
                COMPLETION,
            ))));
            let pipeline = Pipeline::new(
                self.translator.clone(),
                analyzer.clone(),
                generator,
                Arc::new(AlignmentCache::new(conn.clone())),
                Arc::new(QuotaGate::new(conn, self.limit)),
            );
            ApiContext {
                config: Arc::new(test_config(self.itzuli_key, self.claude_key, self.limit)),
                pipeline,
                translator: self.translator,
                analyzer,
                readiness: Readiness::new(),
            }
        }
    }

    fn app(ctx: ApiContext) -> Router {
        api_router(ctx).layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))))
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn basic_request() -> String {
        r#"{"text": "Kaixo mundua", "source_lang": "eu", "target_lang": "en"}"#.to_string()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn health_reports_loading_until_warm_up_completes() {
        let ctx = TestContextBuilder::new().build();
        let readiness = ctx.readiness.clone();

        let response = app(ctx.clone())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(body_text(response).await.contains("loading"));

        readiness.mark_ready();
        let response = app(ctx)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("healthy"));
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let response = app(TestContextBuilder::new().build())
            .oneshot(
                Request::builder()
                    .uri("/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn scaffold_without_itzuli_key_is_a_config_error() {
        let ctx = TestContextBuilder::new().without_itzuli_key().build();
        let response = app(ctx)
            .oneshot(post_json("/analyze-and-scaffold", &basic_request()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_text(response)
            .await
            .contains("ITZULI_API_KEY not configured"));
    }

    #[tokio::test]
    async fn scaffold_without_claude_key_is_a_config_error() {
        let ctx = TestContextBuilder::new().without_claude_key().build();
        let response = app(ctx)
            .oneshot(post_json("/analyze-and-scaffold", &basic_request()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_text(response)
            .await
            .contains("CLAUDE_API_KEY not configured"));
    }

    #[tokio::test]
    async fn over_limit_client_gets_429_before_any_stream() {
        let ctx = TestContextBuilder::new().limit(0).build();
        let mut request = post_json("/analyze-and-scaffold", &basic_request());
        request
            .headers_mut()
            .insert("x-forwarded-for", "203.0.113.8".parse().unwrap());

        let response = app(ctx).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let body = body_text(response).await;
        assert!(body.contains("\"error\":\"rate_limited\""));
        assert!(body.contains("Daily limit reached"));
    }

    #[tokio::test]
    async fn loopback_peer_bypasses_a_zero_limit() {
        // MockConnectInfo pins the peer to 127.0.0.1 and no forwarded
        // header is set, so even limit 0 streams.
        let ctx = TestContextBuilder::new().limit(0).build();
        let response = app(ctx)
            .oneshot(post_json("/analyze-and-scaffold", &basic_request()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn scaffold_streams_stage_events_then_done() {
        let ctx = TestContextBuilder::new().build();
        let response = app(ctx)
            .oneshot(post_json("/analyze-and-scaffold", &basic_request()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"],
            "text/event-stream"
        );

        let body = body_text(response).await;
        let itzuli = body.find("event: itzuli_done").expect("itzuli_done");
        let stanza = body.find("event: stanza_done").expect("stanza_done");
        let done = body.find("event: done").expect("done");
        assert!(itzuli < stanza && stanza < done);
        assert!(body.contains("Kaixo → Hello (core meaning)"));
        assert!(!body.contains("event: error"));
    }

    #[tokio::test]
    async fn repeat_request_is_served_from_cache_with_a_single_done() {
        let ctx = TestContextBuilder::new().build();

        let first = app(ctx.clone())
            .oneshot(post_json("/analyze-and-scaffold", &basic_request()))
            .await
            .unwrap();
        let first_body = body_text(first).await;
        assert!(first_body.contains("event: itzuli_done"));

        let second = app(ctx)
            .oneshot(post_json("/analyze-and-scaffold", &basic_request()))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::OK);
        let second_body = body_text(second).await;
        assert_eq!(second_body.matches("event: ").count(), 1);
        assert!(second_body.contains("event: done"));
        assert!(second_body.contains("Kaixo → Hello (core meaning)"));
    }

    #[tokio::test]
    async fn upstream_failure_streams_an_error_event() {
        let ctx = TestContextBuilder::new()
            .translator(MockTranslator::failing("Translation failed"))
            .build();
        let response = app(ctx)
            .oneshot(post_json("/analyze-and-scaffold", &basic_request()))
            .await
            .unwrap();
        // The stream already started, so the failure is an event, not a status.
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("event: error"));
        assert!(body.contains("Translation failed"));
        assert!(!body.contains("event: done"));
    }

    #[tokio::test]
    async fn analyze_returns_both_raw_analyses() {
        let ctx = TestContextBuilder::new().build();
        let response = app(ctx)
            .oneshot(post_json("/analyze", &basic_request()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value =
            serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["source_text"], "Kaixo mundua");
        assert_eq!(json["target_text"], "Hello world");
        assert_eq!(json["source_lang"], "eu");
        assert_eq!(json["target_lang"], "en");
        assert_eq!(json["source_analysis"].as_array().unwrap().len(), 2);
        assert_eq!(
            json["source_analysis"][0],
            serde_json::json!({"word": "Kaixo", "lemma": "kaixo", "upos": "INTJ", "feats": ""})
        );
        assert_eq!(json["target_analysis"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn analyze_without_itzuli_key_is_a_config_error() {
        let ctx = TestContextBuilder::new().without_itzuli_key().build();
        let response = app(ctx)
            .oneshot(post_json("/analyze", &basic_request()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn analyze_upstream_failure_is_500_with_cause() {
        let ctx = TestContextBuilder::new()
            .translator(MockTranslator::failing("Translation failed"))
            .build();
        let response = app(ctx)
            .oneshot(post_json("/analyze", &basic_request()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_text(response).await;
        assert!(body.contains("Analysis failed"));
    }

    #[tokio::test]
    async fn incomplete_body_is_rejected_before_any_work() {
        let ctx = TestContextBuilder::new().build();
        let response = app(ctx)
            .oneshot(post_json("/analyze-and-scaffold", r#"{"text": "Kaixo"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
