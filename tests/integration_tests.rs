//! Integration tests for the itinerary web service

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::{
    Json, Router,
    body::{Body, to_bytes},
    extract::{Path, State},
    http::{HeaderMap, Request, StatusCode},
    routing::post,
};
use serde_json::{Value, json};
use tower::ServiceExt;

use itinerai::config::GenerationConfig;
use itinerai::credentials::StaticSecrets;
use itinerai::generation::{GeminiClient, GeminiClientFactory};
use itinerai::web::{self, AppState};
use itinerai::{
    ClientFactory, Credential, CredentialResolver, FormController, FormInput, GenerationClient,
    GenerationError, ConfigError, SubmissionState, TravelStyle, Budget,
};

const KEY_NAME: &str = "GOOGLE_API_KEY";

struct CannedClient {
    reply: Result<String, GenerationError>,
    calls: AtomicUsize,
}

#[async_trait]
impl GenerationClient for CannedClient {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone()
    }
}

struct CannedFactory(Arc<CannedClient>);

impl ClientFactory for CannedFactory {
    fn build(&self, _credential: Credential) -> Result<Arc<dyn GenerationClient>, ConfigError> {
        Ok(self.0.clone())
    }
}

fn app_with(secrets: StaticSecrets, reply: Result<String, GenerationError>) -> (Router, Arc<CannedClient>) {
    let client = Arc::new(CannedClient {
        reply,
        calls: AtomicUsize::new(0),
    });
    let controller = FormController::new(
        CredentialResolver::new(secrets, KEY_NAME),
        Arc::new(CannedFactory(client.clone())),
    );
    let state = AppState::new(controller).unwrap();
    (web::router(state, 64 * 1024), client)
}

fn app(reply: Result<String, GenerationError>) -> (Router, Arc<CannedClient>) {
    app_with(StaticSecrets::new().with(KEY_NAME, "test-key"), reply)
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn form_post(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn json_post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_form_page_renders_defaults() {
    let (app, _) = app(Ok("unused".into()));
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;
    assert!(page.contains("Gerador de Roteiros de Viagem com IA"));
    assert!(page.contains(r#"name="destination""#));
    assert!(page.contains(r#"max="90""#));
}

#[tokio::test]
async fn test_form_post_without_destination_is_rejected() {
    let (app, client) = app(Ok("unused".into()));
    let response = app
        .oneshot(form_post(
            "destination=&duration_days=5&style=cultural&budget=moderate&interests=praias",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let page = body_text(response).await;
    assert!(page.contains("Por favor, preencha o destino e seus interesses"));
    assert!(page.contains("praias"));
    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_form_post_renders_itinerary() {
    let (app, client) = app(Ok("# Dia 1\n\nChegada em **Kyoto**".into()));
    let response = app
        .oneshot(form_post(
            "destination=Kyoto%2C+Jap%C3%A3o&duration_days=5&style=cultural&budget=moderate&interests=arquitetura+moderna",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;
    assert!(page.contains("Seu roteiro está pronto!"));
    assert!(page.contains("<h1>Dia 1</h1>"));
    assert!(page.contains("<strong>Kyoto</strong>"));
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_api_itinerary_success() {
    let (app, _) = app(Ok("Day 1...".into()));
    let response = app
        .oneshot(json_post(
            "/api/itinerary",
            json!({
                "destination": "Kyoto, Japão",
                "duration_days": 5,
                "style": "cultural",
                "budget": "moderate",
                "interests": "arquitetura moderna"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["state"], "rendered");
    assert_eq!(body["banner"]["kind"], "success");
    assert_eq!(body["itinerary"]["markdown"], "Day 1...");
}

#[tokio::test]
async fn test_api_itinerary_missing_credential() {
    let (app, client) = app_with(StaticSecrets::new(), Ok("unused".into()));
    let response = app
        .oneshot(json_post(
            "/api/itinerary",
            json!({"destination": "Lisboa", "interests": "fado"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["state"], "config_failed");
    assert_eq!(body["banner"]["kind"], "config");
    assert!(body["banner"]["message"].as_str().unwrap().contains(KEY_NAME));
    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_api_itinerary_generation_failure_is_generic() {
    let (app, _) = app(Err(GenerationError::Authentication("API key not valid".into())));
    let response = app
        .oneshot(json_post(
            "/api/itinerary",
            json!({"destination": "Lisboa", "interests": "fado"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let text = body_text(response).await;
    assert!(!text.contains("API key not valid"));
    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["state"], "gen_failed");
    assert!(body["itinerary"].is_null());
}

#[tokio::test]
async fn test_api_options_and_health() {
    let (app, _) = app(Ok("unused".into()));
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/options").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["styles"].as_array().unwrap().len(), 5);
    assert_eq!(body["budgets"][1]["label"], "Moderado");
    assert_eq!(body["budgets"][1]["selected"], true);
    assert_eq!(body["default_days"], 5);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

// Local stand-in for the Gemini REST endpoint

#[derive(Clone)]
struct FakeGemini {
    reply: (StatusCode, Value),
    hits: Arc<AtomicUsize>,
}

async fn fake_generate(
    State(fake): State<FakeGemini>,
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    fake.hits.fetch_add(1, Ordering::SeqCst);
    assert_eq!(call, "gemini-test:generateContent");
    assert!(body["contents"][0]["parts"][0]["text"].is_string());
    if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some("test-key") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": {"code": 401, "message": "API key not valid", "status": "UNAUTHENTICATED"}})),
        );
    }
    (fake.reply.0, Json(fake.reply.1.clone()))
}

async fn spawn_fake_gemini(status: StatusCode, reply: Value) -> (GenerationConfig, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/v1beta/models/{call}", post(fake_generate))
        .with_state(FakeGemini {
            reply: (status, reply),
            hits: hits.clone(),
        });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = GenerationConfig {
        model: "gemini-test".into(),
        base_url: format!("http://{addr}/v1beta"),
        ..GenerationConfig::default()
    };
    (config, hits)
}

fn candidate(text: &str) -> Value {
    json!({"candidates": [{"content": {"role": "model", "parts": [{"text": text}]}, "finishReason": "STOP"}]})
}

#[tokio::test]
async fn test_gemini_client_returns_text() {
    let (config, hits) = spawn_fake_gemini(StatusCode::OK, candidate("Day 1...")).await;
    let client = GeminiClient::new(&config, Credential::new("test-key")).unwrap();

    let text = client.generate("prompt").await.unwrap();

    assert_eq!(text, "Day 1...");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_gemini_client_authentication_failure() {
    let (config, _) = spawn_fake_gemini(StatusCode::OK, candidate("unused")).await;
    let client = GeminiClient::new(&config, Credential::new("wrong-key")).unwrap();

    let err = client.generate("prompt").await.unwrap_err();

    assert_eq!(err, GenerationError::Authentication("API key not valid".into()));
}

#[tokio::test]
async fn test_gemini_client_upstream_error() {
    let (config, _) = spawn_fake_gemini(
        StatusCode::SERVICE_UNAVAILABLE,
        json!({"error": {"code": 503, "message": "The model is overloaded.", "status": "UNAVAILABLE"}}),
    )
    .await;
    let client = GeminiClient::new(&config, Credential::new("test-key")).unwrap();

    let err = client.generate("prompt").await.unwrap_err();

    assert_eq!(
        err,
        GenerationError::Upstream {
            status: 503,
            message: "The model is overloaded.".into()
        }
    );
}

#[tokio::test]
async fn test_gemini_client_empty_response() {
    let (config, _) = spawn_fake_gemini(StatusCode::OK, json!({"candidates": []})).await;
    let client = GeminiClient::new(&config, Credential::new("test-key")).unwrap();

    assert_eq!(
        client.generate("prompt").await,
        Err(GenerationError::EmptyResponse)
    );
}

#[tokio::test]
async fn test_gemini_client_unreachable_host() {
    let config = GenerationConfig {
        base_url: "http://127.0.0.1:1/v1beta".into(),
        ..GenerationConfig::default()
    };
    let client = GeminiClient::new(&config, Credential::new("test-key")).unwrap();

    assert!(matches!(
        client.generate("prompt").await,
        Err(GenerationError::Transport(_))
    ));
}

#[tokio::test]
async fn test_end_to_end_with_gemini_factory() {
    let (config, hits) = spawn_fake_gemini(StatusCode::OK, candidate("Day 1...")).await;
    let controller = FormController::new(
        CredentialResolver::new(StaticSecrets::new().with(KEY_NAME, "test-key"), KEY_NAME),
        Arc::new(GeminiClientFactory::new(config)),
    );

    let submission = controller
        .submit(&FormInput {
            destination: "Kyoto, Japão".into(),
            duration_days: 5,
            style: TravelStyle::Cultural,
            budget: Budget::Moderate,
            interests: "arquitetura moderna".into(),
        })
        .await;

    assert_eq!(submission.state, SubmissionState::Rendered);
    assert_eq!(submission.markdown(), Some("Day 1..."));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
