//! End-to-end prediction requests against a local stand-in backend.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::extract::State;
use axum::routing::{get, post};
use axum::Json;
use serde_json::{Value, json};

use cardiac_client::{PredictionClient, PredictionError};
use cardiac_core::{ExecutionContext, ResolutionSource, ResolverSettings};
use cardiac_resolver::TransportError;

#[derive(Clone, Default)]
struct Backend {
    health_hits: Arc<AtomicUsize>,
    predict_hits: Arc<AtomicUsize>,
}

async fn health(State(backend): State<Backend>) -> Json<Value> {
    backend.health_hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "status": "ok", "message": "Cardiac AI API is running" }))
}

async fn predict(State(backend): State<Backend>, Json(input): Json<Value>) -> Json<Value> {
    backend.predict_hits.fetch_add(1, Ordering::SeqCst);
    let labs = input["labs"].as_object().map(|l| l.len()).unwrap_or(0);
    Json(json!({
        "prediction": "HF",
        "confidence": 0.64,
        "class_probabilities": { "Arrhythmia": 0.2, "HF": 0.64, "MI": 0.16 },
        "labs_seen": labs,
    }))
}

async fn spawn_backend() -> (SocketAddr, Backend) {
    let backend = Backend::default();
    let app = Router::new()
        .route("/", get(health))
        .route("/predict", post(predict))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, backend)
}

fn payload() -> Value {
    json!({
        "labs": { "troponin": 0.04, "creatinine": 1.1, "bnp": 320.0 },
        "text_svd": vec![0.0; 50],
        "biobert_pca": vec![0.0; 189],
    })
}

#[tokio::test]
async fn local_development_backend_round_trip() {
    let (addr, backend) = spawn_backend().await;
    let settings = ResolverSettings {
        local_url: format!("http://{addr}/predict"),
        ..ResolverSettings::default()
    };
    let client = PredictionClient::connect(ExecutionContext::new("localhost"), settings).unwrap();

    let response = client.predict(&payload()).await.unwrap();
    assert_eq!(response["prediction"], "HF");
    assert_eq!(response["labs_seen"], 3);

    let endpoint = client.current_endpoint().unwrap();
    assert_eq!(endpoint.source(), ResolutionSource::Loopback);
    assert_eq!(backend.predict_hits.load(Ordering::SeqCst), 1);
    assert_eq!(backend.health_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn override_backend_round_trip() {
    let (addr, backend) = spawn_backend().await;
    let ctx = ExecutionContext::new("my-app.onrender.com")
        .with_override(format!("http://{addr}/predict"));
    let client = PredictionClient::connect(ctx, ResolverSettings::default()).unwrap();

    for _ in 0..3 {
        let response = client.predict(&payload()).await.unwrap();
        assert_eq!(response["confidence"], 0.64);
    }
    assert_eq!(backend.predict_hits.load(Ordering::SeqCst), 3);
    assert_eq!(backend.health_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unreachable_backend_surfaces_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let ctx = ExecutionContext::new("example.com").with_override(format!("http://{addr}/predict"));
    let client = PredictionClient::connect(ctx, ResolverSettings::default()).unwrap();

    let err = client.predict(&payload()).await.unwrap_err();
    assert!(matches!(
        err,
        PredictionError::Transport {
            source: TransportError::Connect { .. },
            ..
        }
    ));
    assert_eq!(err.user_message(), "Failed to get prediction. Please try again.");
}

#[tokio::test]
async fn missing_route_surfaces_status_error() {
    let (addr, _) = spawn_backend().await;
    let ctx = ExecutionContext::new("example.com").with_override(format!("http://{addr}/score"));
    let client = PredictionClient::connect(ctx, ResolverSettings::default()).unwrap();

    let err = client.predict(&payload()).await.unwrap_err();
    match err {
        PredictionError::Status { status, .. } => assert_eq!(status.as_u16(), 404),
        other => panic!("unexpected error: {other:?}"),
    }
}
