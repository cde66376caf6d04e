// HTTP client against an in-process service on a loopback port

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use symptom_diag::api::{ApiClient, Severity, SymptomApi};
use symptom_diag::error::ApiError;

async fn spawn_service(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_fetch_symptoms_decodes_catalogue() {
    let router = Router::new().route(
        "/symptomes",
        get(|| async {
            Json(json!({
                "succes": true,
                "symptomes": [
                    {"id": "s1", "nom": "bruit moteur", "categorie": "moteur", "poids": 0.8},
                    {"id": "s2", "nom": "fumée"}
                ]
            }))
        }),
    );
    let client = ApiClient::new(&spawn_service(router).await).unwrap();

    let symptoms = client.fetch_symptoms().await.unwrap();
    assert_eq!(symptoms.len(), 2);
    assert_eq!(symptoms[0].name, "bruit moteur");
    assert_eq!(symptoms[0].category.as_deref(), Some("moteur"));
    assert_eq!(symptoms[1].weight, 1.0);
    assert_eq!(symptoms[1].similarity_score, None);
}

#[tokio::test]
async fn test_search_posts_text_and_reads_scores() {
    let seen = Arc::new(Mutex::new(Vec::<Value>::new()));
    let recorder = Arc::clone(&seen);
    let router = Router::new().route(
        "/rechercher",
        post(move |Json(body): Json<Value>| {
            let recorder = Arc::clone(&recorder);
            async move {
                recorder.lock().unwrap().push(body);
                Json(json!({
                    "succes": true,
                    "texte_recherche": "bru",
                    "resultats": [
                        {"id": "s1", "nom": "bruit moteur", "score_similarite": 0.87}
                    ]
                }))
            }
        }),
    );
    let client = ApiClient::new(&spawn_service(router).await).unwrap();

    let results = client.search_symptoms("bru").await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].similarity_percent(), Some(87));
    assert_eq!(seen.lock().unwrap().as_slice(), &[json!({"texte": "bru"})]);
}

#[tokio::test]
async fn test_search_rejection_carries_server_message() {
    let router = Router::new().route(
        "/rechercher",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"succes": false, "erreur": "Texte trop court"})),
            )
        }),
    );
    let client = ApiClient::new(&spawn_service(router).await).unwrap();

    let err = client.search_symptoms("ab").await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Status {
            status: 400,
            message: "Texte trop court".into()
        }
    );
}

#[tokio::test]
async fn test_diagnose_success() {
    let seen = Arc::new(Mutex::new(None::<Value>));
    let recorder = Arc::clone(&seen);
    let router = Router::new().route(
        "/diagnostiquer",
        post(move |Json(body): Json<Value>| {
            let recorder = Arc::clone(&recorder);
            async move {
                *recorder.lock().unwrap() = Some(body);
                Json(json!({
                    "succes": true,
                    "diagnostic": "Injecteurs encrassés",
                    "gravite": "moyen",
                    "cout_estimatif": "150 000Ar - 400 000Ar",
                    "confiance": "Haute",
                    "score": 0.91,
                    "symptomes_utilises": ["bruit moteur", "fumée"]
                }))
            }
        }),
    );
    let client = ApiClient::new(&spawn_service(router).await).unwrap();

    let result = client
        .diagnose(&["s1".to_string(), "s2".to_string()])
        .await
        .unwrap();
    assert_eq!(result.diagnosis, "Injecteurs encrassés");
    assert_eq!(result.severity, Severity::Medium);
    assert_eq!(result.estimated_cost, "150 000Ar - 400 000Ar");
    assert_eq!(result.used_symptoms, vec!["bruit moteur", "fumée"]);
    assert_eq!(
        seen.lock().unwrap().clone(),
        Some(json!({"symptomes": ["s1", "s2"]}))
    );
}

#[tokio::test]
async fn test_diagnose_failure_surfaces_server_error() {
    let router = Router::new().route(
        "/diagnostiquer",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"succes": false, "erreur": "Maximum 5 symptômes autorisés"})),
            )
        }),
    );
    let client = ApiClient::new(&spawn_service(router).await).unwrap();

    let err = client.diagnose(&["s1".to_string()]).await.unwrap_err();
    assert_eq!(err, ApiError::Diagnosis("Maximum 5 symptômes autorisés".into()));
    assert_eq!(err.to_string(), "Maximum 5 symptômes autorisés");
}

#[tokio::test]
async fn test_diagnose_server_error_without_body_uses_default() {
    let router = Router::new().route(
        "/diagnostiquer",
        post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let client = ApiClient::new(&spawn_service(router).await).unwrap();

    let err = client.diagnose(&["s1".to_string()]).await.unwrap_err();
    assert_eq!(err, ApiError::Diagnosis("Erreur lors du diagnostic".into()));
}

#[tokio::test]
async fn test_malformed_body_is_protocol_error() {
    let router = Router::new().route("/symptomes", get(|| async { "not json" }));
    let client = ApiClient::new(&spawn_service(router).await).unwrap();

    assert!(matches!(
        client.fetch_symptoms().await,
        Err(ApiError::Protocol(_))
    ));
}

#[tokio::test]
async fn test_unreachable_service_is_network_error() {
    // Grab a free port, then close it again
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(&format!("http://{addr}")).unwrap();
    let err = client.fetch_symptoms().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert!(err
        .to_string()
        .starts_with("Impossible de contacter le serveur"));
}

#[tokio::test]
async fn test_request_timeout_is_network_error() {
    let router = Router::new().route(
        "/symptomes",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({"symptomes": []}))
        }),
    );
    let base_url = spawn_service(router).await;
    let client = ApiClient::with_timeout(&base_url, Some(Duration::from_millis(100))).unwrap();

    assert!(matches!(
        client.fetch_symptoms().await,
        Err(ApiError::Network(_))
    ));
}
