use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose, Engine as _};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

use mediassist::config::AppConfig;
use mediassist::database::{self, current_user_repo, disease_predictions_repo};
use mediassist::models::prediction_api_models::ClassifierResponse;
use mediassist::services::classifier_service::{ClassifierError, ClassifierGateway};
use mediassist::services::gemini_service::{GenerateRequest, LlmError, TextModel};
use mediassist::state::AppState;
use mediassist::web::router::build_router;

struct FixedClassifier {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ClassifierGateway for FixedClassifier {
    async fn predict(&self, symptoms: &[String]) -> Result<ClassifierResponse, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ClassifierResponse {
            predicted_probabilities: Some(
                [("Flu".to_string(), 70.0), ("Common Cold".to_string(), 30.0)]
                    .into_iter()
                    .collect(),
            ),
            input_symptoms: Some(symptoms.to_vec()),
            iterations_per_model: Some(10),
            total_predictions: Some(30),
            ..Default::default()
        })
    }
}

struct CannedModel;

#[async_trait]
impl TextModel for CannedModel {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, LlmError> {
        if request.system_instruction.is_some() {
            return Ok("Please rest and drink fluids.".to_string());
        }
        Ok(r#"```json
{
  "description": "A viral infection",
  "precautions": ["rest"],
  "medications": ["paracetamol"],
  "workouts": ["walking"],
  "diets": ["soup"],
  "aiInsights": {"severity": "Mild"}
}
```"#
            .to_string())
    }
}

struct TestApp {
    router: Router,
    pool: SqlitePool,
    classifier_calls: Arc<AtomicUsize>,
}

async fn test_app() -> TestApp {
    let pool = database::connect("sqlite::memory:").await.unwrap();
    let classifier_calls = Arc::new(AtomicUsize::new(0));
    let state = AppState::new(
        pool.clone(),
        AppConfig::for_database("sqlite::memory:"),
        reqwest::Client::new(),
        Arc::new(FixedClassifier {
            calls: classifier_calls.clone(),
        }),
        Arc::new(CannedModel),
    );
    TestApp {
        router: build_router(state),
        pool,
        classifier_calls,
    }
}

fn token_for(user_id: &str, exp: i64) -> String {
    let payload = json!({ "sub": user_id, "exp": exp }).to_string();
    format!(
        "eyJhbGciOiJIUzI1NiJ9.{}.signature",
        general_purpose::URL_SAFE_NO_PAD.encode(payload)
    )
}

fn valid_token(user_id: &str) -> String {
    token_for(user_id, chrono::Utc::now().timestamp() + 3600)
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("access_token={}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

#[tokio::test]
async fn health_reports_ok() {
    let app = test_app().await;
    let (status, body) = send(&app.router, request("GET", "/api/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["build"].is_string());
}

#[tokio::test]
async fn too_many_symptoms_never_reach_the_classifier() {
    let app = test_app().await;
    let symptoms = json!({ "symptoms": ["a", "b", "c", "d", "e", "f"] });
    let (status, body) = send(
        &app.router,
        request("POST", "/api/free-symptoms", None, Some(symptoms)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Maximum 5 symptoms allowed");
    assert_eq!(app.classifier_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_symptom_bodies_are_bad_requests() {
    let app = test_app().await;
    let token = valid_token("user-1");
    let endpoints = [
        "/api/free-symptoms",
        "/api/disease-prediction",
        "/api/predict",
        "/api/symptoms",
    ];
    let bodies = [
        json!({ "symptoms": "fever" }),
        json!({ "symptoms": [1, 2] }),
        json!({ "symptoms": null }),
    ];

    for uri in endpoints {
        for body in &bodies {
            let (status, resp) = send(
                &app.router,
                request("POST", uri, Some(&token), Some(body.clone())),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}", uri, body);
            assert_eq!(resp["error"], "Please provide at least one symptom", "{} {}", uri, body);
        }
    }
    assert_eq!(app.classifier_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn free_symptoms_answers_without_storing() {
    let app = test_app().await;
    let (status, body) = send(
        &app.router,
        request(
            "POST",
            "/api/free-symptoms",
            None,
            Some(json!({ "symptoms": [" Fever ", "cough", "fever"] })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["input_symptoms"], json!(["fever", "cough"]));
    assert_eq!(body["diseasePredictions"][0]["diseaseName"], "Flu");
    assert_eq!(body["diseasePredictions"][0]["description"], "A viral infection");
    assert!(body.get("symptomEntryId").map_or(true, Value::is_null));
    assert_eq!(body["individual_model_results"]["RandomForest"], json!({}));
}

#[tokio::test]
async fn protected_routes_require_a_user() {
    let app = test_app().await;
    let (status, body) = send(&app.router, request("GET", "/api/symptoms", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let expired = token_for("user-1", 1);
    let (status, _) = send(
        &app.router,
        request("GET", "/api/symptoms", Some(&expired), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bearer_header_is_accepted() {
    let app = test_app().await;
    let req = Request::builder()
        .method("GET")
        .uri("/api/symptoms")
        .header(header::AUTHORIZATION, format!("Bearer {}", valid_token("user-1")))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app.router, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn current_user_row_is_the_offline_fallback() {
    let app = test_app().await;
    current_user_repo::set_current_user_id(&app.pool, "local-user")
        .await
        .unwrap();

    let (status, body) = send(
        &app.router,
        request(
            "POST",
            "/api/predict",
            None,
            Some(json!({ "symptoms": ["fever"] })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["disease"], "Flu");
    assert_eq!(body["probability"], 70.0);
    assert_eq!(body["workout"], json!(["walking"]));
    assert!(body["id"].is_string());
    assert!(body["createdAt"].is_string());
}

#[tokio::test]
async fn prediction_is_stored_listed_and_deleted() {
    let app = test_app().await;
    let token = valid_token("user-1");

    let (status, report) = send(
        &app.router,
        request(
            "POST",
            "/api/disease-prediction",
            Some(&token),
            Some(json!({ "symptoms": ["fever", "chills"] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let entry_id = report["symptomEntryId"].as_str().unwrap().to_string();
    assert!(report["diseasePredictions"][0]["id"].is_string());

    let (status, list) = send(&app.router, request("GET", "/api/symptoms", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["symptoms"], json!(["fever", "chills"]));
    assert_eq!(list[0]["predictions"][0]["diseaseName"], "Flu");
    assert_eq!(list[0]["predictions"][1]["diseaseName"], "Common Cold");

    // Other users see nothing and cannot delete it.
    let other = valid_token("user-2");
    let uri = format!("/api/symptoms/{}", entry_id);
    let (status, _) = send(&app.router, request("GET", &uri, Some(&other), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app.router, request("DELETE", &uri, Some(&other), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app.router, request("DELETE", &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let remaining = disease_predictions_repo::count_predictions_for_entry(&app.pool, &entry_id)
        .await
        .unwrap();
    assert_eq!(remaining, 0);

    let (status, _) = send(&app.router, request("DELETE", &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn symptom_entry_create_returns_the_stored_entry() {
    let app = test_app().await;
    let token = valid_token("user-1");
    let (status, entry) = send(
        &app.router,
        request(
            "POST",
            "/api/symptoms",
            Some(&token),
            Some(json!({ "symptoms": ["headache"] })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["userId"], "user-1");
    assert_eq!(entry["predictions"].as_array().unwrap().len(), 2);
    assert_eq!(entry["predictions"][0]["aiInsights"]["severity"], "Mild");
}

#[tokio::test]
async fn chat_uses_history_and_rejects_empty_messages() {
    let app = test_app().await;
    let token = valid_token("user-1");

    let (status, _) = send(
        &app.router,
        request("POST", "/api/chat", Some(&token), Some(json!({ "message": "  " }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app.router,
        request(
            "POST",
            "/api/chat",
            Some(&token),
            Some(json!({ "message": "I feel tired" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Please rest and drink fluids.");
    assert_eq!(body["history"][0]["role"], "user");
    assert_eq!(body["history"][1]["role"], "model");
    assert_eq!(body["history"][1]["parts"][0]["text"], "Please rest and drink fluids.");
}

#[tokio::test]
async fn preferences_default_then_partial_update() {
    let app = test_app().await;
    let token = valid_token("user-1");

    let (status, prefs) = send(
        &app.router,
        request("GET", "/api/user/preferences", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(prefs["theme"], "system");
    assert_eq!(prefs["emailNotifications"], true);

    let (status, prefs) = send(
        &app.router,
        request(
            "PUT",
            "/api/user/preferences",
            Some(&token),
            Some(json!({ "theme": "dark", "shareData": true })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(prefs["theme"], "dark");
    assert_eq!(prefs["shareData"], true);
    assert_eq!(prefs["language"], "en");
}

#[tokio::test]
async fn appointment_validation_and_listing() {
    let app = test_app().await;
    let token = valid_token("user-1");

    let (status, body) = send(
        &app.router,
        request(
            "POST",
            "/api/appointments",
            Some(&token),
            Some(json!({
                "doctorName": "Dr. Who",
                "scheduledAt": "2025-06-01T09:30",
                "status": "someday"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("upcoming"));

    let (status, created) = send(
        &app.router,
        request(
            "POST",
            "/api/appointments",
            Some(&token),
            Some(json!({ "doctorName": "Dr. Who", "scheduledAt": "2025-06-01T09:30" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "upcoming");

    let uri = format!("/api/appointments/{}", created["id"].as_str().unwrap());
    let (status, _) = send(
        &app.router,
        request(
            "PUT",
            &uri,
            Some(&valid_token("user-2")),
            Some(json!({ "status": "cancelled" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, list) = send(&app.router, request("GET", "/api/appointments", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["scheduledAt"], "2025-06-01T09:30:00Z");
}

#[tokio::test]
async fn medication_status_filter() {
    let app = test_app().await;
    let token = valid_token("user-1");

    let (status, _) = send(
        &app.router,
        request(
            "POST",
            "/api/medications",
            Some(&token),
            Some(json!({ "name": "Ibuprofen", "refillsLeft": -2 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for (name, active) in [("Ibuprofen", true), ("Penicillin", false)] {
        let (status, _) = send(
            &app.router,
            request(
                "POST",
                "/api/medications",
                Some(&token),
                Some(json!({ "name": name, "isActive": active })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, past) = send(
        &app.router,
        request("GET", "/api/medications?status=past", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(past.as_array().unwrap().len(), 1);
    assert_eq!(past[0]["name"], "Penicillin");

    let (status, _) = send(
        &app.router,
        request("GET", "/api/medications?status=paused", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn proxies_validate_before_calling_out() {
    let app = test_app().await;

    let (status, body) = send(&app.router, request("GET", "/api/recipes", None, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Query parameter is required");

    let (status, _) = send(
        &app.router,
        request(
            "GET",
            "/api/doctors/search?lat=52.1&lon=4.3&specialty=Astrologer",
            None,
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Known specialty, but no API key configured.
    let (status, _) = send(
        &app.router,
        request(
            "GET",
            "/api/doctors/search?lat=52.1&lon=4.3&specialty=Dentist",
            None,
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, specialties) = send(
        &app.router,
        request("GET", "/api/doctors/specialties", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(specialties[0]["name"], "General Physician");
    assert_eq!(specialties[0]["searchTerms"][0], "general practitioner");
}

#[tokio::test]
async fn logout_clears_cookies() {
    let app = test_app().await;
    let resp = app
        .router
        .clone()
        .oneshot(request("POST", "/api/auth/logout", Some(&valid_token("user-1")), None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let cookies: Vec<String> = resp
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().any(|c| c.starts_with("access_token=;")));
    assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));
    assert_eq!(
        resp.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-store"
    );
}

#[tokio::test]
async fn token_users_get_a_local_profile() {
    let app = test_app().await;
    let payload = json!({
        "sub": "user-9",
        "exp": chrono::Utc::now().timestamp() + 3600,
        "name": "Grace",
        "email": "grace@example.com"
    })
    .to_string();
    let token = format!(
        "eyJhbGciOiJIUzI1NiJ9.{}.signature",
        general_purpose::URL_SAFE_NO_PAD.encode(payload)
    );

    let (status, profile) = send(
        &app.router,
        request("GET", "/api/user/profile", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["name"], "Grace");

    let (status, profile) = send(
        &app.router,
        request(
            "PUT",
            "/api/user/profile",
            Some(&token),
            Some(json!({ "age": "41", "gender": "female" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["age"], 41);
    assert_eq!(profile["email"], "grace@example.com");
}
