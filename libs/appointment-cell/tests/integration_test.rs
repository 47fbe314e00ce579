use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::router::appointment_routes;
use appointment_cell::services::scheduling::SchedulingService;
use appointment_cell::services::store::InMemoryAppointmentStore;
use shared_config::{AppConfig, SchedulingConfig};
use triage_cell::models::{TriageError, TriageVerdict};
use triage_cell::services::classifier::{GroqClassifier, SymptomClassifier};

struct OfflineClassifier;

#[async_trait]
impl SymptomClassifier for OfflineClassifier {
    async fn classify(&self, _symptoms: &str) -> Result<TriageVerdict, TriageError> {
        Err(TriageError::ClassifierUnavailable("offline".to_string()))
    }
}

fn test_app_with(classifier: Arc<dyn SymptomClassifier>) -> Router {
    let config = SchedulingConfig::default();
    let service = Arc::new(SchedulingService::new(
        Arc::new(InMemoryAppointmentStore::new(config.clone())),
        classifier,
        config,
        Duration::from_secs(5),
    ));
    appointment_routes(service)
}

fn test_app() -> Router {
    test_app_with(Arc::new(OfflineClassifier))
}

fn tomorrow_at(hour: u32, minute: u32) -> DateTime<Utc> {
    (Utc::now() + ChronoDuration::days(1))
        .date_naive()
        .and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap())
        .and_utc()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn create_body(date: DateTime<Utc>) -> Value {
    json!({
        "patient_name": "Jane Doe",
        "patient_phone": "5551234567",
        "symptoms": "persistent cough",
        "appointment_date": date.to_rfc3339()
    })
}

fn slot_starts(body: &Value) -> Vec<DateTime<Utc>> {
    body["available_slots"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| {
            DateTime::parse_from_rfc3339(s["start_time"].as_str().unwrap())
                .unwrap()
                .with_timezone(&Utc)
        })
        .collect()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn create_returns_201_with_pending_record() {
    let app = test_app();

    let response = app
        .oneshot(json_request("POST", "/", create_body(tomorrow_at(10, 0))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["status"], "pending");
    assert_eq!(body["appointment_type"], "general");
    assert!(body["id"].as_str().is_some());
}

#[tokio::test]
async fn create_rejects_bad_phone_with_400() {
    let app = test_app();

    let mut body = create_body(tomorrow_at(10, 0));
    body["patient_phone"] = json!("555-ABC");

    let response = app.oneshot(json_request("POST", "/", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("patient_phone"));
}

#[tokio::test]
async fn double_booking_returns_409() {
    let app = test_app();
    let date = tomorrow_at(10, 0);

    let first = app
        .clone()
        .oneshot(json_request("POST", "/", create_body(date)))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .oneshot(json_request("POST", "/", create_body(date)))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn adjacent_bookings_both_succeed() {
    let app = test_app();

    let first = app
        .clone()
        .oneshot(json_request("POST", "/", create_body(tomorrow_at(10, 0))))
        .await
        .unwrap();
    let second = app
        .oneshot(json_request("POST", "/", create_body(tomorrow_at(10, 30))))
        .await
        .unwrap();

    assert_eq!(first.status(), StatusCode::CREATED);
    assert_eq!(second.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn get_and_list_round_trip() {
    let app = test_app();

    let created = app
        .clone()
        .oneshot(json_request("POST", "/", create_body(tomorrow_at(10, 0))))
        .await
        .unwrap();
    let created = body_json(created).await;
    let id = created["id"].as_str().unwrap().to_string();

    let fetched = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(fetched.status(), StatusCode::OK);

    let listed = app
        .oneshot(
            Request::builder()
                .uri("/?status=pending&skip=0&limit=10")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(listed.status(), StatusCode::OK);
    let listed = body_json(listed).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_appointment_returns_404() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/{}", uuid::Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cancel_returns_204_and_frees_the_slot() {
    let app = test_app();
    let date = tomorrow_at(10, 0);

    let created = app
        .clone()
        .oneshot(json_request("POST", "/", create_body(date)))
        .await
        .unwrap();
    let created = body_json(created).await;
    let id = created["id"].as_str().unwrap();

    let cancelled = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(cancelled.status(), StatusCode::NO_CONTENT);

    let slots = app
        .oneshot(json_request(
            "POST",
            "/available-slots",
            json!({ "date": date.to_rfc3339() }),
        ))
        .await
        .unwrap();
    let slots = body_json(slots).await;
    assert!(slot_starts(&slots).contains(&date));
}

#[tokio::test]
async fn cancelling_twice_returns_400() {
    let app = test_app();

    let created = app
        .clone()
        .oneshot(json_request("POST", "/", create_body(tomorrow_at(10, 0))))
        .await
        .unwrap();
    let created = body_json(created).await;
    let id = created["id"].as_str().unwrap().to_string();

    let delete = |app: Router, id: String| async move {
        app.oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
    };

    assert_eq!(
        delete(app.clone(), id.clone()).await.status(),
        StatusCode::NO_CONTENT
    );
    assert_eq!(delete(app, id).await.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_confirms_then_completes() {
    let app = test_app();

    let created = app
        .clone()
        .oneshot(json_request("POST", "/", create_body(tomorrow_at(10, 0))))
        .await
        .unwrap();
    let created = body_json(created).await;
    let id = created["id"].as_str().unwrap().to_string();

    let confirmed = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/{}", id),
            json!({ "status": "confirmed" }),
        ))
        .await
        .unwrap();
    assert_eq!(confirmed.status(), StatusCode::OK);
    assert_eq!(body_json(confirmed).await["status"], "confirmed");

    let completed = app
        .oneshot(json_request(
            "PUT",
            &format!("/{}", id),
            json!({ "status": "completed" }),
        ))
        .await
        .unwrap();
    assert_eq!(completed.status(), StatusCode::OK);
    assert_eq!(body_json(completed).await["status"], "completed");
}

#[tokio::test]
async fn available_slots_excludes_booked_and_validates_duration() {
    let app = test_app();
    let date = tomorrow_at(11, 0);

    app.clone()
        .oneshot(json_request("POST", "/", create_body(date)))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/available-slots",
            json!({ "date": date.to_rfc3339(), "duration_minutes": 30 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let starts = slot_starts(&body);
    assert!(!starts.contains(&date));
    assert_eq!(body["total_slots"], starts.len());

    let invalid = app
        .oneshot(json_request(
            "POST",
            "/available-slots",
            json!({ "date": date.to_rfc3339(), "duration_minutes": 5 }),
        ))
        .await
        .unwrap();
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn book_with_triage_attaches_groq_verdict() {
    let mock_server = MockServer::start().await;

    let content = json!({
        "severity": "high",
        "advice": "See a cardiologist promptly.",
        "needs_appointment": true,
        "urgency": "urgent",
        "department": "Cardiology"
    })
    .to_string();

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [ { "message": { "role": "assistant", "content": content } } ]
        })))
        .mount(&mock_server)
        .await;

    let config = AppConfig {
        groq_api_key: "test-key".to_string(),
        groq_api_url: mock_server.uri(),
        ..AppConfig::default()
    };
    let app = test_app_with(Arc::new(GroqClassifier::new(&config)));

    let response = app
        .oneshot(json_request(
            "POST",
            "/book-with-triage",
            create_body(tomorrow_at(10, 0)),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["triage"]["severity"], "high");
    assert_eq!(body["appointment"]["department"], "Cardiology");
    assert_eq!(
        body["appointment"]["ai_recommendation"],
        "See a cardiologist promptly."
    );
}

#[tokio::test]
async fn book_with_triage_survives_classifier_outage() {
    let app = test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/book-with-triage",
            create_body(tomorrow_at(10, 0)),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["triage"]["severity"], "moderate");
    assert_eq!(body["triage"]["needs_appointment"], true);
    assert_eq!(body["appointment"]["status"], "pending");
}
