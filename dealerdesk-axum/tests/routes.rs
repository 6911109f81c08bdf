use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use dealerdesk::{DealerDesk, NotificationConfig, NotificationService, SqliteRepositoryProvider};
use dealerdesk_mailer::MemoryTransport;
use serde_json::{Value, json};
use tower::ServiceExt;

const CUSTOMER: &str = "jane@example.com";

async fn app() -> (Router, MemoryTransport) {
    let repositories = Arc::new(
        SqliteRepositoryProvider::connect("sqlite::memory:")
            .await
            .unwrap(),
    );
    let mailer = MemoryTransport::new();
    let notifications = NotificationService::new(
        Arc::new(mailer.clone()),
        NotificationConfig {
            from_address: "crm@dealer.test".to_string(),
            receivers: vec!["sales@dealer.test".to_string()],
            error_recipients: vec!["errors@dealer.test".to_string()],
        },
    );

    let desk = DealerDesk::new(repositories, notifications);
    desk.migrate().await.unwrap();
    (dealerdesk_axum::routes(Arc::new(desk)), mailer)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn otp(app: &Router) -> u64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/generate-otp",
        Some(json!({ "email": CUSTOMER })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["otp"].as_u64().unwrap()
}

fn with_otp(mut body: Value, otp: u64) -> Value {
    body["email"] = json!(CUSTOMER);
    body["otp"] = json!(otp);
    body
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app().await;
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_generate_otp_emails_the_code() {
    let (app, mailer) = app().await;
    let code = otp(&app).await;

    let email = mailer.last().unwrap();
    assert_eq!(email.to, vec![CUSTOMER.to_string()]);
    assert!(email.body.contains(&code.to_string()));
    assert!((100_000..=999_999).contains(&code));
}

#[tokio::test]
async fn test_generate_otp_rejects_bad_email() {
    let (app, _) = app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/generate-otp",
        Some(json!({ "email": "not-an-email" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);

    let (status, _) = send(&app, Method::POST, "/generate-otp", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generate_otp_reports_transport_failure() {
    let (app, mailer) = app().await;
    mailer.set_failing(true);

    let (status, body) = send(
        &app,
        Method::POST,
        "/generate-otp",
        Some(json!({ "email": CUSTOMER })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], 502);
}

#[tokio::test]
async fn test_gate_rejects_missing_and_wrong_codes() {
    let (app, _) = app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/add-account",
        Some(json!({ "account_name": "Jane Doe" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email and OTP are required.");

    let (status, body) = send(
        &app,
        Method::POST,
        "/add-account",
        Some(with_otp(json!({ "account_name": "Jane Doe" }), 123456)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No OTP generated for this email.");

    let code = otp(&app).await;
    let wrong = if code == 999_999 { 100_000 } else { code + 1 };
    let (status, body) = send(
        &app,
        Method::POST,
        "/add-account",
        Some(with_otp(json!({ "account_name": "Jane Doe" }), wrong)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid OTP.");

    let (status, body) = send(&app, Method::GET, "/get-all-accounts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_count"], 0);
}

#[tokio::test]
async fn test_code_is_single_use() {
    let (app, _) = app().await;
    let code = otp(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/add-account",
        Some(with_otp(
            json!({ "account_id": "ACC0000001", "account_name": "Jane Doe" }),
            code,
        )),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["account_id"], "ACC0000001");

    let (status, body) = send(
        &app,
        Method::POST,
        "/add-account",
        Some(with_otp(json!({ "account_name": "John Doe" }), code)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No OTP generated for this email.");
}

#[tokio::test]
async fn test_otp_accepted_as_string() {
    let (app, _) = app().await;
    let code = otp(&app).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/add-account",
        Some(json!({
            "email": CUSTOMER,
            "otp": code.to_string(),
            "account_name": "Jane Doe"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_account_lookup_and_gated_delete() {
    let (app, _) = app().await;

    let (status, body) = send(&app, Method::GET, "/get-single-account", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);

    let (status, _) = send(
        &app,
        Method::GET,
        "/get-single-account?account_id=ACC0000404",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let code = otp(&app).await;
    send(
        &app,
        Method::POST,
        "/add-account",
        Some(with_otp(
            json!({ "account_id": "ACC0000001", "account_name": "Jane Doe" }),
            code,
        )),
    )
    .await;

    let code = otp(&app).await;
    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/delete-account?account_id=ACC0000001&email={CUSTOMER}&otp={code}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["account_name"], "Jane Doe");
}

#[tokio::test]
async fn test_duplicate_account_conflicts() {
    let (app, _) = app().await;
    let account = json!({ "account_id": "ACC0000001", "account_name": "Jane Doe" });

    let code = otp(&app).await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/add-account",
        Some(with_otp(account.clone(), code)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let code = otp(&app).await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/add-account",
        Some(with_otp(account, code)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_empty_dealer_list_is_not_found() {
    let (app, _) = app().await;
    let (status, body) = send(&app, Method::GET, "/get-all-dealers", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
}

#[tokio::test]
async fn test_purchase_flow() {
    let (app, mailer) = app().await;

    let code = otp(&app).await;
    send(
        &app,
        Method::POST,
        "/add-account",
        Some(with_otp(
            json!({ "account_id": "ACC0000001", "account_name": "Jane Doe" }),
            code,
        )),
    )
    .await;

    let code = otp(&app).await;
    let (status, dealer) = send(
        &app,
        Method::POST,
        "/add-dealer",
        Some(with_otp(
            json!({ "dealer_code": "DL01", "opportunity_owner": "Sam Seller" }),
            code,
        )),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let dealer_id = dealer["data"]["dealer_id"].as_str().unwrap().to_string();

    let code = otp(&app).await;
    let (status, vehicle) = send(
        &app,
        Method::POST,
        "/add-vehicle",
        Some(with_otp(
            json!({ "vehicle_model": "Roadster", "vehicle_year": 2024, "color": "Red" }),
            code,
        )),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let model_id = vehicle["data"]["vehicle_model_id"]
        .as_str()
        .unwrap()
        .to_string();

    let code = otp(&app).await;
    let (status, opportunity) = send(
        &app,
        Method::POST,
        "/new-customer",
        Some(with_otp(
            json!({
                "opportunity_name": "Roadster for Jane",
                "account_name": "Jane Doe",
                "amount": 1000,
                "dealer_id": dealer_id,
                "dealer_code": "DL01",
                "opportunity_owner": "Sam Seller",
                "probability": 15,
                "vehicle_model_id": model_id
            }),
            code,
        )),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(opportunity["data"]["stage"], "Prospecting");
    let opportunity_id = opportunity["data"]["opportunity_id"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, found) = send(
        &app,
        Method::GET,
        "/get-opportunities?account_name=Jane",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["total_count"], 1);

    let code = otp(&app).await;
    let (status, purchase) = send(
        &app,
        Method::POST,
        "/purchase-vehicle",
        Some(with_otp(
            json!({
                "opportunity_id": opportunity_id,
                "vehicle_model_id": model_id,
                "tax_amount": 1500.0,
                "customer_email": CUSTOMER
            }),
            code,
        )),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(purchase["data"]["vehicle"]["free_services_left"], 2);
    assert_eq!(purchase["data"]["vehicle"]["vehicle_color"], "Red");
    assert_eq!(purchase["data"]["tax"]["tax_type"], "Road Tax");
    let vehicle_id = purchase["data"]["vehicle"]["vehicle_id"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(
        mailer
            .sent()
            .iter()
            .any(|e| e.subject == "Vehicle Purchase Confirmation")
    );

    let (status, next) = send(
        &app,
        Method::GET,
        &format!("/next-service?vehicle_id={vehicle_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(next["data"]["service_type"], "Regular Maintenance");

    let code = otp(&app).await;
    let (status, update) = send(
        &app,
        Method::PUT,
        "/update-purchased-vehicle",
        Some(with_otp(
            json!({ "vehicle_id": vehicle_id, "current_kilometers": 900 }),
            code,
        )),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(update["changes"]["current_kilometers"], "900");

    let code = otp(&app).await;
    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/delete-purchased-vehicle?vehicle_id={vehicle_id}&email={CUSTOMER}&otp={code}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/get-services?vehicle_id={vehicle_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
