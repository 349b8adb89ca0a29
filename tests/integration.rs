use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use rider_bucket::api::rest::router;
use rider_bucket::config::Config;
use rider_bucket::state::AppState;
use serde_json::{json, Value};
use tower::ServiceExt;

fn setup() -> axum::Router {
    router(Arc::new(AppState::new(&Config::default())))
}

fn json_request(method: &str, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Registers a rider and logs in, returning `(rider_id, token)`.
async fn rider_session(app: &axum::Router, username: &str, name: &str) -> (String, String) {
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/riders",
            json!({ "username": username, "password": "pw-1234", "name": name }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/riders/login",
            json!({ "username": username, "password": "pw-1234" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let session = body_json(res).await;
    (
        session["rider_id"].as_str().unwrap().to_string(),
        session["token"].as_str().unwrap().to_string(),
    )
}

/// Places an order in `pincode` and has the warehouse pack it.
async fn packed_order(app: &axum::Router, pincode: &str) -> String {
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/orders",
            json!({
                "customer_id": "7d9f8a52-3c1e-4b7a-9a57-0f6a1c2b3d4e",
                "items": [
                    { "product_id": "1b4e28ba-2fa1-11d2-883f-0016d3cca427", "quantity": 2, "unit_price": 4500 }
                ],
                "shipping_address": {
                    "line1": "221 Residency Road",
                    "city": "Bengaluru",
                    "state": "Karnataka",
                    "pincode": pincode
                },
                "payment_method": "COD"
            }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let order = body_json(res).await;
    assert_eq!(order["order_status"], "Order Placed");
    assert_eq!(order["total_amount"], 9000);
    let order_id = order["id"].as_str().unwrap().to_string();

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/orders/{order_id}/status"),
            json!({ "status": "Packed / Processing" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    order_id
}

async fn toggle(app: &axum::Router, order_id: &str, token: &str) -> axum::response::Response {
    app.clone()
        .oneshot(json_request(
            "POST",
            &format!("/orders/bucket/{order_id}/toggle"),
            json!({}),
            Some(token),
        ))
        .await
        .unwrap()
}

async fn rider_status(
    app: &axum::Router,
    order_id: &str,
    status: &str,
    token: &str,
) -> axum::response::Response {
    app.clone()
        .oneshot(json_request(
            "POST",
            &format!("/delivery/orders/{order_id}/status"),
            json!({ "status": status }),
            Some(token),
        ))
        .await
        .unwrap()
}

#[tokio::test]
async fn health_returns_ok() {
    let app = setup();
    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["orders"], 0);
    assert_eq!(body["riders"], 0);
    assert_eq!(body["orders_in_bucket"], 0);
}

#[tokio::test]
async fn metrics_returns_prometheus_format() {
    let app = setup();
    let response = app.oneshot(get_request("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.contains("text/plain"));

    let body = body_string(response).await;
    assert!(body.contains("orders_in_bucket"));
}

#[tokio::test]
async fn register_hides_password_and_rejects_duplicates() {
    let app = setup();
    let payload = json!({ "username": "asha", "password": "pw-1234", "name": "Asha" });

    let res = app
        .clone()
        .oneshot(json_request("POST", "/riders", payload.clone(), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let rider = body_json(res).await;
    assert_eq!(rider["name"], "Asha");
    assert!(rider.get("password_hash").is_none());
    assert!(rider.get("password").is_none());

    let res = app
        .oneshot(json_request("POST", "/riders", payload, None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = setup();
    rider_session(&app, "ravi", "Ravi").await;

    let res = app
        .oneshot(json_request(
            "POST",
            "/riders/login",
            json!({ "username": "ravi", "password": "nope" }),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(res).await;
    assert_eq!(body["error"], "invalid credentials");
}

#[tokio::test]
async fn toggle_without_session_is_unauthorized() {
    let app = setup();
    let order_id = packed_order(&app, "560001").await;

    let res = app
        .oneshot(json_request(
            "POST",
            &format!("/orders/bucket/{order_id}/toggle"),
            json!({}),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logged_out_session_is_rejected() {
    let app = setup();
    let (_, token) = rider_session(&app, "meera", "Meera").await;
    let order_id = packed_order(&app, "560001").await;

    let res = app
        .clone()
        .oneshot(json_request("POST", "/riders/logout", json!({}), Some(&token)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["revoked"], true);

    let res = toggle(&app, &order_id, &token).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn get_nonexistent_order_returns_404() {
    let app = setup();
    let fake_id = "00000000-0000-0000-0000-000000000000";
    let response = app
        .oneshot(get_request(&format!("/orders/{fake_id}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains(fake_id));
}

#[tokio::test]
async fn malformed_status_is_bad_request() {
    let app = setup();
    let order_id = packed_order(&app, "560001").await;

    let res = app
        .oneshot(json_request(
            "POST",
            &format!("/orders/{order_id}/status"),
            json!({ "status": "Teleported" }),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = body_json(res).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn delivery_and_return_scenario() {
    let app = setup();
    let (rider_id, token) = rider_session(&app, "a", "A").await;
    let order_id = packed_order(&app, "560001").await;

    let res = app
        .clone()
        .oneshot(get_request("/orders/available/560001"))
        .await
        .unwrap();
    let available = body_json(res).await;
    assert_eq!(available.as_array().unwrap().len(), 1);
    assert_eq!(available[0]["in_bucket"], false);

    let res = toggle(&app, &order_id, &token).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["outcome"], "added");
    assert_eq!(body["order"]["in_bucket"], true);
    assert_eq!(body["order"]["assignment"]["rider_name"], "A");
    assert_eq!(body["order"]["assignment"]["rider_id"], rider_id);

    let res = app
        .clone()
        .oneshot(get_request("/orders/available/560001"))
        .await
        .unwrap();
    assert_eq!(body_json(res).await.as_array().unwrap().len(), 0);

    let res = rider_status(&app, &order_id, "Out for Delivery", &token).await;
    assert_eq!(res.status(), StatusCode::OK);
    let order = body_json(res).await;
    assert!(order["timestamps"]["out_for_delivery_at"].is_string());

    let res = app
        .clone()
        .oneshot(get_request("/delivery/bucket/A"))
        .await
        .unwrap();
    assert_eq!(body_json(res).await.as_array().unwrap().len(), 1);

    let res = rider_status(&app, &order_id, "Delivered", &token).await;
    assert_eq!(res.status(), StatusCode::OK);
    let order = body_json(res).await;
    assert_eq!(order["order_status"], "Delivered");
    assert_eq!(order["assignment"]["completed"], true);
    assert_eq!(order["in_bucket"], false);
    assert!(order["assignment"]["delivered_at"].is_string());
    assert!(order["timestamps"]["delivered_at"].is_string());
    assert_eq!(order["history"].as_array().unwrap().len(), 2);

    let res = app
        .clone()
        .oneshot(get_request("/delivery/bucket/A"))
        .await
        .unwrap();
    assert_eq!(body_json(res).await.as_array().unwrap().len(), 0);

    let res = app
        .clone()
        .oneshot(get_request("/delivery/completed/A"))
        .await
        .unwrap();
    assert_eq!(body_json(res).await.as_array().unwrap().len(), 1);

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/orders/{order_id}/return-status"),
            json!({ "return_status": "Return Requested" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let order = body_json(res).await;
    assert_eq!(order["return_status"], "Return Requested");
    assert!(order["return_timeline"]["requested_at"].is_string());
    assert_eq!(order["order_status"], "Delivered");

    let res = app
        .oneshot(get_request("/orders/returns?state=active"))
        .await
        .unwrap();
    let returns = body_json(res).await;
    assert_eq!(returns.as_array().unwrap().len(), 1);
    assert_eq!(returns[0]["id"], order_id);
}

#[tokio::test]
async fn second_rider_is_blocked_from_claim_and_status() {
    let app = setup();
    let (_, token_a) = rider_session(&app, "a", "A").await;
    let (_, token_b) = rider_session(&app, "b", "B").await;
    let order_id = packed_order(&app, "560001").await;

    let res = toggle(&app, &order_id, &token_a).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = toggle(&app, &order_id, &token_b).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = body_json(res).await;
    assert_eq!(body["error"], "Order already in bucketlist of rider A");

    let res = rider_status(&app, &order_id, "Out for Delivery", &token_b).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app
        .clone()
        .oneshot(get_request(&format!("/orders/{order_id}")))
        .await
        .unwrap();
    let order = body_json(res).await;
    assert_eq!(order["order_status"], "Packed / Processing");
    assert_eq!(order["assignment"]["rider_name"], "A");

    let res = toggle(&app, &order_id, &token_a).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["outcome"], "removed");
    assert_eq!(body["order"]["in_bucket"], false);
    assert!(body["order"]["assignment"]["rider_id"].is_null());
    assert!(body["order"]["assignment"]["rider_name"].is_null());
    assert!(body["order"]["assignment"]["assigned_at"].is_null());
    assert_eq!(body["order"]["assignment"]["completed"], false);
}

#[tokio::test]
async fn rider_with_same_display_name_cannot_move_claimed_order() {
    let app = setup();
    let (holder_id, token_a) = rider_session(&app, "asha1", "Asha").await;
    let (_, token_b) = rider_session(&app, "asha2", "Asha").await;
    let order_id = packed_order(&app, "560001").await;

    let res = toggle(&app, &order_id, &token_a).await;
    assert_eq!(res.status(), StatusCode::OK);

    for status in ["Out for Delivery", "Cancelled"] {
        let res = rider_status(&app, &order_id, status, &token_b).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    let res = app
        .clone()
        .oneshot(get_request(&format!("/orders/{order_id}")))
        .await
        .unwrap();
    let order = body_json(res).await;
    assert_eq!(order["order_status"], "Packed / Processing");
    assert_eq!(order["assignment"]["rider_id"], holder_id.as_str());
    assert!(order["history"].as_array().unwrap().iter().all(|h| h["rider_name"].is_null()));

    let res = rider_status(&app, &order_id, "Out for Delivery", &token_a).await;
    assert_eq!(res.status(), StatusCode::OK);
    let res = rider_status(&app, &order_id, "Delivered", &token_b).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = rider_status(&app, &order_id, "Delivered", &token_a).await;
    assert_eq!(res.status(), StatusCode::OK);
    let order = body_json(res).await;
    assert_eq!(order["assignment"]["completed"], true);
    assert_eq!(order["assignment"]["rider_id"], holder_id.as_str());
}

#[tokio::test]
async fn illegal_transition_is_bad_request() {
    let app = setup();
    let (_, token) = rider_session(&app, "a", "A").await;
    let order_id = packed_order(&app, "560001").await;
    toggle(&app, &order_id, &token).await;

    let res = rider_status(&app, &order_id, "Delivered", &token).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = body_json(res).await;
    assert_eq!(
        body["error"],
        "illegal transition from Packed / Processing to Delivered"
    );
}

#[tokio::test]
async fn return_on_undelivered_order_conflicts() {
    let app = setup();
    let order_id = packed_order(&app, "560001").await;

    let res = app
        .oneshot(json_request(
            "POST",
            &format!("/orders/{order_id}/return-status"),
            json!({ "return_status": "Return Requested" }),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn concurrent_claims_admit_one_rider() {
    let app = setup();
    let (_, token_a) = rider_session(&app, "a", "A").await;
    let (_, token_b) = rider_session(&app, "b", "B").await;
    let order_id = packed_order(&app, "560001").await;

    let first = {
        let app = app.clone();
        let order_id = order_id.clone();
        tokio::spawn(async move { toggle(&app, &order_id, &token_a).await.status() })
    };
    let second = {
        let app = app.clone();
        let order_id = order_id.clone();
        tokio::spawn(async move { toggle(&app, &order_id, &token_b).await.status() })
    };

    let mut statuses = vec![first.await.unwrap(), second.await.unwrap()];
    statuses.sort_by_key(|status| status.as_u16());

    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::CONFLICT]);
}

#[tokio::test]
async fn rider_location_is_upserted_by_owner_only() {
    let app = setup();
    let (rider_a, token_a) = rider_session(&app, "a", "A").await;
    let (_, token_b) = rider_session(&app, "b", "B").await;

    let res = app
        .clone()
        .oneshot(get_request(&format!("/riders/{rider_a}/location")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_json(res).await["location"].is_null());

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/riders/{rider_a}/location"),
            json!({ "lat": 12.9716, "lng": 77.5946 }),
            Some(&token_b),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/riders/{rider_a}/location"),
            json!({ "lat": 120.0, "lng": 77.5946 }),
            Some(&token_a),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/riders/{rider_a}/location"),
            json!({ "lat": 12.9716, "lng": 77.5946 }),
            Some(&token_a),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .oneshot(get_request(&format!("/riders/{rider_a}/location")))
        .await
        .unwrap();
    let body = body_json(res).await;
    assert_eq!(body["location"]["coords"]["lat"], 12.9716);
    assert_eq!(body["location"]["rider_id"], rider_a);
}
