//! End-to-end tests for the flats and users APIs.
//!
//! These exercise the full router against a live document store and skip
//! when none is reachable.

use anyhow::Result;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use serde_json::{Value, json};
use tower::ServiceExt;

use flatmatch::server::{AppState, create_app};

#[path = "test_utils/mod.rs"]
mod test_utils;
use test_utils::{setup_test_db, teardown_test_db};

fn app_for(db: &mongodb::Database) -> Router {
    create_app(AppState { db: db.clone() })
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Value) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn send(app: &Router, method: &str, uri: &str) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("response body is JSON")
}

#[tokio::test]
async fn flat_crud_roundtrip() -> Result<()> {
    let Some(db) = setup_test_db().await? else {
        return Ok(());
    };
    let app = app_for(&db);

    // Create
    let response = send_json(
        &app,
        "POST",
        "/flats",
        json!({
            "title": "Sunny loft",
            "location": "Berlin",
            "price": 1200.0,
            "amenities": ["wifi", "balcony"]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["_id"].as_str().expect("assigned id").to_string();
    assert_eq!(created["title"], "Sunny loft");

    // Read back
    let response = send(&app, "GET", &format!("/flats/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert_eq!(fetched["location"], "Berlin");
    assert_eq!(fetched["amenities"], json!(["wifi", "balcony"]));

    // Listed
    let response = send(&app, "GET", "/flats").await;
    assert_eq!(response.status(), StatusCode::OK);
    let all = body_json(response).await;
    assert_eq!(all.as_array().unwrap().len(), 1);

    // Partial update leaves untouched fields alone
    let response = send_json(
        &app,
        "PUT",
        &format!("/flats/{id}"),
        json!({ "price": 1350.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["price"], 1350.0);
    assert_eq!(updated["title"], "Sunny loft");
    assert_eq!(updated["amenities"], json!(["wifi", "balcony"]));

    // Delete
    let response = send(&app, "DELETE", &format!("/flats/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let confirmation = body_json(response).await;
    assert_eq!(confirmation["message"], "Flat deleted successfully");

    // Gone
    let response = send(&app, "GET", &format!("/flats/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error = body_json(response).await;
    assert_eq!(error["error"], "Flat not found");

    teardown_test_db(db).await;
    Ok(())
}

#[tokio::test]
async fn flat_filter_combines_conditions() -> Result<()> {
    let Some(db) = setup_test_db().await? else {
        return Ok(());
    };
    let app = app_for(&db);

    for flat in [
        json!({ "title": "A", "location": "Kreuzberg, Berlin", "price": 900.0, "amenities": ["wifi"] }),
        json!({ "title": "B", "location": "Mitte, Berlin", "price": 1500.0, "amenities": ["wifi", "garage"] }),
        json!({ "title": "C", "location": "Hamburg", "price": 1000.0, "amenities": ["wifi"] }),
    ] {
        let response = send_json(&app, "POST", "/flats", flat).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    // Case-insensitive substring on location
    let response = send(&app, "GET", "/flats/filter?location=berlin").await;
    assert_eq!(response.status(), StatusCode::OK);
    let matched = body_json(response).await;
    assert_eq!(matched.as_array().unwrap().len(), 2);

    // Price band narrows further
    let response = send(&app, "GET", "/flats/filter?location=berlin&maxPrice=1000").await;
    let matched = body_json(response).await;
    assert_eq!(matched.as_array().unwrap().len(), 1);
    assert_eq!(matched[0]["title"], "A");

    // Amenities require every listed value
    let response = send(&app, "GET", "/flats/filter?amenities=wifi,garage").await;
    let matched = body_json(response).await;
    assert_eq!(matched.as_array().unwrap().len(), 1);
    assert_eq!(matched[0]["title"], "B");

    // No parameters matches everything
    let response = send(&app, "GET", "/flats/filter").await;
    let matched = body_json(response).await;
    assert_eq!(matched.as_array().unwrap().len(), 3);

    teardown_test_db(db).await;
    Ok(())
}

#[tokio::test]
async fn flat_partial_update_retains_every_other_field() -> Result<()> {
    let Some(db) = setup_test_db().await? else {
        return Ok(());
    };
    let app = app_for(&db);

    let response = send_json(
        &app,
        "POST",
        "/flats",
        json!({
            "title": "Canal view",
            "description": "Two rooms over the canal",
            "location": "Amsterdam",
            "price": 1400.0,
            "landlordId": "landlord-1",
            "managerId": "manager-1",
            "tenantIds": ["tenant-1", "tenant-2"],
            "preferences": ["non-smoker"],
            "amenities": ["wifi", "dishwasher"],
            "availableFrom": "2026-09-01T00:00:00Z"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["_id"].as_str().unwrap().to_string();

    let response = send_json(
        &app,
        "PUT",
        &format!("/flats/{id}"),
        json!({ "price": 1500.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;

    assert_eq!(updated["price"], 1500.0);
    assert_eq!(updated["title"], "Canal view");
    assert_eq!(updated["description"], "Two rooms over the canal");
    assert_eq!(updated["location"], "Amsterdam");
    assert_eq!(updated["landlordId"], "landlord-1");
    assert_eq!(updated["managerId"], "manager-1");
    assert_eq!(updated["tenantIds"], json!(["tenant-1", "tenant-2"]));
    assert_eq!(updated["preferences"], json!(["non-smoker"]));
    assert_eq!(updated["amenities"], json!(["wifi", "dishwasher"]));
    assert_eq!(updated["availableFrom"], "2026-09-01T00:00:00Z");

    teardown_test_db(db).await;
    Ok(())
}

#[tokio::test]
async fn user_partial_update_retains_every_other_field() -> Result<()> {
    let Some(db) = setup_test_db().await? else {
        return Ok(());
    };
    let app = app_for(&db);

    let response = send_json(
        &app,
        "POST",
        "/api/users",
        json!({
            "userId": "u-9",
            "username": "maxine",
            "name": "Maxine",
            "email": "maxine@example.com",
            "location": "Berlin",
            "lifestyle": ["quiet", "vegan"],
            "preferences": ["pets"],
            "budget": 700.0,
            "gender": "female"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send_json(
        &app,
        "PUT",
        "/api/users/u-9",
        json!({ "location": "Hamburg" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;

    assert_eq!(updated["location"], "Hamburg");
    assert_eq!(updated["userId"], "u-9");
    assert_eq!(updated["username"], "maxine");
    assert_eq!(updated["name"], "Maxine");
    assert_eq!(updated["email"], "maxine@example.com");
    assert_eq!(updated["lifestyle"], json!(["quiet", "vegan"]));
    assert_eq!(updated["preferences"], json!(["pets"]));
    assert_eq!(updated["budget"], 700.0);
    assert_eq!(updated["gender"], "female");

    teardown_test_db(db).await;
    Ok(())
}

#[tokio::test]
async fn user_creation_rejects_duplicate_user_id() -> Result<()> {
    let Some(db) = setup_test_db().await? else {
        return Ok(());
    };
    let app = app_for(&db);

    let user = json!({ "userId": "u-1", "username": "ada", "name": "Ada" });
    let response = send_json(&app, "POST", "/api/users", user.clone()).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send_json(&app, "POST", "/api/users", user).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = body_json(response).await;
    assert!(error["error"].as_str().unwrap().contains("u-1"));

    teardown_test_db(db).await;
    Ok(())
}

#[tokio::test]
async fn user_lookup_accepts_either_key() -> Result<()> {
    let Some(db) = setup_test_db().await? else {
        return Ok(());
    };
    let app = app_for(&db);

    let response = send_json(
        &app,
        "POST",
        "/api/users",
        json!({ "userId": "u-7", "username": "grace", "name": "Grace" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let internal_id = created["_id"].as_str().unwrap().to_string();

    // Fetch by external key
    let response = send(&app, "GET", "/api/users/u-7").await;
    assert_eq!(response.status(), StatusCode::OK);

    // Fetch by internal id
    let response = send(&app, "GET", &format!("/api/users/{internal_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Update through the external key
    let response = send_json(
        &app,
        "PUT",
        "/api/users/u-7",
        json!({ "location": "London" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["location"], "London");
    assert_eq!(updated["username"], "grace");

    // Delete an unknown key
    let response = send(&app, "DELETE", "/api/users/u-unknown").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error = body_json(response).await;
    assert_eq!(error["error"], "User not found");

    teardown_test_db(db).await;
    Ok(())
}

#[tokio::test]
async fn user_filter_match_mode_switches_semantics() -> Result<()> {
    let Some(db) = setup_test_db().await? else {
        return Ok(());
    };
    let app = app_for(&db);

    for user in [
        json!({ "userId": "u-1", "username": "a", "lifestyle": ["quiet", "tidy"] }),
        json!({ "userId": "u-2", "username": "b", "lifestyle": ["quiet"] }),
        json!({ "userId": "u-3", "username": "c", "lifestyle": ["social"] }),
    ] {
        let response = send_json(&app, "POST", "/api/users", user).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    // Default mode matches any listed value
    let response = send(&app, "GET", "/api/users?lifestyle=quiet,social").await;
    let matched = body_json(response).await;
    assert_eq!(matched.as_array().unwrap().len(), 3);

    // "all" requires every listed value
    let response = send(&app, "GET", "/api/users?lifestyle=quiet,tidy&matchMode=all").await;
    let matched = body_json(response).await;
    assert_eq!(matched.as_array().unwrap().len(), 1);
    assert_eq!(matched[0]["userId"], "u-1");

    // Unrecognised mode falls back to any
    let response = send(&app, "GET", "/api/users?lifestyle=quiet&matchMode=bogus").await;
    let matched = body_json(response).await;
    assert_eq!(matched.as_array().unwrap().len(), 2);

    teardown_test_db(db).await;
    Ok(())
}

#[tokio::test]
async fn username_search_is_substring_and_404s_on_miss() -> Result<()> {
    let Some(db) = setup_test_db().await? else {
        return Ok(());
    };
    let app = app_for(&db);

    for user in [
        json!({ "userId": "u-1", "username": "Alice_W" }),
        json!({ "userId": "u-2", "username": "malice" }),
        json!({ "userId": "u-3", "username": "bob" }),
    ] {
        let response = send_json(&app, "POST", "/api/users", user).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = send(&app, "GET", "/api/users/search?username=alice").await;
    assert_eq!(response.status(), StatusCode::OK);
    let matched = body_json(response).await;
    assert_eq!(matched.as_array().unwrap().len(), 2);

    let response = send(&app, "GET", "/api/users/search?username=zzz").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error = body_json(response).await;
    assert_eq!(error["error"], "No users found");

    teardown_test_db(db).await;
    Ok(())
}
