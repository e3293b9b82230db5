// HTTP-level integration tests against an in-memory store

use actix_web::{middleware, test, web, App};
use serde_json::{json, Value};
use std::sync::Arc;

use matchmaker_api::config::PaginationSettings;
use matchmaker_api::routes::{self, AppState};
use matchmaker_api::services::UserStore;

async fn app_state() -> AppState {
    let store = UserStore::new("sqlite::memory:", 1, 1)
        .await
        .expect("in-memory store");

    AppState {
        store: Arc::new(store),
        pagination: PaginationSettings::default(),
    }
}

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .wrap(middleware::NormalizePath::trim())
                .configure(routes::configure_routes),
        )
        .await
    };
}

fn user_payload(name: &str, age: i64, gender: &str, email: &str, interests: Vec<&str>) -> Value {
    json!({
        "name": name,
        "age": age,
        "gender": gender,
        "email": email,
        "city": "Berlin",
        "interests": interests,
    })
}

#[actix_web::test]
async fn test_create_then_get_round_trip() {
    let app = test_app!(app_state().await);

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(user_payload("Ada", 30, "female", "ada@example.com", vec!["chess", "hiking"]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let created: Value = test::read_body_json(resp).await;
    let id = created["id"].as_i64().unwrap();

    let req = test::TestRequest::get().uri(&format!("/users/{}", id)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let fetched: Value = test::read_body_json(resp).await;
    assert_eq!(fetched["name"], "Ada");
    assert_eq!(fetched["age"], 30);
    assert_eq!(fetched["gender"], "female");
    assert_eq!(fetched["email"], "ada@example.com");
    assert_eq!(fetched["city"], "Berlin");
    assert_eq!(fetched["interests"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn test_trailing_slash_paths_accepted() {
    let app = test_app!(app_state().await);

    let req = test::TestRequest::post()
        .uri("/users/")
        .set_json(user_payload("Ada", 30, "female", "ada@example.com", vec![]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let req = test::TestRequest::get().uri("/users/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}

#[actix_web::test]
async fn test_duplicate_email_rejected() {
    let app = test_app!(app_state().await);

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(user_payload("Ada", 30, "female", "ada@example.com", vec![]))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 201);

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(user_payload("Eve", 25, "female", "ada@example.com", vec![]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "email_taken");
}

#[actix_web::test]
async fn test_age_boundaries() {
    let app = test_app!(app_state().await);

    for (age, expected) in [(17, 400), (100, 400), (18, 201), (99, 201)] {
        let email = format!("age{}@example.com", age);
        let req = test::TestRequest::post()
            .uri("/users")
            .set_json(user_payload("Test", age, "other", &email, vec![]))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected, "age {} should yield {}", age, expected);
    }
}

#[actix_web::test]
async fn test_gender_normalization_and_rejection() {
    let app = test_app!(app_state().await);

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(user_payload("Ada", 30, "MALE", "ada@example.com", vec![]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["gender"], "male");

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(user_payload("Eve", 30, "x", "eve@example.com", vec![]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_interest_names_case_normalized_and_shared() {
    let app = test_app!(app_state().await);

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(user_payload("Ada", 30, "female", "ada@example.com", vec!["Hiking"]))
        .to_request();
    let ada: Value = test::read_body_json(test::call_service(&app, req).await).await;

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(user_payload("Bob", 32, "male", "bob@example.com", vec!["hiking"]))
        .to_request();
    let bob: Value = test::read_body_json(test::call_service(&app, req).await).await;

    assert_eq!(ada["interests"][0]["name"], "hiking");
    assert_eq!(ada["interests"][0]["id"], bob["interests"][0]["id"]);
}

#[actix_web::test]
async fn test_matches_gender_rule_and_ranking() {
    let app = test_app!(app_state().await);

    let subject_payload = json!({
        "name": "Subject",
        "age": 30,
        "gender": "male",
        "email": "subject@example.com",
        "city": "Berlin",
        "interests": ["reading", "travel", "music"],
    });
    let req = test::TestRequest::post().uri("/users").set_json(subject_payload).to_request();
    let subject: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let subject_id = subject["id"].as_i64().unwrap();

    // F1: shares two interests, F2: shares one, M1: wrong gender
    for payload in [
        user_payload("F1", 28, "female", "f1@example.com", vec!["reading", "travel"]),
        user_payload("F2", 35, "female", "f2@example.com", vec!["reading"]),
        user_payload("M1", 29, "male", "m1@example.com", vec!["reading", "travel", "music"]),
    ] {
        let req = test::TestRequest::post().uri("/users").set_json(payload).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 201);
    }

    let req = test::TestRequest::get()
        .uri(&format!("/users/{}/matches", subject_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["match_count"], 2);

    let matches = body["matches"].as_array().unwrap();
    assert_eq!(matches[0]["name"], "F1");
    assert_eq!(matches[1]["name"], "F2");
}

#[actix_web::test]
async fn test_matches_age_bounds_inclusive() {
    let app = test_app!(app_state().await);

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(user_payload("Subject", 30, "female", "subject@example.com", vec![]))
        .to_request();
    let subject: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let subject_id = subject["id"].as_i64().unwrap();

    for (name, age, email) in [
        ("AtMin", 25, "atmin@example.com"),
        ("AtMax", 40, "atmax@example.com"),
        ("Below", 24, "below@example.com"),
        ("Above", 41, "above@example.com"),
    ] {
        let req = test::TestRequest::post()
            .uri("/users")
            .set_json(user_payload(name, age, "male", email, vec![]))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 201);
    }

    let req = test::TestRequest::get()
        .uri(&format!("/users/{}/matches?min_age=25&max_age=40", subject_id))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;

    assert_eq!(body["match_count"], 2);
    let names: Vec<&str> = body["matches"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"AtMin"));
    assert!(names.contains(&"AtMax"));
}

#[actix_web::test]
async fn test_matches_for_missing_subject() {
    let app = test_app!(app_state().await);

    let req = test::TestRequest::get().uri("/users/999/matches").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn test_partial_update() {
    let app = test_app!(app_state().await);

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(user_payload("Ada", 30, "female", "ada@example.com", vec!["chess"]))
        .to_request();
    let created: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let id = created["id"].as_i64().unwrap();

    // Null fields are skipped, supplied fields applied
    let req = test::TestRequest::put()
        .uri(&format!("/users/{}", id))
        .set_json(json!({"city": "Paris", "age": null}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let updated: Value = test::read_body_json(resp).await;
    assert_eq!(updated["city"], "Paris");
    assert_eq!(updated["age"], 30);
    assert_eq!(updated["name"], "Ada");
    assert_eq!(updated["interests"][0]["name"], "chess");
}

#[actix_web::test]
async fn test_update_email_conflict_and_missing_user() {
    let app = test_app!(app_state().await);

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(user_payload("Ada", 30, "female", "ada@example.com", vec![]))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 201);

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(user_payload("Bob", 32, "male", "bob@example.com", vec![]))
        .to_request();
    let bob: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let bob_id = bob["id"].as_i64().unwrap();

    let req = test::TestRequest::put()
        .uri(&format!("/users/{}", bob_id))
        .set_json(json!({"email": "ada@example.com"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);

    let req = test::TestRequest::put()
        .uri("/users/999")
        .set_json(json!({"city": "Paris"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);
}

#[actix_web::test]
async fn test_delete_user_semantics() {
    let app = test_app!(app_state().await);

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(user_payload("Ada", 30, "female", "ada@example.com", vec!["hiking"]))
        .to_request();
    let ada: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let ada_id = ada["id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(user_payload("Bob", 32, "male", "bob@example.com", vec!["hiking"]))
        .to_request();
    let bob: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let bob_id = bob["id"].as_i64().unwrap();

    let req = test::TestRequest::delete().uri(&format!("/users/{}", ada_id)).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 204);

    // Gone from get
    let req = test::TestRequest::get().uri(&format!("/users/{}", ada_id)).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);

    // Gone from Bob's candidate pool
    let req = test::TestRequest::get().uri(&format!("/users/{}/matches", bob_id)).to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["match_count"], 0);

    // Shared interest row survives on Bob's profile
    let req = test::TestRequest::get().uri(&format!("/users/{}", bob_id)).to_request();
    let bob_after: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(bob_after["interests"][0]["name"], "hiking");

    // Deleting again is a 404
    let req = test::TestRequest::delete().uri(&format!("/users/{}", ada_id)).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);
}

#[actix_web::test]
async fn test_list_users_offset_and_limit() {
    let app = test_app!(app_state().await);

    for i in 0..4 {
        let req = test::TestRequest::post()
            .uri("/users")
            .set_json(user_payload(
                &format!("User{}", i),
                20 + i,
                "other",
                &format!("user{}@example.com", i),
                vec![],
            ))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 201);
    }

    let req = test::TestRequest::get().uri("/users?offset=1&limit=2").to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;

    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["name"], "User1");
    assert_eq!(users[1]["name"], "User2");
}

#[actix_web::test]
async fn test_welcome_and_health() {
    let app = test_app!(app_state().await);

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Welcome to the Matchmaker API");

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn test_malformed_json_is_a_400() {
    let app = test_app!(app_state().await);

    let req = test::TestRequest::post()
        .uri("/users")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}
