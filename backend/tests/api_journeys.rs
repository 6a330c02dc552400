//! End-to-end journeys through the REST surface with two tenants.

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{Value, json};

#[path = "support/http.rs"]
mod http;

use http::{PASSWORD, init_app, register, send};

fn data(body: &Value) -> &Value {
    body.get("data").expect("data envelope")
}

fn len(body: &Value) -> usize {
    data(body).as_array().map_or(0, Vec::len)
}

#[actix_web::test]
async fn two_tenants_never_see_each_others_rows() {
    let app = init_app().await;
    let alice = register(&app, "alice@example.com").await;
    let bob = register(&app, "bob@example.com").await;

    for (day, score) in [(1, 8), (2, 7), (3, 9)] {
        let (status, _) = send(
            &app,
            test::TestRequest::post().uri("/api/v1/mood").set_json(json!({
                "score": score,
                "notes": "alice",
                "recordedAt": format!("2024-03-0{day}T08:00:00Z"),
            })),
            Some(&alice),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/mood")
            .set_json(json!({ "score": 5, "notes": "bob" })),
        Some(&bob),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, created) = send(
        &app,
        test::TestRequest::post().uri("/api/v1/goals").set_json(json!({
            "title": "Meditate daily",
            "category": "mindfulness",
            "targetDate": "2999-12-31",
        })),
        Some(&alice),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let alice_goal = data(&created)
        .get("id")
        .and_then(Value::as_str)
        .expect("goal id")
        .to_owned();

    let (_, alice_moods) = send(&app, test::TestRequest::get().uri("/api/v1/mood"), Some(&alice)).await;
    let (_, bob_moods) = send(&app, test::TestRequest::get().uri("/api/v1/mood"), Some(&bob)).await;
    assert_eq!(len(&alice_moods), 3);
    assert_eq!(len(&bob_moods), 1);
    assert_eq!(
        data(&bob_moods)[0].get("notes").and_then(Value::as_str),
        Some("bob")
    );

    let (_, bob_goals) = send(&app, test::TestRequest::get().uri("/api/v1/goals"), Some(&bob)).await;
    assert_eq!(len(&bob_goals), 0);

    let (status, _) = send(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/goals/{alice_goal}/progress"))
            .set_json(json!({ "progress": 100 })),
        Some(&bob),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, overview) = send(&app, test::TestRequest::get().uri("/api/v1/overview"), Some(&alice)).await;
    let overview = data(&overview);
    assert_eq!(overview.get("moodEntryCount"), Some(&json!(3)));
    assert_eq!(overview.get("goalCount"), Some(&json!(1)));
    assert_eq!(
        overview
            .get("latestMood")
            .and_then(|mood| mood.get("score")),
        Some(&json!(9))
    );

    let (status, export) = send(
        &app,
        test::TestRequest::get().uri("/api/v1/privacy/export"),
        Some(&bob),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let export = data(&export);
    assert_eq!(export.get("moodEntries").and_then(Value::as_array).map(Vec::len), Some(1));
    assert_eq!(export.get("goals").and_then(Value::as_array).map(Vec::len), Some(0));
}

#[actix_web::test]
async fn erasure_removes_rows_but_keeps_the_account() {
    let app = init_app().await;
    let carol = register(&app, "carol@example.com").await;
    let dave = register(&app, "dave@example.com").await;
    for cookie in [&carol, &dave] {
        let (status, _) = send(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/mood")
                .set_json(json!({ "score": 6 })),
            Some(cookie),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, erased) = send(
        &app,
        test::TestRequest::delete().uri("/api/v1/privacy/data"),
        Some(&carol),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(data(&erased).get("moodEntries"), Some(&json!(1)));

    let (status, again) = send(
        &app,
        test::TestRequest::delete().uri("/api/v1/privacy/data"),
        Some(&carol),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(data(&again).get("moodEntries"), Some(&json!(0)));

    let (_, dave_moods) = send(&app, test::TestRequest::get().uri("/api/v1/mood"), Some(&dave)).await;
    assert_eq!(len(&dave_moods), 1);

    let (status, _) = send(
        &app,
        test::TestRequest::post().uri("/api/v1/login").set_json(json!({
            "email": "carol@example.com",
            "password": PASSWORD,
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn responses_carry_a_trace_id() {
    let app = init_app().await;
    let response = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/me").to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key("trace-id"));
}
