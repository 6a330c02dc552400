//! In-process HTTP harness over the in-memory adapter.

use std::sync::Arc;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use mindtrack::Trace;
use mindtrack::domain::AccountService;
use mindtrack::inbound::http::routes::configure_api;
use mindtrack::inbound::http::state::{HttpState, HttpStatePorts};
use mindtrack::outbound::memory::InMemoryStore;
use mockable::DefaultClock;
use serde_json::{Value, json};

pub const PASSWORD: &str = "correct horse battery";

fn memory_state() -> HttpState {
    let store = Arc::new(InMemoryStore::new());
    HttpState::new(HttpStatePorts {
        login: Arc::new(AccountService::new(store.clone())),
        users: store.clone(),
        moods: store.clone(),
        insights: store.clone(),
        goals: store.clone(),
        overview: store.clone(),
        tenant_data: store.clone(),
        notifications: store.clone(),
        privacy: store.clone(),
        support_groups: store.clone(),
        therapists: store,
        clock: Arc::new(DefaultClock),
    })
}

/// Initialise the full `/api/v1` surface with tracing and sessions.
pub async fn init_app()
-> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build();
    test::init_service(
        App::new()
            .app_data(web::Data::new(memory_state()))
            .wrap(Trace)
            .service(web::scope("/api/v1").wrap(session).configure(configure_api)),
    )
    .await
}

/// The `session` cookie set on `response`, if any.
pub fn session_cookie(response: &ServiceResponse) -> Option<Cookie<'static>> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

/// Register an account and return its session cookie.
pub async fn register(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    email: &str,
) -> Cookie<'static> {
    let response = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(json!({
                "email": email,
                "displayName": "Journey User",
                "password": PASSWORD,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED, "register {email}");
    session_cookie(&response).expect("session cookie")
}

/// Send `request`, optionally with a session, and decode any JSON body.
pub async fn send(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    request: test::TestRequest,
    cookie: Option<&Cookie<'static>>,
) -> (StatusCode, Value) {
    let request = match cookie {
        Some(cookie) => request.cookie(cookie.clone()),
        None => request,
    };
    let response = test::call_service(app, request.to_request()).await;
    let status = response.status();
    let body = test::read_body(response).await;
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}
