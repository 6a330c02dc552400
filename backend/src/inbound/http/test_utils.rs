//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use mockable::DefaultClock;
use serde_json::{Value, json};

use super::routes::configure_api;
use super::state::{HttpState, HttpStatePorts};
use crate::domain::AccountService;
use crate::outbound::memory::InMemoryStore;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Extract the `session` cookie set by a response.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// HTTP state backed by a fresh in-memory store.
pub fn memory_state() -> (HttpState, InMemoryStore) {
    let store = InMemoryStore::new();
    let shared = Arc::new(store.clone());
    let ports = HttpStatePorts {
        login: Arc::new(AccountService::new(shared.clone())),
        users: shared.clone(),
        moods: shared.clone(),
        insights: shared.clone(),
        goals: shared.clone(),
        overview: shared.clone(),
        tenant_data: shared.clone(),
        notifications: shared.clone(),
        privacy: shared.clone(),
        support_groups: shared.clone(),
        therapists: shared,
        clock: Arc::new(DefaultClock),
    };
    (HttpState::new(ports), store)
}

/// App exposing the full `/api/v1` surface over `state`.
pub fn api_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .service(web::scope("/api/v1").configure(configure_api))
}

/// Register `email` with a fixed password and return the session cookie.
pub async fn signed_in(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    email: &str,
) -> Cookie<'static> {
    let request = test::TestRequest::post()
        .uri("/api/v1/register")
        .set_json(json!({
            "email": email,
            "displayName": "Test User",
            "password": "correct horse battery",
        }))
        .to_request();
    let response = test::call_service(app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED, "registration succeeds");
    session_cookie(&response)
}

/// Send a JSON request with the session cookie and decode the JSON body.
pub async fn call_json(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    request: test::TestRequest,
    cookie: &Cookie<'static>,
) -> (StatusCode, Value) {
    let response = test::call_service(app, request.cookie(cookie.clone()).to_request()).await;
    let status = response.status();
    let body = test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, value)
}
