//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Provides a thin wrapper around Actix sessions so handlers only deal with
//! domain-friendly operations such as persisting or retrieving a user id.
//! A cookie that cannot be decrypted yields an empty session, so tampered
//! cookies surface as `401 Unauthorized` like missing ones.
//!
//! Sessions live entirely in the encrypted cookie and the server keeps no
//! session records. Logging out therefore only tells the client to drop the
//! cookie. A copy captured before logout stays valid until the session key
//! is rotated, because the two-hour lifetime is enforced by the browser
//! through `Max-Age`.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated user's id in the session cookie.
    ///
    /// The session is renewed first so a pre-login cookie is never reused.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id.to_string())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Fetch the current user id from the session, if present.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let id = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        match id {
            Some(raw) => match UserId::new(raw) {
                Ok(id) => Ok(Some(id)),
                Err(error) => {
                    warn!("invalid user id in session cookie: {error}");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Require an authenticated user id or return `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Drop every session value and answer with an expired, empty cookie.
    ///
    /// Revocation is client-side only; see the module documentation.
    pub fn end(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

/// Authenticated user id extracted from the session.
///
/// Extraction fails with `401 Unauthorized` before any later extractor runs,
/// so an anonymous request with a malformed body is still rejected as
/// unauthenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser(pub UserId);

impl FromRequest for SessionUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = SessionContext::from_request(req, payload);
        Box::pin(async move {
            let session = fut.await?;
            Ok(Self(session.require_user_id()?))
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_session::Session;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    use super::*;
    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};

    const FIXTURE_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    fn session_test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(test_session_middleware())
            .route(
                "/set",
                web::get().to(|session: SessionContext| async move {
                    let id = UserId::new(FIXTURE_ID).expect("fixture id");
                    session.persist_user(&id)?;
                    Ok::<_, Error>(HttpResponse::Ok())
                }),
            )
            .route(
                "/set-invalid",
                web::get().to(|session: Session| async move {
                    session
                        .insert(USER_ID_KEY, "not-a-uuid")
                        .expect("set invalid user id");
                    HttpResponse::Ok()
                }),
            )
            .route(
                "/require",
                web::get().to(|session: SessionContext| async move {
                    let id = session.require_user_id()?;
                    Ok::<_, Error>(HttpResponse::Ok().body(id.to_string()))
                }),
            )
            .route(
                "/typed",
                web::post().to(
                    |SessionUser(id): SessionUser, body: web::Json<serde_json::Value>| async move {
                        HttpResponse::Ok().body(format!("{id}:{}", body.into_inner()))
                    },
                ),
            )
            .route(
                "/end",
                web::get().to(|session: SessionContext| async move {
                    session.end();
                    HttpResponse::NoContent()
                }),
            )
    }

    async fn require_with(cookie: Option<Cookie<'static>>) -> StatusCode {
        let app = test::init_service(session_test_app()).await;
        let mut req = test::TestRequest::get().uri("/require");
        if let Some(cookie) = cookie {
            req = req.cookie(cookie);
        }
        test::call_service(&app, req.to_request()).await.status()
    }

    #[actix_web::test]
    async fn round_trips_user_id() {
        let app = test::init_service(session_test_app()).await;
        let set_res =
            test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        assert_eq!(set_res.status(), StatusCode::OK);
        let cookie = session_cookie(&set_res);

        let get_res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/require")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(get_res.status(), StatusCode::OK);
        let body = test::read_body(get_res).await;
        assert_eq!(body, FIXTURE_ID);
    }

    #[actix_web::test]
    async fn missing_user_is_unauthorised() {
        assert_eq!(require_with(None).await, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn forged_cookie_is_unauthorised() {
        let forged = Cookie::new("session", "bm90LWEtcmVhbC1zZXNzaW9u");
        assert_eq!(require_with(Some(forged)).await, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn session_user_rejects_before_the_body_is_read() {
        let app = test::init_service(session_test_app()).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/typed")
                .insert_header(("content-type", "text/plain"))
                .set_payload("not json")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn session_user_yields_the_stored_id() {
        let app = test::init_service(session_test_app()).await;
        let set_res =
            test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        let cookie = session_cookie(&set_res);

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/typed")
                .cookie(cookie)
                .set_json(serde_json::json!(1))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = test::read_body(res).await;
        assert_eq!(body, format!("{FIXTURE_ID}:1"));
    }

    #[actix_web::test]
    async fn invalid_user_id_is_unauthorised() {
        let app = test::init_service(session_test_app()).await;
        let set_res = test::call_service(
            &app,
            test::TestRequest::get().uri("/set-invalid").to_request(),
        )
        .await;
        let cookie = session_cookie(&set_res);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/require")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn ending_the_session_expires_the_cookie() {
        let app = test::init_service(session_test_app()).await;
        let set_res =
            test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        let cookie = session_cookie(&set_res);

        let end_res = test::call_service(
            &app,
            test::TestRequest::get().uri("/end").cookie(cookie).to_request(),
        )
        .await;
        let removal = end_res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("removal cookie");
        assert_eq!(removal.value(), "");
    }
}
