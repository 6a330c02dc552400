//! Account API handlers.
//!
//! ```text
//! POST /api/v1/register {"email":"alice@example.com","displayName":"Alice","password":"..."}
//! POST /api/v1/login {"email":"alice@example.com","password":"..."}
//! POST /api/v1/logout
//! GET /api/v1/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{
    CredentialsValidationError, Error, LoginCredentials, Registration, User, UserValidationError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::Envelope;
use crate::inbound::http::schemas::{ErrorSchema, UserSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{ErrorCode, FieldName, field_error};

/// Registration request body for `POST /api/v1/register`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "Alice")]
    pub display_name: String,
    /// 8 to 128 characters.
    pub password: String,
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = CredentialsValidationError;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.display_name, &value.password)
    }
}

/// Login request body for `POST /api/v1/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "alice@example.com")]
    pub email: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = CredentialsValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

fn user_field_code(err: &UserValidationError) -> ErrorCode {
    match err {
        UserValidationError::EmptyId
        | UserValidationError::EmptyEmail
        | UserValidationError::EmptyDisplayName => ErrorCode::Empty,
        UserValidationError::EmailTooLong { .. }
        | UserValidationError::DisplayNameTooLong { .. } => ErrorCode::TooLong,
        UserValidationError::InvalidId | UserValidationError::InvalidEmail => {
            ErrorCode::InvalidFormat
        }
    }
}

fn map_credentials_error(err: &CredentialsValidationError) -> Error {
    let message = err.to_string();
    match err {
        CredentialsValidationError::Email(inner) => {
            field_error(FieldName::new("email"), user_field_code(inner), message)
        }
        CredentialsValidationError::DisplayName(inner) => {
            field_error(FieldName::new("displayName"), user_field_code(inner), message)
        }
        CredentialsValidationError::EmptyPassword => {
            field_error(FieldName::new("password"), ErrorCode::Empty, message)
        }
        CredentialsValidationError::PasswordLength { .. } => {
            field_error(FieldName::new("password"), ErrorCode::OutOfRange, message)
        }
    }
}

/// Create an account and sign the new user in.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = Envelope<UserSchema>,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration =
        Registration::try_from(payload.into_inner()).map_err(|err| map_credentials_error(&err))?;
    let user = state.login.register(&registration).await?;
    session.persist_user(user.id())?;
    Ok(HttpResponse::Created().json(Envelope { data: user }))
}

/// Authenticate a user and establish a session.
///
/// Unknown emails and wrong passwords produce the same `401` response.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = Envelope<UserSchema>,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<Envelope<User>>> {
    let credentials = LoginCredentials::try_from(payload.into_inner())
        .map_err(|err| map_credentials_error(&err))?;
    let user_id = state.login.authenticate(&credentials).await?;
    let user = state
        .users
        .find_by_id(&user_id)
        .await?
        .ok_or_else(|| Error::unauthorized("invalid email or password"))?;
    session.persist_user(&user_id)?;
    info!(user_id = %user_id, "user signed in");
    Ok(Envelope::json(user))
}

/// End the current session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses(
        (status = 204, description = "Session ended"),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    session.end();
    info!(user_id = %user_id, "user signed out");
    Ok(HttpResponse::NoContent().finish())
}

/// Fetch the signed-in user's profile.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Current user", body = Envelope<UserSchema>),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "currentUser"
)]
#[get("/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Envelope<User>>> {
    let user_id = session.require_user_id()?;
    match state.users.find_by_id(&user_id).await? {
        Some(user) => Ok(Envelope::json(user)),
        None => {
            // The account behind this cookie no longer exists.
            session.end();
            Err(Error::unauthorized("login required"))
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::inbound::http::test_utils::{api_app, call_json, memory_state, signed_in};

    #[rstest]
    #[case(json!({"email": "nope", "displayName": "A", "password": "longenough"}), "email", "invalid_format")]
    #[case(json!({"email": "a@example.com", "displayName": "  ", "password": "longenough"}), "displayName", "empty")]
    #[case(json!({"email": "a@example.com", "displayName": "A", "password": "short"}), "password", "out_of_range")]
    #[actix_web::test]
    async fn register_rejects_invalid_input(
        #[case] body: Value,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let (state, _) = memory_state();
        let app = test::init_service(api_app(state)).await;
        let request = test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(body)
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let value: Value = test::read_body_json(response).await;
        assert_eq!(value["code"], "invalid_request");
        assert_eq!(value["details"]["field"], field);
        assert_eq!(value["details"]["code"], code);
    }

    #[actix_web::test]
    async fn duplicate_registration_conflicts() {
        let (state, _) = memory_state();
        let app = test::init_service(api_app(state)).await;
        signed_in(&app, "alice@example.com").await;

        let request = test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(json!({
                "email": "Alice@Example.com",
                "displayName": "Alice again",
                "password": "another password",
            }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn login_then_me_returns_profile() {
        let (state, _) = memory_state();
        let app = test::init_service(api_app(state)).await;
        signed_in(&app, "bob@example.com").await;

        let login = test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({"email": "bob@example.com", "password": "correct horse battery"}))
            .to_request();
        let response = test::call_service(&app, login).await;
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = crate::inbound::http::test_utils::session_cookie(&response);

        let (status, body) =
            call_json(&app, test::TestRequest::get().uri("/api/v1/me"), &cookie).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["email"], "bob@example.com");
        assert_eq!(body["data"]["displayName"], "Test User");
    }

    #[actix_web::test]
    async fn wrong_password_is_unauthorised() {
        let (state, _) = memory_state();
        let app = test::init_service(api_app(state)).await;
        signed_in(&app, "carol@example.com").await;

        let login = test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({"email": "carol@example.com", "password": "wrong password"}))
            .to_request();
        let response = test::call_service(&app, login).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn logout_clears_the_session() {
        let (state, _) = memory_state();
        let app = test::init_service(api_app(state)).await;
        let cookie = signed_in(&app, "dave@example.com").await;

        let response = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/logout")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let cleared = crate::inbound::http::test_utils::session_cookie(&response);

        let (status, _) =
            call_json(&app, test::TestRequest::get().uri("/api/v1/me"), &cleared).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
