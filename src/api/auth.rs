use std::sync::Arc;

use poem::web::cookie::CookieJar;
use poem::Request;
use poem_openapi::{payload::Json, OpenApi, Tags};

use crate::api::{clear_auth_cookies, cookie_value, establish_identity, set_auth_token_cookie,
    set_session_cookie, SESSION_COOKIE};
use crate::errors::api::auth::AuthError;
use crate::services::{AuthService, LoginOutcome, SessionContinuity};
use crate::types::dto::auth::{LoginRequest, LoginResponse, LogoutResponse, WhoAmIResponse};
use crate::types::internal::request_meta::RequestMeta;

/// Authentication API endpoints
pub struct AuthApi {
    auth_service: Arc<AuthService>,
    continuity: Arc<SessionContinuity>,
}

impl AuthApi {
    pub fn new(auth_service: Arc<AuthService>, continuity: Arc<SessionContinuity>) -> Self {
        Self {
            auth_service,
            continuity,
        }
    }
}

/// API tags for authentication endpoints
#[derive(Tags)]
enum AuthTags {
    /// Authentication endpoints
    Authentication,
}

#[OpenApi(prefix_path = "/auth")]
impl AuthApi {
    /// Login with username and password; establishes the session and the
    /// AuthToken continuity cookie
    #[oai(path = "/login", method = "post", tag = "AuthTags::Authentication")]
    async fn login(
        &self,
        req: &Request,
        jar: &CookieJar,
        body: Json<LoginRequest>,
    ) -> Result<Json<LoginResponse>, AuthError> {
        let meta = RequestMeta::from_request(req);
        let remember_me = body.remember_me.unwrap_or(false);

        let outcome = self
            .auth_service
            .login(&meta, &body.username, &body.password, remember_me)
            .await?;

        let established = match outcome {
            LoginOutcome::Success(established) => established,
            LoginOutcome::Locked => return Err(AuthError::account_locked()),
            LoginOutcome::InvalidCredentials => return Err(AuthError::invalid_credentials()),
        };

        set_session_cookie(jar, &established.session_id);
        set_auth_token_cookie(jar, &established.token, established.remember_me);

        Ok(Json(LoginResponse {
            username: established.username,
            role: established.role,
            member_id: established.member_id,
            expires_in: established.expires_in,
        }))
    }

    /// Destroy the session and drop both cookies
    #[oai(path = "/logout", method = "post", tag = "AuthTags::Authentication")]
    async fn logout(
        &self,
        req: &Request,
        jar: &CookieJar,
    ) -> Result<Json<LogoutResponse>, AuthError> {
        let meta = RequestMeta::from_request(req);
        let session_id = cookie_value(jar, SESSION_COOKIE);

        self.auth_service
            .logout(&meta, session_id.as_deref())
            .await;

        clear_auth_cookies(jar);

        Ok(Json(LogoutResponse {
            message: "Logged out successfully".to_string(),
        }))
    }

    /// Report the identity established for this request, hydrating the
    /// session from the AuthToken cookie when needed
    #[oai(path = "/whoami", method = "get", tag = "AuthTags::Authentication")]
    async fn whoami(&self, req: &Request, jar: &CookieJar) -> Json<WhoAmIResponse> {
        let (_meta, continuity) = establish_identity(req, jar, &self.continuity).await;

        match continuity.session.filter(|s| s.is_authenticated()) {
            Some(session) => Json(WhoAmIResponse {
                logged_in: true,
                username: Some(session.username),
                role: Some(session.role),
                member_id: Some(session.member_id),
                company_id: session.company_id,
            }),
            None => Json(WhoAmIResponse {
                logged_in: false,
                username: None,
                role: None,
                member_id: None,
                company_id: None,
            }),
        }
    }
}
