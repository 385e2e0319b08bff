// API layer - HTTP endpoints
pub mod admin;
pub mod auth;
pub mod health;

pub use admin::AdminApi;
pub use auth::AuthApi;
pub use health::HealthApi;

use poem::web::cookie::{Cookie, CookieJar};
use poem::Request;

use crate::services::session_continuity::{Continuity, SessionContinuity};
use crate::services::token_service::REMEMBER_ME_TTL_SECS;
use crate::types::internal::request_meta::RequestMeta;

/// Session id cookie presented by browser clients
pub const SESSION_COOKIE: &str = "SessionId";

/// Signed credential cookie used for continuity across sessions
pub const AUTH_TOKEN_COOKIE: &str = "AuthToken";

pub(crate) fn cookie_value(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name).map(|cookie| cookie.value_str().to_string())
}

pub(crate) fn set_session_cookie(jar: &CookieJar, session_id: &str) {
    let mut cookie = Cookie::new_with_str(SESSION_COOKIE, session_id);
    cookie.set_path("/");
    cookie.set_http_only(true);
    jar.add(cookie);
}

/// The token cookie is persistent only for remember-me logins; otherwise it
/// lives as long as the browser session, matching the token's own 2h expiry
/// handling
pub(crate) fn set_auth_token_cookie(jar: &CookieJar, token: &str, remember_me: bool) {
    let mut cookie = Cookie::new_with_str(AUTH_TOKEN_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    if remember_me {
        cookie.set_max_age(std::time::Duration::from_secs(REMEMBER_ME_TTL_SECS as u64));
    }
    jar.add(cookie);
}

pub(crate) fn clear_auth_cookies(jar: &CookieJar) {
    jar.remove(SESSION_COOKIE);
    jar.remove(AUTH_TOKEN_COOKIE);
}

/// Apply the cookie effects decided by session continuity: drop a rejected
/// token, present a newly hydrated session id
pub(crate) fn apply_continuity_cookies(
    jar: &CookieJar,
    continuity: &Continuity,
    presented_session_id: Option<&str>,
) {
    if continuity.discard_token {
        jar.remove(AUTH_TOKEN_COOKIE);
    }

    if let Some(new_id) = &continuity.session_id {
        if presented_session_id != Some(new_id.as_str()) {
            set_session_cookie(jar, new_id);
        }
    }
}

/// Run session continuity for one request.
///
/// Called at the top of every endpoint, before any authorization check, so
/// hydration always precedes the gate.
pub(crate) async fn establish_identity(
    req: &Request,
    jar: &CookieJar,
    continuity: &SessionContinuity,
) -> (RequestMeta, Continuity) {
    let meta = RequestMeta::from_request(req);
    let session_id = cookie_value(jar, SESSION_COOKIE);
    let token = cookie_value(jar, AUTH_TOKEN_COOKIE);

    let result = continuity
        .establish(session_id.as_deref(), token.as_deref(), &meta)
        .await;

    apply_continuity_cookies(jar, &result, session_id.as_deref());

    (meta, result)
}
