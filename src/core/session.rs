use std::convert::Infallible;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderValue;
use axum::response::{IntoResponseParts, ResponseParts};
use cookie::{Cookie, CookieJar, Key, SameSite};
use serde::{Deserialize, Serialize};

pub(crate) const SESSION_COOKIE: &str = "session";

#[derive(Clone)]
pub(crate) struct SessionConfig {
    key: Key,
    secure: bool,
}

impl SessionConfig {
    /// Derives the signing key from `secret`, which must be at least 32 bytes.
    pub(crate) fn new(secret: &[u8], secure: bool) -> Self {
        Self {
            key: Key::derive_from(secret),
            secure,
        }
    }
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secure", &self.secure)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    flashes: Vec<String>,
}

impl SessionData {
    fn is_empty(&self) -> bool {
        self.username.is_none() && self.flashes.is_empty()
    }
}

/// The browser session carried in the signed `session` cookie.
///
/// Holds at most one identity claim and a queue of flash messages. Returning
/// the session as part of a response writes it back if it changed.
#[derive(Debug)]
pub(crate) struct Session {
    data: SessionData,
    changed: bool,
    config: SessionConfig,
}

impl Session {
    pub(crate) fn username(&self) -> Option<&str> {
        self.data.username.as_deref()
    }

    pub(crate) fn log_in(&mut self, username: &str) {
        self.data.username = Some(username.to_owned());
        self.changed = true;
    }

    pub(crate) fn log_out(&mut self) {
        self.data.username = None;
        self.changed = true;
    }

    pub(crate) fn flash(&mut self, message: impl Into<String>) {
        self.data.flashes.push(message.into());
        self.changed = true;
    }

    /// Removes queued flash messages so they are shown exactly once.
    pub(crate) fn take_flashes(&mut self) -> Vec<String> {
        if !self.data.flashes.is_empty() {
            self.changed = true;
        }
        std::mem::take(&mut self.data.flashes)
    }

    fn from_jar(jar: &CookieJar, config: SessionConfig) -> Self {
        let data = jar
            .signed(&config.key)
            .get(SESSION_COOKIE)
            .and_then(|cookie| serde_json::from_str(cookie.value()).ok())
            .unwrap_or_default();

        Self {
            data,
            changed: false,
            config,
        }
    }

    fn to_cookie(&self) -> Option<Cookie<'static>> {
        if self.data.is_empty() {
            let mut removal = Cookie::build((SESSION_COOKIE, "")).path("/").build();
            removal.make_removal();
            return Some(removal);
        }

        let value = match serde_json::to_string(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Error serializing session, {:?}", e);
                return None;
            }
        };

        let cookie = Cookie::build((SESSION_COOKIE, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.config.secure);

        let mut jar = CookieJar::new();
        jar.signed_mut(&self.config.key).add(cookie);
        jar.get(SESSION_COOKIE).cloned()
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    SessionConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let mut jar = CookieJar::new();

        for header in parts.headers.get_all(COOKIE) {
            let Ok(header) = header.to_str() else {
                continue;
            };
            for cookie in Cookie::split_parse_encoded(header.to_owned()).flatten() {
                jar.add_original(cookie.into_owned());
            }
        }

        Ok(Session::from_jar(&jar, SessionConfig::from_ref(state)))
    }
}

impl IntoResponseParts for Session {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if !self.changed {
            return Ok(res);
        }

        let Some(cookie) = self.to_cookie() else {
            return Ok(res);
        };

        match HeaderValue::from_str(&cookie.encoded().to_string()) {
            Ok(value) => {
                res.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::error!("Error encoding session cookie, {:?}", e),
        }

        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"a test secret that is comfortably longer than 32 bytes";

    fn config() -> SessionConfig {
        SessionConfig::new(SECRET, false)
    }

    fn round_trip(session: &Session) -> Session {
        let cookie = session.to_cookie().unwrap();
        let mut jar = CookieJar::new();
        jar.add_original(cookie);
        Session::from_jar(&jar, config())
    }

    #[test]
    fn signed_claim_survives_round_trip() {
        let mut session = Session::from_jar(&CookieJar::new(), config());
        assert_eq!(session.username(), None);

        session.log_in("alice");
        session.flash("Welcome back, alice!");

        let mut restored = round_trip(&session);
        assert_eq!(restored.username(), Some("alice"));
        assert_eq!(restored.take_flashes(), vec!["Welcome back, alice!".to_string()]);
        assert!(restored.take_flashes().is_empty());
    }

    #[test]
    fn tampered_cookie_is_anonymous() {
        let mut session = Session::from_jar(&CookieJar::new(), config());
        session.log_in("alice");
        let signed = session.to_cookie().unwrap();

        let forged = signed.value().replace("alice", "bobby");
        let mut jar = CookieJar::new();
        jar.add_original(Cookie::new(SESSION_COOKIE, forged));

        assert_eq!(Session::from_jar(&jar, config()).username(), None);
    }

    #[test]
    fn cookie_signed_with_another_key_is_anonymous() {
        let other = SessionConfig::new(b"another secret that is also longer than 32 bytes", false);
        let mut session = Session::from_jar(&CookieJar::new(), other);
        session.log_in("alice");

        let mut jar = CookieJar::new();
        jar.add_original(session.to_cookie().unwrap());

        assert_eq!(Session::from_jar(&jar, config()).username(), None);
    }

    #[test]
    fn empty_session_clears_cookie() {
        let mut session = Session::from_jar(&CookieJar::new(), config());
        session.log_in("alice");
        session.log_out();

        let cookie = session.to_cookie().unwrap();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(cookie::time::Duration::ZERO));
    }
}
