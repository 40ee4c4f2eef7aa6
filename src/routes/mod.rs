pub(crate) mod auth;
pub(crate) mod feedback;
pub(crate) mod router;
pub(crate) mod user;


use axum::response::{IntoResponse, Redirect, Response};

use crate::core::session::Session;

pub(crate) fn user_path(username: &str) -> String {
    format!("/users/{username}")
}

/// Redirects and writes back any change to the session.
pub(crate) fn redirect(session: Session, to: &str) -> Response {
    (session, Redirect::to(to)).into_response()
}
