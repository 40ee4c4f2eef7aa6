use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use tracing::instrument;

use crate::core::error::Error;
use crate::core::session::Session;
use crate::core::state::AppState;
use crate::routes::redirect;
use crate::types::Username;
use crate::utils::guard::{self, Access};
use crate::views::{self, Page};

#[instrument(skip(state, session))]
pub(crate) async fn show(
    State(state): State<AppState>,
    mut session: Session,
    Path(username): Path<Username>,
) -> Result<Response, Error> {
    if guard::check(session.username(), &username) != Access::Owner {
        session.flash("Must be logged in to view page");
        return Ok(redirect(session, "/login"));
    }

    // The claim outlived its account, e.g. deleted from another browser.
    let Some(user) = state.store.get_user(&username).await? else {
        tracing::warn!("Session claims missing user {}", username);
        session.log_out();
        return Ok((session, Error::UserNotFound).into_response());
    };
    let feedback = state.store.get_feedback_by_user(&username).await?;

    let page = Page::take(&mut session);

    Ok((session, views::user_detail(&page, &user, &feedback)).into_response())
}

#[instrument(skip(state, session))]
pub(crate) async fn delete(
    State(state): State<AppState>,
    mut session: Session,
    Path(username): Path<Username>,
) -> Result<Response, Error> {
    if guard::check(session.username(), &username) != Access::Owner {
        session.flash("Must be logged in to delete account");
        return Ok(redirect(session, "/login"));
    }

    if state.store.delete_user(&username).await? {
        tracing::info!("Deleted user {}", username);
    } else {
        tracing::warn!("User {} was already gone", username);
    }

    session.log_out();
    session.flash("Account deleted");

    Ok(redirect(session, "/"))
}
