use axum::extract::rejection::FormRejection;
use axum::extract::{FromRequestParts, Path, State};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum::Form;
use tracing::instrument;

use crate::core::error::Error;
use crate::core::session::Session;
use crate::core::state::AppState;
use crate::routes::{redirect, user_path};
use crate::types::request::{FeedbackForm, FormErrors};
use crate::types::{Feedback, FeedbackChanges, NewFeedback, Username};
use crate::utils::guard::{self, Access};
use crate::views::{self, Page};

#[instrument(skip(session))]
pub(crate) async fn add_form(session: Session, Path(username): Path<Username>) -> Response {
    if let Some(refused) = refuse_add(session.username(), &username) {
        return refused.apply(session);
    }

    render(
        session,
        "Add feedback",
        &add_path(&username),
        &FeedbackForm::default(),
        &FormErrors::default(),
    )
}

#[instrument(skip(state, session, form))]
pub(crate) async fn add(
    State(state): State<AppState>,
    mut session: Session,
    Path(username): Path<Username>,
    form: Result<Form<FeedbackForm>, FormRejection>,
) -> Result<Response, Error> {
    if let Some(refused) = refuse_add(session.username(), &username) {
        return Ok(refused.apply(session));
    }

    let Form(form) = form?;

    let errors = form.validate();
    if !errors.is_empty() {
        return Ok(render(session, "Add feedback", &add_path(&username), &form, &errors));
    }

    let feedback = state
        .store
        .insert_feedback(NewFeedback::new(form, &username))
        .await?;

    tracing::info!("User {} added feedback {}", username, feedback.id);

    session.flash(format!("Feedback {} added", feedback.title));

    Ok(redirect(session, &user_path(&feedback.username)))
}

#[instrument(skip(state, session))]
pub(crate) async fn edit_form(
    State(state): State<AppState>,
    session: Session,
    FeedbackId(id): FeedbackId,
) -> Result<Response, Error> {
    let feedback = find(&state, id).await?;

    if let Some(refused) = refuse(session.username(), &feedback, "edit") {
        return Ok(refused.apply(session));
    }

    Ok(render(
        session,
        "Edit feedback",
        &edit_path(id),
        &FeedbackForm::from(&feedback),
        &FormErrors::default(),
    ))
}

#[instrument(skip(state, session, form))]
pub(crate) async fn edit(
    State(state): State<AppState>,
    mut session: Session,
    FeedbackId(id): FeedbackId,
    form: Result<Form<FeedbackForm>, FormRejection>,
) -> Result<Response, Error> {
    let feedback = find(&state, id).await?;

    if let Some(refused) = refuse(session.username(), &feedback, "edit") {
        return Ok(refused.apply(session));
    }

    let Form(form) = form?;

    let errors = form.validate();
    if !errors.is_empty() {
        return Ok(render(session, "Edit feedback", &edit_path(id), &form, &errors));
    }

    let feedback = state
        .store
        .update_feedback(id, FeedbackChanges::from(form))
        .await?
        .ok_or(Error::FeedbackNotFound)?;

    tracing::info!("User {} updated feedback {}", feedback.username, feedback.id);

    session.flash("Feedback updated");

    Ok(redirect(session, &user_path(&feedback.username)))
}

#[instrument(skip(state, session))]
pub(crate) async fn delete(
    State(state): State<AppState>,
    mut session: Session,
    FeedbackId(id): FeedbackId,
) -> Result<Response, Error> {
    let Some(username) = session.username().map(str::to_owned) else {
        session.flash("Must be logged in to delete feedback");
        return Ok(redirect(session, "/login"));
    };

    let feedback = find(&state, id).await?;

    if let Some(refused) = refuse(Some(username.as_str()), &feedback, "delete") {
        return Ok(refused.apply(session));
    }

    if !state.store.delete_feedback(id).await? {
        return Err(Error::FeedbackNotFound);
    }

    tracing::info!("User {} deleted feedback {}", username, id);

    session.flash("Feedback deleted");

    Ok(redirect(session, &user_path(&username)))
}

/// The `{id}` segment of a feedback route. A segment that is not an `i32` cannot
/// name a row, so it is rejected as not found.
pub(crate) struct FeedbackId(i32);

impl<S> FromRequestParts<S> for FeedbackId
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i32>::from_request_parts(parts, state)
            .await
            .map_err(|_| Error::FeedbackNotFound)?;

        Ok(Self(id))
    }
}

async fn find(state: &AppState, id: i32) -> Result<Feedback, Error> {
    state
        .store
        .get_feedback(id)
        .await?
        .ok_or(Error::FeedbackNotFound)
}

/// A failed guard: the flash to queue and where to send the browser.
struct Refusal {
    message: String,
    to: String,
}

impl Refusal {
    fn apply(self, mut session: Session) -> Response {
        session.flash(self.message);
        redirect(session, &self.to)
    }
}

fn refuse_add(claim: Option<&str>, username: &str) -> Option<Refusal> {
    match guard::check(claim, username) {
        Access::Owner => None,
        Access::Anonymous | Access::Other(_) => Some(Refusal {
            message: "Must be logged in to add feedback".to_owned(),
            to: "/login".to_owned(),
        }),
    }
}

fn refuse(claim: Option<&str>, feedback: &Feedback, action: &str) -> Option<Refusal> {
    match guard::check(claim, &feedback.username) {
        Access::Owner => None,
        Access::Anonymous => Some(Refusal {
            message: format!("Must be logged in to {action} feedback"),
            to: "/login".to_owned(),
        }),
        Access::Other(username) => Some(Refusal {
            message: format!("You do not have permission to {action} this feedback"),
            to: user_path(username),
        }),
    }
}

fn add_path(username: &str) -> String {
    format!("{}/feedback/add", user_path(username))
}

fn edit_path(id: i32) -> String {
    format!("/feedback/{id}/update")
}

fn render(
    mut session: Session,
    title: &str,
    action: &str,
    form: &FeedbackForm,
    errors: &FormErrors,
) -> Response {
    let page = Page::take(&mut session);

    (session, views::feedback_form(&page, title, action, form, errors)).into_response()
}
