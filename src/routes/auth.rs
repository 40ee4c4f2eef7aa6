use axum::extract::State;
use axum::extract::rejection::FormRejection;
use axum::response::{IntoResponse, Response};
use axum::Form;
use tracing::instrument;

use crate::core::error::Error;
use crate::core::session::Session;
use crate::core::state::AppState;
use crate::core::store::{Insert, Taken};
use crate::routes::{redirect, user_path};
use crate::types::request::{
    EMAIL_TAKEN, FormErrors, INCORRECT_CREDENTIALS, LoginForm, RegisterForm, USERNAME_TAKEN,
};
use crate::views::{self, Page};

#[instrument(skip_all)]
pub(crate) async fn home(mut session: Session) -> Response {
    let page = Page::take(&mut session);

    (session, views::home(&page)).into_response()
}

#[instrument(skip_all)]
pub(crate) async fn register_form(session: Session) -> Response {
    if let Some(username) = session.username() {
        let to = user_path(username);
        return redirect(session, &to);
    }

    render_register(session, &RegisterForm::default(), &FormErrors::default())
}

#[instrument(skip_all)]
pub(crate) async fn register(
    State(state): State<AppState>,
    mut session: Session,
    form: Result<Form<RegisterForm>, FormRejection>,
) -> Result<Response, Error> {
    if let Some(username) = session.username() {
        let to = user_path(username);
        return Ok(redirect(session, &to));
    }

    let Form(form) = form?;

    let errors = state.user_controller.validate_registration(&form);
    if !errors.is_empty() {
        return Ok(render_register(session, &form, &errors));
    }

    let new_user = state.user_controller.register(form.clone()).await?;

    match state.store.insert_user(new_user).await? {
        Insert::Created(user) => {
            tracing::info!("Registered user {}", user.username);

            session.log_in(&user.username);
            session.flash(format!("User {} added!", user.username));

            Ok(redirect(session, &user_path(&user.username)))
        }
        Insert::Conflict(taken) => {
            tracing::info!("Registration conflict on {:?}", taken);

            let mut errors = FormErrors::default();
            match taken {
                Taken::Username => errors.add("username", USERNAME_TAKEN),
                Taken::Email => errors.add("email", EMAIL_TAKEN),
            }

            Ok(render_register(session, &form, &errors))
        }
    }
}

fn render_register(mut session: Session, form: &RegisterForm, errors: &FormErrors) -> Response {
    let page = Page::take(&mut session);

    (session, views::register(&page, form, errors)).into_response()
}

#[instrument(skip_all)]
pub(crate) async fn login_form(session: Session) -> Response {
    if let Some(username) = session.username() {
        let to = user_path(username);
        return redirect(session, &to);
    }

    render_login(session, &LoginForm::default(), &FormErrors::default())
}

#[instrument(skip_all)]
pub(crate) async fn login(
    State(state): State<AppState>,
    mut session: Session,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Response, Error> {
    if let Some(username) = session.username() {
        let to = user_path(username);
        return Ok(redirect(session, &to));
    }

    let Form(form) = form?;

    let mut errors = form.validate();

    if errors.is_empty() {
        match state
            .user_controller
            .authenticate(&form.username, &form.password)
            .await?
        {
            Some(user) => {
                tracing::info!("User {} logged in", user.username);

                session.log_in(&user.username);
                session.flash(format!("Welcome back, {}!", user.username));

                return Ok(redirect(session, &user_path(&user.username)));
            }
            None => {
                tracing::warn!("Failed login attempt for {}", form.username);
                errors.add("username", INCORRECT_CREDENTIALS);
            }
        }
    }

    Ok(render_login(session, &form, &errors))
}

fn render_login(mut session: Session, form: &LoginForm, errors: &FormErrors) -> Response {
    let page = Page::take(&mut session);

    (session, views::login(&page, form, errors)).into_response()
}

#[instrument(skip_all)]
pub(crate) async fn logout(mut session: Session) -> Response {
    if let Some(username) = session.username() {
        tracing::info!("User {} logged out", username);
    }

    session.log_out();
    session.flash("Successfully logged out.");

    redirect(session, "/")
}
