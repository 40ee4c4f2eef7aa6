//! Server-rendered pages.
//!
//! Every value that originates from a request or the database goes through
//! [`escape`] before it is interpolated.

use std::fmt::Write;

use axum::http::StatusCode;
use axum::response::Html;

use crate::core::session::Session;
use crate::types::request::{FeedbackForm, FormErrors, LoginForm, RegisterForm};
use crate::types::{Feedback, User};
use crate::utils::encode::escape;

/// What every page needs from the session: who is logged in and the flash
/// messages queued for display.
#[derive(Debug, Default)]
pub(crate) struct Page {
    pub(crate) username: Option<String>,
    pub(crate) flashes: Vec<String>,
}

impl Page {
    /// Consumes the session's flash messages.
    pub(crate) fn take(session: &mut Session) -> Self {
        Self {
            username: session.username().map(str::to_owned),
            flashes: session.take_flashes(),
        }
    }
}

fn layout(page: &Page, title: &str, body: &str) -> Html<String> {
    let nav = match &page.username {
        Some(username) => format!(
            r#"<a href="/users/{0}">{0}</a> <a href="/logout">Log out</a>"#,
            escape(username)
        ),
        None => r#"<a href="/register">Register</a> <a href="/login">Log in</a>"#.to_owned(),
    };

    let mut flashes = String::new();
    for message in &page.flashes {
        flashes.push_str(&format!(r#"<li class="flash">{}</li>"#, escape(message)));
    }
    if !flashes.is_empty() {
        flashes = format!(r#"<ul class="flashes">{flashes}</ul>"#);
    }

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} | Feedback</title>
</head>
<body>
<nav><a href="/">Home</a> {nav}</nav>
{flashes}
<main>
<h1>{title}</h1>
{body}
</main>
</body>
</html>"#,
        title = escape(title),
    ))
}

fn field(
    out: &mut String,
    errors: &FormErrors,
    name: &'static str,
    label: &str,
    kind: &str,
    value: &str,
) {
    out.push_str(&format!(
        r#"<p><label for="{name}">{label}</label> <input type="{kind}" id="{name}" name="{name}" value="{}">"#,
        escape(value)
    ));
    field_errors(out, errors, name);
    out.push_str("</p>\n");
}

fn field_errors(out: &mut String, errors: &FormErrors, name: &str) {
    for message in errors.get(name) {
        out.push_str(&format!(r#" <span class="error">{}</span>"#, escape(message)));
    }
}

pub(crate) fn home(page: &Page) -> Html<String> {
    let body = match &page.username {
        Some(username) => format!(
            r#"<p>Logged in as {0}. <a href="/users/{0}">Your feedback</a></p>"#,
            escape(username)
        ),
        None => "<p>Register or log in to leave feedback.</p>".to_owned(),
    };

    layout(page, "Home", &body)
}

pub(crate) fn register(page: &Page, form: &RegisterForm, errors: &FormErrors) -> Html<String> {
    let mut body = String::from(r#"<form method="POST" action="/register">"#);
    body.push('\n');
    field(&mut body, errors, "username", "Username", "text", &form.username);
    field(&mut body, errors, "password", "Password", "password", "");
    field(&mut body, errors, "email", "Email", "email", &form.email);
    field(&mut body, errors, "first_name", "First Name", "text", &form.first_name);
    field(&mut body, errors, "last_name", "Last Name", "text", &form.last_name);
    body.push_str("<button>Register</button>\n</form>");

    layout(page, "Register", &body)
}

pub(crate) fn login(page: &Page, form: &LoginForm, errors: &FormErrors) -> Html<String> {
    let mut body = String::from(r#"<form method="POST" action="/login">"#);
    body.push('\n');
    field(&mut body, errors, "username", "Username", "text", &form.username);
    field(&mut body, errors, "password", "Password", "password", "");
    body.push_str("<button>Log in</button>\n</form>");

    layout(page, "Log in", &body)
}

pub(crate) fn user_detail(page: &Page, user: &User, feedback: &[Feedback]) -> Html<String> {
    let username = escape(&user.username);

    let mut body = format!(
        r#"<dl>
<dt>Username</dt><dd>{username}</dd>
<dt>Email</dt><dd>{}</dd>
<dt>Name</dt><dd>{}</dd>
</dl>
<h2>Feedback</h2>
"#,
        escape(&user.email),
        escape(&user.full_name()),
    );

    if feedback.is_empty() {
        body.push_str("<p>No feedback yet.</p>\n");
    } else {
        body.push_str("<ul>\n");
        for item in feedback {
            let _ = writeln!(
                body,
                r#"<li><h3>{}</h3><p>{}</p><small>{}</small> <a href="/feedback/{id}/update">Edit</a> <a href="/feedback/{id}/delete">Delete</a></li>"#,
                escape(&item.title),
                escape(&item.content),
                item.created_at.format("%Y-%m-%d %H:%M"),
                id = item.id,
            );
        }
        body.push_str("</ul>\n");
    }

    body.push_str(&format!(
        r#"<p><a href="/users/{username}/feedback/add">Add feedback</a></p>
<p><a href="/users/{username}/delete">Delete account</a></p>"#
    ));

    layout(page, &user.username, &body)
}

/// Shared by the add and edit routes; `action` is the path the form posts to.
pub(crate) fn feedback_form(
    page: &Page,
    title: &str,
    action: &str,
    form: &FeedbackForm,
    errors: &FormErrors,
) -> Html<String> {
    let mut body = format!(r#"<form method="POST" action="{}">"#, escape(action));
    body.push('\n');
    field(&mut body, errors, "title", "Title", "text", &form.title);
    body.push_str(&format!(
        r#"<p><label for="content">Content</label> <textarea id="content" name="content">{}</textarea>"#,
        escape(&form.content)
    ));
    field_errors(&mut body, errors, "content");
    body.push_str("</p>\n<button>Save</button>\n</form>");

    layout(page, title, &body)
}

pub(crate) fn error_page(status: StatusCode) -> Html<String> {
    let message = match status {
        StatusCode::NOT_FOUND => "The page you requested could not be found.",
        status if status.is_client_error() => "The submitted request could not be processed.",
        _ => "Something went wrong, please try again.",
    };

    layout(
        &Page::default(),
        status.canonical_reason().unwrap_or("Error"),
        &format!(r#"<p>{message}</p><p><a href="/">Back to the home page</a></p>"#),
    )
}
