use axum::extract::rejection::FormRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::views;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Database migration error: {0}")]
    DatabaseMigration(#[from] sqlx::migrate::MigrateError),
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
    #[error("Secret must be at least 32 bytes")]
    SecretTooShort,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("Blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("Invalid form submission: {0}")]
    Form(#[from] FormRejection),
    #[error("Feedback not found")]
    FeedbackNotFound,
    #[error("User not found")]
    UserNotFound,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self {
            Error::FeedbackNotFound | Error::UserNotFound => StatusCode::NOT_FOUND,
            Error::Form(ref rejection) => {
                tracing::warn!("{}", rejection.body_text());
                rejection.status()
            }
            Error::Sql(_) | Error::Bcrypt(_) | Error::Join(_) => {
                tracing::error!("{:?}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, views::error_page(status)).into_response()
    }
}
