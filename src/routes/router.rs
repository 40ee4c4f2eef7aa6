use axum::{
    Router,
    extract::{MatchedPath, Request},
    http::{HeaderValue, StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use tower::ServiceBuilder;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::info_span;

use crate::core::state::AppState;
use crate::routes::{auth, feedback, user};
use crate::views;

pub(crate) fn routes(state: AppState) -> Router {
    // /users/...
    let user_router = Router::new()
        .route("/{username}", get(user::show).post(user::show))
        .route("/{username}/delete", get(user::delete))
        .route(
            "/{username}/feedback/add",
            get(feedback::add_form).post(feedback::add),
        );

    // /feedback/...
    let feedback_router = Router::new()
        .route(
            "/{id}/update",
            get(feedback::edit_form).post(feedback::edit),
        )
        .route("/{id}/delete", get(feedback::delete));

    Router::new()
        .route("/", get(auth::home))
        .route("/register", get(auth::register_form).post(auth::register))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", get(auth::logout))
        .nest("/users", user_router)
        .nest("/feedback", feedback_router)
        .fallback(not_found)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                        let matched_path = request
                            .extensions()
                            .get::<MatchedPath>()
                            .map(MatchedPath::as_str);

                        info_span!(
                            "request",
                            method = ?request.method(),
                            matched_path,
                        )
                    }),
                )
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                )),
        )
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        views::error_page(StatusCode::NOT_FOUND),
    )
}
