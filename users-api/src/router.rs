use std::sync::Arc;

use axum::{response::Redirect, routing::get, Router};
use tower_http::{
    services::ServeDir,
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::{
    adapters::outbound::csv_file::CsvUserTableRepository,
    app_state::AppState,
    config::Settings,
    domain::services::UserDirectoryServiceImpl,
    routes,
};

pub fn create(config: Settings) -> Router<()> {
    let repository = CsvUserTableRepository::new(config.storage.csv_path.clone());
    let app_state = AppState::new(UserDirectoryServiceImpl::new(Arc::new(repository)));

    tracing::info!(
        "Serving users from {}",
        config.storage.csv_path.display()
    );

    Router::new()
        .route("/", get(|| async { Redirect::to("/users") }))
        .route("/health", get(|| async { "OK" }))
        .merge(routes::pages::router())
        .nest("/api", routes::users::router(config.storage.max_upload_bytes))
        .nest_service("/static", ServeDir::new(&config.storage.static_dir))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
}


#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::test_support::test_router;

    #[tokio::test]
    async fn root_redirects_to_users_page() {
        let (_dir, app) = test_router(None);

        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/users");
    }

    #[tokio::test]
    async fn health_check_responds() {
        let (_dir, app) = test_router(None);

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn serves_static_files() {
        let (_dir, app) = test_router(None);

        let response = app
            .oneshot(Request::get("/static/styles.css").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"body { margin: 0; }");
    }
}
