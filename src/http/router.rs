use crate::app_context::AppContext;
use crate::cli::Args;
use crate::http::cors_layer;
use crate::storage::sessions::HashMapSessionStorage;
use crate::{auth, estimates, health, http::middleware, sessions};
use axum::{
    routing::{any, get, post},
    Router,
};
use tower::ServiceBuilder;

type Storage = HashMapSessionStorage;

pub fn new(args: &Args, app_context: AppContext<Storage>) -> Router {
    let cors_policy = cors_layer(args);
    tracing::info!("Initialized HTTP configuration.");

    let health_routes = Router::new().route("/check", get(health::handlers::healthcheck));
    let auth_routes = Router::new().route("/token/decode", get(auth::handlers::decode_token));
    let points_routes = Router::new()
        .route("/refresh", post(sessions::handlers::points::refresh))
        .route(
            "/:point-id/focus",
            post(sessions::handlers::points::focus),
        );
    let sessions_routes = Router::new()
        .route("/", post(sessions::handlers::session::create))
        .route(
            "/:session-id",
            get(sessions::handlers::session::view).delete(sessions::handlers::session::delete),
        )
        .route("/:session-id/mount", post(sessions::handlers::session::mount))
        .route(
            "/:session-id/click",
            post(sessions::handlers::selection::click::<Storage>),
        )
        .route(
            "/:session-id/drag",
            post(sessions::handlers::selection::drag::<Storage>),
        )
        .route(
            "/:session-id/selection",
            post(sessions::handlers::selection::enter::<Storage>),
        )
        .route(
            "/:session-id/current-location",
            post(sessions::handlers::selection::current_location::<Storage>),
        )
        .route(
            "/:session-id/default-location",
            post(sessions::handlers::selection::default_location::<Storage>),
        )
        .route(
            "/:session-id/submit",
            post(sessions::handlers::selection::submit::<Storage>),
        )
        .nest("/:session-id/points", points_routes)
        .route("/:session-id/ws", any(sessions::handlers::ws::ws));
    let estimates_routes = Router::new().route("/fare", post(estimates::handlers::fare));

    Router::new()
        .nest("/health", health_routes)
        .nest("/auth", auth_routes)
        .nest("/sessions", sessions_routes)
        .nest("/estimates", estimates_routes)
        .with_state(app_context)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::tracing))
                .layer(cors_policy),
        )
}
