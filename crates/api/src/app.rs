use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use domain::{PlannerService, PlannerStore};
use shared::jwt::JwtConfig;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::error::ApiError;
use crate::middleware::{
    handle_panic, metrics_handler, metrics_middleware, require_user_auth,
    security_headers_middleware, trace_id,
};
use crate::routes::{attendance, auth, events, health, search, tasks};
use crate::services::AuthService;

#[derive(Clone)]
pub struct AppState {
    pub planner: PlannerService,
    pub auth: AuthService,
    pub jwt: Arc<JwtConfig>,
    pub store: Arc<dyn PlannerStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn PlannerStore>) -> anyhow::Result<Self> {
        let jwt = Arc::new(JwtConfig::new(
            &config.jwt.secret,
            config.jwt.token_expiry_secs,
            config.jwt.leeway_secs,
        )?);

        Ok(Self {
            planner: PlannerService::new(store.clone()),
            auth: AuthService::new(store.clone(), jwt.clone()),
            jwt,
            store,
            config: Arc::new(config),
        })
    }
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("route not found".to_string())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<_> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(origin) => Some(origin),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn create_app(config: Config, store: Arc<dyn PlannerStore>) -> anyhow::Result<Router> {
    let state = AppState::new(config, store)?;
    let config = state.config.clone();

    // Bearer token required
    let protected_routes = Router::new()
        .route("/api/events", post(events::create_event))
        .route("/api/events/organized", get(events::list_organized_events))
        .route("/api/events/invited", get(events::list_invited_events))
        .route(
            "/api/events/:id",
            get(events::get_event).delete(events::delete_event),
        )
        .route("/api/events/:id/invite", post(attendance::invite_user))
        .route("/api/events/:id/attendance", put(attendance::update_attendance))
        .route("/api/events/:id/attendees", get(attendance::list_attendees))
        .route(
            "/api/events/:id/tasks",
            get(tasks::list_tasks).post(tasks::create_task),
        )
        .route(
            "/api/events/:id/tasks/:task_id/status",
            put(tasks::update_task_status),
        )
        .route("/api/search", get(search::search))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    let public_routes = Router::new()
        .route("/api/ping", get(health::ping))
        .route("/api/health", get(health::health_check))
        .route("/api/signup", post(auth::signup))
        .route("/api/login", post(auth::login))
        .route("/metrics", get(metrics_handler));

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(route_not_found)
        // Global middleware (order matters: bottom layers run first)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors_layer(&config.security.cors_origins))
        .with_state(state);

    Ok(app)
}
