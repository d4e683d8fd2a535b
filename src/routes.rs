use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::from_fn,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{self, AppConfig};
use crate::handlers::{admin, public, AppState};
use crate::middleware::principal_middleware;

pub fn app(state: AppState) -> Router {
    let config = config::config();

    let mut router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Entity API, principal required
        .merge(admin_routes())
        .with_state(state)
        // Global middleware
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    if config.security.enable_cors {
        router = router.layer(cors_layer(config));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        // Collection-level operations
        .route("/admin/:entity/create", post(admin::create))
        .route("/admin/:entity/addBulk", post(admin::add_bulk))
        .route("/admin/:entity/list", post(admin::list))
        .route("/admin/:entity/count", post(admin::count))
        .route("/admin/:entity/updateBulk", put(admin::update_bulk))
        .route("/admin/:entity/update", put(admin::update_missing_id))
        .route("/admin/:entity/deleteMany", post(admin::delete_many))
        .route("/admin/:entity/softDeleteMany", put(admin::soft_delete_many))
        // Record-level operations
        .route("/admin/:entity/:id", get(admin::get))
        .route("/admin/:entity/update/:id", put(admin::update))
        .route("/admin/:entity/partial-update/:id", put(admin::partial_update))
        .route("/admin/:entity/softDelete/:id", put(admin::soft_delete))
        .route("/admin/:entity/delete/:id", delete(admin::delete))
        .route_layer(from_fn(principal_middleware))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if crate::is_development!() || config.security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    CorsLayer::new().allow_origin(origins).allow_methods(Any).allow_headers(Any)
}
