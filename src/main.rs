use axum::{
    Json, Router,
    routing::{get, post},
    middleware::{from_fn, from_fn_with_state},
};

use http::{Method, header};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_governor::governor::GovernorConfigBuilder;
use tower_http::{
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
    cors::CorsLayer,
};

use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod state;
mod db;
mod response;
mod jwt;
mod llm;

mod models {
    pub mod user;
    pub mod course;
    pub mod enrollment;
    pub mod chat;
}

mod repositories {
    pub mod user;
    pub mod course;
    pub mod enrollment;
    pub mod chat;
}

mod services {
    pub mod auth;
    pub mod users;
    pub mod courses;
    pub mod enrollments;
    pub mod chat;
}

mod handlers {
    pub mod auth;
    pub mod users;
    pub mod courses;
    pub mod instructor;
    pub mod student;
    pub mod chat;
}

mod middleware_layer {
    pub mod auth;
}

use config::Config;
use middleware_layer::auth::{
    authenticate, require_role, ADMIN_ONLY, INSTRUCTOR_OR_ADMIN, STUDENT_OR_ADMIN,
};
use response::ApiResponse;
use state::AppState;

async fn root() -> Json<ApiResponse<()>> {
    Json(ApiResponse::message("Server is running"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    tracing::info!("✅ Configuration loaded successfully");

    let state = AppState::new(&config).await?;
    tracing::info!("✅ AppState initialized");

    let cors = CorsLayer::new()
        .allow_origin([
            "http://localhost:3000".parse().unwrap(),
            "http://127.0.0.1:3000".parse().unwrap(),
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true)
        .max_age(Duration::from_secs(86400));

    // Brute-force guard on the credential endpoints.
    let auth_governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(30)
            .use_headers()
            .finish()
            .unwrap(),
    );

    let public_routes = Router::new()
        .route("/", get(root))
        .route("/api/courses", get(handlers::courses::list_courses))
        .route("/api/courses/{id}", get(handlers::courses::get_course))
        .with_state(state.clone());

    let auth_routes = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/refresh", post(handlers::auth::refresh))
        .route_layer(tower_governor::GovernorLayer::new(auth_governor_conf))
        .with_state(state.clone());

    let me_routes = Router::new()
        .route(
            "/api/users/me",
            get(handlers::users::get_me)
                .put(handlers::users::update_me)
                .delete(handlers::users::delete_me),
        )
        .route_layer(from_fn_with_state(state.clone(), authenticate))
        .with_state(state.clone());

    let admin_routes = Router::new()
        .route(
            "/api/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/api/users/{id}",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        .route_layer(from_fn(|req, next| require_role(req, next, ADMIN_ONLY)))
        .route_layer(from_fn_with_state(state.clone(), authenticate))
        .with_state(state.clone());

    let instructor_routes = Router::new()
        .route(
            "/api/instructor/dashboard/stats",
            get(handlers::instructor::dashboard_stats),
        )
        .route(
            "/api/instructor/courses",
            post(handlers::instructor::create_course).get(handlers::instructor::my_courses),
        )
        .route(
            "/api/instructor/courses/{id}",
            axum::routing::put(handlers::instructor::update_course)
                .delete(handlers::instructor::delete_course),
        )
        .route(
            "/api/courses/{id}/enrollments",
            get(handlers::courses::course_enrollments),
        )
        .route_layer(from_fn(|req, next| require_role(req, next, INSTRUCTOR_OR_ADMIN)))
        .route_layer(from_fn_with_state(state.clone(), authenticate))
        .with_state(state.clone());

    let student_routes = Router::new()
        .route("/api/student/courses", get(handlers::student::enrolled_courses))
        .route(
            "/api/student/courses/completed",
            get(handlers::student::completed_courses),
        )
        .route("/api/student/courses/{id}/enroll", post(handlers::student::enroll))
        .route("/api/student/courses/{id}/drop", post(handlers::student::drop_course))
        .route(
            "/api/student/courses/{id}/complete",
            post(handlers::student::complete_course),
        )
        .route_layer(from_fn(|req, next| require_role(req, next, STUDENT_OR_ADMIN)))
        .route_layer(from_fn_with_state(state.clone(), authenticate))
        .with_state(state.clone());

    let chat_routes = Router::new()
        .route("/api/gpt/usage", get(handlers::chat::usage))
        .route("/api/gpt/generate", post(handlers::chat::gpt_generate))
        .route("/api/gpt/history", get(handlers::chat::history))
        .route("/api/gemini/usage", get(handlers::chat::usage))
        .route("/api/gemini/generate", post(handlers::chat::gemini_generate))
        .route_layer(from_fn_with_state(state.clone(), authenticate))
        .with_state(state.clone());

    let app = Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(me_routes)
        .merge(admin_routes)
        .merge(instructor_routes)
        .merge(student_routes)
        .merge(chat_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default())
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(cors);

    let addr = SocketAddr::from(([127, 0, 0, 1], state.config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
