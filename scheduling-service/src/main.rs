use axum::{
    Router,
    routing::{get, post},
};
use scheduling_service::{
    api::{
        handler::{carryover, health, schedule},
        state::SchedulingAppState,
    },
    domain::{
        carryover::CarryoverConstraints,
        config::{GenerateConfig, ServiceConfig},
        service::{
            CarryoverResolution, GenerateScheduleRequest, ImportedRow, ResolveCarryoverRequest,
            SchedulingService,
        },
    },
    infrastructure::seed::RandomSeedSource,
};
use shared::{
    responses::HealthResponse,
    types::{
        CoverageKind, CoverageShortfall, DayOffRequest, Period, Position, RestDeficit, RosterRow,
        Schedule, ShiftCode, Staff, StaffStats, StaffStatus,
    },
};
use std::{env, net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        schedule::generate,
        carryover::resolve,
    ),
    components(schemas(
        HealthResponse,
        Staff,
        Position,
        StaffStatus,
        ShiftCode,
        DayOffRequest,
        Period,
        StaffStats,
        RosterRow,
        CoverageKind,
        CoverageShortfall,
        RestDeficit,
        Schedule,
        GenerateConfig,
        CarryoverConstraints,
        GenerateScheduleRequest,
        ImportedRow,
        ResolveCarryoverRequest,
        CarryoverResolution,
    )),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Schedules", description = "Monthly roster generation"),
        (name = "Carryover", description = "Prior-period import and opening-day constraints"),
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    shared::telemetry::init_telemetry("scheduling-service");

    let port = env::var("SERVER_PORT").unwrap_or_else(|_| "8081".to_string());
    let config_path =
        env::var("SCHEDULING_CONFIG_PATH").unwrap_or_else(|_| "scheduling.toml".to_string());
    let config = ServiceConfig::load(&config_path).expect("Failed to load scheduling config");

    let scheduling_service = Arc::new(SchedulingService::new(
        config,
        Arc::new(RandomSeedSource),
    ));

    let state = Arc::new(SchedulingAppState { scheduling_service });

    let governor_conf = GovernorConfigBuilder::default()
        .per_second(2)
        .burst_size(10)
        .key_extractor(SmartIpKeyExtractor)
        .use_headers()
        .finish()
        .expect("Failed to build governor config");

    let app = Router::new()
        .route("/health", get(health::health))
        .route("/api/v1/schedules/generate", post(schedule::generate))
        .route("/api/v1/carryover/resolve", post(carryover::resolve))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Rate limiting (per-IP, 2 req/s with burst of 10)
        .layer(GovernorLayer::new(governor_conf))
        .layer(
            TraceLayer::new_for_http()
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(tower_http::LatencyUnit::Millis),
                ),
        )
        .with_state(state);

    tracing::info!("scheduling-service listening on 0.0.0.0:{port}");

    let listener = TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("Failed to bind");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shared::shutdown::shutdown_signal())
    .await
    .expect("Server exited with an error");

    tracing::info!("scheduling-service shut down");
}
