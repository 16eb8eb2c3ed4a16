use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use vendor_mdm::config::AppConfig;
use vendor_mdm::error::AppError;
use vendor_mdm::portal::attachments::{attachment_router, AttachmentService};
use vendor_mdm::portal::change_requests::router::change_request_router;
use vendor_mdm::portal::change_requests::service::ChangeRequestService;
use vendor_mdm::portal::invitations::{invitation_router, InvitationService};
use vendor_mdm::portal::memory::{
    MemoryApplications, MemoryArtifacts, MemoryAttachments, MemoryBroker, MemoryChangeRequests,
    MemoryEventLog, MemoryInvitations, MemoryMetadata,
};
use vendor_mdm::portal::metadata::{metadata_router, MetadataService};
use vendor_mdm::portal::notifications::run_email_worker;
use vendor_mdm::portal::queue::INVITATION_EMAILS_QUEUE;
use vendor_mdm::portal::registration::router::registration_router;
use vendor_mdm::portal::registration::service::RegistrationService;
use vendor_mdm::telemetry;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Vendor Master Data Portal",
    about = "Run the vendor onboarding and change-request portal",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    // Storage seams. The in-memory implementations carry all state; swapping
    // in durable backends is a wiring change here, not a service change.
    let invitations = Arc::new(MemoryInvitations::default());
    let applications = Arc::new(MemoryApplications::default());
    let change_requests = Arc::new(MemoryChangeRequests::default());
    let attachments = Arc::new(MemoryAttachments::default());
    let artifacts = Arc::new(MemoryArtifacts::default());
    let events = Arc::new(MemoryEventLog::default());
    let broker = Arc::new(MemoryBroker::new());

    let metadata_service = Arc::new(MetadataService::new(Arc::new(MemoryMetadata::default())));
    let invitation_service = Arc::new(InvitationService::new(
        invitations,
        applications.clone(),
        artifacts.clone(),
        events.clone(),
        broker.clone(),
        config.portal.clone(),
    ));
    let change_request_service = Arc::new(ChangeRequestService::new(
        change_requests.clone(),
        artifacts.clone(),
        events.clone(),
        broker.clone(),
        metadata_service.clone(),
    ));
    let registration_service = Arc::new(RegistrationService::new(
        applications,
        change_requests,
        artifacts,
        events,
        broker.clone(),
        metadata_service.clone(),
    ));
    let attachment_service = Arc::new(AttachmentService::new(attachments));

    // Async consumer for invitation emails, fed by the queue publisher.
    let email_rx = broker.subscribe(INVITATION_EMAILS_QUEUE);
    tokio::spawn(run_email_worker(email_rx, config.portal.clone()));

    // Background sweep flipping overdue Pending invitations to Expired.
    let sweep_service = invitation_service.clone();
    let sweep_interval = Duration::from_secs(config.portal.sweep_interval_secs.max(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(error) = sweep_service.expire_overdue() {
                warn!(%error, "invitation expiry sweep failed");
            }
        }
    });

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(invitation_router(invitation_service))
        .merge(change_request_router(change_request_service))
        .merge(registration_router(registration_service))
        .merge(attachment_router(attachment_service))
        .merge(metadata_router(metadata_service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "vendor master data portal ready");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
