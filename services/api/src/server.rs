use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use tracing::{info, warn};

use ism_admissions::config::AppConfig;
use ism_admissions::error::AppError;
use ism_admissions::telemetry;
use ism_admissions::workflows::admissions::{ChangeBus, ChangeEvent, RandomGradeSource};

use crate::cli::ServeArgs;
use crate::infra::{build_api, AppState};
use crate::routes::with_admissions_routes;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
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
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let api = build_api(&config.admissions, RandomGradeSource)?;
    spawn_change_log(api.admissions.events());

    let app = with_admissions_routes(api)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        intake_year = config.admissions.intake_year,
        policy = ?config.admissions.transition_policy,
        "admissions service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Mirror every change event into the log stream.
fn spawn_change_log(events: &ChangeBus) {
    let mut subscription = events.subscribe();
    tokio::spawn(async move {
        while let Some(event) = subscription.next().await {
            match &event {
                ChangeEvent::StatusChanged { id, from, to } => {
                    info!(application_id = %id, %from, %to, "change: status");
                }
                ChangeEvent::ApplicationCreated { id, number } => {
                    info!(application_id = %id, %number, "change: application created");
                }
                other => info!(event = ?other, "change"),
            }
        }
        warn!("change bus closed");
    });
}
