use crate::cli::ServeArgs;
use crate::infra::{open_site, AppState};
use crate::routes::with_site_routes;
use axum::http::HeaderValue;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use crsel_site::config::{AppConfig, ConfigError};
use crsel_site::error::AppError;
use crsel_site::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(data_dir) = args.data_dir.take() {
        config.storage.data_dir = data_dir;
    }
    if let Some(upload_dir) = args.upload_dir.take() {
        config.storage.upload_dir = upload_dir;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let site = open_site(&config).await?;

    let app = with_site_routes(site)
        .layer(Extension(app_state))
        .layer(cors_layer(config.server.cors_allow_origin.as_deref())?)
        .layer(TraceLayer::new_for_http())
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        data_dir = %config.storage.data_dir.display(),
        upload_dir = %config.storage.upload_dir.display(),
        "submission service ready"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("submission service stopped");
    Ok(())
}

fn cors_layer(allow_origin: Option<&str>) -> Result<CorsLayer, AppError> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match allow_origin {
        None => Ok(layer.allow_origin(Any)),
        Some(origin) => {
            let origin = HeaderValue::from_str(origin)
                .map_err(|_| ConfigError::InvalidCorsOrigin(origin.to_string()))?;
            Ok(layer.allow_origin(origin))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
