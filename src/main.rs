use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lexguard::{
    api::{create_router, middleware::input_sanitization::InputSanitizationConfig, router::AppState},
    application::{
        access_guard::{AccessGuard, AccessGuardConfig},
        ports::SecurityEventLogger,
        route_permissions::RoutePermissionTable,
    },
    config::LogFormat,
    infrastructure::{
        auth::JwtClaimsResolver,
        security_events::{
            FanOutSecurityEventLogger, InMemorySecurityEventRecorder, TracingSecurityEventLogger,
            DEFAULT_RECORDER_CAPACITY,
        },
    },
    Config,
};

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.compact().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing(config.log_format);

    info!("Starting lexguard");

    config.validate().context("invalid configuration")?;
    if config.has_weak_secret() {
        warn!("JWT_SECRET is shorter than 32 bytes");
    }
    info!(config = ?config, "Configuration loaded and validated");

    // Security events go to the log and to the in-memory recorder behind /api/admin/audit-logs
    let recorder = Arc::new(InMemorySecurityEventRecorder::new(DEFAULT_RECORDER_CAPACITY));
    let console: Arc<dyn SecurityEventLogger> = Arc::new(TracingSecurityEventLogger);
    let recorded: Arc<dyn SecurityEventLogger> = recorder.clone();
    let events: Arc<dyn SecurityEventLogger> =
        Arc::new(FanOutSecurityEventLogger::new(vec![console, recorded]));

    let resolver = Arc::new(JwtClaimsResolver::new(
        config.jwt_secret.as_bytes(),
        config.jwt_issuer.clone(),
        config.jwt_leeway_secs,
    ));

    let guard = Arc::new(AccessGuard::new(
        resolver,
        Arc::new(RoutePermissionTable::standard()),
        events,
        AccessGuardConfig::default()
            .with_cookie_name(config.auth_cookie_name.clone())
            .with_lookup_timeout(config.lookup_timeout())
            .with_clock_skew(config.leeway()),
    ));

    let state = AppState::new(guard, recorder)
        .with_sanitization(InputSanitizationConfig::default())
        .with_max_request_body_bytes(config.max_request_body_bytes);

    let app = create_router(state).context("route permission table is incomplete")?;

    info!("Listening on {}", config.listen_addr);
    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
