use mimalloc::MiMalloc;
use std::sync::Arc;
use supaguard::api::{GoTrueAccounts, OpenAiAssistant, PlatformApi, build_http_client};
use supaguard::config::Config;
use supaguard::db::TargetsStorage;
use supaguard::{GuardState, guard_router};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.basic.database_url,
        proxy = %cfg.platform.proxy.as_ref().map(|u| u.as_str()).unwrap_or("<none>"),
        loglevel = %cfg.basic.loglevel,
        admin_key_len = cfg.basic.admin_key.len(),
        management_token = cfg.platform.access_token.is_some(),
        auth_provider = cfg.auth.url.is_some(),
        assistant = cfg.assistant.api_key.is_some(),
    );
    if cfg.basic.cookie_secret.is_none() {
        warn!("no cookie_secret configured; sessions will not survive a restart");
    }

    let http = build_http_client(&cfg.platform)?;
    let targets = TargetsStorage::connect(&cfg.basic.database_url).await?;

    let mut state = GuardState::new(
        Arc::new(PlatformApi::new(http.clone(), &cfg.platform)),
        Arc::new(GoTrueAccounts::new(http.clone(), &cfg.auth)),
        Arc::new(OpenAiAssistant::new(http, &cfg.assistant)),
        targets,
        cfg.basic.admin_key.as_str(),
    )
    .with_insecure_cookie(cfg.basic.insecure_cookie)
    .with_assistant_rate(cfg.assistant.requests_per_minute);
    if let Some(secret) = cfg.basic.cookie_secret.as_deref() {
        state = state.with_cookie_secret(secret);
    }

    let app = guard_router(state, cfg.basic.body_limit);

    let listener = TcpListener::bind(&cfg.basic.listen_addr).await?;
    info!("HTTP server listening on {}", cfg.basic.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
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
