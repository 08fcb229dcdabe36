use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use homepage::config::Config;
use homepage::mail;
use homepage::server::{AppState, build_router};
use homepage::tasks::{LocalTaskQueue, QueueSpec, RouterDelivery};
use homepage::templates::TeraRenderer;

#[derive(Debug, Parser)]
#[command(name = "homepage", version, about = "Personal homepage server")]
struct Cli {
    /// Configuration file (defaults to homepage.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, overriding the configured one
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "homepage=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = Config::load_from(cli.config.as_deref()).context("loading configuration")?;
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    let addr = config.bind_addr()?;

    let renderer = TeraRenderer::embedded().context("compiling templates")?;
    let mailer = mail::from_config(&config.mail);

    let mut queue = LocalTaskQueue::new();
    let consumer = queue.declare(QueueSpec::new(
        config.queue.name.clone(),
        config.queue.throttle(),
        config.queue.retry(),
    ));

    let app_state = AppState::new(&config, Arc::new(renderer), Arc::new(queue), mailer);
    let app = build_router(app_state);

    let shutdown = CancellationToken::new();
    let consumer_handle = consumer.spawn(RouterDelivery::new(app.clone()), shutdown.clone());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("listening on {}", addr);

    let server_shutdown = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
            tracing::info!("shutting down");
            server_shutdown.cancel();
        })
        .await
        .context("serving HTTP")?;

    shutdown.cancel();
    if let Err(e) = consumer_handle.await {
        tracing::warn!(error = %e, "queue consumer ended abnormally");
    }

    Ok(())
}
