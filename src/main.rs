use clap::Parser; // for cli
use tokio::signal;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use visit_counter::config::Args;
use visit_counter::store::expiry_sweeper;
use visit_counter::{BuiltStore, app, build_state, build_store};

fn init_tracing(dev: bool) {
    let default_level = if dev { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("VISITS_LOG").unwrap_or_else(|_| default_level.into());
    let registry = tracing_subscriber::registry().with(filter);

    if dev {
        registry.with(fmt::layer().pretty()).init();
    } else {
        registry.with(fmt::layer().json()).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => tracing::error!(error = %err, "failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // parse cli arguments
    let args = Args::parse();
    init_tracing(args.dev);

    let store = build_store(&args.store_settings(), reqwest::Client::new());

    // spawn the expiry sweeper for the in-process store
    if let BuiltStore::Memory(memory) = &store {
        tokio::spawn(expiry_sweeper(memory.clone(), args.sweep_interval()));
    }

    let state = build_state(&args, &store);
    let app = app(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(%addr, store = store.name(), "visit counter listening");
    tracing::info!(
        rate_window_secs = args.rate_window,
        client_ip_header = %args.client_ip_header,
        "rate limit: one increment per client per window"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
