use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

mod app;
mod http;

use mailflow_core::config::{MailBackend, MailflowConfig};
use mailflow_mailer::{FileMailer, Mailer, SmtpMailer};
use mailflow_recurrence::DuePolicy;
use mailflow_runner::DispatchRunner;
use mailflow_store::Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailflow_server=info,tower_http=debug".into()),
        )
        .init();

    // load config: explicit path > MAILFLOW_CONFIG env > ~/.mailflow/mailflow.toml
    let config_path = std::env::var("MAILFLOW_CONFIG").ok();
    let config = MailflowConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        warn!("Config load failed ({}), using defaults", e);
        MailflowConfig::default()
    });

    let db_path = config.database.path.clone();
    ensure_parent_dir(&db_path);
    info!(path = %db_path, "opening SQLite database");
    let store = Store::open(&db_path)?;

    let mailer = build_mailer(&config)?;
    info!(backend = mailer.name(), "mail transport ready");

    let policy = DuePolicy::from_tolerance_secs(config.scheduler.due_tolerance_secs);
    let runner = Arc::new(DispatchRunner::new(store.clone(), mailer, policy));

    let state = Arc::new(app::AppState {
        config: config.clone(),
        store,
        runner: Arc::clone(&runner),
    });
    let router = app::build_router(state);

    // background due scan, once per poll interval
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let poll = Duration::from_secs(config.scheduler.poll_interval_secs);
    tokio::spawn(run_loop(runner, poll, shutdown_rx));

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    info!("mailflow server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    // signal the runner loop to stop
    let _ = shutdown_tx.send(true);
    Ok(())
}

/// Periodic due scan. SQLite and SMTP are blocking, so each tick runs on the
/// blocking pool; run_due serialises overlapping invocations itself.
async fn run_loop(
    runner: Arc<DispatchRunner>,
    poll: Duration,
    mut shutdown_rx: tokio::sync::watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(poll);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // the first tick of an interval fires immediately
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let runner = Arc::clone(&runner);
                let result =
                    tokio::task::spawn_blocking(move || runner.run_due(chrono::Utc::now())).await;
                match result {
                    Ok(Ok(_summary)) => {}
                    Ok(Err(e)) => warn!(error = %e, "due scan failed"),
                    Err(e) => warn!(error = %e, "due scan task panicked"),
                }
            }
            _ = shutdown_rx.changed() => {
                info!("runner loop stopping");
                break;
            }
        }
    }
}

fn build_mailer(config: &MailflowConfig) -> anyhow::Result<Arc<dyn Mailer>> {
    match config.mail.backend {
        MailBackend::Smtp => {
            let smtp = config.mail.smtp.as_ref().ok_or_else(|| {
                anyhow::anyhow!("mail.backend = \"smtp\" requires a [mail.smtp] section")
            })?;
            Ok(Arc::new(SmtpMailer::new(smtp, &config.mail.from_address)?))
        }
        MailBackend::File => Ok(Arc::new(FileMailer::new(
            &config.mail.outbox_dir,
            &config.mail.from_address,
        )?)),
    }
}

fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }
}
