use click_quota_links::clock::{Clock, SystemClock};
use click_quota_links::commands::Console;
use click_quota_links::config::Config;
use click_quota_links::identity::SessionIdentity;
use click_quota_links::registry::LinkRegistry;
use dotenvy::dotenv;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_TRACING_LEVEL: &str = "click_quota_links=debug";

#[tokio::main]
async fn main() {
    _ = dotenv();
    configure_tracing();
    let config = Config::load().expect("Loading configuration failed");
    let registry = Arc::new(
        LinkRegistry::new(config.code_length).expect("Creating link registry failed"),
    );
    configure_scheduler(&config.sweep_cron, registry.clone()).await;
    let console = Console::new(registry, config, SystemClock, SessionIdentity::new());
    let input = BufReader::new(tokio::io::stdin());
    let mut output = tokio::io::stdout();
    console
        .run(input, &mut output)
        .await
        .expect("Console input/output failed");
}

fn configure_tracing() {
    // stdout belongs to the console
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or(DEFAULT_TRACING_LEVEL.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn configure_scheduler(cron_expression: &str, registry: Arc<LinkRegistry>) {
    let scheduler = JobScheduler::new()
        .await
        .expect("Creating scheduler failed");
    scheduler
        .add(create_cleaning_job(cron_expression, registry))
        .await
        .expect("Adding cleaning job to scheduler failed");
    scheduler.start().await.expect("Starting scheduler failed");
    tracing::info!("Expired link sweep scheduled: {}", cron_expression);
}

fn create_cleaning_job(cron_expression: &str, registry: Arc<LinkRegistry>) -> Job {
    Job::new_async(cron_expression, move |_, _| {
        let registry = registry.clone();
        Box::pin(async move {
            registry.sweep_expired(SystemClock.now());
        })
    })
    .expect("Creating cleaning job failed")
}
