//! Print the grouped view and stats for a JSON record snapshot, and optionally
//! publish one piece of content from it.
//!
//! ```text
//! snapshot_report records.json
//! snapshot_report records.json --platform instagram --from 2026-01-01T00:00:00Z
//! snapshot_report records.json --publish <record-id> --platforms fb,ig,tiktok
//! snapshot_report --database --user <user-id>     # with the `postgres` feature
//! ```

use anyhow::{bail, Context, Result};
use automation_client::AutomationClient;
use chrono::{DateTime, Utc};
use clap::Parser;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use publisher_core::adapters::{HttpAutomationEndpoint, HttpRowCreationService};
use publisher_core::{
    load_dashboard, Config, ContentRecord, Dashboard, MemoryRecordStore, Platform,
    PublishOrchestrator, PublishResult, RecordFilter, RecordId, RecordStore, UserId,
};

#[cfg(feature = "postgres")]
use publisher_core::PostgresRecordStore;

#[derive(Parser)]
#[command(name = "snapshot_report")]
#[command(about = "Group a record snapshot and optionally publish from it")]
struct Cli {
    /// JSON file holding an array of content records
    snapshot: Option<PathBuf>,

    /// Read records from DATABASE_URL instead of a snapshot file
    #[cfg(feature = "postgres")]
    #[arg(long, requires = "user")]
    database: bool,

    /// User to report on (defaults to the owner of the first snapshot record)
    #[arg(long)]
    user: Option<UserId>,

    /// Only show records created at or after this instant (RFC 3339)
    #[arg(long)]
    from: Option<DateTime<Utc>>,

    /// Only show records created before this instant (RFC 3339)
    #[arg(long)]
    to: Option<DateTime<Utc>>,

    /// Only show records for these platforms
    #[arg(long = "platform")]
    platforms_filter: Vec<Platform>,

    /// Print the dashboard as JSON
    #[arg(long)]
    json: bool,

    /// Publish the content this record belongs to
    #[arg(long, requires = "platforms")]
    publish: Option<RecordId>,

    /// Platforms to publish to, comma separated
    #[arg(long, value_delimiter = ',')]
    platforms: Vec<Platform>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,publisher_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let cli = Cli::parse();

    let (store, user_id) = open_store(&cli).await?;

    let mut filter = RecordFilter {
        from: cli.from,
        to: cli.to,
        ..RecordFilter::default()
    };
    filter = filter.with_platforms(cli.platforms_filter.iter().copied());

    let dashboard = load_dashboard(store.as_ref(), user_id, &filter)
        .await
        .context("Failed to load dashboard")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
    } else {
        print_dashboard(&dashboard);
    }

    if let Some(record_id) = cli.publish {
        publish(&dashboard, record_id, &cli.platforms, user_id).await?;
    }

    Ok(())
}

async fn open_store(cli: &Cli) -> Result<(Box<dyn RecordStore>, UserId)> {
    #[cfg(feature = "postgres")]
    if cli.database {
        let url = Config::database_url_from_env()?;
        let store = PostgresRecordStore::new(&url)
            .await
            .context("Failed to connect to the record database")?;
        let user_id = cli.user.context("--database needs --user")?;
        return Ok((Box::new(store), user_id));
    }

    let Some(path) = &cli.snapshot else {
        bail!("Give a snapshot file to read");
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let records: Vec<ContentRecord> =
        serde_json::from_str(&raw).context("Snapshot must be a JSON array of content records")?;

    let user_id = match cli.user.or_else(|| records.first().map(|r| r.user_id)) {
        Some(user_id) => user_id,
        None => bail!("Snapshot is empty and no --user was given"),
    };

    Ok((Box::new(MemoryRecordStore::with_records(records)), user_id))
}

fn print_dashboard(dashboard: &Dashboard) {
    println!(
        "Generated: {}  Published: {}",
        dashboard.stats.total_generated, dashboard.stats.total_published
    );

    println!("\nGroups ({})", dashboard.view.groups.len());
    for group in &dashboard.view.groups {
        let primary = group.primary();
        println!(
            "  {}  primary {}  created {}",
            group.content_group_id(),
            primary.id,
            primary.created_at.format("%Y-%m-%d %H:%M")
        );
        for (platform, state) in group.publish_states() {
            let label = if state.is_published() {
                "published"
            } else {
                "not published"
            };
            println!("    {:<10} {} ({})", platform, state.record_id(), label);
        }
    }

    println!("\nStandalone ({})", dashboard.view.standalone.len());
    for record in &dashboard.view.standalone {
        println!(
            "  {}  {}  {}  {}",
            record.id, record.source_type, record.platform, record.status
        );
    }
}

async fn publish(
    dashboard: &Dashboard,
    record_id: RecordId,
    platforms: &[Platform],
    user_id: UserId,
) -> Result<()> {
    let Some(target) = dashboard.view.publish_target(record_id) else {
        bail!("Record {} is not in the current view", record_id);
    };

    let config = Config::from_env()?;
    let client = Arc::new(
        AutomationClient::new(config.client_options())
            .context("Failed to build automation client")?,
    );
    let orchestrator = PublishOrchestrator::new(
        Arc::new(HttpRowCreationService::new(client.clone())),
        Arc::new(HttpAutomationEndpoint::new(client)),
    )
    .with_config(config.orchestrator_config());

    let requested: BTreeSet<Platform> = platforms.iter().copied().collect();

    match orchestrator.publish(target, &requested, user_id).await {
        PublishResult::Accepted(receipt) => {
            println!("\nPublish accepted at {}", receipt.accepted_at);
            for (platform, id) in receipt.command.targets() {
                println!("  {:<10} {}", platform, id);
            }
            if !receipt.skipped_published.is_empty() {
                println!("  already published: {:?}", receipt.skipped_published);
            }
            Ok(())
        }
        PublishResult::NoPlatformsSelected => bail!("Nothing to publish"),
        PublishResult::Invalid(err) => bail!("Invalid publish request: {}", err),
        PublishResult::AlreadyInFlight => bail!("A publish for this content is already running"),
        PublishResult::RowCreationFailed(reason) => bail!("Row creation failed: {}", reason),
        PublishResult::PublishCommandFailed(reason) => bail!("Publish command failed: {}", reason),
    }
}
