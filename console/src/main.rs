//! Headless admin console
//!
//! Logs in (when `GOPYPI_ADMIN_USERNAME` and `GOPYPI_ADMIN_PASSWORD` are set),
//! loads the dashboard data and prints a summary.
//!
//! Run with: `RUST_LOG=info cargo run --bin gopypi-admin`

use anyhow::Context;
use gopypi_admin::{selectors, Console, ConsoleConfig, LogNavigator};
use gopypi_admin_client::{ListParams, FEATURE_DOWNLOAD_STATS};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    gopypi_admin_runtime::metrics::describe();

    let config = ConsoleConfig::from_env().context("reading configuration")?;
    info!(base_url = %config.base_url, "Starting admin console");

    let console = Console::from_config(&config, Arc::new(LogNavigator));

    if let (Ok(username), Ok(password)) = (
        std::env::var("GOPYPI_ADMIN_USERNAME"),
        std::env::var("GOPYPI_ADMIN_PASSWORD"),
    ) {
        console
            .login(&username, &password)
            .await
            .with_context(|| format!("logging in as {username}"))?;
    } else if console.storage().load().is_none() {
        warn!("No credentials and no stored session; requests will be anonymous");
    }

    let params = ListParams::new();
    let (info, stats, packages, licenses) = tokio::join!(
        console.get_all_info(),
        console.get_server_stats(),
        console.get_all_packages(&params),
        console.get_all_licenses(),
    );

    for (what, failed) in [
        ("info", info.err()),
        ("server stats", stats.err()),
        ("packages", packages.err()),
        ("licenses", licenses.err()),
    ] {
        if let Some(error) = failed {
            if !error.is_absorbed() {
                warn!(what, %error, "Could not load");
            }
        }
    }

    let summary = console
        .select(|s| {
            (
                selectors::all_info(s).map(|i| i.version.clone()),
                selectors::has_feature(s, FEATURE_DOWNLOAD_STATS),
                selectors::all_packages(s).len(),
                selectors::all_licenses(s).len(),
                selectors::server_stats(s).cloned(),
                selectors::messages(s).to_vec(),
            )
        })
        .await;
    let (version, download_stats, package_count, license_count, server_stats, messages) = summary;

    println!("Server version:  {}", version.as_deref().unwrap_or("unknown"));
    println!("Download stats:  {}", if download_stats { "enabled" } else { "disabled" });
    println!("Packages:        {package_count}");
    println!("Licenses:        {license_count}");
    if let Some(stats) = server_stats {
        println!("Server stats:    {stats}");
    }
    for message in messages {
        println!("[{}] {}", message.level, message.text);
    }

    Ok(())
}
