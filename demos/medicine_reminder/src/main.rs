//! Medicine reminder skill server.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package medicine-reminder -- --config demos/medicine_reminder/parley.toml
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use medicine_reminder::{SkillSettings, build_skill};
use parley::alexa::HttpReminderClient;
use parley::runtime::ParleyRuntime;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Configuration profile (e.g. development, production)
    #[arg(short, long)]
    profile: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut builder = ParleyRuntime::builder();
    if let Some(path) = &args.config {
        builder = builder.config_file(path);
    }
    if let Some(profile) = &args.profile {
        builder = builder.profile(profile);
    }
    let runtime = builder.build().context("failed to load configuration")?;

    let settings: SkillSettings = runtime.skill_settings()?;
    settings.validate()?;

    // The blocking client must exist before the async runtime starts
    let reminders = HttpReminderClient::with_timeout(Duration::from_secs(settings.api_timeout_secs))
        .context("failed to build reminder client")?;

    info!(
        time_zone = %settings.time_zone,
        offset_minutes = settings.offset_minutes,
        "Medicine reminder skill starting"
    );

    let skill = build_skill(settings, Arc::new(reminders), runtime.interceptor_policy());
    runtime.serve(skill)?;

    Ok(())
}
