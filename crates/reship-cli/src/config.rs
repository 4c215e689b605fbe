use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use reship_core::channel::{self, ChannelProfile};
use std::path::Path;

/// Resolved run inputs
///
/// Anything missing or malformed here is a startup error, surfaced before
/// any session is opened.
#[derive(Debug)]
pub struct RunConfig {
    pub target_date: NaiveDate,
    pub channel: ChannelProfile,
}

/// Resolve the target date and channel profile from CLI inputs
///
/// The date defaults to today; the channel must resolve against the
/// built-in profiles or the optional channels file (file entries win).
pub fn resolve(
    date: Option<String>,
    channel_name: &str,
    channels_file: Option<&Path>,
) -> Result<RunConfig> {
    let target_date = match date {
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .with_context(|| format!("Invalid --date value: {} (expected YYYY-MM-DD)", raw))?,
        None => Local::now().date_naive(),
    };

    let extra = match channels_file {
        Some(path) => channel::load_channels(path)
            .with_context(|| format!("Failed to load channels file: {}", path.display()))?,
        None => Vec::new(),
    };

    let channel = channel::resolve_channel(channel_name, &extra)?;

    tracing::debug!(
        "Run config: date {}, channel {} ({} stages)",
        target_date,
        channel.name,
        channel.stages.len()
    );

    Ok(RunConfig {
        target_date,
        channel,
    })
}
