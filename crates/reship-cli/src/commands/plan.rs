use anyhow::Result;
use console::style;
use reship_core::batch::OrderBatch;
use reship_core::source::SourceReader;
use std::path::Path;

pub fn execute(
    source: &Path,
    channel: &str,
    date: Option<String>,
    channels_file: Option<&Path>,
) -> Result<()> {
    let config = crate::config::resolve(date, channel, channels_file)?;

    tracing::debug!("Planning batch from: {}", source.display());
    let rows = SourceReader::from_file(source)?;
    let batch = OrderBatch::build(&rows, config.target_date, &config.channel.name);

    if batch.is_empty() {
        println!(
            "No {} exchange shipments for {}",
            config.channel.name, config.target_date
        );
        return Ok(());
    }

    println!(
        "{} {} exchange shipments for {}:",
        batch.len(),
        config.channel.name,
        config.target_date
    );
    for order in batch.iter() {
        let tracking = if order.has_tracking() {
            order.tracking_number.as_str()
        } else {
            "(no tracking yet)"
        };
        println!("  {}  {}", style(&order.order_id).cyan(), tracking);
    }

    Ok(())
}
