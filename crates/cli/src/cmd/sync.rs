//! Mirror the live tree into the archive's staging directory

use crate::settings::Settings;
use anyhow::Result;

pub async fn run(settings: &Settings, source: Option<&str>, address: Option<&str>) -> Result<()> {
    let source = source.unwrap_or(&settings.backup_src);
    let address = address.unwrap_or(&settings.address);

    let command = archive::sync_command(source, address, &settings.archive);

    let executor = settings.executor()?;
    let _lock = executor.lock("sync")?;
    executor.run(&command).await?;

    if !executor.is_dry_run() {
        tracing::info!(source, "Synchronized staging tree");
    }
    Ok(())
}
