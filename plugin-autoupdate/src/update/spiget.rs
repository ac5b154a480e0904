use crate::api::{ResourceDownload as _, ResourceHost};
use crate::error::UpdaterError;
use crate::files::{StagedFile, sha1_file};
use crate::statistics::{ItemOutcome, Statistics};
use crate::update::SpigetPlugin;
use reqwest::StatusCode;
use std::path::PathBuf;

/// Keeps Spiget-hosted plugins in sync with their remote SHA-1.
pub struct SpigetUpdater<H> {
    host: H,
    plugin_directory: PathBuf,
    plugins: &'static [SpigetPlugin],
}

impl<H: ResourceHost> SpigetUpdater<H> {
    pub fn new(
        host: H,
        plugin_directory: impl Into<PathBuf>,
        plugins: &'static [SpigetPlugin],
    ) -> Self {
        Self {
            host,
            plugin_directory: plugin_directory.into(),
            plugins,
        }
    }

    /// Check every configured plugin once, in order.
    pub async fn run(&self) -> Statistics {
        tracing::info!("Checking for Spiget plugin updates...");

        let mut statistics = Statistics::new();
        for plugin in self.plugins {
            let outcome = self.update(plugin).await;
            statistics.record(format!("spiget resource {}", plugin.resource_id), outcome);
        }

        statistics
    }

    #[tracing::instrument(skip(self), fields(resource_id = plugin.resource_id))]
    async fn update(&self, plugin: &SpigetPlugin) -> ItemOutcome {
        let target = self.plugin_directory.join(plugin.file_name);

        match self.try_update(plugin.resource_id, target).await {
            Ok(v) => v,
            Err(err) => {
                tracing::warn!("An error occurred while downloading the plugin: {}", err);
                ItemOutcome::Failed(err)
            }
        }
    }

    async fn try_update(
        &self,
        resource_id: u64,
        target: PathBuf,
    ) -> Result<ItemOutcome, UpdaterError> {
        let download = self.host.request(resource_id).await?;

        tokio::fs::create_dir_all(&self.plugin_directory).await?;

        let local_sha1 = sha1_file(&target).await?;

        if let (Some(remote), Some(local)) = (download.sha1(), local_sha1.as_deref())
            && remote.eq_ignore_ascii_case(local)
        {
            tracing::info!(
                "{} already exists locally with matching SHA-1 {}",
                target.display(),
                local
            );
            return Ok(ItemOutcome::UpToDate);
        }

        let status = download.status();
        if status != StatusCode::OK {
            return Err(UpdaterError::UnexpectedStatus(status));
        }

        let mut file = StagedFile::create(&target)?;
        let written = download.write_to(&mut file).await?;
        let saved = file.commit().await?;

        tracing::info!(
            "Download completed ({} bytes). File saved to: {}",
            written,
            saved.display()
        );

        Ok(ItemOutcome::Downloaded(saved))
    }
}
