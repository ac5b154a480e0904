use crate::api::ReleaseSource;
use crate::error::UpdaterError;
use crate::state::{DownloadRecord, RecordStore};
use crate::statistics::{ItemOutcome, Statistics};
use crate::update::GithubPlugin;
use regex::Regex;
use std::path::PathBuf;

/// Keeps plugins published as GitHub release assets up to date.
///
/// Which asset was last written to each output path is remembered in a
/// [`RecordStore`], so an asset is only downloaded when its id changes.
pub struct GithubReleaseUpdater<S> {
    source: S,
    store: RecordStore,
    plugin_directory: PathBuf,
    plugins: &'static [GithubPlugin],
}

impl<S: ReleaseSource> GithubReleaseUpdater<S> {
    pub fn new(
        source: S,
        store: RecordStore,
        plugin_directory: impl Into<PathBuf>,
        plugins: &'static [GithubPlugin],
    ) -> Self {
        Self {
            source,
            store,
            plugin_directory: plugin_directory.into(),
            plugins,
        }
    }

    /// Check every configured plugin once and persist the new record.
    ///
    /// Only setting up or saving the record can fail the run as a whole. The
    /// saved record contains exactly the plugins resolved during this run.
    pub async fn run(&self) -> Result<Statistics, UpdaterError> {
        tracing::info!("Checking for GitHub plugin updates...");

        self.store.prepare().await?;
        let previous = self.store.load().await;
        if previous.is_empty() {
            tracing::debug!("No release assets recorded yet");
        } else {
            tracing::debug!("Loaded {} recorded release assets", previous.len());
        }

        let mut current = DownloadRecord::new();
        let mut statistics = Statistics::new();

        for plugin in self.plugins {
            let outcome = self.update(plugin, &previous, &mut current).await;
            statistics.record(format!("github {}", plugin.repository), outcome);
        }

        self.store.save(&current).await.map_err(|e| {
            tracing::error!(
                "Failed to save download record to {}: {}",
                self.store.path().display(),
                e
            );
            e
        })?;

        Ok(statistics)
    }

    #[tracing::instrument(skip_all, fields(repository = plugin.repository))]
    async fn update(
        &self,
        plugin: &GithubPlugin,
        previous: &DownloadRecord,
        current: &mut DownloadRecord,
    ) -> ItemOutcome {
        match self.try_update(plugin, previous, current).await {
            Ok(v) => v,
            Err(err) => {
                tracing::warn!("Download failed: {}", err);
                ItemOutcome::Failed(err)
            }
        }
    }

    async fn try_update(
        &self,
        plugin: &GithubPlugin,
        previous: &DownloadRecord,
        current: &mut DownloadRecord,
    ) -> Result<ItemOutcome, UpdaterError> {
        let pattern = Regex::new(plugin.pattern())?;
        let asset = self.source.search(plugin.repository, None, &pattern).await?;

        if asset.is_missing() {
            tracing::debug!("No release asset of {} matches {}", plugin.repository, pattern);
            return Ok(ItemOutcome::Skipped(format!(
                "no release asset matches {}",
                pattern
            )));
        }

        let output = self.plugin_directory.join(plugin.file_name);
        let output_key = output.to_string_lossy().into_owned();

        let outcome = if previous.get(&output_key) == asset.id {
            tracing::info!("{} is the latest.", plugin.repository);
            ItemOutcome::UpToDate
        } else {
            self.source
                .download(&asset, &self.plugin_directory, plugin.file_name)
                .await?;
            tracing::info!("{} downloaded as: {}", plugin.repository, output.display());
            ItemOutcome::Downloaded(output)
        };

        current.insert(output_key, asset.id);

        Ok(outcome)
    }
}
