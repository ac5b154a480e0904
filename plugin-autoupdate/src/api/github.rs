use super::{GithubRelease, ReleaseAsset, join_segments, stream_into};
use crate::error::UpdaterError;
use crate::files::StagedFile;
use regex::Regex;
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use std::path::Path;

const RELEASES_PER_PAGE: &str = "30";

/// Resolves and downloads release assets of source repositories.
#[allow(async_fn_in_trait)]
pub trait ReleaseSource {
    /// Find the best asset matching `pattern`.
    ///
    /// Returns [`ReleaseAsset::missing`] when nothing matches.
    async fn search(
        &self,
        repository: &str,
        tag: Option<&str>,
        pattern: &Regex,
    ) -> Result<ReleaseAsset, UpdaterError>;

    async fn download(
        &self,
        asset: &ReleaseAsset,
        directory: &Path,
        file_name: &str,
    ) -> Result<(), UpdaterError>;
}

#[derive(Debug, Clone)]
pub struct GithubReleasesApi {
    client: Client,
    base: Url,
    token: Option<String>,
}

impl GithubReleasesApi {
    pub fn new(client: Client, base: Url, token: Option<String>) -> Result<Self, UpdaterError> {
        if base.cannot_be_a_base() {
            return Err(UpdaterError::InvalidBaseUrl(base));
        }

        Ok(Self {
            client,
            base,
            token,
        })
    }

    fn releases_url(&self, repository: &str, tag: Option<&str>) -> Result<Url, UpdaterError> {
        let (owner, name) = split_repository(repository)?;

        match tag {
            Some(tag) => join_segments(&self.base, ["repos", owner, name, "releases", "tags", tag]),
            None => {
                let mut url = join_segments(&self.base, ["repos", owner, name, "releases"])?;
                url.query_pairs_mut().append_pair("per_page", RELEASES_PER_PAGE);
                Ok(url)
            }
        }
    }

    fn api_get(&self, url: Url) -> RequestBuilder {
        let request = self
            .client
            .get(url)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");

        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

impl ReleaseSource for GithubReleasesApi {
    #[tracing::instrument(skip(self, pattern), fields(pattern = pattern.as_str()))]
    async fn search(
        &self,
        repository: &str,
        tag: Option<&str>,
        pattern: &Regex,
    ) -> Result<ReleaseAsset, UpdaterError> {
        let response = self.api_get(self.releases_url(repository, tag)?).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!("No releases found for {}", repository);
            return Ok(ReleaseAsset::missing());
        }

        let data = response.error_for_status()?.bytes().await?;

        let releases: Vec<GithubRelease> = match tag {
            Some(_) => vec![serde_json::from_slice(&data)?],
            None => serde_json::from_slice(&data)?,
        };

        Ok(select_asset(&releases, pattern))
    }

    #[tracing::instrument(skip(self, asset), fields(asset = asset.name.as_str()))]
    async fn download(
        &self,
        asset: &ReleaseAsset,
        directory: &Path,
        file_name: &str,
    ) -> Result<(), UpdaterError> {
        let url = asset
            .download_url
            .clone()
            .ok_or_else(|| UpdaterError::MissingDownloadUrl(asset.name.clone()))?;

        tokio::fs::create_dir_all(directory).await?;

        let response = self.client.get(url).send().await?.error_for_status()?;

        let mut file = StagedFile::create(directory.join(file_name))?;
        let written = stream_into(response, &mut file).await?;
        file.commit().await?;

        tracing::debug!("Wrote {} bytes for asset {}", written, asset.name);

        Ok(())
    }
}

/// Pick the first matching asset, walking releases newest first and skipping drafts.
pub fn select_asset(releases: &[GithubRelease], pattern: &Regex) -> ReleaseAsset {
    releases
        .iter()
        .filter(|release| !release.draft)
        .find_map(|release| {
            let asset = release
                .assets
                .iter()
                .find(|asset| pattern.is_match(&asset.name))?;

            tracing::trace!(
                "Selected {} ({} bytes) from release {}",
                asset.name,
                asset.size,
                release.tag_name
            );

            Some(ReleaseAsset::from(asset))
        })
        .unwrap_or_else(ReleaseAsset::missing)
}

fn split_repository(repository: &str) -> Result<(&str, &str), UpdaterError> {
    match repository.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok((owner, name))
        }
        _ => Err(UpdaterError::InvalidRepository(repository.to_owned())),
    }
}
