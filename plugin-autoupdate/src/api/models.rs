use reqwest::Url;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct GithubRelease {
    pub tag_name: String,

    #[serde(default)]
    pub draft: bool,

    #[serde(default)]
    pub assets: Vec<GithubReleaseAsset>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubReleaseAsset {
    pub id: u64,
    pub name: String,
    pub browser_download_url: Url,

    #[serde(default)]
    pub size: u64,
}

/// A resolved release asset.
///
/// An id of `0` means no asset matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseAsset {
    pub id: u64,
    pub name: String,
    pub download_url: Option<Url>,
}

impl ReleaseAsset {
    pub fn missing() -> Self {
        Self {
            id: 0,
            name: String::new(),
            download_url: None,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.id == 0
    }
}

impl From<&GithubReleaseAsset> for ReleaseAsset {
    fn from(asset: &GithubReleaseAsset) -> Self {
        Self {
            id: asset.id,
            name: asset.name.clone(),
            download_url: Some(asset.browser_download_url.clone()),
        }
    }
}
