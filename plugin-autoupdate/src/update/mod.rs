mod github;
mod spiget;

pub use github::GithubReleaseUpdater;
pub use spiget::SpigetUpdater;

/// Matches any jar asset.
pub const DEFAULT_ASSET_PATTERN: &str = r"\.jar$";

/// Plugins downloaded from Spiget.
pub const SPIGET_PLUGINS: &[SpigetPlugin] = &[
    SpigetPlugin::new(19254, "ViaVersion.jar"),
    SpigetPlugin::new(27448, "ViaBackwards.jar"),
    SpigetPlugin::new(52109, "ViaRewind.jar"),
];

/// Plugins downloaded from GitHub releases.
pub const GITHUB_PLUGINS: &[GithubPlugin] = &[
    GithubPlugin::new("CakeDreamer/ProxiedProxy", "ProxiedProxy.jar"),
    GithubPlugin::new("MUAlliance/UnionProxyExtension", "UnionProxyExtension.jar"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpigetPlugin {
    pub resource_id: u64,
    pub file_name: &'static str,
}

impl SpigetPlugin {
    pub const fn new(resource_id: u64, file_name: &'static str) -> Self {
        Self {
            resource_id,
            file_name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GithubPlugin {
    pub repository: &'static str,
    pub file_name: &'static str,
    pub pattern: Option<&'static str>,
}

impl GithubPlugin {
    pub const fn new(repository: &'static str, file_name: &'static str) -> Self {
        Self {
            repository,
            file_name,
            pattern: None,
        }
    }

    /// Use a custom regex instead of [`DEFAULT_ASSET_PATTERN`].
    #[cfg(test)]
    pub const fn with_pattern(self, pattern: &'static str) -> Self {
        Self {
            pattern: Some(pattern),
            ..self
        }
    }

    pub fn pattern(&self) -> &'static str {
        self.pattern.unwrap_or(DEFAULT_ASSET_PATTERN)
    }
}
