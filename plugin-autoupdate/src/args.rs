use clap::Parser;
use std::path::PathBuf;
use url::Url;

#[derive(Debug, Clone, Parser)]
#[command(version, about = "Updates proxy plugins from Spiget and GitHub releases")]
pub struct UpdaterArgs {
    #[arg(short, long, default_value = "proxy", env = "PLUGIN_AUTOUPDATE_PROXY_DIR")]
    pub proxy_directory: PathBuf,

    #[arg(
        short,
        long,
        default_value = "extensions/conf/autoupdate_plugins.txt",
        env = "PLUGIN_AUTOUPDATE_STATE_FILE"
    )]
    pub state_file: PathBuf,

    #[arg(
        long,
        default_value = "https://api.spiget.org/v2/resources",
        env = "PLUGIN_AUTOUPDATE_SPIGET_BASE"
    )]
    pub spiget_base: Url,

    #[arg(
        long,
        default_value = "https://api.github.com/",
        env = "PLUGIN_AUTOUPDATE_GITHUB_API"
    )]
    pub github_api_base: Url,

    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    #[arg(long, default_value_t = false)]
    pub no_spiget: bool,

    #[arg(long, default_value_t = false)]
    pub no_github: bool,
}

impl UpdaterArgs {
    /// Directory the proxy loads its plugins from.
    pub fn plugin_directory(&self) -> PathBuf {
        self.proxy_directory.join("plugins")
    }
}
