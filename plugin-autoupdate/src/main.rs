mod api;
mod args;
mod error;
mod files;
mod hooks;
mod state;
mod statistics;
mod update;

use clap::Parser as _;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use crate::api::{GithubReleasesApi, SpigetApi};
use crate::args::UpdaterArgs;
use crate::error::UpdaterError;
use crate::hooks::{HookPriority, StartupHooks};
use crate::state::RecordStore;
use crate::update::{GITHUB_PLUGINS, GithubReleaseUpdater, SPIGET_PLUGINS, SpigetUpdater};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("PLUGIN_AUTOUPDATE_LOG")
                .from_env_lossy(),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = UpdaterArgs::parse();

    let result = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build() {
        Ok(v) => v.block_on(async_main(args)),
        Err(err) => {
            tracing::error!("Failed to create tokio runtime: {:?}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = result {
        tracing::error!("Error: {:?}", err);
        std::process::exit(1);
    }
}

async fn async_main(args: UpdaterArgs) -> Result<(), UpdaterError> {
    tracing::trace!(
        "proxy = {}, state = {}",
        args.proxy_directory.display(),
        args.state_file.display()
    );

    let hooks = register_hooks(&args)?;
    if hooks.is_empty() {
        tracing::info!("All updaters are disabled, nothing to do.");
        return Ok(());
    }

    tracing::info!("Running {} startup hooks...", hooks.len());

    let reports = hooks.run_all().await;

    let failed = reports
        .iter()
        .filter(|r| r.result.is_err())
        .map(|r| r.name.as_str())
        .collect::<Vec<_>>();

    if !failed.is_empty() {
        tracing::warn!(
            "{} of {} startup hooks failed: {}",
            failed.len(),
            reports.len(),
            failed.join(", ")
        );
    }

    tracing::info!("Done.");

    Ok(())
}

/// Build the startup hook list with both plugin updaters.
fn register_hooks(args: &UpdaterArgs) -> Result<StartupHooks, UpdaterError> {
    let client = api::http_client()?;
    let plugin_directory = args.plugin_directory();
    let mut hooks = StartupHooks::new();

    if !args.no_spiget {
        let updater = SpigetUpdater::new(
            SpigetApi::new(client.clone(), args.spiget_base.clone())?,
            &plugin_directory,
            SPIGET_PLUGINS,
        );

        hooks.register("spiget plugin update", HookPriority::High, move || async move {
            Ok(updater.run().await)
        });
    }

    if !args.no_github {
        let updater = GithubReleaseUpdater::new(
            GithubReleasesApi::new(
                client,
                args.github_api_base.clone(),
                args.github_token.clone(),
            )?,
            RecordStore::new(&args.state_file),
            &plugin_directory,
            GITHUB_PLUGINS,
        );

        hooks.register("github plugin update", HookPriority::High, move || async move {
            updater.run().await
        });
    }

    Ok(hooks)
}
