// SPDX-License-Identifier: MPL-2.0-only

use std::{fs, path::PathBuf};

use anyhow::Context;
use calloop::channel::SyncSender;
use cosmic_dock_icon_config::CosmicDockIconConfig;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{error, info};

use crate::DockMsg;

/// Watch the config file and send every valid new version to the event loop.
///
/// The returned watcher stops watching when dropped.
pub fn watch_config(tx: SyncSender<DockMsg>) -> anyhow::Result<RecommendedWatcher> {
    let config_path = CosmicDockIconConfig::config_path()?;
    let config_dir = config_path
        .parent()
        .map(PathBuf::from)
        .context("Config path has no parent directory")?;
    // the file itself may not exist yet, so watch its directory
    fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create {}", config_dir.display()))?;

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| {
            let event = match res {
                Ok(event) => event,
                Err(err) => {
                    error!("Config watcher error: {:?}", err);
                    return;
                }
            };
            if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
                || !event.paths.iter().any(|p| p == &config_path)
            {
                return;
            }
            match CosmicDockIconConfig::load_from(&config_path) {
                Ok(config) => {
                    info!("Config changed, reloading");
                    if tx.send(DockMsg::Config(config)).is_err() {
                        error!("Failed to send config update");
                    }
                }
                Err(err) => error!("Ignoring invalid config: {:?}", err),
            }
        },
        notify::Config::default(),
    )?;
    watcher.watch(&config_dir, RecursiveMode::NonRecursive)?;
    info!("Watching {} for config changes", config_dir.display());
    Ok(watcher)
}
