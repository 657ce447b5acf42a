// SPDX-License-Identifier: MPL-2.0-only

use std::{rc::Rc, time::Duration};

use anyhow::Result;
use calloop::{channel, EventLoop, LoopSignal};
use cosmic_dock_icon::LocalWorkspace;
use cosmic_dock_icon_config::CosmicDockIconConfig;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config_watching;
mod desktop_entry;
mod dock;
mod icon_loader;
mod process_watcher;

use dock::Dock;
use process_watcher::ProcessEvent;

/// Messages from helper threads to the dock's event loop
#[derive(Debug)]
pub enum DockMsg {
    Process(ProcessEvent),
    Config(CosmicDockIconConfig),
    Shutdown,
}

struct DockState {
    dock: Dock,
    signal: LoopSignal,
}

fn init_logging() -> Result<()> {
    let fmt_layer = fmt::layer().with_target(false);
    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;
    if let Ok(journal_layer) = tracing_journald::layer() {
        tracing_subscriber::registry()
            .with(fmt_layer)
            .with(filter_layer)
            .with(journal_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt_layer)
            .with(filter_layer)
            .init();
    }
    Ok(())
}

/// Resolve `ids`, load their icons and add them to the dock
fn add_pinned(dock: &mut Dock, ids: &[String]) {
    let size = dock.config().icon_size.pixels().round() as u32;
    for entry in desktop_entry::resolve(ids) {
        let image = match icon_loader::load_icon(entry.icon.as_deref(), size) {
            Ok(image) => image,
            Err(err) => {
                error!("Failed to create icon for {}: {:?}", entry.id, err);
                continue;
            }
        };
        let id = entry.id.clone();
        if let Err(err) = dock.add(entry, image) {
            error!("Failed to add {} to the dock: {}", id, err);
        }
    }
}

fn main() -> Result<()> {
    init_logging()?;
    log_panics::init();

    let arg = std::env::args().nth(1);
    let usage = "USAGE: cosmic-dock-icon";
    let config = match arg.as_ref().map(|s| &s[..]) {
        Some(arg) if arg == "--help" || arg == "-h" => {
            println!("{}", usage);
            std::process::exit(1);
        }
        None => match CosmicDockIconConfig::load() {
            Ok(c) => c,
            Err(e) => {
                warn!("Falling back to default dock icon configuration: {:?}", e);
                CosmicDockIconConfig::default()
            }
        },
        _ => {
            println!("{}", usage);
            std::process::exit(1);
        }
    };

    let mut event_loop: EventLoop<DockState> = EventLoop::try_new()?;
    let workspace = Rc::new(LocalWorkspace::new());
    let mut dock = Dock::new(config.clone(), workspace);
    add_pinned(&mut dock, &config.pinned);
    info!("Dock started with {} icons", dock.icons().count());

    let (tx, rx) = channel::sync_channel(100);
    event_loop
        .handle()
        .insert_source(rx, |event, _, state: &mut DockState| match event {
            channel::Event::Msg(DockMsg::Process(event)) => {
                state.dock.handle_process_event(&event);
            }
            channel::Event::Msg(DockMsg::Config(config)) => {
                let added = state.dock.apply_config(config);
                add_pinned(&mut state.dock, &added);
            }
            channel::Event::Msg(DockMsg::Shutdown) | channel::Event::Closed => {
                state.dock.shutdown();
                state.signal.stop();
            }
        })
        .map_err(|err| anyhow::anyhow!("Failed to insert dock event source: {}", err))?;

    let _config_watcher = match config_watching::watch_config(tx.clone()) {
        Ok(watcher) => Some(watcher),
        Err(err) => {
            warn!("Config changes won't be picked up: {:?}", err);
            None
        }
    };
    let _process_watcher = process_watcher::spawn(tx, config.poll_interval());

    let mut state = DockState { dock, signal: event_loop.get_signal() };
    event_loop.run(None::<Duration>, &mut state, |state| {
        state.dock.flush();
    })?;

    info!("Dock exited");
    Ok(())
}
