// SPDX-License-Identifier: MPL-2.0-only

use std::{collections::HashSet, rc::Rc};

use cosmic_dock_icon::{
    DockIcon, DockIconError, IconImage, LocalWorkspace, WorkspaceEvent, WorkspaceEventKind,
};
use cosmic_dock_icon_config::CosmicDockIconConfig;
use tracing::{debug, error, info, trace};

use crate::{desktop_entry::AppEntry, process_watcher::ProcessEvent};

/// The pinned icons of the dock, all driven from the event loop's thread
#[derive(Debug)]
pub struct Dock {
    config: CosmicDockIconConfig,
    workspace: Rc<LocalWorkspace>,
    icons: Vec<(AppEntry, DockIcon)>,
    // executables seen by the process watcher
    running: HashSet<String>,
}

impl Dock {
    pub fn new(config: CosmicDockIconConfig, workspace: Rc<LocalWorkspace>) -> Self {
        Self { config, workspace, icons: Vec::new(), running: HashSet::new() }
    }

    pub fn config(&self) -> &CosmicDockIconConfig {
        &self.config
    }

    pub fn icons(&self) -> impl Iterator<Item = &DockIcon> {
        self.icons.iter().map(|(_, icon)| icon)
    }

    pub fn icon(&self, id: &str) -> Option<&DockIcon> {
        self.icons.iter().find(|(entry, _)| entry.id == id).map(|(_, icon)| icon)
    }

    /// Create, configure and set up the icon for `entry`, keeping pinned order.
    pub fn add(&mut self, entry: AppEntry, image: IconImage) -> Result<(), DockIconError> {
        if self.icon(&entry.id).is_some() {
            debug!("{} is already in the dock", entry.id);
            return Ok(());
        }
        let mut icon = DockIcon::new(self.unique_name(&entry), image);
        configure(&mut icon, &self.config)?;
        icon.setup(self.workspace.clone())?;
        info!("Added {} to the dock as {}", entry.id, icon.app_name());
        if self.is_running(&entry) {
            self.workspace
                .emit(WorkspaceEvent::new(icon.app_name(), WorkspaceEventKind::Launched));
        }

        let rank =
            |id: &str| self.config.pinned.iter().position(|p| p == id).unwrap_or(usize::MAX);
        let new_rank = rank(&entry.id);
        let index = self
            .icons
            .iter()
            .position(|(e, _)| rank(&e.id) > new_rank)
            .unwrap_or(self.icons.len());
        self.icons.insert(index, (entry, icon));
        Ok(())
    }

    /// Tear down and drop the icon for `id`
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(index) = self.icons.iter().position(|(entry, _)| entry.id == id) else {
            return false;
        };
        let (entry, mut icon) = self.icons.remove(index);
        let app_name = icon.app_name().to_string();
        icon.self_destruct();
        // balance the launch published for this icon
        if self.is_running(&entry) {
            self.workspace.emit(WorkspaceEvent::new(app_name, WorkspaceEventKind::Terminated));
        }
        info!("Removed {} from the dock", entry.id);
        true
    }

    /// Apply a reloaded config to every icon and drop icons that are no longer
    /// pinned. Returns the newly pinned ids, which the caller still has to add.
    pub fn apply_config(&mut self, config: CosmicDockIconConfig) -> Vec<String> {
        let unpinned: Vec<String> = self
            .icons
            .iter()
            .filter(|(entry, _)| !config.pinned.contains(&entry.id))
            .map(|(entry, _)| entry.id.clone())
            .collect();
        for id in unpinned {
            self.remove(&id);
        }

        for (entry, icon) in &mut self.icons {
            if let Err(err) = configure(icon, &config) {
                error!("Failed to apply config to {}: {}", entry.id, err);
            }
        }

        let added = config
            .pinned
            .iter()
            .filter(|id| self.icon(id).is_none())
            .cloned()
            .collect();
        self.config = config;
        added
    }

    /// The workspace filters by app name, so every icon needs its own. Entries
    /// sharing a display name are told apart by their desktop id.
    fn unique_name(&self, entry: &AppEntry) -> String {
        if self.icons().any(|icon| icon.app_name() == entry.name) {
            format!("{} ({})", entry.name, entry.id)
        } else {
            entry.name.clone()
        }
    }

    fn is_running(&self, entry: &AppEntry) -> bool {
        entry.executable.as_ref().is_some_and(|exe| self.running.contains(exe))
    }

    /// Publish a process change to the workspace under the name of every
    /// pinned icon it belongs to. Returns how many icons were notified.
    pub fn handle_process_event(&mut self, event: &ProcessEvent) -> usize {
        let (executable, kind) = match event {
            ProcessEvent::Started(name) => (name, WorkspaceEventKind::Launched),
            ProcessEvent::Exited(name) => (name, WorkspaceEventKind::Terminated),
        };
        let changed = match kind {
            WorkspaceEventKind::Launched => self.running.insert(executable.clone()),
            _ => self.running.remove(executable),
        };
        if !changed {
            return 0;
        }
        let app_names: Vec<String> = self
            .icons
            .iter()
            .filter(|(entry, _)| entry.executable.as_deref() == Some(executable.as_str()))
            .map(|(_, icon)| icon.app_name().to_string())
            .collect();
        app_names
            .into_iter()
            .map(|app_name| self.workspace.emit(WorkspaceEvent::new(app_name, kind)))
            .sum()
    }

    /// Drain invalidations after a dispatch, returns how many icons need painting.
    pub fn flush(&mut self) -> usize {
        let mut damaged = 0;
        for (entry, icon) in &mut self.icons {
            if let Some(invalidation) = icon.take_invalidation() {
                trace!(
                    "{:?} for {} (size {}, lit {})",
                    invalidation,
                    entry.id,
                    icon.icon_size(),
                    icon.active_light().is_some_and(|light| light.is_lit())
                );
                damaged += 1;
            }
        }
        damaged
    }

    /// Tear down every icon
    pub fn shutdown(&mut self) {
        for (_, icon) in &mut self.icons {
            icon.self_destruct();
        }
        self.icons.clear();
        debug!("Dock shut down, {} subscriptions left", self.workspace.subscriber_count());
    }
}

fn configure(icon: &mut DockIcon, config: &CosmicDockIconConfig) -> Result<(), DockIconError> {
    icon.set_icon_size(config.icon_size.pixels())?;
    icon.set_active_light_diameter(config.active_light_diameter)?;
    if icon.show_label() != config.show_labels {
        icon.set_label_visibility(config.show_labels);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use cosmic_dock_icon::WorkspaceService;
    use cosmic_dock_icon_config::IconSize;

    use super::*;

    fn entry(id: &str, name: &str, executable: &str) -> AppEntry {
        AppEntry {
            id: id.into(),
            name: name.into(),
            executable: Some(executable.into()),
            icon: None,
        }
    }

    fn image() -> IconImage {
        IconImage::placeholder(4, [0, 0, 0, 255]).unwrap()
    }

    fn dock(pinned: &[&str]) -> Dock {
        let config = CosmicDockIconConfig {
            pinned: pinned.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        };
        Dock::new(config, Rc::new(LocalWorkspace::new()))
    }

    #[test]
    fn keeps_pinned_order() {
        let mut dock = dock(&["a", "b", "c"]);
        dock.add(entry("c", "C", "c"), image()).unwrap();
        dock.add(entry("a", "A", "a"), image()).unwrap();
        dock.add(entry("b", "B", "b"), image()).unwrap();
        dock.add(entry("a", "A", "a"), image()).unwrap();

        let names: Vec<_> = dock.icons().map(|icon| icon.app_name().to_string()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(dock.workspace.subscriber_count(), 3);
    }

    #[test]
    fn process_events_reach_the_matching_icon() {
        let mut dock = dock(&["org.mozilla.firefox", "com.system76.CosmicTerm"]);
        dock.add(entry("org.mozilla.firefox", "Firefox", "firefox"), image()).unwrap();
        dock.add(entry("com.system76.CosmicTerm", "Terminal", "cosmic-term"), image())
            .unwrap();

        assert_eq!(dock.handle_process_event(&ProcessEvent::Started("firefox".into())), 1);
        assert!(dock.icon("org.mozilla.firefox").unwrap().is_active());
        assert!(!dock.icon("com.system76.CosmicTerm").unwrap().is_active());

        assert_eq!(dock.handle_process_event(&ProcessEvent::Started("bash".into())), 0);
        dock.handle_process_event(&ProcessEvent::Exited("firefox".into()));
        assert!(!dock.icon("org.mozilla.firefox").unwrap().is_active());
    }

    #[test]
    fn icons_added_late_see_running_apps() {
        let mut dock = dock(&["org.mozilla.firefox"]);
        assert_eq!(dock.handle_process_event(&ProcessEvent::Started("firefox".into())), 0);
        dock.add(entry("org.mozilla.firefox", "Firefox", "firefox"), image()).unwrap();
        assert!(dock.icon("org.mozilla.firefox").unwrap().is_active());
        assert!(dock.workspace.is_running("Firefox"));

        // unpinning a running app leaves no stale running state behind
        dock.remove("org.mozilla.firefox");
        assert!(dock.workspace.running_apps().is_empty());
        dock.add(entry("org.mozilla.firefox", "Firefox", "firefox"), image()).unwrap();
        dock.handle_process_event(&ProcessEvent::Exited("firefox".into()));
        assert!(!dock.icon("org.mozilla.firefox").unwrap().is_active());
        assert!(!dock.workspace.is_running("Firefox"));
    }

    #[test]
    fn shared_display_names_stay_apart() {
        let mut dock = dock(&["org.gnome.Terminal", "com.system76.CosmicTerm"]);
        dock.add(entry("org.gnome.Terminal", "Terminal", "gnome-terminal"), image()).unwrap();
        dock.add(entry("com.system76.CosmicTerm", "Terminal", "cosmic-term"), image()).unwrap();
        assert_eq!(
            dock.icon("com.system76.CosmicTerm").unwrap().app_name(),
            "Terminal (com.system76.CosmicTerm)"
        );

        assert_eq!(dock.handle_process_event(&ProcessEvent::Started("cosmic-term".into())), 1);
        assert!(!dock.icon("org.gnome.Terminal").unwrap().is_active());
        assert!(dock.icon("com.system76.CosmicTerm").unwrap().is_active());

        dock.remove("com.system76.CosmicTerm");
        assert!(dock.workspace.running_apps().is_empty());
        dock.handle_process_event(&ProcessEvent::Started("gnome-terminal".into()));
        assert!(dock.icon("org.gnome.Terminal").unwrap().is_active());
    }

    #[test]
    fn reload_resizes_and_unpins() {
        let mut dock = dock(&["a", "b"]);
        dock.add(entry("a", "A", "a"), image()).unwrap();
        dock.add(entry("b", "B", "b"), image()).unwrap();
        dock.flush();

        let config = CosmicDockIconConfig {
            icon_size: IconSize::XL,
            show_labels: false,
            pinned: vec!["b".into(), "c".into()],
            ..dock.config().clone()
        };
        let added = dock.apply_config(config);

        assert_eq!(added, vec!["c".to_string()]);
        assert!(dock.icon("a").is_none());
        assert_eq!(dock.workspace.subscriber_count(), 1);
        let b = dock.icon("b").unwrap();
        assert_eq!(b.icon_size(), 80.0);
        assert!(!b.show_label());
        assert_eq!(dock.flush(), 1);
    }

    #[test]
    fn shutdown_releases_everything() {
        let mut dock = dock(&["a"]);
        dock.add(entry("a", "A", "a"), image()).unwrap();
        dock.shutdown();
        assert_eq!(dock.icons().count(), 0);
        assert_eq!(dock.workspace.subscriber_count(), 0);
        assert_eq!(dock.handle_process_event(&ProcessEvent::Started("a".into())), 0);
    }
}
