// SPDX-License-Identifier: MPL-2.0-only

use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    fmt,
    rc::Rc,
};

use tracing::{trace, warn};

use super::{
    SubscriptionHandle, WorkspaceCallback, WorkspaceEvent, WorkspaceEventKind, WorkspaceService,
};

struct Subscriber {
    handle: SubscriptionHandle,
    filter: String,
    callback: Rc<RefCell<WorkspaceCallback>>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: Vec<Subscriber>,
    // app name -> number of running instances
    running: HashMap<String, usize>,
}

/// In-process workspace service.
///
/// Events are pushed in with [`LocalWorkspace::emit`] by whatever observes the
/// system and delivered synchronously, in subscription order.
#[derive(Default)]
pub struct LocalWorkspace {
    registry: RefCell<Registry>,
}

impl fmt::Debug for LocalWorkspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.borrow();
        f.debug_struct("LocalWorkspace")
            .field("subscribers", &registry.subscribers.len())
            .field("running", &registry.running)
            .finish()
    }
}

impl LocalWorkspace {
    /// create an empty workspace
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` to every matching subscriber, returns how many callbacks ran.
    pub fn emit(&self, event: WorkspaceEvent) -> usize {
        let targets: Vec<_> = {
            let mut registry = self.registry.borrow_mut();
            registry.track(&event);
            registry
                .subscribers
                .iter()
                .filter(|s| s.filter == event.app_name)
                .map(|s| (s.handle, s.callback.clone()))
                .collect()
        };

        let mut delivered = 0;
        for (handle, callback) in targets {
            // a callback earlier in this dispatch may have released this handle
            if !self.is_subscribed(handle) {
                continue;
            }
            let Ok(mut cb) = callback.try_borrow_mut() else {
                warn!("Skipping re-entrant delivery of {:?} to {:?}", event, handle);
                continue;
            };
            (&mut *cb)(&event);
            delivered += 1;
        }
        trace!("Delivered {:?} to {} subscribers", event, delivered);
        delivered
    }

    /// whether `handle` is still registered
    pub fn is_subscribed(&self, handle: SubscriptionHandle) -> bool {
        self.registry.borrow().subscribers.iter().any(|s| s.handle == handle)
    }

    /// number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.registry.borrow().subscribers.len()
    }

    /// names of all applications with at least one running instance
    pub fn running_apps(&self) -> HashSet<String> {
        self.registry.borrow().running.keys().cloned().collect()
    }
}

impl Registry {
    fn track(&mut self, event: &WorkspaceEvent) {
        match event.kind {
            WorkspaceEventKind::Launched => {
                *self.running.entry(event.app_name.clone()).or_default() += 1;
            }
            WorkspaceEventKind::Terminated => {
                if let Some(count) = self.running.get_mut(&event.app_name) {
                    *count -= 1;
                    if *count == 0 {
                        self.running.remove(&event.app_name);
                    }
                }
            }
            WorkspaceEventKind::FocusGained | WorkspaceEventKind::FocusLost => {}
        }
    }
}

impl WorkspaceService for LocalWorkspace {
    fn subscribe(&self, filter: &str, callback: WorkspaceCallback) -> SubscriptionHandle {
        let mut registry = self.registry.borrow_mut();
        registry.next_id += 1;
        let handle = SubscriptionHandle::from_raw(registry.next_id);
        registry.subscribers.push(Subscriber {
            handle,
            filter: filter.to_string(),
            callback: Rc::new(RefCell::new(callback)),
        });
        trace!("Subscribed {:?} for {}", handle, filter);
        handle
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) {
        let mut registry = self.registry.borrow_mut();
        let before = registry.subscribers.len();
        registry.subscribers.retain(|s| s.handle != handle);
        if registry.subscribers.len() == before {
            warn!("Tried to release unknown subscription {:?}", handle);
        }
    }

    fn is_running(&self, app_name: &str) -> bool {
        self.registry.borrow().running.contains_key(app_name)
    }
}
