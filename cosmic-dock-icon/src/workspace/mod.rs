// SPDX-License-Identifier: MPL-2.0-only

mod local;

pub use local::*;

/// What happened to an application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkspaceEventKind {
    /// the application was started
    Launched,
    /// the application exited
    Terminated,
    /// one of the application's windows received focus
    FocusGained,
    /// the application lost focus
    FocusLost,
}

impl WorkspaceEventKind {
    /// state of the active light after this event
    pub fn is_active(self) -> bool {
        match self {
            Self::Launched | Self::FocusGained => true,
            Self::Terminated | Self::FocusLost => false,
        }
    }
}

/// Notification delivered to workspace subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceEvent {
    /// display name of the application
    pub app_name: String,
    /// what happened
    pub kind: WorkspaceEventKind,
}

impl WorkspaceEvent {
    /// create a new event
    pub fn new(app_name: impl Into<String>, kind: WorkspaceEventKind) -> Self {
        Self { app_name: app_name.into(), kind }
    }
}

/// Token for a live registration, released with [`WorkspaceService::unsubscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    /// wrap a service specific id
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// the service specific id
    pub fn as_raw(self) -> u64 {
        self.0
    }
}

/// callback invoked on the UI thread for every event matching a subscription
pub type WorkspaceCallback = Box<dyn FnMut(&WorkspaceEvent)>;

/// Registry of running applications and source of launch/terminate/focus events.
///
/// Everything runs on the UI thread, so implementations use interior mutability
/// and are shared between icons with `Rc`.
pub trait WorkspaceService {
    /// Register `callback` for events whose app name equals `filter`
    fn subscribe(&self, filter: &str, callback: WorkspaceCallback) -> SubscriptionHandle;

    /// Release a subscription. Its callback is never invoked again afterwards.
    fn unsubscribe(&self, handle: SubscriptionHandle);

    /// Whether the application is currently running, if the service knows
    fn is_running(&self, _app_name: &str) -> bool {
        false
    }
}
