// SPDX-License-Identifier: MPL-2.0-only

use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use cosmic_dock_icon::{
    DockIcon, IconImage, SubscriptionHandle, WorkspaceCallback, WorkspaceEvent, WorkspaceEventKind,
    WorkspaceService,
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Subscribe(String, SubscriptionHandle),
    Unsubscribe(SubscriptionHandle),
}

/// Workspace double that records every call and delivers events by hand,
/// including to callbacks whose subscription was already released.
#[derive(Default)]
struct RecordingWorkspace {
    calls: RefCell<Vec<Call>>,
    callbacks: RefCell<BTreeMap<SubscriptionHandle, WorkspaceCallback>>,
    released: RefCell<Vec<(SubscriptionHandle, WorkspaceCallback)>>,
}

impl RecordingWorkspace {
    fn deliver(&self, event: WorkspaceEvent) {
        for callback in self.callbacks.borrow_mut().values_mut() {
            callback(&event);
        }
    }

    /// imitate a platform that still flushes callbacks queued before unsubscription
    fn deliver_to_released(&self, event: WorkspaceEvent) {
        for (_, callback) in self.released.borrow_mut().iter_mut() {
            callback(&event);
        }
    }

    fn live(&self) -> usize {
        self.callbacks.borrow().len()
    }
}

impl WorkspaceService for RecordingWorkspace {
    fn subscribe(&self, filter: &str, callback: WorkspaceCallback) -> SubscriptionHandle {
        let handle = SubscriptionHandle::from_raw(self.calls.borrow().len() as u64 + 1);
        self.calls.borrow_mut().push(Call::Subscribe(filter.to_string(), handle));
        self.callbacks.borrow_mut().insert(handle, callback);
        handle
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) {
        self.calls.borrow_mut().push(Call::Unsubscribe(handle));
        if let Some(callback) = self.callbacks.borrow_mut().remove(&handle) {
            self.released.borrow_mut().push((handle, callback));
        }
    }
}

fn icon(name: &str) -> DockIcon {
    DockIcon::new(name, IconImage::placeholder(8, [255, 255, 255, 255]).unwrap())
}

#[test]
fn full_lifecycle() {
    let workspace = Rc::new(RecordingWorkspace::default());
    let mut icon = icon("Foo");
    icon.setup(workspace.clone()).unwrap();
    assert!(icon.is_set_up());

    workspace.deliver(WorkspaceEvent::new("Foo", WorkspaceEventKind::Launched));
    assert!(icon.is_active());
    workspace.deliver(WorkspaceEvent::new("Foo", WorkspaceEventKind::Terminated));
    assert!(!icon.is_active());

    icon.self_destruct();
    icon.self_destruct();
    assert_eq!(workspace.live(), 0);

    // queued callbacks reaching a destroyed icon are dropped without panicking
    workspace.deliver_to_released(WorkspaceEvent::new("Foo", WorkspaceEventKind::Launched));
    assert!(icon.active_light().is_none());

    let calls = workspace.calls.borrow();
    assert_eq!(
        *calls,
        vec![
            Call::Subscribe("Foo".into(), SubscriptionHandle::from_raw(1)),
            Call::Unsubscribe(SubscriptionHandle::from_raw(1)),
        ]
    );
}

#[test]
fn rename_subscribes_before_releasing() {
    let workspace = Rc::new(RecordingWorkspace::default());
    let mut icon = icon("Foo");
    icon.setup(workspace.clone()).unwrap();
    icon.set_app_name("Bar");

    assert_eq!(
        *workspace.calls.borrow(),
        vec![
            Call::Subscribe("Foo".into(), SubscriptionHandle::from_raw(1)),
            Call::Subscribe("Bar".into(), SubscriptionHandle::from_raw(2)),
            Call::Unsubscribe(SubscriptionHandle::from_raw(1)),
        ]
    );

    // the old callback double checks the name even if the platform keeps calling it
    workspace.deliver_to_released(WorkspaceEvent::new("Foo", WorkspaceEventKind::Launched));
    assert!(!icon.is_active());
    workspace.deliver(WorkspaceEvent::new("Bar", WorkspaceEventKind::Launched));
    assert!(icon.is_active());
}

#[test]
fn dropping_an_icon_releases_its_subscription() {
    let workspace = Rc::new(RecordingWorkspace::default());
    {
        let mut icon = icon("Foo");
        icon.setup(workspace.clone()).unwrap();
        assert_eq!(workspace.live(), 1);
    }
    assert_eq!(workspace.live(), 0);
    assert_eq!(
        workspace.calls.borrow().last(),
        Some(&Call::Unsubscribe(SubscriptionHandle::from_raw(1)))
    );
}

#[test]
fn icon_without_setup_never_subscribes() {
    let workspace = Rc::new(RecordingWorkspace::default());
    let mut icon = icon("Foo");
    icon.set_app_name("Bar");
    icon.self_destruct();
    assert!(workspace.calls.borrow().is_empty());
}
