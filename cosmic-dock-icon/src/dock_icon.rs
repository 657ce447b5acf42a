// SPDX-License-Identifier: MPL-2.0-only

use std::{
    cell::{Cell, Ref, RefCell},
    fmt,
    rc::{Rc, Weak},
};

use tracing::{debug, trace, warn};

use crate::{
    error::{positive, DockIconError},
    workspace::{SubscriptionHandle, WorkspaceEvent, WorkspaceService},
    ActiveLight, IconImage, Invalidation,
};

/// icon edge length used until the host configures one
pub const DEFAULT_ICON_SIZE: f32 = 48.0;
/// active light diameter used until the host configures one
pub const DEFAULT_ACTIVE_LIGHT_DIAMETER: f32 = 6.0;

/// A single application in the dock: its image, label and active light.
///
/// The icon is plain state. A host paints it after draining
/// [`DockIcon::take_invalidation`] and feeds workspace notifications to it
/// through the [`WorkspaceService`] passed to [`DockIcon::setup`].
///
/// Lifecycle: `new` -> `setup` -> mutations and notifications -> `self_destruct`.
/// Dropping the icon tears it down as well.
pub struct DockIcon {
    icon_image: Option<IconImage>,
    icon_size: f32,
    app_name: String,
    show_label: bool,
    active_light_diameter: f32,
    active_light: Option<Rc<RefCell<ActiveLight>>>,
    workspace: Option<Rc<dyn WorkspaceService>>,
    subscription: Option<SubscriptionHandle>,
    // shared with the notification callbacks, which compare against the
    // current name rather than the one they were subscribed under
    destroyed: Rc<Cell<bool>>,
    tracked_name: Rc<RefCell<String>>,
    pending: Option<Invalidation>,
}

impl fmt::Debug for DockIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DockIcon")
            .field("app_name", &self.app_name)
            .field("icon_size", &self.icon_size)
            .field("show_label", &self.show_label)
            .field("active_light", &self.active_light)
            .field("subscription", &self.subscription)
            .field("destroyed", &self.destroyed.get())
            .finish()
    }
}

impl DockIcon {
    /// create an icon which is not yet connected to a workspace
    pub fn new(app_name: impl Into<String>, icon_image: IconImage) -> Self {
        let app_name = app_name.into();
        Self {
            icon_image: Some(icon_image),
            icon_size: DEFAULT_ICON_SIZE,
            tracked_name: Rc::new(RefCell::new(app_name.clone())),
            app_name,
            show_label: true,
            active_light_diameter: DEFAULT_ACTIVE_LIGHT_DIAMETER,
            active_light: None,
            workspace: None,
            subscription: None,
            destroyed: Rc::new(Cell::new(false)),
            pending: Some(Invalidation::Layout),
        }
    }

    /// Create the active light and subscribe to workspace notifications for this app.
    ///
    /// Calling it again on a set up icon does nothing, a destroyed icon can't be set up.
    pub fn setup(&mut self, workspace: Rc<dyn WorkspaceService>) -> Result<(), DockIconError> {
        if self.is_destroyed() {
            return Err(DockIconError::AlreadyDestroyed);
        }
        if self.is_set_up() {
            debug!("Dock icon for {} is already set up", self.app_name);
            return Ok(());
        }

        let light = Rc::new(RefCell::new(ActiveLight::new(self.active_light_diameter)?));
        light.borrow_mut().set_active(workspace.is_running(&self.app_name));
        let handle = self.subscribe(&*workspace, &light);

        self.active_light = Some(light);
        self.subscription = Some(handle);
        self.workspace = Some(workspace);
        self.invalidate(Invalidation::Layout);
        debug!("Dock icon for {} set up with {:?}", self.app_name, handle);
        Ok(())
    }

    fn subscribe(
        &self,
        workspace: &dyn WorkspaceService,
        light: &Rc<RefCell<ActiveLight>>,
    ) -> SubscriptionHandle {
        let app_name = self.tracked_name.clone();
        let destroyed = self.destroyed.clone();
        let light = Rc::downgrade(light);
        workspace.subscribe(
            &self.app_name,
            Box::new(move |event| {
                sync_active_light(event, &app_name, &destroyed, &light);
            }),
        )
    }

    /// whether `setup` completed and the icon was not torn down since
    pub fn is_set_up(&self) -> bool {
        self.subscription.is_some()
    }

    /// whether `self_destruct` ran
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    /// whether the label is rendered
    pub fn show_label(&self) -> bool {
        self.show_label
    }

    /// Show or hide the label. The label text is kept either way.
    pub fn set_label_visibility(&mut self, is_visible: bool) {
        if self.is_destroyed() {
            return;
        }
        self.show_label = is_visible;
        self.invalidate(Invalidation::Redraw);
    }

    /// the current image, `None` once the icon is destroyed
    pub fn icon_image(&self) -> Option<&IconImage> {
        self.icon_image.as_ref()
    }

    /// Replace the image. The icon must always have something to display,
    /// so `None` is rejected and the previous image is kept.
    pub fn set_icon_image(&mut self, icon_image: Option<IconImage>) -> Result<(), DockIconError> {
        let icon_image = icon_image
            .ok_or_else(|| DockIconError::invalid(format!("missing icon image for {}", self.app_name)))?;
        if self.is_destroyed() {
            return Ok(());
        }
        self.icon_image = Some(icon_image);
        self.invalidate(Invalidation::Layout);
        Ok(())
    }

    /// edge length of the square icon in logical pixels
    pub fn icon_size(&self) -> f32 {
        self.icon_size
    }

    /// Resize the icon. The host lays out the icon and its active light again.
    pub fn set_icon_size(&mut self, icon_size: f32) -> Result<(), DockIconError> {
        let icon_size = positive(icon_size, "icon size")?;
        if self.is_destroyed() {
            return Ok(());
        }
        self.icon_size = icon_size;
        self.invalidate(Invalidation::Layout);
        Ok(())
    }

    /// diameter used for the active light
    pub fn active_light_diameter(&self) -> f32 {
        self.active_light_diameter
    }

    /// Resize the active light, forwarded to the light if it exists.
    pub fn set_active_light_diameter(&mut self, diameter: f32) -> Result<(), DockIconError> {
        let diameter = positive(diameter, "active light diameter")?;
        if self.is_destroyed() {
            return Ok(());
        }
        self.active_light_diameter = diameter;
        if let Some(light) = &self.active_light {
            light.borrow_mut().set_diameter(diameter)?;
        }
        self.invalidate(Invalidation::Layout);
        Ok(())
    }

    /// the application's display name, also used as the label
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Rename the icon. A live subscription follows the new name: the new
    /// filter is registered before the old one is released, so no event slips
    /// through in between.
    pub fn set_app_name(&mut self, app_name: impl Into<String>) {
        let app_name = app_name.into();
        if self.is_destroyed() || app_name == self.app_name {
            return;
        }
        debug!("Renaming dock icon {} to {}", self.app_name, app_name);
        self.tracked_name.replace(app_name.clone());
        self.app_name = app_name;

        if let (Some(workspace), Some(light), Some(old)) =
            (self.workspace.clone(), self.active_light.clone(), self.subscription)
        {
            let handle = self.subscribe(&*workspace, &light);
            workspace.unsubscribe(old);
            self.subscription = Some(handle);
            light.borrow_mut().set_active(workspace.is_running(&self.app_name));
        }
        self.invalidate(Invalidation::Redraw);
    }

    /// Show or hide the active light.
    ///
    /// Fails with [`DockIconError::NotInitialized`] before `setup` and after
    /// `self_destruct`, which hosts usually ignore.
    pub fn set_active_light_visibility(&mut self, is_visible: bool) -> Result<(), DockIconError> {
        let light = self.active_light.as_ref().ok_or(DockIconError::NotInitialized)?;
        let mut light = light.borrow_mut();
        if is_visible {
            light.show();
        } else {
            light.hide();
        }
        Ok(())
    }

    /// the active light, while the icon is set up
    pub fn active_light(&self) -> Option<Ref<'_, ActiveLight>> {
        self.active_light.as_ref().map(|light| light.borrow())
    }

    /// whether the application is considered running or focused
    pub fn is_active(&self) -> bool {
        self.active_light().map(|light| light.is_active()).unwrap_or(false)
    }

    /// Strongest invalidation raised since the last call, including changes
    /// made to the active light by workspace notifications.
    pub fn take_invalidation(&mut self) -> Option<Invalidation> {
        let light_dirty = self
            .active_light
            .as_ref()
            .map(|light| light.borrow_mut().take_dirty())
            .unwrap_or(false);
        let pending = self.pending.take();
        if light_dirty {
            Invalidation::merge(pending, Invalidation::Redraw)
        } else {
            pending
        }
    }

    fn invalidate(&mut self, invalidation: Invalidation) {
        self.pending = Invalidation::merge(self.pending, invalidation);
    }

    /// Release the subscription, the active light and the image.
    ///
    /// Safe to call any number of times, only the first call has an effect.
    pub fn self_destruct(&mut self) {
        if self.destroyed.replace(true) {
            trace!("Dock icon for {} already destroyed", self.app_name);
            return;
        }
        match (self.workspace.take(), self.subscription.take()) {
            (Some(workspace), Some(handle)) => workspace.unsubscribe(handle),
            (None, None) => {}
            (workspace, handle) => {
                warn!(
                    "Dock icon for {} had an inconsistent subscription: {:?} / {}",
                    self.app_name,
                    handle,
                    workspace.is_some()
                );
            }
        }
        self.active_light = None;
        self.icon_image = None;
        self.pending = None;
        debug!("Dock icon for {} destroyed", self.app_name);
    }
}

impl Drop for DockIcon {
    fn drop(&mut self) {
        self.self_destruct();
    }
}

/// Apply one workspace notification to the light of the icon currently named `app_name`.
fn sync_active_light(
    event: &WorkspaceEvent,
    app_name: &RefCell<String>,
    destroyed: &Cell<bool>,
    light: &Weak<RefCell<ActiveLight>>,
) {
    if destroyed.get() {
        trace!("Dropping {:?} for destroyed dock icon", event);
        return;
    }
    let app_name = app_name.borrow();
    if event.app_name != *app_name {
        trace!("Dropping {:?}, dock icon tracks {}", event, app_name);
        return;
    }
    let Some(light) = light.upgrade() else {
        return;
    };
    let active = event.kind.is_active();
    trace!("{} is now {}", app_name, if active { "active" } else { "inactive" });
    light.borrow_mut().set_active(active);
}
