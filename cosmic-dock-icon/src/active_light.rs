// SPDX-License-Identifier: MPL-2.0-only

use crate::error::{positive, DockIconError};

/// Small status light shown next to a dock icon while its application runs.
///
/// Only the visibility and on/off contract lives here, painting is left to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveLight {
    diameter: f32,
    visible: bool,
    active: bool,
    dirty: bool,
}

impl ActiveLight {
    /// create a visible, inactive light
    pub fn new(diameter: f32) -> Result<Self, DockIconError> {
        Ok(Self {
            diameter: positive(diameter, "active light diameter")?,
            visible: true,
            active: false,
            dirty: true,
        })
    }

    /// show the light
    pub fn show(&mut self) {
        self.set_visible(true);
    }

    /// hide the light, its on/off state is kept
    pub fn hide(&mut self) {
        self.set_visible(false);
    }

    fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.dirty = true;
        }
    }

    /// whether the light is shown
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Switch the light on or off. Repeating the current state is not a change.
    pub fn set_active(&mut self, active: bool) {
        if self.active != active {
            self.active = active;
            self.dirty = true;
        }
    }

    /// whether the light is switched on
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// whether the light is currently painted as lit
    pub fn is_lit(&self) -> bool {
        self.visible && self.active
    }

    /// diameter of the light in logical pixels
    pub fn diameter(&self) -> f32 {
        self.diameter
    }

    /// resize the light
    pub fn set_diameter(&mut self, diameter: f32) -> Result<(), DockIconError> {
        let diameter = positive(diameter, "active light diameter")?;
        if self.diameter != diameter {
            self.diameter = diameter;
            self.dirty = true;
        }
        Ok(())
    }

    /// returns whether anything changed since the last call and clears the flag
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
