// SPDX-License-Identifier: MPL-2.0-only
#![warn(missing_debug_implementations, missing_docs)]

//! Provides the core functionality of a cosmic dock icon: the icon widget state,
//! its active light and the workspace subscription that keeps the light current.

mod active_light;
mod dock_icon;
mod error;
mod image;
mod invalidation;
/// workspace notification abstraction
pub mod workspace;

pub use active_light::*;
pub use dock_icon::*;
pub use error::*;
pub use image::*;
pub use invalidation::*;
pub use workspace::{
    LocalWorkspace, SubscriptionHandle, WorkspaceCallback, WorkspaceEvent, WorkspaceEventKind,
    WorkspaceService,
};
