// SPDX-License-Identifier: MPL-2.0-only

//! Config for cosmic-dock-icon

mod icon_config;

pub use icon_config::*;
