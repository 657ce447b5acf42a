// SPDX-License-Identifier: MPL-2.0-only

use tiny_skia::{Color, Pixmap};

use crate::error::DockIconError;

/// Bitmap shown by a dock icon
#[derive(Debug, Clone, PartialEq)]
pub struct IconImage {
    pixmap: Pixmap,
}

impl IconImage {
    /// wrap an already decoded pixmap
    pub fn from_pixmap(pixmap: Pixmap) -> Self {
        Self { pixmap }
    }

    /// decode a PNG file's contents
    pub fn from_png_data(data: &[u8]) -> Result<Self, DockIconError> {
        Pixmap::decode_png(data)
            .map(Self::from_pixmap)
            .map_err(|err| DockIconError::invalid(format!("failed to decode icon: {err}")))
    }

    /// Square image filled with a single color, used when no icon could be found.
    pub fn placeholder(size: u32, rgba: [u8; 4]) -> Result<Self, DockIconError> {
        let mut pixmap = Pixmap::new(size, size)
            .ok_or_else(|| DockIconError::invalid(format!("invalid placeholder size {size}")))?;
        pixmap.fill(Color::from_rgba8(rgba[0], rgba[1], rgba[2], rgba[3]));
        Ok(Self::from_pixmap(pixmap))
    }

    /// width in pixels
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// height in pixels
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// the underlying pixmap, for painting
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }
}
