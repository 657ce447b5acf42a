// SPDX-License-Identifier: MPL-2.0-only

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use cosmic_dock_icon::IconImage;
use tracing::{debug, warn};
use xdg::BaseDirectories;

const PLACEHOLDER_COLOR: [u8; 4] = [0x48, 0x48, 0x48, 0xff];
// preferred hicolor sizes after the requested one
const FALLBACK_SIZES: [u32; 6] = [64, 128, 256, 512, 48, 32];

/// Load the icon named `icon` at roughly `size` pixels, or a placeholder.
pub fn load_icon(icon: Option<&str>, size: u32) -> anyhow::Result<IconImage> {
    if let Some(path) = icon.and_then(|icon| find_icon_file(icon, size)) {
        match read_png(&path) {
            Ok(image) => return Ok(image),
            Err(err) => warn!("Failed to load icon {}: {:?}", path.display(), err),
        }
    } else {
        debug!("No PNG icon found for {:?}, using placeholder", icon);
    }
    Ok(IconImage::placeholder(size.max(1), PLACEHOLDER_COLOR)?)
}

fn read_png(path: &Path) -> anyhow::Result<IconImage> {
    let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(IconImage::from_png_data(&data)?)
}

/// Absolute PNG paths are used as is, names are looked up in the XDG data dirs.
pub fn find_icon_file(icon: &str, size: u32) -> Option<PathBuf> {
    let path = Path::new(icon);
    if path.is_absolute() {
        let is_png = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        return (is_png && path.exists()).then(|| path.to_path_buf());
    }

    let xdg = BaseDirectories::new().ok()?;
    icon_candidates(icon, size)
        .into_iter()
        .find_map(|candidate| xdg.find_data_file(candidate))
}

fn icon_candidates(icon: &str, size: u32) -> Vec<String> {
    std::iter::once(size)
        .chain(FALLBACK_SIZES.into_iter().filter(|s| *s != size))
        .map(|s| format!("icons/hicolor/{s}x{s}/apps/{icon}.png"))
        .chain(std::iter::once(format!("pixmaps/{icon}.png")))
        .collect()
}
