// SPDX-License-Identifier: MPL-2.0-only

use std::{
    fmt::Display,
    fs::File,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use serde::{Deserialize, Serialize};
use xdg::BaseDirectories;

/// Configurable size for the dock icons
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(deny_unknown_fields)]
pub enum IconSize {
    /// XS
    XS,
    /// S
    S,
    /// M
    M,
    /// L
    L,
    /// XL
    XL,
    /// Custom edge length in logical pixels
    Custom(f32),
}

impl IconSize {
    /// edge length of the square icon in logical pixels
    pub fn pixels(&self) -> f32 {
        match self {
            IconSize::XS => 32.0,
            IconSize::S => 40.0,
            IconSize::M => 48.0,
            IconSize::L => 64.0,
            IconSize::XL => 80.0,
            IconSize::Custom(size) => *size,
        }
    }
}

impl Display for IconSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IconSize::XS => write!(f, "XS"),
            IconSize::S => write!(f, "S"),
            IconSize::M => write!(f, "M"),
            IconSize::L => write!(f, "L"),
            IconSize::XL => write!(f, "XL"),
            IconSize::Custom(size) => write!(f, "{}", size),
        }
    }
}

impl FromStr for IconSize {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "XS" => Ok(Self::XS),
            "S" => Ok(Self::S),
            "M" => Ok(Self::M),
            "L" => Ok(Self::L),
            "XL" => Ok(Self::XL),
            s => s
                .parse::<f32>()
                .map(Self::Custom)
                .map_err(|_| anyhow::anyhow!("Not a valid IconSize: {}", s)),
        }
    }
}

impl Default for IconSize {
    fn default() -> Self {
        IconSize::M
    }
}

/// Config structure for the dock icons
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CosmicDockIconConfig {
    /// size of every icon
    pub icon_size: IconSize,
    /// diameter of the active light below each icon
    pub active_light_diameter: f32,
    /// whether app names are shown below the icons
    pub show_labels: bool,
    /// desktop entry ids of the pinned applications, in dock order
    pub pinned: Vec<String>,
    /// how often the running processes are checked
    pub poll_interval_ms: u64,
}

static CONFIG_PATH: &str = "cosmic-dock-icon/config.ron";

impl CosmicDockIconConfig {
    /// path of the user's config file, whether it exists or not
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(BaseDirectories::new()?.get_config_home().join(CONFIG_PATH))
    }

    /// load the user's config
    pub fn load() -> anyhow::Result<Self> {
        let config_path =
            match BaseDirectories::new().map(|dirs| dirs.find_config_file(CONFIG_PATH)) {
                Ok(Some(path)) => path,
                _ => anyhow::bail!("Failed to find config file"),
            };
        Self::load_from(&config_path)
    }

    /// load and validate a config file
    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        let file = match File::open(config_path) {
            Ok(file) => file,
            Err(err) => {
                anyhow::bail!("Failed to open '{}': {}", config_path.display(), err);
            }
        };

        let config = match ron::de::from_reader::<_, Self>(file) {
            Ok(config) => config,
            Err(err) => {
                anyhow::bail!("Failed to parse '{}': {}", config_path.display(), err);
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// write config to the user's config file
    pub fn write(&self) -> anyhow::Result<()> {
        let xdg = BaseDirectories::new()?;
        let f = xdg.place_config_file(CONFIG_PATH)?;
        self.write_to(&f)
    }

    /// write config to `path`
    pub fn write_to(&self, path: &Path) -> anyhow::Result<()> {
        let f = File::create(path)?;
        ron::ser::to_writer_pretty(&f, self, ron::ser::PrettyConfig::default())?;
        Ok(())
    }

    /// reject sizes the dock icons can't be configured with
    pub fn validate(&self) -> anyhow::Result<()> {
        let icon_size = self.icon_size.pixels();
        if !(icon_size.is_finite() && icon_size > 0.0) {
            anyhow::bail!("icon_size must be positive, got {}", icon_size);
        }
        if !(self.active_light_diameter.is_finite() && self.active_light_diameter > 0.0) {
            anyhow::bail!(
                "active_light_diameter must be positive, got {}",
                self.active_light_diameter
            );
        }
        if self.poll_interval_ms == 0 {
            anyhow::bail!("poll_interval_ms must not be 0");
        }
        Ok(())
    }

    /// interval between two process scans
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for CosmicDockIconConfig {
    fn default() -> Self {
        ron::de::from_str(include_str!("../config.ron")).unwrap()
    }
}
