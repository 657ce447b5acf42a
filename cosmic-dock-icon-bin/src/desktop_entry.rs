// SPDX-License-Identifier: MPL-2.0-only

use std::{ffi::OsStr, fs, path::Path};

use freedesktop_desktop_entry::{default_paths, DesktopEntry, Iter};
use shlex::Shlex;
use tracing::{trace, warn};

/// What the dock needs to know about a pinned application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppEntry {
    /// desktop entry id, e.g. `org.mozilla.firefox`
    pub id: String,
    /// display name, used as the icon's app name
    pub name: String,
    /// file name of the executable, matched against running processes
    pub executable: Option<String>,
    /// icon name or absolute icon path
    pub icon: Option<String>,
}

impl AppEntry {
    /// entry for an id without a desktop file, labelled with the id itself
    pub fn unresolved(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            executable: Some(id.to_string()),
            icon: None,
        }
    }

    fn from_desktop_entry(id: &str, entry: &DesktopEntry<'_>) -> Self {
        Self {
            id: id.to_string(),
            name: entry
                .name(None)
                .map(|name| name.into_owned())
                .unwrap_or_else(|| id.to_string()),
            executable: entry.exec().and_then(executable_name),
            icon: entry.icon().map(str::to_string),
        }
    }
}

/// Executable file name from a desktop entry `Exec` line.
///
/// Leading `env` invocations and variable assignments are skipped.
pub fn executable_name(exec: &str) -> Option<String> {
    Shlex::new(exec)
        .skip_while(|word| word == "env" || word.contains('='))
        .next()
        .and_then(|word| {
            Path::new(&word)
                .file_name()
                .and_then(OsStr::to_str)
                .map(str::to_string)
        })
}

/// Look up desktop entries for `ids`, in the order given.
///
/// Each id resolves at most once, even if several data dirs contain a matching file.
pub fn resolve(ids: &[String]) -> Vec<AppEntry> {
    let mut found: Vec<Option<AppEntry>> = vec![None; ids.len()];
    for path in Iter::new(default_paths()) {
        let Some(position) = ids.iter().enumerate().position(|(i, id)| {
            found[i].is_none() && Some(OsStr::new(id)) == path.file_stem()
        }) else {
            continue;
        };
        let Ok(bytes) = fs::read_to_string(&path) else {
            continue;
        };
        match DesktopEntry::decode(&path, &bytes) {
            Ok(entry) => {
                trace!("Resolved {} from {}", ids[position], path.display());
                found[position] = Some(AppEntry::from_desktop_entry(&ids[position], &entry));
            }
            Err(err) => warn!("Failed to decode {}: {:?}", path.display(), err),
        }
    }

    ids.iter()
        .zip(found)
        .map(|(id, entry)| {
            entry.unwrap_or_else(|| {
                warn!("No desktop entry found for {}", id);
                AppEntry::unresolved(id)
            })
        })
        .collect()
}
