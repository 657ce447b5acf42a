// SPDX-License-Identifier: MPL-2.0-only

use std::{
    collections::HashSet,
    fs,
    path::Path,
    thread::{self, JoinHandle},
    time::Duration,
};

use calloop::channel::SyncSender;
use itertools::Itertools;
use tokio::runtime;
use tracing::{debug, info, trace};

use crate::DockMsg;

/// A change in the set of running executables
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    Started(String),
    Exited(String),
}

/// Executable names of all processes under `proc_dir`.
///
/// Kernel threads have an empty command line and are skipped.
pub fn scan_processes(proc_dir: &Path) -> HashSet<String> {
    let Ok(entries) = fs::read_dir(proc_dir) else {
        return HashSet::new();
    };
    entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.bytes().all(|b| b.is_ascii_digit()))
        })
        .filter_map(|entry| fs::read(entry.path().join("cmdline")).ok())
        .filter_map(|cmdline| executable_name(&cmdline))
        .collect()
}

fn executable_name(cmdline: &[u8]) -> Option<String> {
    let argv0 = cmdline.split(|b| *b == 0).next()?;
    let argv0 = std::str::from_utf8(argv0).ok()?;
    // some processes rewrite their argv into one space separated string,
    // with or without a trailing NUL
    let argv0 = if argv0.contains(char::is_whitespace) && !Path::new(argv0).exists() {
        argv0.split_whitespace().next()?
    } else {
        argv0
    };
    let name = Path::new(argv0).file_name()?.to_str()?;
    (!name.is_empty()).then(|| name.to_string())
}

/// Events turning `old` into `new`, exits first, each group sorted by name.
pub fn diff(old: &HashSet<String>, new: &HashSet<String>) -> Vec<ProcessEvent> {
    old.difference(new)
        .sorted()
        .map(|name| ProcessEvent::Exited(name.clone()))
        .chain(
            new.difference(old)
                .sorted()
                .map(|name| ProcessEvent::Started(name.clone())),
        )
        .collect()
}

/// Poll `/proc` on a separate thread and forward changes to the dock's event loop.
///
/// Ctrl-C is forwarded as [`DockMsg::Shutdown`]. The thread ends once the event
/// loop drops its end of the channel.
pub fn spawn(tx: SyncSender<DockMsg>, interval: Duration) -> JoinHandle<anyhow::Result<()>> {
    thread::spawn(move || -> anyhow::Result<()> {
        let rt = runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let res: anyhow::Result<()> = rt.block_on(async move {
            let mut known = HashSet::new();
            let mut ticker = tokio::time::interval(interval);
            let ctrl_c = tokio::signal::ctrl_c();
            tokio::pin!(ctrl_c);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let current = scan_processes(Path::new("/proc"));
                        let events = diff(&known, &current);
                        trace!("Process scan found {} changes", events.len());
                        for event in events {
                            if tx.send(DockMsg::Process(event)).is_err() {
                                debug!("Dock event loop is gone, stopping process watcher");
                                return Ok(());
                            }
                        }
                        known = current;
                    }
                    res = &mut ctrl_c => {
                        res?;
                        info!("Received Ctrl-C, shutting down");
                        let _ = tx.send(DockMsg::Shutdown);
                        return Ok(());
                    }
                }
            }
        });
        res
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> HashSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn diff_reports_exits_then_starts() {
        let old = set(&["bash", "firefox", "cosmic-term"]);
        let new = set(&["bash", "cosmic-files", "alacritty"]);
        assert_eq!(
            diff(&old, &new),
            vec![
                ProcessEvent::Exited("cosmic-term".into()),
                ProcessEvent::Exited("firefox".into()),
                ProcessEvent::Started("alacritty".into()),
                ProcessEvent::Started("cosmic-files".into()),
            ]
        );
        assert!(diff(&new, &new).is_empty());
    }

    #[test]
    fn executable_name_from_cmdline() {
        assert_eq!(
            executable_name(b"/usr/lib/firefox/firefox\0-contentproc\0"),
            Some("firefox".into())
        );
        assert_eq!(executable_name(b"cosmic-term"), Some("cosmic-term".into()));
        assert_eq!(executable_name(b"/usr/bin/python3 -m http.server"), Some("python3".into()));
        assert_eq!(executable_name(b""), None);
    }

    #[test]
    fn rewritten_argv_with_trailing_nul() {
        assert_eq!(
            executable_name(b"/usr/lib/electron/electron --type=renderer\0"),
            Some("electron".into())
        );

        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("My App");
        fs::write(&app, b"").unwrap();
        let mut cmdline = app.to_str().unwrap().as_bytes().to_vec();
        cmdline.extend_from_slice(b"\0--flag\0");
        assert_eq!(executable_name(&cmdline), Some("My App".into()));
    }

    #[test]
    fn scans_a_proc_tree() {
        let dir = tempfile::tempdir().unwrap();
        for (pid, cmdline) in [
            ("1", &b"/sbin/init\0"[..]),
            ("42", &b"/usr/bin/firefox\0"[..]),
            ("7", &b""[..]),
        ] {
            fs::create_dir(dir.path().join(pid)).unwrap();
            fs::write(dir.path().join(pid).join("cmdline"), cmdline).unwrap();
        }
        fs::create_dir(dir.path().join("self")).unwrap();
        fs::write(dir.path().join("self").join("cmdline"), b"/usr/bin/ignored\0").unwrap();

        assert_eq!(scan_processes(dir.path()), set(&["init", "firefox"]));
    }
}
