//! Clipboard access for copying loaded logs

use crate::{CoreError, Result};
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// Something text can be copied into
pub trait Clipboard: Send + Sync {
    fn copy(&self, text: &str) -> Result<()>;
}

/// System clipboard through the platform's command-line tools.
///
/// Tries, in order: wl-copy (Wayland), xclip and xsel (X11), pbcopy (macOS).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    const COMMANDS: &'static [(&'static str, &'static [&'static str])] = &[
        ("wl-copy", &[]),
        ("xclip", &["-selection", "clipboard"]),
        ("xsel", &["--clipboard", "--input"]),
        ("pbcopy", &[]),
    ];
}

impl Clipboard for SystemClipboard {
    /// Returns after at most 100ms; a copy still running then is assumed to succeed
    fn copy(&self, text: &str) -> Result<()> {
        let (tx, rx) = mpsc::channel();
        let content = text.to_string();

        thread::spawn(move || {
            let _ = tx.send(copy_sync(&content));
        });

        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(()),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(CoreError::Clipboard(
                "Clipboard thread terminated unexpectedly".to_string(),
            )),
        }
    }
}

fn command_exists(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn copy_sync(content: &str) -> Result<()> {
    for (cmd, args) in SystemClipboard::COMMANDS {
        if !command_exists(cmd) {
            continue;
        }

        let Ok(mut child) = Command::new(cmd)
            .args(*args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        else {
            continue;
        };

        let Some(mut stdin) = child.stdin.take() else {
            continue;
        };
        if stdin.write_all(content.as_bytes()).is_err() {
            let _ = child.kill();
            continue;
        }
        // EOF lets the tool finish
        drop(stdin);

        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            match child.try_wait() {
                Ok(Some(status)) if status.success() => return Ok(()),
                Ok(Some(_)) | Err(_) => break,
                Ok(None) if Instant::now() > deadline => {
                    let _ = child.kill();
                    break;
                }
                Ok(None) => thread::sleep(Duration::from_millis(50)),
            }
        }
        tracing::debug!("Clipboard command {} failed, trying next", cmd);
    }

    Err(CoreError::Clipboard(
        "No clipboard command available (tried wl-copy, xclip, xsel, pbcopy)".to_string(),
    ))
}
