use crate::error::ClipboardError;
use crate::submission::ClipboardSink;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use clap::ValueEnum;
use crossterm::{queue, style::Print};
use std::cell::RefCell;
use std::io::{self, Write};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ClipboardBackend {
    /// OSC 52 escape sequence, handled by the terminal itself
    Osc52,
    /// Platform clipboard tool (pbcopy, clip, wl-copy, xclip)
    System,
    /// Never copy; the sheet is still opened
    Disabled,
}

/// Copies through the terminal with an OSC 52 sequence.
///
/// Works over SSH and inside tmux (with `set-clipboard on`), but the
/// terminal gives no acknowledgement, so a write that reaches the terminal
/// counts as copied.
pub struct Osc52Clipboard<W = io::Stdout> {
    out: RefCell<W>,
}

impl Osc52Clipboard {
    pub fn stdout() -> Self {
        Osc52Clipboard::new(io::stdout())
    }
}

impl<W: Write> Osc52Clipboard<W> {
    pub fn new(out: W) -> Self {
        Osc52Clipboard {
            out: RefCell::new(out),
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write> ClipboardSink for Osc52Clipboard<W> {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let sequence = format!("\x1b]52;c;{}\x07", BASE64.encode(text.as_bytes()));
        let mut out = self.out.borrow_mut();
        queue!(out, Print(sequence))?;
        out.flush()?;
        Ok(())
    }
}

/// Pipes the text into a platform clipboard tool
#[derive(Debug, Clone)]
pub struct CommandClipboard {
    program: String,
    args: Vec<String>,
}

impl CommandClipboard {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        CommandClipboard {
            program: program.into(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }

    /// Picks the clipboard tool for the current platform.
    pub fn detect() -> Option<Self> {
        if cfg!(target_os = "macos") {
            Some(CommandClipboard::new("pbcopy", &[]))
        } else if cfg!(windows) {
            Some(CommandClipboard::new("clip", &[]))
        } else if std::env::var_os("WAYLAND_DISPLAY").is_some() {
            Some(CommandClipboard::new("wl-copy", &[]))
        } else if std::env::var_os("DISPLAY").is_some() {
            Some(CommandClipboard::new("xclip", &["-selection", "clipboard"]))
        } else {
            None
        }
    }
}

impl ClipboardSink for CommandClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| match err.kind() {
                io::ErrorKind::NotFound => {
                    ClipboardError::Unavailable(format!("`{}` is not installed", self.program))
                }
                io::ErrorKind::PermissionDenied => ClipboardError::PermissionDenied,
                _ => ClipboardError::Io(err),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).await?;
            stdin.shutdown().await?;
        }

        let status = child.wait().await?;
        if !status.success() {
            return Err(ClipboardError::ToolFailed {
                tool: self.program.clone(),
                status: status.to_string(),
            });
        }
        debug!(tool = %self.program, bytes = text.len(), "copied to clipboard");
        Ok(())
    }
}

/// Clipboard chosen at startup
pub enum Clipboard {
    Osc52(Osc52Clipboard),
    System(CommandClipboard),
    Disabled,
}

impl Clipboard {
    pub fn from_backend(backend: ClipboardBackend) -> Self {
        match backend {
            ClipboardBackend::Osc52 => Clipboard::Osc52(Osc52Clipboard::stdout()),
            ClipboardBackend::System => match CommandClipboard::detect() {
                Some(tool) => Clipboard::System(tool),
                None => {
                    warn!("no clipboard tool found for this platform, copying is disabled");
                    Clipboard::Disabled
                }
            },
            ClipboardBackend::Disabled => Clipboard::Disabled,
        }
    }
}

impl ClipboardSink for Clipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        match self {
            Clipboard::Osc52(clipboard) => clipboard.write_text(text).await,
            Clipboard::System(clipboard) => clipboard.write_text(text).await,
            Clipboard::Disabled => Err(ClipboardError::Unavailable(
                "copying is disabled".to_string(),
            )),
        }
    }
}
