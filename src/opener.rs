use crate::submission::DestinationOpener;
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Opens URLs with the desktop's default handler
pub struct SystemOpener;

impl DestinationOpener for SystemOpener {
    fn open(&self, url: &str) {
        let mut command = opener_command(url);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        match command.spawn() {
            Ok(mut child) => {
                debug!(pid = child.id(), url, "launched url opener");
                // Reap the launcher so it does not linger as a zombie
                std::thread::spawn(move || child.wait());
            }
            Err(err) => warn!(error = %err, url, "could not launch url opener"),
        }
    }
}

fn opener_command(url: &str) -> Command {
    if cfg!(target_os = "macos") {
        let mut command = Command::new("open");
        command.arg(url);
        command
    } else if cfg!(windows) {
        // The empty title keeps `start` from treating the url as a window title
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]).arg(url);
        command
    } else {
        let mut command = Command::new("xdg-open");
        command.arg(url);
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_passes_url_as_last_argument() {
        let command = opener_command("https://example.com/sheet");
        let last = command.get_args().last().and_then(|arg| arg.to_str());
        assert_eq!(last, Some("https://example.com/sheet"));
    }
}
