//! Hands finished reports to the desktop's default PDF viewer.

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

use log::{info, warn};

/// Command that asks the platform to open `path` with its associated program.
pub fn open_command(path: &Path) -> Command {
    let mut command = if cfg!(windows) {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]);
        command
    } else if cfg!(target_os = "macos") {
        Command::new("open")
    } else {
        Command::new("xdg-open")
    };
    command
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    command
}

/// Launches the default viewer for `path` without waiting for it.
///
/// Failures are logged and otherwise ignored.
pub fn open_in_viewer(path: &Path) {
    if !path.is_file() {
        warn!("Not opening {}: file does not exist", path.display());
        return;
    }

    match spawn(path) {
        Ok(()) => info!("Opened {} in the default viewer", path.display()),
        Err(err) => warn!("Could not open {}: {}", path.display(), err),
    }
}

fn spawn(path: &Path) -> io::Result<()> {
    open_command(path).spawn().map(drop)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_ends_with_the_report_path() {
        let command = open_command(Path::new("pessoas.2024.01.01.00.00.00.pdf"));
        let last = command.get_args().last().map(|arg| arg.to_owned());
        assert_eq!(
            last.as_deref(),
            Some(std::ffi::OsStr::new("pessoas.2024.01.01.00.00.00.pdf"))
        );
    }

    #[test]
    fn missing_file_is_ignored() {
        let dir = tempfile::tempdir().expect("create temp dir");
        open_in_viewer(&dir.path().join("absent.pdf"));
    }
}
