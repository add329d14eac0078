use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("nothing to copy")]
    Empty,
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
}

/// Copy `text` to the system clipboard and return the number of characters
/// copied. Tries the platform clipboard API first, then pipes through the
/// system copy command.
pub fn copy_text(text: &str) -> Result<usize, ClipboardError> {
    if text.trim().is_empty() {
        return Err(ClipboardError::Empty);
    }

    match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text.to_string()))
    {
        Ok(()) => Ok(text.chars().count()),
        Err(primary) => match copy_via_command(text) {
            Ok(()) => Ok(text.chars().count()),
            Err(fallback) => Err(ClipboardError::Unavailable(format!(
                "{}; fallback: {}",
                primary, fallback
            ))),
        },
    }
}

fn copy_via_command(text: &str) -> Result<()> {
    let candidates: &[(&str, &[&str])] = if cfg!(target_os = "macos") {
        &[("pbcopy", &[])]
    } else if cfg!(target_os = "windows") {
        &[("clip", &[])]
    } else {
        &[("wl-copy", &[]), ("xclip", &["-selection", "clipboard"])]
    };

    let mut last_err = None;
    for (cmd, args) in candidates {
        match pipe_to(cmd, args, text) {
            Ok(()) => return Ok(()),
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap_or_else(|| anyhow::anyhow!("no copy command available")))
}

fn pipe_to(cmd: &str, args: &[&str], text: &str) -> Result<()> {
    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to spawn {}", cmd))?;

    child
        .stdin
        .as_mut()
        .context("child has no stdin")?
        .write_all(text.as_bytes())
        .with_context(|| format!("failed to write to {}", cmd))?;

    let status = child
        .wait()
        .with_context(|| format!("{} did not exit", cmd))?;
    if status.success() {
        Ok(())
    } else {
        Err(anyhow::anyhow!("{} exited with {}", cmd, status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_rejected_without_touching_the_clipboard() {
        let err = copy_text("").unwrap_err();
        assert!(matches!(err, ClipboardError::Empty));
        assert_eq!(err.to_string(), "nothing to copy");
    }

    #[test]
    fn whitespace_only_text_is_rejected() {
        assert!(matches!(
            copy_text("  \n\t "),
            Err(ClipboardError::Empty)
        ));
    }
}
