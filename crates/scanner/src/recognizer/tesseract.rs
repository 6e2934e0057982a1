use super::{Progress, Recognizer};
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::instrument;

pub const DEFAULT_LANGUAGE: &str = "eng";
const EXECUTABLE: &str = "tesseract";

/// Recogniser backed by the `tesseract` command-line tool.
///
/// The image is piped through `tesseract stdin stdout -l <language>`; the
/// tool reports no incremental progress, so only start and finish are
/// reported.
#[derive(Debug, Clone)]
pub struct Tesseract {
    binary: PathBuf,
    language: String,
}
impl Tesseract {
    /// Locate `tesseract` on `PATH`.
    pub fn discover(language: impl Into<String>) -> Result<Self> {
        match which::which(EXECUTABLE) {
            Ok(binary) => {
                tracing::debug!(binary = %binary.display(), "Discovered tesseract executable");
                Ok(Self::with_binary(binary, language))
            },
            Err(e) => {
                tracing::info!(error = %e, "Tesseract executable not found in PATH");
                exn::bail!(ErrorKind::RecognizerNotFound);
            },
        }
    }

    pub fn with_binary(binary: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self { binary: binary.into(), language: language.into() }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .args(["stdin", "stdout", "-l", &self.language])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl Recognizer for Tesseract {
    fn name(&self) -> &str {
        EXECUTABLE
    }

    #[instrument(skip_all, fields(binary = %self.binary.display(), language = %self.language))]
    async fn recognize(&self, image: &[u8], progress: Progress) -> Result<String> {
        progress.report(0.0);
        let mut child = self.command().spawn().or_raise(|| ErrorKind::RecognizerNotFound)?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(image).await.or_raise(|| ErrorKind::Recognition)?;
            // Closing stdin tells tesseract the image is complete.
            drop(stdin);
        }
        let output = child.wait_with_output().await.or_raise(|| ErrorKind::Recognition)?;
        if !output.status.success() {
            tracing::warn!(
                status = ?output.status.code(),
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "Tesseract exited unsuccessfully"
            );
            exn::bail!(ErrorKind::Recognition);
        }
        progress.report(1.0);
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line() {
        let tesseract = Tesseract::with_binary("/usr/bin/tesseract", "deu");
        let command = tesseract.command();
        let std = command.as_std();
        assert_eq!(std.get_program(), "/usr/bin/tesseract");
        let args: Vec<_> = std.get_args().collect();
        assert_eq!(args, ["stdin", "stdout", "-l", "deu"]);
    }

    #[tokio::test]
    async fn missing_binary_is_reported() {
        let tesseract = Tesseract::with_binary("/nonexistent/cardscan/tesseract", DEFAULT_LANGUAGE);
        let err = tesseract.recognize(b"not an image", Progress::discard()).await.unwrap_err();
        assert_eq!(*err, ErrorKind::RecognizerNotFound);
    }
}
