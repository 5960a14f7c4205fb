use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use textsnap_config::ocr::OcrConfig;
use unicode_normalization::UnicodeNormalization;

use crate::command::EngineCommand;
use crate::error::OcrError;
use crate::tsv::{parse_tsv, reconstruct_layout};

/// Something that turns an image file into text.
pub trait Recognizer: Send + Sync {
    /// Never fails: errors are logged and yield an empty string.
    fn recognize(&self, image: &Path, command: &EngineCommand, structured: bool) -> String;
}

/// Runs the external `tesseract` executable.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: PathBuf,
    tessdata: Option<PathBuf>,
}

impl TesseractEngine {
    pub fn new(binary: impl Into<PathBuf>, tessdata: Option<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            tessdata,
        }
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        let tessdata = (!config.tessdata_path.is_empty()).then(|| PathBuf::from(&config.tessdata_path));
        Self::new(&config.tesseract_path, tessdata)
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.binary);
        if let Some(dir) = self.tessdata.as_ref().filter(|dir| dir.is_dir()) {
            command.env("TESSDATA_PREFIX", dir);
        }
        command
    }

    fn execute(&self, mut command: Command) -> Result<String, OcrError> {
        let output = match command.output() {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(OcrError::EngineNotFound(self.binary.clone()));
            }
            Err(e) => return Err(OcrError::Io(e)),
        };

        if !output.status.success() {
            return Err(OcrError::EngineFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).nfc().collect())
    }

    /// `tesseract --version`, first line.
    pub fn version(&self) -> Result<String, OcrError> {
        let mut command = self.command();
        command.arg("--version");
        let output = self.execute(command)?;
        Ok(output.lines().next().unwrap_or_default().trim().to_string())
    }

    pub fn try_run_simple(&self, image: &Path, args: &EngineCommand) -> Result<String, OcrError> {
        tracing::info!("Performing tesseract image to string '{}'", image.display());
        let mut command = self.command();
        command.arg(image).arg("stdout").args(args.args());
        self.execute(command)
    }

    pub fn try_run_structured(&self, image: &Path, args: &EngineCommand) -> Result<String, OcrError> {
        tracing::info!("Performing tesseract image to data '{}'", image.display());
        let mut command = self.command();
        command.arg(image).arg("stdout").args(args.args()).arg("tsv");
        let tsv = self.execute(command)?;
        Ok(reconstruct_layout(&parse_tsv(&tsv)))
    }

    pub fn run_simple(&self, image: &Path, args: &EngineCommand) -> String {
        self.try_run_simple(image, args).unwrap_or_else(|e| log_failure(&e))
    }

    pub fn run_structured(&self, image: &Path, args: &EngineCommand) -> String {
        self.try_run_structured(image, args).unwrap_or_else(|e| log_failure(&e))
    }
}

fn log_failure(error: &OcrError) -> String {
    tracing::error!("An error occurred during the OCR process: {error}");
    String::new()
}

impl Recognizer for TesseractEngine {
    fn recognize(&self, image: &Path, command: &EngineCommand, structured: bool) -> String {
        if structured {
            self.run_structured(image, command)
        } else {
            self.run_simple(image, command)
        }
    }
}
