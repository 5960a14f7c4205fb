use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use image::ImageFormat;
use textsnap_config::preprocess::PreprocessConfig;

pub mod deskew;
pub mod error;
pub mod filters;
pub mod frame;
pub mod pipeline;

pub use error::PreprocessError;
pub use frame::Frame;
pub use pipeline::{Blur, Morphology, Pipeline, Stage, Threshold};

/// What happened to the working file.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Disabled,
    /// GIF input, the decoder path used here does not handle it
    SkippedGif,
    /// Enabled, but no stage changed the image; the file was not rewritten
    Unchanged,
    Written(Vec<Stage>),
}

/// Preprocess the image at `path` in place. Never fails: any error is
/// logged and the file is left as it was.
pub fn preprocess_image(path: &Path, config: &PreprocessConfig) {
    if let Err(e) = try_preprocess_image(path, config) {
        tracing::error!(
            "An error occurred while preprocessing the image '{}' [{e}]",
            path.display()
        );
    }
}

pub fn try_preprocess_image(
    path: &Path,
    config: &PreprocessConfig,
) -> Result<Outcome, PreprocessError> {
    if !config.enable_preprocess {
        tracing::info!("Preprocessing is disabled");
        return Ok(Outcome::Disabled);
    }

    if sniff_format(path)? == Some(ImageFormat::Gif) {
        tracing::warn!("The image is a GIF, skipping preprocessing");
        return Ok(Outcome::SkippedGif);
    }

    let pipeline = Pipeline::from_config(config);
    if pipeline.is_empty() {
        return Ok(Outcome::Unchanged);
    }

    let frame = Frame::open(path)?;
    let (frame, stages) = pipeline.run_with_report(frame)?;
    if stages.is_empty() {
        return Ok(Outcome::Unchanged);
    }

    frame.save(path)?;
    tracing::info!("Image preprocessing successfully completed");
    Ok(Outcome::Written(stages))
}

fn sniff_format(path: &Path) -> Result<Option<ImageFormat>, PreprocessError> {
    let mut header = Vec::with_capacity(16);
    BufReader::new(File::open(path)?)
        .take(16)
        .read_to_end(&mut header)?;
    Ok(image::guess_format(&header).ok())
}
