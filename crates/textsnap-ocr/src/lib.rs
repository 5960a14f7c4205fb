pub mod command;
pub mod download;
pub mod engine;
pub mod error;
pub mod tsv;

pub use command::{CharFilter, EngineCommand, build_command};
pub use download::{Progress, TessdataDownloader, installed_languages};
pub use engine::{Recognizer, TesseractEngine};
pub use error::{DownloadError, OcrError};
