use serde::{Deserialize, Serialize};

use self::ocr::OcrConfig;
use self::output::OutputConfig;
use self::preprocess::PreprocessConfig;
use self::translate::TranslateConfig;
use self::window::{MiscellaneousConfig, OcrWindowConfig, PreferencesConfig};

pub mod languages;
pub mod ocr;
pub mod output;
pub mod preprocess;
pub mod store;
pub mod translate;
pub mod window;

pub use store::ConfigStore;

/// Full application settings, one field per persisted section.
///
/// Handed out by value from [`ConfigStore::load`]; treat it as an immutable
/// snapshot for the duration of one operation.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub preferences: PreferencesConfig,
    pub ocr: OcrConfig,
    pub preprocess: PreprocessConfig,
    pub output: OutputConfig,
    pub translate: TranslateConfig,
    pub ocr_window: OcrWindowConfig,
    pub miscellaneous: MiscellaneousConfig,
}
