use serde::{Deserialize, Serialize};

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    #[serde(default = "default_enabled")]
    pub copy_to_clipboard: bool,
    #[serde(default = "default_enabled")]
    pub show_popup_window: bool,
    pub remove_empty_lines: bool,
    /// Keep the raw capture in `output_folder_path`
    pub save_captured_image: bool,
    /// Keep the preprocessed working image in `output_folder_path`
    pub save_enhanced_image: bool,
    pub output_folder_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            copy_to_clipboard: default_enabled(),
            show_popup_window: default_enabled(),
            remove_empty_lines: false,
            save_captured_image: false,
            save_enhanced_image: false,
            output_folder_path: String::new(),
        }
    }
}
