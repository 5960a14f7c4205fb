use serde::{Deserialize, Serialize};

fn default_sound_file() -> String {
    "assets/sound/sound.wav".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PreferencesConfig {
    pub minimize_to_system_tray: bool,
    /// Play `sound_file` after a capture produced text
    pub enable_sound: bool,
    #[serde(default = "default_sound_file")]
    pub sound_file: String,
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            minimize_to_system_tray: false,
            enable_sound: true,
            sound_file: default_sound_file(),
        }
    }
}

/// Result popup appearance, owned by the display collaborator.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct OcrWindowConfig {
    pub font_name: String,
    pub font_size: u32,
    pub font_weight: u32,
    pub font_style: String,
    pub font_strikeout: bool,
    pub font_underline: bool,
    pub position_x: i32,
    pub position_y: i32,
    pub always_on_top: bool,
}

impl Default for OcrWindowConfig {
    fn default() -> Self {
        Self {
            font_name: "Arial".to_string(),
            font_size: 12,
            font_weight: 400,
            font_style: "Regular".to_string(),
            font_strikeout: false,
            font_underline: false,
            position_x: 0,
            position_y: 0,
            always_on_top: false,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct MiscellaneousConfig {
    pub main_window_position_x: i32,
    pub main_window_position_y: i32,
    pub settings_window_position_x: i32,
    pub settings_window_position_y: i32,
    pub tray_notification_shown: bool,
}
