pub mod clipboard;
pub mod sound;

pub use clipboard::ClipboardWriter;
pub use sound::play_sound;
