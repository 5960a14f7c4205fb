pub use textsnap_config::languages;
pub mod state;
pub mod text;
