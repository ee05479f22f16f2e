pub mod interaction;
pub mod layout;
pub mod navigation;
pub mod path;
pub mod render_settings;
