//! User interface components for terminal interaction.
//!
//! - [`display`]: banner, discovery info, batch summary
//! - [`progress`]: per-file progress bar
//! - [`prompt`]: interactive password and selection dialogs

pub mod display;
pub mod progress;
pub mod prompt;
