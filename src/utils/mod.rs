pub(crate) mod fs;
pub(crate) mod terminal;

// Public API - utilities used by commands
pub use fs::is_non_empty_dir;
pub use terminal::{set_terminal_title, set_terminal_title_and_flush};
