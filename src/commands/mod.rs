//! Command implementations

pub mod clone;

pub use clone::handle_clone_command;
