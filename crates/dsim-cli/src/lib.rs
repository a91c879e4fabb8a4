//! Library half of the `dsim` command: logging, settings, rendering and the
//! interactive shell.

pub mod logging;
pub mod render;
pub mod settings;
pub mod shell;
