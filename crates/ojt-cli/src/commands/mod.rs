//! CLI subcommand implementations.

pub mod log;
pub mod recent;
pub mod summary;
pub mod target;
pub mod track;
pub mod util;
