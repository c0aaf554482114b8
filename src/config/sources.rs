//! Configuration sources layered by the merge service.

pub mod column_titles;
pub mod environment;
pub mod global_file;
