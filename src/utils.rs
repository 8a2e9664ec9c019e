pub mod file;
pub mod logging;
pub mod long_path;
pub mod task;
pub mod time;
