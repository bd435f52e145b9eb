//! bkang CLI library: commands, configuration, execution and locking

pub mod cmd;
pub mod exec;
pub mod locks;
pub mod settings;
pub mod system_config;
pub mod util;
