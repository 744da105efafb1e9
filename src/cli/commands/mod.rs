//! CLI command implementations

pub mod cache;
pub mod configure;
pub mod deploy;
pub mod e2e;
pub mod settings;

pub use cache::execute as cache;
pub use configure::execute as configure;
pub use deploy::execute as deploy;
pub use e2e::execute as dump_e2e_config;
pub use settings::execute as settings;
