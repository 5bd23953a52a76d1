mod load;
mod types;

pub use load::{load_default, load_from_path};
pub use types::{
    ConfigFile, LifecycleConfig, LoggingConfig, RunDefaults, CANONICAL_STATUSES,
    CONFIG_VERSION,
};
