pub mod app;
pub mod config;
pub mod effects;
pub mod ui;

pub use app::{Controller, Presenter};
pub use config::{load_config, AppConfig, ConfigError, LogTarget};
pub use effects::{map_engine_event, EffectRunner};
