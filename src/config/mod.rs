mod settings;

pub use settings::{AuditConfig, CacheConfig, Settings, SlackConfig, load_settings};
