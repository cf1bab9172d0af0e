mod settings;

pub use settings::{OneSignalConfig, OtelConfig, ServerConfig, Settings};
