mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    DatabaseProvider, DatabaseSettings, DownloaderSettings, LoggingSettings, ServerSettings,
    Settings,
};
