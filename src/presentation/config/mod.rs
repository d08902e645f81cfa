mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    ChatSettings, DatabaseSettings, LlmSettings, LoggingSettings, ServerSettings, Settings,
};
