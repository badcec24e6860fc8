//! guide-session: agent configuration, credentials and the conversation
//! runtime that drives the intent router one turn at a time

mod config;
pub use config::{
    require_credential, require_credential_with, AgentConfiguration, ApiKey, GuideSettings,
    LLM_KEY_VAR, WEATHER_KEY_VAR,
};

mod error;
pub use error::{ConfigurationError, SessionError};

mod pipeline;
pub use pipeline::VoicePipeline;

mod session;
pub use session::{AgentSession, SessionSummary, SpokenReply};
