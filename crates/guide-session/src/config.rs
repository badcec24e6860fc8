use crate::ConfigurationError;
use city_lookups::{Location, WeatherSettings};
use intent_router::{IntentClassifier, IntentRule, RouterConfig, DEFAULT_APOLOGY};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use voice_engines::PipelineSpec;

pub const WEATHER_KEY_VAR: &str = "OPENWEATHER_API_KEY";
pub const LLM_KEY_VAR: &str = "GROQ_API_KEY";

const DEFAULT_CONFIG_PATH: &str = "configs/guide.yaml";

const DEFAULT_INSTRUCTIONS: &str = "You are a friendly, knowledgeable travel guide for Toronto. \
Greet users briefly, don't take too long and then prompt them for what they want. \
Use a warm, local tone. \
Only answer questions related to travel in Toronto. \
Do not spell out or include punctuation marks, special characters, or symbols \
(such as asterisks, commas, periods, etc.), just use natural speech.";

/// Fixed agent behaviour. Built once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfiguration {
    /// System instructions for the language model
    pub instructions: String,
    /// One-off instructions for the opening reply
    pub greeting_instructions: String,
    pub farewell: String,
    pub apology: String,
}

impl Default for AgentConfiguration {
    fn default() -> Self {
        Self {
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            greeting_instructions: "Greet the user and offer your assistance.".to_string(),
            farewell: "Thanks for chatting! Enjoy your time in Toronto.".to_string(),
            apology: DEFAULT_APOLOGY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideSettings {
    pub agent: AgentConfiguration,
    pub location: Location,
    pub weather: WeatherSettings,
    pub pipeline: PipelineSpec,
    /// Conversation messages kept for the fallback prompt
    pub max_history_messages: usize,
    /// Extra keyword rules, tried after the built-in ones
    pub intent_keywords: Vec<IntentRule>,
}

impl Default for GuideSettings {
    fn default() -> Self {
        Self {
            agent: AgentConfiguration::default(),
            location: Location::default(),
            weather: WeatherSettings::default(),
            pipeline: PipelineSpec::default(),
            max_history_messages: 20,
            intent_keywords: Vec::new(),
        }
    }
}

impl GuideSettings {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self =
            serde_yaml::from_str(&raw).map_err(|source| ConfigurationError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load `configs/guide.yaml` when present, defaults otherwise.
    pub fn load_or_default() -> Result<(Self, Option<PathBuf>), ConfigurationError> {
        let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default_path.exists() {
            let settings = Self::from_file(&default_path)?;
            Ok((settings, Some(default_path)))
        } else {
            Ok((Self::default(), None))
        }
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let blank = |s: &str| s.trim().is_empty();
        if blank(&self.location.city) || blank(&self.location.country) {
            return Err(ConfigurationError::Invalid(
                "location.city and location.country must be set".into(),
            ));
        }
        if blank(&self.agent.instructions) {
            return Err(ConfigurationError::Invalid("agent.instructions is empty".into()));
        }
        if blank(&self.agent.apology) {
            return Err(ConfigurationError::Invalid("agent.apology is empty".into()));
        }
        if !(self.weather.base_url.starts_with("http://")
            || self.weather.base_url.starts_with("https://"))
        {
            return Err(ConfigurationError::Invalid(format!(
                "weather.base_url is not an http(s) URL: {}",
                self.weather.base_url
            )));
        }
        if let Some(rule) = self.intent_keywords.iter().find(|r| r.keywords().is_empty()) {
            return Err(ConfigurationError::Invalid(format!(
                "intent_keywords rule for {} has no keywords",
                rule.intent
            )));
        }
        if self.max_history_messages == 0 {
            return Err(ConfigurationError::Invalid(
                "max_history_messages must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn classifier(&self) -> IntentClassifier {
        let mut classifier = IntentClassifier::default();
        for rule in &self.intent_keywords {
            classifier.push_rule(rule.clone());
        }
        classifier
    }

    pub fn router_config(&self) -> RouterConfig {
        RouterConfig {
            apology: self.agent.apology.clone(),
            location: self.location.clone(),
        }
    }
}

/// Credential value; `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Read a required credential from the process environment.
pub fn require_credential(var: &'static str) -> Result<ApiKey, ConfigurationError> {
    require_credential_with(var, |name| std::env::var(name).ok())
}

pub fn require_credential_with<F>(var: &'static str, lookup: F) -> Result<ApiKey, ConfigurationError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(ApiKey)
        .ok_or(ConfigurationError::MissingCredential(var))
}
