//! Keyword classification of utterances into intents

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Classification bucket that decides which handler answers an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Weather,
    Events,
    /// Anything else; answered by the language-model fallback
    General,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Intent::Weather => "weather",
            Intent::Events => "events",
            Intent::General => "general",
        };
        f.write_str(name)
    }
}

/// Selects `intent` when the utterance contains any of `keywords`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentRule {
    pub intent: Intent,
    /// Normalized substrings
    #[serde(deserialize_with = "normalized_keywords")]
    keywords: Vec<String>,
}

impl IntentRule {
    pub fn new<I, S>(intent: Intent, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            intent,
            keywords: keywords
                .into_iter()
                .map(|k| normalize(&k.into()))
                .collect(),
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// `normalized` must already be lowercased via [`normalize`].
    fn matches(&self, normalized: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| !k.is_empty() && normalized.contains(k.as_str()))
    }
}

/// Ordered rules; the first matching rule wins, otherwise [`Intent::General`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentClassifier {
    rules: Vec<IntentRule>,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self {
            rules: vec![
                IntentRule::new(Intent::Weather, ["weather"]),
                IntentRule::new(Intent::Events, ["event", "what's happening"]),
            ],
        }
    }
}

impl IntentClassifier {
    pub fn new(rules: Vec<IntentRule>) -> Self {
        Self { rules }
    }

    /// Append a rule with the lowest priority.
    pub fn push_rule(&mut self, rule: IntentRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[IntentRule] {
        &self.rules
    }

    pub fn classify(&self, text: &str) -> Intent {
        let normalized = normalize(text);
        self.rules
            .iter()
            .find(|rule| rule.matches(&normalized))
            .map(|rule| rule.intent)
            .unwrap_or(Intent::General)
    }
}

fn normalized_keywords<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    Ok(raw.iter().map(|k| normalize(k)).collect())
}

// Speech-to-text engines often emit typographic apostrophes.
fn normalize(text: &str) -> String {
    text.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_keyword_any_case() {
        let c = IntentClassifier::default();
        for text in [
            "What's the weather like today?",
            "WEATHER",
            "is the Weather nice",
            "weatherproof jackets?",
        ] {
            assert_eq!(c.classify(text), Intent::Weather, "{text}");
        }
    }

    #[test]
    fn weather_beats_events() {
        let c = IntentClassifier::default();
        assert_eq!(c.classify("will the weather ruin the event"), Intent::Weather);
        assert_eq!(c.classify("what's happening with the weather"), Intent::Weather);
    }

    #[test]
    fn events_keywords() {
        let c = IntentClassifier::default();
        for text in [
            "Any events happening this weekend?",
            "an EVENT near me",
            "What's happening downtown",
            "What\u{2019}s happening tonight",
            "eventually I want to see the CN Tower",
        ] {
            assert_eq!(c.classify(text), Intent::Events, "{text}");
        }
    }

    #[test]
    fn everything_else_is_general() {
        let c = IntentClassifier::default();
        for text in [
            "What's the best neighborhood to stay in?",
            "how do I get to the island",
            "whats happening",
            "",
        ] {
            assert_eq!(c.classify(text), Intent::General, "{text}");
        }
    }

    #[test]
    fn pushed_rules_have_lowest_priority() {
        let mut c = IntentClassifier::default();
        c.push_rule(IntentRule::new(Intent::Weather, ["Forecast"]));
        assert_eq!(c.classify("forecast for the event"), Intent::Events);
        assert_eq!(c.classify("tomorrow's forecast"), Intent::Weather);
        assert_eq!(c.rules().len(), 3);
    }

    #[test]
    fn deserialized_keywords_are_normalized() {
        let rule: IntentRule =
            serde_json::from_str(r#"{"intent":"weather","keywords":["FORECAST","It’s Raining"]}"#)
                .unwrap();
        assert_eq!(rule.keywords(), ["forecast", "it's raining"]);

        let c = IntentClassifier::new(vec![rule]);
        assert_eq!(c.classify("Tomorrow's forecast?"), Intent::Weather);
        assert_eq!(c.classify("it's raining again"), Intent::Weather);
    }

    #[test]
    fn empty_keyword_never_matches() {
        let c = IntentClassifier::new(vec![IntentRule::new(Intent::Events, [""])]);
        assert_eq!(c.classify("anything"), Intent::General);
    }
}
