//! Primary model selection.
//!
//! Selection is static priority: the first entry of the configured candidate
//! table wins. Nothing probes whether a model is currently available, and the
//! fallback model used by the completion gateway is configured separately and
//! need not appear in this table.

use fleetwise_core::error::{Error, Result};

/// Ordered, read-only table of primary model identifiers.
#[derive(Debug, Clone)]
pub struct ModelSelector {
    candidates: Vec<String>,
}

impl ModelSelector {
    /// Blank identifiers are dropped; order is preserved.
    pub fn new<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            candidates: candidates
                .into_iter()
                .map(Into::into)
                .filter(|m: &String| !m.trim().is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &fleetwise_config::AppConfig) -> Self {
        Self::new(config.models.candidates.iter().cloned())
    }

    /// The preferred model.
    pub fn select(&self) -> Result<&str> {
        self.candidates
            .first()
            .map(String::as_str)
            .ok_or_else(|| Error::Config {
                message: "no primary model candidates configured".into(),
            })
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_candidate_wins() {
        let selector = ModelSelector::new([
            "mistralai/mixtral-8x7b-instruct:nitro",
            "anthropic/claude-3-opus",
        ]);
        assert_eq!(
            selector.select().unwrap(),
            "mistralai/mixtral-8x7b-instruct:nitro"
        );
    }

    #[test]
    fn default_table_prefers_mixtral() {
        let selector = ModelSelector::from_config(&fleetwise_config::AppConfig::default());
        assert_eq!(selector.candidates().len(), 5);
        assert_eq!(
            selector.select().unwrap(),
            "mistralai/mixtral-8x7b-instruct:nitro"
        );
    }

    #[test]
    fn blank_entries_are_skipped() {
        let selector = ModelSelector::new(["", "  ", "openai/gpt-4-turbo-preview"]);
        assert_eq!(selector.select().unwrap(), "openai/gpt-4-turbo-preview");
    }

    #[test]
    fn empty_table_is_a_config_error() {
        let selector = ModelSelector::new(Vec::<String>::new());
        assert!(matches!(selector.select(), Err(Error::Config { .. })));
    }
}
