use serde::{Deserialize, Serialize};

use crate::errors::HealError;

pub const DEFAULT_MIN_CANDIDATE_SCORE: f64 = 0.3;

/// Tunables for one orchestrator. Defaults reproduce the stock pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealOptions {
    /// Candidates scoring below this are dropped before synthesis
    pub min_candidate_score: f64,

    /// Keep at most this many ranked results
    pub max_results: Option<usize>,

    /// Convert a panic inside the pipeline into an empty result
    pub catch_panics: bool,
}

impl Default for HealOptions {
    fn default() -> Self {
        Self {
            min_candidate_score: DEFAULT_MIN_CANDIDATE_SCORE,
            max_results: None,
            catch_panics: true,
        }
    }
}

impl HealOptions {
    pub fn with_min_candidate_score(mut self, min: f64) -> Self {
        self.min_candidate_score = min;
        self
    }

    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = Some(max);
        self
    }

    pub fn validate(&self) -> Result<(), HealError> {
        if !(0.0..=1.0).contains(&self.min_candidate_score) {
            return Err(HealError::InvalidOptions(format!(
                "min_candidate_score must be within 0..=1, got {}",
                self.min_candidate_score
            )));
        }
        if self.max_results == Some(0) {
            return Err(HealError::InvalidOptions(
                "max_results must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_pipeline_threshold() {
        let options = HealOptions::default();
        assert_eq!(options.min_candidate_score, 0.3);
        assert!(options.max_results.is_none());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let options: HealOptions = serde_json::from_str(r#"{"max_results": 5}"#).unwrap();
        assert_eq!(options.max_results, Some(5));
        assert_eq!(options.min_candidate_score, 0.3);
        assert!(options.catch_panics);
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(HealOptions::default()
            .with_min_candidate_score(1.5)
            .validate()
            .is_err());
        assert!(HealOptions::default().with_max_results(0).validate().is_err());
    }
}
