//! Sentiment classifier implementations
//!
//! - [`HttpSentimentClassifier`]: remote text-classification endpoint (reqwest)
//! - [`StaticClassifier`]: fixed answers for offline runs and tests

use crate::types::{ClassifierError, EmotionDistribution, SentimentClassifier};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sonemica_common::config::ClassifierConfig;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

// ============================================================================
// HTTP classifier
// ============================================================================

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

/// Accepted response shapes
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassifyResponse {
    /// `{"joy": 0.7, "sadness": 0.1, ...}`
    Scores(HashMap<String, f64>),
    /// `[[{"label": "joy", "score": 0.7}, ...]]` (one list per input)
    Batched(Vec<Vec<LabelScore>>),
    /// `[{"label": "joy", "score": 0.7}, ...]`
    Labels(Vec<LabelScore>),
}

impl ClassifyResponse {
    fn into_distribution(self) -> Result<EmotionDistribution, ClassifierError> {
        let pairs: Vec<(String, f64)> = match self {
            ClassifyResponse::Scores(map) => map.into_iter().collect(),
            ClassifyResponse::Batched(batches) => batches
                .into_iter()
                .next()
                .unwrap_or_default()
                .into_iter()
                .map(|ls| (ls.label, ls.score))
                .collect(),
            ClassifyResponse::Labels(labels) => {
                labels.into_iter().map(|ls| (ls.label, ls.score)).collect()
            }
        };

        let mut distribution = EmotionDistribution::default();
        let mut known = 0;
        for (label, score) in pairs {
            if distribution.set(&label.to_lowercase(), score) {
                known += 1;
            } else {
                debug!(label = %label, "Ignoring unknown emotion label");
            }
        }

        if known == 0 {
            return Err(ClassifierError::Parse(
                "response contains none of the expected emotion labels".to_string(),
            ));
        }

        Ok(distribution)
    }
}

/// Remote sentiment classifier
///
/// POSTs `{"inputs": text}` to the configured endpoint.
pub struct HttpSentimentClassifier {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpSentimentClassifier {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ClassifierError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClassifierError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    /// Classifier from the `[classifier]` config section
    ///
    /// # Errors
    /// `NotAvailable` when no endpoint is configured.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self, ClassifierError> {
        let endpoint = config.endpoint.as_deref().ok_or_else(|| {
            ClassifierError::NotAvailable("no [classifier] endpoint configured".to_string())
        })?;
        Self::new(endpoint, Duration::from_secs(config.timeout_secs))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SentimentClassifier for HttpSentimentClassifier {
    fn name(&self) -> &'static str {
        "HttpSentimentClassifier"
    }

    async fn classify(&self, text: &str) -> Result<EmotionDistribution, ClassifierError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ClassifyRequest { inputs: text })
            .send()
            .await
            .map_err(|e| ClassifierError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Classifier returned an error");
            return Err(ClassifierError::Api(format!("{}: {}", status, body)));
        }

        let parsed: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::Parse(e.to_string()))?;

        parsed.into_distribution()
    }
}

// ============================================================================
// Static classifier
// ============================================================================

/// Classifier with canned answers
///
/// Texts registered with [`StaticClassifier::with_text`] get their own distribution;
/// everything else gets the fallback.
#[derive(Debug, Clone, Default)]
pub struct StaticClassifier {
    fallback: EmotionDistribution,
    by_text: HashMap<String, EmotionDistribution>,
}

impl StaticClassifier {
    pub fn new(fallback: EmotionDistribution) -> Self {
        Self {
            fallback,
            by_text: HashMap::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>, distribution: EmotionDistribution) -> Self {
        self.by_text.insert(text.into(), distribution);
        self
    }
}

#[async_trait]
impl SentimentClassifier for StaticClassifier {
    fn name(&self) -> &'static str {
        "StaticClassifier"
    }

    async fn classify(&self, text: &str) -> Result<EmotionDistribution, ClassifierError> {
        Ok(self.by_text.get(text).copied().unwrap_or(self.fallback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<EmotionDistribution, ClassifierError> {
        serde_json::from_str::<ClassifyResponse>(json)
            .unwrap()
            .into_distribution()
    }

    #[test]
    fn test_flat_scores() {
        let d = parse(r#"{"anger":0.1,"joy":0.5,"optimism":0.3,"sadness":0.1}"#).unwrap();
        assert_eq!(d, EmotionDistribution::new(0.1, 0.5, 0.3, 0.1));
    }

    #[test]
    fn test_batched_label_scores() {
        let d = parse(
            r#"[[{"label":"joy","score":0.7},{"label":"sadness","score":0.2},{"label":"anger","score":0.1}]]"#,
        )
        .unwrap();
        assert_eq!(d.joy, 0.7);
        assert_eq!(d.optimism, 0.0);
    }

    #[test]
    fn test_unknown_labels_ignored() {
        let d = parse(r#"[{"label":"JOY","score":0.9},{"label":"fear","score":0.1}]"#).unwrap();
        assert_eq!(d.joy, 0.9);
    }

    #[test]
    fn test_no_known_labels_is_parse_error() {
        assert!(matches!(
            parse(r#"{"positive":0.9}"#),
            Err(ClassifierError::Parse(_))
        ));
    }

    #[test]
    fn test_from_config_requires_endpoint() {
        assert!(matches!(
            HttpSentimentClassifier::from_config(&ClassifierConfig::default()),
            Err(ClassifierError::NotAvailable(_))
        ));
    }

    #[tokio::test]
    async fn test_static_classifier() {
        let sad = EmotionDistribution::new(0.0, 0.0, 0.0, 1.0);
        let classifier = StaticClassifier::new(EmotionDistribution::default()).with_text("tears", sad);

        assert_eq!(classifier.classify("tears").await.unwrap(), sad);
        assert_eq!(
            classifier.classify("other").await.unwrap(),
            EmotionDistribution::default()
        );
    }
}
