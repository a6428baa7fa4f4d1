//! Optional embedding-similarity filter for search results
//!
//! Scores every result's `title + description` against the query with an
//! external embeddings endpoint and drops results below a threshold. Any
//! embedding failure leaves the list untouched.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::utils::ConfigError;
use crate::web_search::SearchResultItem;

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Embedding request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Embedding endpoint returned HTTP {0}")]
    Status(u16),

    #[error("Embedding endpoint returned an empty vector")]
    Empty,
}

/// Turns text into a vector
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelevanceConfig {
    /// Base URL of an Ollama compatible server
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Results scoring at or below this cosine similarity are dropped
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}
fn default_model() -> String {
    "nomic-embed-text".to_string()
}
fn default_threshold() -> f32 {
    0.5
}
fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            threshold: default_threshold(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl RelevanceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(-1.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::Threshold(self.threshold));
        }
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::Empty("relevance.endpoint"));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::Empty("relevance.model"));
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}

/// `POST {endpoint}/api/embeddings` against an Ollama server
pub struct OllamaEmbedder {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl OllamaEmbedder {
    pub fn new(config: &RelevanceConfig) -> Result<Self, EmbeddingError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            url: format!("{}/api/embeddings", config.endpoint.trim_end_matches('/')),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let response = self
            .client
            .post(&self.url)
            .json(&EmbeddingRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EmbeddingError::Status(status.as_u16()));
        }

        let body: EmbeddingResponse = response.json().await?;
        if body.embedding.is_empty() {
            return Err(EmbeddingError::Empty);
        }
        Ok(body.embedding)
    }
}

/// Cosine similarity; 0.0 for empty, mismatched or zero vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[derive(Clone)]
pub struct RelevanceFilter {
    embedder: Arc<dyn Embedder>,
    threshold: f32,
}

impl RelevanceFilter {
    pub fn new(embedder: Arc<dyn Embedder>, threshold: f32) -> Self {
        Self { embedder, threshold }
    }

    pub fn from_config(config: &RelevanceConfig) -> Result<Self, EmbeddingError> {
        Ok(Self::new(Arc::new(OllamaEmbedder::new(config)?), config.threshold))
    }

    /// Keep items whose similarity to `query` exceeds the threshold, in order
    pub async fn filter(&self, query: &str, items: Vec<SearchResultItem>) -> Vec<SearchResultItem> {
        if items.is_empty() {
            return items;
        }

        let query_vector = match self.embedder.embed(query).await {
            Ok(vector) => vector,
            Err(e) => {
                warn!("Relevance filter skipped, query embedding failed: {}", e);
                return items;
            }
        };

        let scored = futures::future::try_join_all(items.iter().map(|item| {
            let text = format!("{} {}", item.title, item.description);
            let embedder = Arc::clone(&self.embedder);
            async move { embedder.embed(&text).await }
        }))
        .await;

        let vectors = match scored {
            Ok(vectors) => vectors,
            Err(e) => {
                warn!("Relevance filter skipped, result embedding failed: {}", e);
                return items;
            }
        };

        let before = items.len();
        let kept: Vec<_> = items
            .into_iter()
            .zip(vectors)
            .filter_map(|(item, vector)| {
                let score = cosine_similarity(&query_vector, &vector);
                debug!("Relevance {:.3} for {}", score, item.url);
                (score > self.threshold).then_some(item)
            })
            .collect();

        info!("Relevance filter kept {}/{} result(s)", kept.len(), before);
        kept
    }
}
