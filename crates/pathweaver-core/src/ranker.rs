//! Best-effort AI content ranking.
//!
//! [`AiRanker`] asks a text-generation backend to pick a handful of
//! supplementary items from a candidate pool. This is the system's
//! primary external-dependency failure boundary: provider errors,
//! timeouts, and unparseable responses all degrade to "no
//! recommendations" and are never allowed to fail a curation.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::traits::{GenerateRequest, RankRequest, Ranker, TextGenerator};

/// Maximum pool items enumerated in the ranking prompt.
pub const DEFAULT_MAX_CANDIDATES: usize = 80;

/// Upper bound on returned recommendations.
pub const MAX_RECOMMENDATIONS: usize = 8;

/// Wall-clock budget for one ranking call, on top of the provider's own
/// HTTP timeout.
pub const DEFAULT_RANKER_TIMEOUT: Duration = Duration::from_secs(30);

const RANKER_SYSTEM_PROMPT: &str = "You are a special-education content specialist. \
Given a student profile and a numbered list of content items, select the items that \
best supplement the student's learning path. Respond ONLY with a JSON array of the \
selected item numbers, e.g. [3, 7, 12]. Select between 5 and 8 items.";

/// Ranker that never recommends anything.
///
/// Used when no text-generation provider is configured; the curation
/// pipeline is identical either way.
pub struct NoopRanker;

#[async_trait]
impl Ranker for NoopRanker {
    async fn recommend(&self, _request: &RankRequest) -> Vec<String> {
        Vec::new()
    }
}

/// Ranker backed by a text-generation provider.
pub struct AiRanker {
    generator: Arc<dyn TextGenerator>,
    model: String,
    max_candidates: usize,
    timeout: Duration,
}

impl AiRanker {
    pub fn new(generator: Arc<dyn TextGenerator>, model: &str) -> Self {
        Self {
            generator,
            model: model.to_string(),
            max_candidates: DEFAULT_MAX_CANDIDATES,
            timeout: DEFAULT_RANKER_TIMEOUT,
        }
    }

    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn build_prompt(&self, request: &RankRequest) -> String {
        let mut prompt = format!(
            "Student profile: {} learner, autism score {:.1}, down-syndrome score {:.1}, \
             knowledge accuracy {:.0}%.\n\nCandidate content items:\n",
            request.learner_type,
            request.autism_score,
            request.down_syndrome_score,
            request.accuracy * 100.0,
        );

        for (position, item) in request.pool.iter().take(self.max_candidates).enumerate() {
            let _ = writeln!(
                prompt,
                "{}. [{}] {} ({}, {})",
                position + 1,
                item.id,
                item.title,
                item.content_type,
                item.difficulty,
            );
        }

        prompt.push_str(
            "\nReturn a JSON array of the numbers of 5-8 items that would best \
             supplement this student's path.",
        );
        prompt
    }
}

#[async_trait]
impl Ranker for AiRanker {
    async fn recommend(&self, request: &RankRequest) -> Vec<String> {
        let pool_len = request.pool.len().min(self.max_candidates);
        if pool_len == 0 {
            return Vec::new();
        }

        let generate_request = GenerateRequest {
            model: self.model.clone(),
            prompt: self.build_prompt(request),
            system_prompt: Some(RANKER_SYSTEM_PROMPT.to_string()),
            max_tokens: 256,
            temperature: 0.0,
        };

        let response = match tokio::time::timeout(
            self.timeout,
            self.generator.generate(&generate_request),
        )
        .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::warn!(
                    provider = self.generator.name(),
                    "content ranking degraded, continuing with base set only: {e:#}"
                );
                return Vec::new();
            }
            Err(_) => {
                tracing::warn!(
                    provider = self.generator.name(),
                    timeout_secs = self.timeout.as_secs(),
                    "content ranking timed out, continuing with base set only"
                );
                return Vec::new();
            }
        };

        tracing::debug!(
            model = %response.model,
            latency_ms = response.latency_ms,
            tokens = response.token_usage.total_tokens,
            "ranking response received"
        );

        let Some(indices) = extract_json_array(&response.text) else {
            tracing::warn!(
                provider = self.generator.name(),
                "ranking response contained no JSON array, continuing with base set only"
            );
            return Vec::new();
        };

        let base: HashSet<&str> = request.base_ids.iter().map(String::as_str).collect();
        let mut seen = HashSet::new();
        let mut recommended = Vec::new();

        for index in indices {
            // 1-based; anything outside the enumerated pool is discarded.
            if index < 1 || index as usize > pool_len {
                continue;
            }
            let id = &request.pool[index as usize - 1].id;
            if base.contains(id.as_str()) || !seen.insert(id.clone()) {
                continue;
            }
            recommended.push(id.clone());
            if recommended.len() >= MAX_RECOMMENDATIONS {
                break;
            }
        }

        recommended
    }
}

/// Extract the first well-formed JSON array of integers from free text.
///
/// Handles:
/// - A bare array (`[1, 2, 3]`)
/// - An array embedded in prose or a markdown code fence
/// - Truncated or non-JSON responses (returns `None`)
pub fn extract_json_array(text: &str) -> Option<Vec<i64>> {
    let bytes = text.as_bytes();

    for (start, &byte) in bytes.iter().enumerate() {
        if byte != b'[' {
            continue;
        }

        // Scan to the matching close bracket, respecting strings.
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        for (offset, &b) in bytes[start..].iter().enumerate() {
            if in_string {
                if escaped {
                    escaped = false;
                } else if b == b'\\' {
                    escaped = true;
                } else if b == b'"' {
                    in_string = false;
                }
                continue;
            }
            match b {
                b'"' => in_string = true,
                b'[' => depth += 1,
                b']' => {
                    depth -= 1;
                    if depth == 0 {
                        let candidate = &text[start..=start + offset];
                        if let Ok(values) = serde_json::from_str::<Vec<i64>>(candidate) {
                            return Some(values);
                        }
                        break;
                    }
                }
                _ => {}
            }
        }
    }

    None
}
