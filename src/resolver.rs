//! Caller model id → NIM model id.
//!
//! Strategies run in order and the first that yields an id wins:
//! exact table lookup, a live one-token probe of the upstream, then
//! name-pattern heuristics with a catch-all default. Resolution never fails.

use crate::models;
use crate::translate::nim_types::ProbeRequest;
use std::future::Future;

/// Which strategy produced a resolved model id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    Mapped,
    Probed,
    Heuristic,
}

impl ResolutionSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mapped => "mapped",
            Self::Probed => "probed",
            Self::Heuristic => "heuristic",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub model: String,
    pub source: ResolutionSource,
}

/// Asks the upstream whether it serves a model under the caller's id.
pub trait ModelProbe {
    /// `true` only on an explicit success; every failure means "no".
    fn accepts(&self, model: &str) -> impl Future<Output = bool> + Send;
}

/// Probe that sends a one-token completion to the real upstream.
pub struct UpstreamProbe<'a> {
    pub client: &'a reqwest::Client,
    pub url: String,
    pub api_key: &'a str,
}

impl ModelProbe for UpstreamProbe<'_> {
    async fn accepts(&self, model: &str) -> bool {
        let result = self
            .client
            .post(&self.url)
            .bearer_auth(self.api_key)
            .json(&ProbeRequest::new(model))
            .send()
            .await;

        match result {
            Ok(resp) => {
                let status = resp.status();
                tracing::debug!(model, status = status.as_u16(), "model probe answered");
                status.is_success()
            }
            Err(e) => {
                tracing::debug!(model, error = %e, "model probe failed");
                false
            }
        }
    }
}

pub async fn resolve_model<P>(requested: &str, probe: &P) -> Resolution
where
    P: ModelProbe + Sync,
{
    if let Some(model) = models::mapped_model(requested) {
        return Resolution {
            model: model.to_string(),
            source: ResolutionSource::Mapped,
        };
    }

    if probe.accepts(requested).await {
        return Resolution {
            model: requested.to_string(),
            source: ResolutionSource::Probed,
        };
    }

    Resolution {
        model: heuristic_model(requested).to_string(),
        source: ResolutionSource::Heuristic,
    }
}

/// Pattern fallback on the lower-cased id; the first matching rule wins.
#[must_use]
pub fn heuristic_model(requested: &str) -> &'static str {
    let lowered = requested.to_lowercase();
    models::pattern_rules()
        .iter()
        .find(|rule| rule.matches(&lowered))
        .map_or(models::DEFAULT_MODEL, |rule| rule.nim_model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BALANCED_MODEL, BEST_QUALITY_MODEL, FAST_MODEL};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeProbe {
        accept: bool,
        calls: AtomicUsize,
    }

    impl FakeProbe {
        fn new(accept: bool) -> Self {
            Self {
                accept,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl ModelProbe for FakeProbe {
        async fn accepts(&self, _model: &str) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.accept
        }
    }

    fn resolve(requested: &str, probe: &FakeProbe) -> Resolution {
        tokio_test::block_on(resolve_model(requested, probe))
    }

    #[test]
    fn test_mapped_models_never_probe() {
        let probe = FakeProbe::new(true);
        for alias in models::model_mapping() {
            let resolution = resolve(alias.name, &probe);
            assert_eq!(resolution.model, alias.nim_model);
            assert_eq!(resolution.source, ResolutionSource::Mapped);
        }
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_accepted_probe_keeps_caller_id() {
        let probe = FakeProbe::new(true);
        let resolution = resolve("meta/llama-3.3-70b-instruct", &probe);

        assert_eq!(resolution.model, "meta/llama-3.3-70b-instruct");
        assert_eq!(resolution.source, ResolutionSource::Probed);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_rejected_probe_falls_back_to_heuristics() {
        let probe = FakeProbe::new(false);
        let resolution = resolve("unknown-model-xyz", &probe);

        assert_eq!(resolution.model, BALANCED_MODEL);
        assert_eq!(resolution.source, ResolutionSource::Heuristic);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_heuristic_rules_in_declared_order() {
        let cases = [
            ("GPT-4-Vision", BEST_QUALITY_MODEL),
            ("claude-3-opus-20240229", BEST_QUALITY_MODEL),
            ("my-deepseek-r1", "deepseek-ai/deepseek-v3.1"),
            ("claude-sonnet-4", BALANCED_MODEL),
            ("some-70b-chat", BALANCED_MODEL),
            ("gpt-3.5-mini", FAST_MODEL),
            ("claude-3-haiku", FAST_MODEL),
            ("FAST-model", FAST_MODEL),
            ("gemini-1.5-flash", "qwen/qwen3-next-80b-a3b-thinking"),
            ("qwen2", "qwen/qwen3-next-80b-a3b-thinking"),
            ("unknown-model-xyz", BALANCED_MODEL),
        ];

        for (requested, expected) in cases {
            assert_eq!(heuristic_model(requested), expected, "model {requested}");
        }
    }

    #[test]
    fn test_overlapping_patterns_first_rule_wins() {
        // "gpt-4" rule precedes the "70b" rule.
        assert_eq!(heuristic_model("gpt-4-70b"), BEST_QUALITY_MODEL);
        // "deepseek" precedes "3.5".
        assert_eq!(heuristic_model("deepseek-3.5"), "deepseek-ai/deepseek-v3.1");
        // "70b" precedes "qwen".
        assert_eq!(heuristic_model("qwen-70b"), BALANCED_MODEL);
        // "3.5" precedes "gemini" ("gemini-1.5" has no "3.5").
        assert_eq!(heuristic_model("gemini-3.5"), FAST_MODEL);
    }
}
