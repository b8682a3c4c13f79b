//! Static model catalog.
//!
//! Caller-facing model names, the NIM models they map to, which NIM models
//! support a reasoning mode, and the ordered name-pattern rules used when a
//! caller asks for a model the table does not know. All tables are
//! compile-time constants and never change while the process runs.

use serde::Serialize;

/// A caller-facing model name and the upstream model it maps to.
#[derive(Debug, Clone, Copy)]
pub struct ModelAlias {
    pub name: &'static str,
    pub nim_model: &'static str,
}

/// Declaration order is the order `/v1/models` reports.
const MODEL_MAPPING: &[ModelAlias] = &[
    // Premium reasoning
    ModelAlias {
        name: "gpt-4",
        nim_model: "deepseek-ai/deepseek-v3.2",
    },
    ModelAlias {
        name: "gpt-4-turbo",
        nim_model: "deepseek-ai/deepseek-v3.1",
    },
    ModelAlias {
        name: "gpt-4o",
        nim_model: "deepseek-ai/deepseek-v3.1-terminus",
    },
    ModelAlias {
        name: "claude-opus",
        nim_model: "nvidia/llama-3.1-nemotron-ultra-253b-v1",
    },
    ModelAlias {
        name: "claude-sonnet",
        nim_model: "nvidia/llama-3.3-nemotron-super-49b-v1.5",
    },
    // Fast
    ModelAlias {
        name: "gpt-3.5-turbo",
        nim_model: "nvidia/llama-3.1-nemotron-nano-8b-v1",
    },
    ModelAlias {
        name: "gpt-3.5-turbo-16k",
        nim_model: "nvidia/nvidia-nemotron-nano-9b-v2",
    },
    ModelAlias {
        name: "claude-haiku",
        nim_model: "nvidia/nemotron-3-nano-30b-a3b",
    },
    // Specialized
    ModelAlias {
        name: "gemini-pro",
        nim_model: "qwen/qwen3-next-80b-a3b-thinking",
    },
    ModelAlias {
        name: "gemini-pro-vision",
        nim_model: "nvidia/nemotron-nano-12b-v2-vl",
    },
    ModelAlias {
        name: "gpt-4-reasoning",
        nim_model: "moonshotai/kimi-k2-instruct-1113",
    },
    ModelAlias {
        name: "deepseek",
        nim_model: "deepseek-ai/deepseek-v3.1",
    },
    // Meta Llama
    ModelAlias {
        name: "llama-70b",
        nim_model: "meta/llama-3.1-70b-instruct",
    },
    ModelAlias {
        name: "llama-405b",
        nim_model: "meta/llama-3.1-405b-instruct",
    },
    ModelAlias {
        name: "llama-8b",
        nim_model: "meta/llama-3.1-8b-instruct",
    },
];

const THINKING_MODELS: &[&str] = &[
    "deepseek-ai/deepseek-v3.2",
    "deepseek-ai/deepseek-v3.1",
    "deepseek-ai/deepseek-v3.1-terminus",
    "qwen/qwen3-next-80b-a3b-thinking",
    "nvidia/llama-3.1-nemotron-ultra-253b-v1",
    "nvidia/llama-3.3-nemotron-super-49b-v1.5",
    "nvidia/llama-3.1-nemotron-nano-8b-v1",
    "nvidia/nvidia-nemotron-nano-9b-v2",
    "nvidia/nemotron-3-nano-30b-a3b",
];

pub const BEST_QUALITY_MODEL: &str = "deepseek-ai/deepseek-v3.2";
pub const BALANCED_MODEL: &str = "nvidia/llama-3.3-nemotron-super-49b-v1.5";
pub const FAST_MODEL: &str = "nvidia/llama-3.1-nemotron-nano-8b-v1";

/// Upstream model used when no pattern rule matches.
pub const DEFAULT_MODEL: &str = BALANCED_MODEL;

/// A name-pattern rule: any substring hit selects `nim_model`.
#[derive(Debug, Clone, Copy)]
pub struct PatternRule {
    pub patterns: &'static [&'static str],
    pub nim_model: &'static str,
}

impl PatternRule {
    /// `lowered` must already be lower-case.
    pub fn matches(&self, lowered: &str) -> bool {
        self.patterns.iter().any(|p| lowered.contains(p))
    }
}

// Rules overlap (e.g. "gpt-4-70b"); the first match wins, so order matters.
const PATTERN_RULES: &[PatternRule] = &[
    PatternRule {
        patterns: &["gpt-4", "opus"],
        nim_model: BEST_QUALITY_MODEL,
    },
    PatternRule {
        patterns: &["deepseek"],
        nim_model: "deepseek-ai/deepseek-v3.1",
    },
    PatternRule {
        patterns: &["claude-sonnet", "70b"],
        nim_model: BALANCED_MODEL,
    },
    PatternRule {
        patterns: &["3.5", "haiku", "fast"],
        nim_model: FAST_MODEL,
    },
    PatternRule {
        patterns: &["gemini", "qwen"],
        nim_model: "qwen/qwen3-next-80b-a3b-thinking",
    },
];

#[must_use]
pub fn model_mapping() -> &'static [ModelAlias] {
    MODEL_MAPPING
}

#[must_use]
pub fn pattern_rules() -> &'static [PatternRule] {
    PATTERN_RULES
}

/// Exact lookup of a caller-facing name.
#[must_use]
pub fn mapped_model(name: &str) -> Option<&'static str> {
    MODEL_MAPPING
        .iter()
        .find(|alias| alias.name == name)
        .map(|alias| alias.nim_model)
}

#[must_use]
pub fn supports_thinking(nim_model: &str) -> bool {
    THINKING_MODELS.contains(&nim_model)
}

/// One entry of the OpenAI-compatible `/v1/models` listing.
#[derive(Debug, Clone, Serialize)]
pub struct ModelEntry {
    pub id: String,
    pub object: &'static str,
    pub created: i64,
    pub owned_by: &'static str,
    pub nim_model: String,
    pub supports_thinking: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelList {
    pub object: &'static str,
    pub data: Vec<ModelEntry>,
}

/// Build the `/v1/models` listing, one entry per mapped name.
#[must_use]
pub fn model_list(created: i64) -> ModelList {
    let data = MODEL_MAPPING
        .iter()
        .map(|alias| ModelEntry {
            id: alias.name.to_string(),
            object: "model",
            created,
            owned_by: "nvidia-nim-proxy",
            nim_model: alias.nim_model.to_string(),
            supports_thinking: supports_thinking(alias.nim_model),
        })
        .collect();

    ModelList {
        object: "list",
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_lookup() {
        assert_eq!(mapped_model("gpt-4"), Some("deepseek-ai/deepseek-v3.2"));
        assert_eq!(mapped_model("claude-haiku"), Some("nvidia/nemotron-3-nano-30b-a3b"));
        assert_eq!(mapped_model("GPT-4"), None); // exact, case-sensitive
        assert_eq!(mapped_model("unknown"), None);
    }

    #[test]
    fn test_mapping_names_are_unique() {
        let mut names: Vec<&str> = model_mapping().iter().map(|a| a.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), model_mapping().len());
    }

    #[test]
    fn test_thinking_set() {
        assert!(supports_thinking("deepseek-ai/deepseek-v3.2"));
        assert!(!supports_thinking("meta/llama-3.1-70b-instruct"));
        assert!(!supports_thinking("moonshotai/kimi-k2-instruct-1113"));
    }

    #[test]
    fn test_model_list_follows_table_order() {
        let list = model_list(1_700_000_000);
        assert_eq!(list.object, "list");
        assert_eq!(list.data.len(), 15);
        assert_eq!(list.data[0].id, "gpt-4");
        assert_eq!(list.data[14].id, "llama-8b");

        let vision = list.data.iter().find(|m| m.id == "gemini-pro-vision").unwrap();
        assert_eq!(vision.nim_model, "nvidia/nemotron-nano-12b-v2-vl");
        assert!(!vision.supports_thinking);
        assert_eq!(vision.owned_by, "nvidia-nim-proxy");
    }
}
