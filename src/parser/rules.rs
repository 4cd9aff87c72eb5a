//! Rule tables for identifier parsing.
//!
//! Patterns are regex fragments matched against the normalized slug
//! (lowercase, `-` separated). Source and architecture fragments are
//! wrapped in `-` boundaries when compiled, so `gpt-5` never matches
//! inside `gpt-5.1`.

/// Maps a slug fragment to a canonical source label.
///
/// `sample` is a slug the rule must resolve on its own. The parser refuses
/// a table where an earlier rule already captures a later rule's sample.
#[derive(Debug, Clone, Copy)]
pub struct SourceRuleDef {
    pub pattern: &'static str,
    pub label: &'static str,
    pub sample: &'static str,
}

/// Structural base-architecture pattern.
///
/// `pattern` must define a `size` capture and may define `active` for
/// mixture-of-experts markers like `-a3b`. `fixed_active` is used for
/// families whose active count never appears in the slug.
#[derive(Debug, Clone, Copy)]
pub struct ArchitectureDef {
    pub pattern: &'static str,
    pub family: &'static str,
    pub fixed_active: Option<&'static str>,
}

const fn rule(pattern: &'static str, label: &'static str, sample: &'static str) -> SourceRuleDef {
    SourceRuleDef {
        pattern,
        label,
        sample,
    }
}

// ===== SOURCE RULES =====

// Evaluated top to bottom. Sub-variants sit above their family.
pub const SOURCE_RULES: &[SourceRuleDef] = &[
    // Anthropic
    rule(r"claude-(?:4\.5-opus|opus-4\.5)", "Claude Opus 4.5", "Qwen3-4B-Thinking-2507-Claude-4.5-Opus-High-Reasoning-Distill"),
    rule(r"claude-(?:4\.5-sonnet|sonnet-4\.5)", "Claude Sonnet 4.5", "Qwen3-8B-Claude-Sonnet-4.5-Reasoning-Distill-GGUF"),
    rule(r"claude-(?:4\.5-haiku|haiku-4\.5)", "Claude Haiku 4.5", "claude-haiku-4.5-high-reasoning-1700x"),
    rule(r"claude-sonnet-4", "Claude Sonnet 4", "Qwen3-8B-Claude-Sonnet-4-Distill"),
    rule(r"claude-sonnet", "Claude Sonnet 4.5", "Qwen3-14B-Claude-Sonnet-Distill"),
    // Google
    rule(r"gemini-3-pro(?:-preview)?", "Gemini 3 Pro", "Qwen3-8B-Gemini-3-Pro-Preview-Distill-GGUF"),
    rule(r"gemini-2\.5-pro", "Gemini 2.5 Pro", "Qwen3-4B-Thinking-2507-Gemini-2.5-Pro-Distill"),
    rule(r"gemini-2\.5-flash-lite", "Gemini 2.5 Flash Lite", "gemini-2.5-flash-lite-2500x"),
    rule(r"gemini-2\.5-flash-preview-\d{2}-\d{4}", "Gemini 2.5 Flash Preview", "gemini-2.5-flash-preview-09-2025-1000x"),
    rule(r"gemini-2\.5-flash", "Gemini 2.5 Flash", "Qwen3-30B-A3B-Thinking-2507-Gemini-2.5-Flash-Distill-GGUF"),
    // OpenAI
    rule(r"gpt-5\.1-codex", "GPT-5.1 Codex", "Qwen3-4B-GPT-5.1-Codex-Distill"),
    rule(r"gpt-5\.1", "GPT-5.1", "Qwen3-4B-Thinking-2507-GPT-5.1-High-Reasoning-Distill"),
    rule(r"gpt-5-codex", "GPT-5 Codex", "Qwen3-4B-Thinking-2507-GPT-5-Codex-Distill"),
    rule(r"gpt-5", "GPT-5", "gpt-5-high-reasoning-250x"),
    // Moonshot
    rule(r"kimi-k2-thinking", "Kimi K2 Thinking", "Qwen3-8B-Kimi-K2-Thinking-Distill-GGUF"),
    rule(r"kimi-k2", "Kimi K2", "kimi-k2-instruct-1000x"),
    // Zhipu
    rule(r"glm-4\.6", "GLM 4.6", "Qwen3-4B-Thinking-2507-GLM-4.6-Distill"),
    rule(r"glm-4\.5-air", "GLM 4.5 Air", "glm-4.5-air-1000x"),
    rule(r"glm-4\.5", "GLM 4.5", "glm-4.5-1000x"),
    // Cohere
    rule(r"command-a", "Command A", "Qwen3-4B-Thinking-2507-Command-A-Reasoning-Distill"),
    // DeepSeek
    rule(r"deepseek-v3\.2-speciale", "DeepSeek V3.2 Speciale", "Qwen3-8B-DeepSeek-v3.2-Speciale-Distill"),
    rule(r"deepseek-v3\.2(?:-exp)?", "DeepSeek V3.2", "deepseek-v3.2-1000x"),
    rule(r"deepseek-r1", "DeepSeek R1", "Qwen3-8B-DeepSeek-R1-Distill"),
    // xAI
    rule(r"grok-4-fast", "Grok 4 Fast", "grok-4-fast-reasoning-1000x"),
    rule(r"grok-4", "Grok 4", "Qwen3-8B-Grok-4-Distill"),
    // Shares its leading token with the Qwen3 base family.
    rule(r"qwen3-max", "Qwen3 Max", "Qwen3-4B-Thinking-2507-Qwen3-Max-Distill"),
    rule(r"minimax-m2", "MiniMax M2", "minimax-m2-1000x"),
];

// ===== BASE ARCHITECTURES =====

pub const ARCHITECTURES: &[ArchitectureDef] = &[
    ArchitectureDef {
        pattern: r"qwen3-(?P<size>\d+(?:\.\d+)?)b(?:-a(?P<active>\d+(?:\.\d+)?)b)?",
        family: "Qwen3",
        fixed_active: None,
    },
    ArchitectureDef {
        pattern: r"qwen2\.5-(?P<size>\d+(?:\.\d+)?)b",
        family: "Qwen2.5",
        fixed_active: None,
    },
    ArchitectureDef {
        pattern: r"gpt-oss-(?P<size>20)b",
        family: "GPT-OSS",
        fixed_active: Some("3"),
    },
    ArchitectureDef {
        pattern: r"gpt-oss-(?P<size>120)b",
        family: "GPT-OSS",
        fixed_active: Some("5"),
    },
    ArchitectureDef {
        pattern: r"gemma-?3-(?P<size>\d+)b",
        family: "Gemma3",
        fixed_active: None,
    },
    ArchitectureDef {
        pattern: r"llama-?3\.1-(?P<size>\d+)b",
        family: "Llama-3.1",
        fixed_active: None,
    },
    ArchitectureDef {
        pattern: r"llama-?3\.2-(?P<size>\d+)b",
        family: "Llama-3.2",
        fixed_active: None,
    },
];

// ===== NORMALIZATION =====

// Trailing boilerplate removed before source rules run. `\d+x` is the
// sample-count suffix on dataset names.
pub const BOILERPLATE_SUFFIXES: &[&str] = &[
    "gguf",
    "mlx",
    "awq",
    "gptq",
    "fp8",
    "bnb-4bit",
    "distilled",
    "distill",
    "high-reasoning",
    "reasoning",
    r"\d+x",
];

// Tokens skipped between an architecture prefix and the remainder used by
// the fallback label.
pub const VARIANT_TOKENS: &[&str] = &["thinking", "instruct", "it", "base", "chat", r"\d{4}"];

/// Immutable tables handed to the parser at construction.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    pub source_rules: Vec<SourceRuleDef>,
    pub architectures: Vec<ArchitectureDef>,
    pub boilerplate_suffixes: Vec<&'static str>,
    pub variant_tokens: Vec<&'static str>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            source_rules: SOURCE_RULES.to_vec(),
            architectures: ARCHITECTURES.to_vec(),
            boilerplate_suffixes: BOILERPLATE_SUFFIXES.to_vec(),
            variant_tokens: VARIANT_TOKENS.to_vec(),
        }
    }
}
