use regex::Regex;

use super::rules::ParserConfig;
use crate::error::{CatalogError, Result};
use crate::models::{ParsedIdentity, UNKNOWN};

// Bounds for a fallback label, exclusive, in characters.
const MIN_FALLBACK_LEN: usize = 2;
const MAX_FALLBACK_LEN: usize = 50;

struct SourceRule {
    regex: Regex,
    label: String,
}

struct Architecture {
    regex: Regex,
    family: &'static str,
    fixed_active: Option<&'static str>,
}

struct ArchitectureMatch {
    base: String,
    params: String,
    start: usize,
    end: usize,
}

/// Turns catalog identifiers into display labels.
///
/// Built once from a [`ParserConfig`] and shared read-only. Parsing is
/// total: anything unresolved comes back as `"Unknown"`.
pub struct IdentityParser {
    source_rules: Vec<SourceRule>,
    architectures: Vec<Architecture>,
    boilerplate: Regex,
    variant_prefix: Regex,
}

fn compile(label: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| CatalogError::Pattern {
        label: label.to_string(),
        source,
    })
}

fn bounded(label: &str, fragment: &str) -> Result<Regex> {
    compile(label, &format!("(?:^|-)(?:{fragment})(?:-|$)"))
}

impl IdentityParser {
    /// Compile the tables and check rule order.
    ///
    /// Every source rule must match its own sample, and no earlier rule may
    /// match it first.
    pub fn new(config: &ParserConfig) -> Result<Self> {
        let boilerplate = compile(
            "boilerplate",
            &format!("(?:-(?:{}))+$", config.boilerplate_suffixes.join("|")),
        )?;
        let variant_prefix = compile(
            "variant tokens",
            &format!("^(?:(?:{})(?:-|$))*", config.variant_tokens.join("|")),
        )?;

        let architectures = config
            .architectures
            .iter()
            .map(|def| {
                Ok(Architecture {
                    regex: bounded(def.family, def.pattern)?,
                    family: def.family,
                    fixed_active: def.fixed_active,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut parser = Self {
            source_rules: Vec::with_capacity(config.source_rules.len()),
            architectures,
            boilerplate,
            variant_prefix,
        };

        for (index, def) in config.source_rules.iter().enumerate() {
            let regex = bounded(def.label, def.pattern)?;
            let sample = parser.normalize(def.sample);

            if !regex.is_match(&sample) {
                return Err(CatalogError::RuleSample {
                    label: def.label.to_string(),
                    sample: def.sample.to_string(),
                });
            }
            if let Some(earlier) = parser.source_rules.iter().find(|r| r.regex.is_match(&sample)) {
                return Err(CatalogError::RuleShadowed {
                    index,
                    label: def.label.to_string(),
                    shadowed_by: earlier.label.clone(),
                });
            }

            parser.source_rules.push(SourceRule {
                regex,
                label: def.label.to_string(),
            });
        }

        Ok(parser)
    }

    pub fn parse_identity(&self, identifier: &str) -> ParsedIdentity {
        let (organization, slug) = identifier.split_once('/').unwrap_or(("", identifier));
        let normalized = self.normalize(slug);
        let arch = self.match_architecture(&normalized);

        let (source_label, source_inferred) = match self.match_source(&normalized) {
            Some(label) => (label.to_string(), false),
            None => match self.infer_source(&normalized, arch.as_ref()) {
                Some(label) => (label, true),
                None => (UNKNOWN.to_string(), false),
            },
        };

        let (base_architecture, parameter_label) = match arch {
            Some(m) => (m.base, m.params),
            None => (UNKNOWN.to_string(), UNKNOWN.to_string()),
        };

        ParsedIdentity {
            organization: organization.to_string(),
            slug: slug.to_string(),
            base_architecture,
            parameter_label,
            source_label,
            source_inferred,
        }
    }

    /// Source label only, for filtering.
    pub fn source_label(&self, identifier: &str) -> String {
        self.parse_identity(identifier).source_label
    }

    /// Lowercase, `-` separated, trailing boilerplate removed.
    fn normalize(&self, slug: &str) -> String {
        let lowered = slug
            .trim()
            .to_lowercase()
            .replace(|c: char| c == '_' || c == '/' || c.is_whitespace(), "-");
        let collapsed = lowered
            .split('-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-");

        self.boilerplate.replace(&collapsed, "").into_owned()
    }

    fn match_source(&self, normalized: &str) -> Option<&str> {
        self.source_rules
            .iter()
            .find(|rule| rule.regex.is_match(normalized))
            .map(|rule| rule.label.as_str())
    }

    fn match_architecture(&self, normalized: &str) -> Option<ArchitectureMatch> {
        self.architectures.iter().find_map(|arch| {
            let caps = arch.regex.captures(normalized)?;
            let whole = caps.get(0)?;
            let size = caps.name("size")?.as_str();
            let marked = caps.name("active").map(|m| m.as_str());

            let base = match marked {
                Some(active) => format!("{}-{}B-A{}B", arch.family, size, active),
                None => format!("{}-{}B", arch.family, size),
            };
            let params = match marked.or(arch.fixed_active) {
                Some(active) => format!("{}B ({}B active)", size, active),
                None => format!("{}B", size),
            };

            Some(ArchitectureMatch {
                base,
                params,
                start: whole.start(),
                end: whole.end(),
            })
        })
    }

    /// Best-effort label from whatever follows a leading architecture token.
    fn infer_source(&self, normalized: &str, arch: Option<&ArchitectureMatch>) -> Option<String> {
        let arch = arch.filter(|m| m.start == 0)?;
        let remainder = &normalized[arch.end..];
        let skip = self.variant_prefix.find(remainder).map_or(0, |m| m.end());

        let label = title_case(&remainder[skip..]);
        let len = label.chars().count();
        (len > MIN_FALLBACK_LEN && len < MAX_FALLBACK_LEN).then_some(label)
    }
}

fn title_case(text: &str) -> String {
    text.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::rules::{SourceRuleDef, SOURCE_RULES};

    fn parser() -> IdentityParser {
        IdentityParser::new(&ParserConfig::default()).unwrap()
    }

    #[test]
    fn default_tables_compile() {
        assert!(IdentityParser::new(&ParserConfig::default()).is_ok());
    }

    #[test]
    fn dense_model_identifier() {
        let parsed = parser().parse_identity("TeichAI/Qwen3-8B-Claude-Sonnet-4.5-Reasoning-Distill-GGUF");
        assert_eq!(parsed.organization, "TeichAI");
        assert_eq!(parsed.slug, "Qwen3-8B-Claude-Sonnet-4.5-Reasoning-Distill-GGUF");
        assert_eq!(parsed.base_architecture, "Qwen3-8B");
        assert_eq!(parsed.parameter_label, "8B");
        assert_eq!(parsed.source_label, "Claude Sonnet 4.5");
        assert!(!parsed.source_inferred);
    }

    #[test]
    fn mixture_model_reports_active_parameters() {
        let parsed =
            parser().parse_identity("TeichAI/Qwen3-30B-A3B-Thinking-2507-Gemini-2.5-Flash-Distill-GGUF");
        assert_eq!(parsed.base_architecture, "Qwen3-30B-A3B");
        assert_eq!(parsed.parameter_label, "30B (3B active)");
        assert_eq!(parsed.source_label, "Gemini 2.5 Flash");
    }

    #[test]
    fn gpt_oss_uses_known_active_count() {
        let parsed =
            parser().parse_identity("TeichAI/gpt-oss-20b-claude-4.5-sonnet-high-reasoning-distill-GGUF");
        assert_eq!(parsed.base_architecture, "GPT-OSS-20B");
        assert_eq!(parsed.parameter_label, "20B (3B active)");
        assert_eq!(parsed.source_label, "Claude Sonnet 4.5");
    }

    #[test]
    fn dataset_names_resolve_sources() {
        let p = parser();
        assert_eq!(p.source_label("TeichAI/claude-4.5-opus-high-reasoning-250x"), "Claude Opus 4.5");
        assert_eq!(p.source_label("TeichAI/gemini-2.5-flash-11000x"), "Gemini 2.5 Flash");
        assert_eq!(p.source_label("TeichAI/kimi-k2-thinking-1000x"), "Kimi K2 Thinking");
        assert_eq!(
            p.source_label("TeichAI/gemini-3-pro-preview-high-reasoning-250x"),
            "Gemini 3 Pro"
        );
    }

    #[test]
    fn parsing_is_total() {
        let p = parser();
        for input in ["", "/", "//", "a", "a/b/c", "   ", "-----", "TeichAI/", "/Qwen3-8B", "ünïcödé/ß"] {
            let parsed = p.parse_identity(input);
            assert!(!parsed.base_architecture.is_empty());
            assert!(!parsed.parameter_label.is_empty());
            assert!(!parsed.source_label.is_empty());
        }
    }

    #[test]
    fn separator_handling() {
        let p = parser();
        let bare = p.parse_identity("Qwen3-4B-GLM-4.6-Distill");
        assert_eq!(bare.organization, "");
        assert_eq!(bare.slug, "Qwen3-4B-GLM-4.6-Distill");
        assert_eq!(bare.source_label, "GLM 4.6");

        let nested = p.parse_identity("org/team/Qwen3-14B-Command-A-Distill");
        assert_eq!(nested.organization, "org");
        assert_eq!(nested.slug, "team/Qwen3-14B-Command-A-Distill");
        assert_eq!(nested.base_architecture, "Qwen3-14B");
        assert_eq!(nested.source_label, "Command A");
    }

    #[test]
    fn unknown_tokens_resolve_to_sentinel() {
        let p = parser();
        for input in ["TeichAI/my-custom-dataset", "someone/llm-experiment-v2", "x"] {
            let parsed = p.parse_identity(input);
            assert_eq!(parsed.base_architecture, UNKNOWN, "{input}");
            assert_eq!(parsed.parameter_label, UNKNOWN, "{input}");
            assert_eq!(parsed.source_label, UNKNOWN, "{input}");
        }
    }

    // (identifier, required label, sibling label it must not fall through to)
    const PRECEDENCE: &[(&str, &str, &str)] = &[
        ("TeichAI/Qwen3-8B-DeepSeek-v3.2-Speciale-Distill", "DeepSeek V3.2 Speciale", "DeepSeek V3.2"),
        ("TeichAI/gemini-2.5-flash-lite-2500x", "Gemini 2.5 Flash Lite", "Gemini 2.5 Flash"),
        ("TeichAI/gemini-2.5-flash-preview-09-2025-1000x", "Gemini 2.5 Flash Preview", "Gemini 2.5 Flash"),
        ("TeichAI/Qwen3-4B-GPT-5.1-Codex-Distill", "GPT-5.1 Codex", "GPT-5.1"),
        ("TeichAI/Qwen3-4B-Thinking-2507-GPT-5.1-High-Reasoning-Distill", "GPT-5.1", "GPT-5"),
        ("TeichAI/Qwen3-4B-Thinking-2507-GPT-5-Codex-Distill", "GPT-5 Codex", "GPT-5"),
        ("TeichAI/Qwen3-8B-Kimi-K2-Thinking-Distill-GGUF", "Kimi K2 Thinking", "Kimi K2"),
        ("TeichAI/glm-4.5-air-1000x", "GLM 4.5 Air", "GLM 4.5"),
        ("TeichAI/grok-4-fast-reasoning-1000x", "Grok 4 Fast", "Grok 4"),
        ("TeichAI/Qwen3-8B-Claude-Sonnet-4.5-Reasoning-Distill-GGUF", "Claude Sonnet 4.5", "Claude Sonnet 4"),
    ];

    #[test]
    fn specific_rules_win_over_their_family() {
        let p = parser();
        for (identifier, specific, general) in PRECEDENCE {
            assert_eq!(p.source_label(identifier), *specific, "{identifier}");
            assert_ne!(p.source_label(identifier), *general, "{identifier}");
        }
    }

    #[test]
    fn specific_rules_are_listed_first() {
        let position = |label: &str| SOURCE_RULES.iter().position(|r| r.label == label).unwrap();
        for (_, specific, general) in PRECEDENCE {
            assert!(position(specific) < position(general), "{specific} must precede {general}");
        }
    }

    #[test]
    fn every_sample_resolves_to_its_rule() {
        let p = parser();
        for rule in SOURCE_RULES {
            assert_eq!(p.source_label(rule.sample), rule.label, "{}", rule.sample);
        }
    }

    #[test]
    fn reordered_table_is_rejected() {
        let mut config = ParserConfig::default();
        let lite = config
            .source_rules
            .iter()
            .position(|r| r.label == "Gemini 2.5 Flash Lite")
            .unwrap();
        let flash = config
            .source_rules
            .iter()
            .position(|r| r.label == "Gemini 2.5 Flash")
            .unwrap();
        let general = config.source_rules.remove(flash);
        config.source_rules.insert(lite, general);

        match IdentityParser::new(&config) {
            Err(CatalogError::RuleShadowed { label, shadowed_by, .. }) => {
                assert_eq!(label, "Gemini 2.5 Flash Lite");
                assert_eq!(shadowed_by, "Gemini 2.5 Flash");
            }
            other => panic!("expected RuleShadowed, got {:?}", other.err()),
        }
    }

    #[test]
    fn rule_must_match_its_sample() {
        let config = ParserConfig {
            source_rules: vec![SourceRuleDef {
                pattern: r"mistral-large",
                label: "Mistral Large",
                sample: "Qwen3-8B-Mistral-Small-Distill",
            }],
            ..ParserConfig::default()
        };
        assert!(matches!(
            IdentityParser::new(&config),
            Err(CatalogError::RuleSample { .. })
        ));
    }

    #[test]
    fn fallback_uses_remainder_after_architecture() {
        let p = parser();
        let parsed = p.parse_identity("TeichAI/Qwen3-8B-Mistral-Large-Distill-GGUF");
        assert_eq!(parsed.source_label, "Mistral Large");
        assert!(parsed.source_inferred);

        let parsed = p.parse_identity("TeichAI/Qwen3-4B-Thinking-2507-Hermes_4-Distill");
        assert_eq!(parsed.source_label, "Hermes 4");
    }

    #[test]
    fn fallback_rejects_trivial_or_long_remainders() {
        let p = parser();
        assert_eq!(p.source_label("TeichAI/Qwen3-8B-Xy-Distill"), UNKNOWN);
        assert_eq!(p.source_label("TeichAI/Qwen3-4B-Thinking-2507"), UNKNOWN);

        let long = format!("TeichAI/Qwen3-8B-{}", "word-".repeat(12));
        assert_eq!(p.source_label(&long), UNKNOWN);
    }

    #[test]
    fn fallback_needs_leading_architecture() {
        // Architecture present but not as the prefix.
        let parsed = parser().parse_identity("TeichAI/custom-qwen3-8b-finetune");
        assert_eq!(parsed.base_architecture, "Qwen3-8B");
        assert_eq!(parsed.source_label, UNKNOWN);
    }

    #[test]
    fn title_case_splits_separators() {
        assert_eq!(title_case("mistral-large_v2  beta"), "Mistral Large V2 Beta");
        assert_eq!(title_case(""), "");
    }
}
