//! Badge values read from hub tags like `size_categories:1K<n<10K`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{ModalityKind, TagBadges};

static BELOW: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^n<(.+)$").unwrap());
static ABOVE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^n>(.+)$").unwrap());
static RANGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(.+)<n<(.+)$").unwrap());
static LOWER_BOUND: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(.+)<n$").unwrap());

/// Value of the first `key:value` tag, case-insensitive on the key.
pub fn tag_value<'a>(tags: &'a [String], key: &str) -> Option<&'a str> {
    let needle = format!("{}:", key.to_lowercase());
    let tag = tags
        .iter()
        .find(|tag| tag.trim().to_lowercase().starts_with(&needle))?;
    let (_, value) = tag.split_once(':')?;
    Some(value.trim()).filter(|v| !v.is_empty())
}

/// `n<1K` → `<1K`, `1K<n<10K` → `1K–10K`, `10K<n` → `>10K`.
pub fn format_size_label(value: &str) -> String {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            'k' => 'K',
            'm' => 'M',
            other => other,
        })
        .collect();

    if let Some(caps) = BELOW.captures(&compact) {
        return format!("<{}", &caps[1]);
    }
    if let Some(caps) = ABOVE.captures(&compact) {
        return format!(">{}", &caps[1]);
    }
    if let Some(caps) = RANGE.captures(&compact) {
        return format!("{}–{}", &caps[1], &caps[2]);
    }
    if let Some(caps) = LOWER_BOUND.captures(&compact) {
        return format!(">{}", &caps[1]);
    }
    compact
}

pub fn modality_kind(modality: &str) -> ModalityKind {
    let value = modality.trim().to_lowercase();
    if value.contains("image") {
        ModalityKind::Image
    } else if value.contains("audio") {
        ModalityKind::Audio
    } else if value.contains("video") {
        ModalityKind::Video
    } else {
        ModalityKind::Text
    }
}

pub fn badges(tags: &[String]) -> TagBadges {
    let modality = tag_value(tags, "modality");
    TagBadges {
        size: tag_value(tags, "size_categories").map(format_size_label),
        format: tag_value(tags, "format").map(|v| v.trim().to_uppercase()),
        modality: modality.map(|v| v.trim().to_uppercase()),
        modality_kind: modality.map(modality_kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_tag_value() {
        let t = tags(&["license:apache-2.0", " Format:json ", "modality:"]);
        assert_eq!(tag_value(&t, "format"), Some("json"));
        assert_eq!(tag_value(&t, "license"), Some("apache-2.0"));
        assert_eq!(tag_value(&t, "modality"), None);
        assert_eq!(tag_value(&t, "size_categories"), None);
    }

    #[test]
    fn test_format_size_label() {
        assert_eq!(format_size_label("n<1K"), "<1K");
        assert_eq!(format_size_label("n>1T"), ">1T");
        assert_eq!(format_size_label("1K<n<10K"), "1K–10K");
        assert_eq!(format_size_label("10k < n"), ">10K");
        assert_eq!(format_size_label("100m"), "100M");
    }

    #[test]
    fn test_badges() {
        let t = tags(&["size_categories:n<1K", "format:parquet", "modality:image", "region:us"]);
        let b = badges(&t);
        assert_eq!(b.size.as_deref(), Some("<1K"));
        assert_eq!(b.format.as_deref(), Some("PARQUET"));
        assert_eq!(b.modality.as_deref(), Some("IMAGE"));
        assert_eq!(b.modality_kind, Some(ModalityKind::Image));

        assert_eq!(badges(&[]), TagBadges::default());
        assert_eq!(modality_kind("tabular"), ModalityKind::Text);
    }
}
