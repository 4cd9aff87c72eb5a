//! Cross-record aggregation for catalog listings.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::models::{CatalogEntry, HomeSummary, SortOption, Stats, UNKNOWN};
use crate::parser::IdentityParser;

/// Number of models featured on the landing page.
pub const FEATURED_MODELS: usize = 2;

/// Totals across models and datasets. Likes count models only.
pub fn aggregate_stats(models: &[CatalogEntry], datasets: &[CatalogEntry]) -> Stats {
    let model_downloads: u64 = models.iter().map(|m| m.downloads).sum();
    let dataset_downloads: u64 = datasets.iter().map(|d| d.downloads).sum();

    Stats {
        total_downloads: model_downloads + dataset_downloads,
        total_models: models.len(),
        total_datasets: datasets.len(),
        total_likes: models.iter().map(|m| m.likes).sum(),
    }
}

/// Up to `n` entries by downloads, descending. Ties keep input order.
pub fn top_by_downloads(entries: &[CatalogEntry], n: usize) -> Vec<&CatalogEntry> {
    let mut ranked: Vec<&CatalogEntry> = entries.iter().collect();
    ranked.sort_by(|a, b| b.downloads.cmp(&a.downloads));
    ranked.truncate(n);
    ranked
}

/// `1234567` → `1.2M`, `3456` → `3.5K`, `92` → `92`.
pub fn format_downloads(downloads: u64) -> String {
    if downloads >= 1_000_000 {
        format!("{:.1}M", downloads as f64 / 1_000_000.0)
    } else if downloads >= 1_000 {
        format!("{:.1}K", downloads as f64 / 1_000.0)
    } else {
        downloads.to_string()
    }
}

pub fn home_summary(models: &[CatalogEntry], datasets: &[CatalogEntry]) -> HomeSummary {
    let stats = aggregate_stats(models, datasets);
    HomeSummary {
        total_downloads: format_downloads(stats.total_downloads),
        total_models: stats.total_models,
        total_datasets: stats.total_datasets,
        top_models: top_by_downloads(models, FEATURED_MODELS)
            .into_iter()
            .cloned()
            .collect(),
    }
}

/// Stable sort in place.
pub fn sort_entries(entries: &mut [CatalogEntry], sort: SortOption) {
    match sort {
        SortOption::Downloads => entries.sort_by(|a, b| b.downloads.cmp(&a.downloads)),
        SortOption::Likes => entries.sort_by(|a, b| b.likes.cmp(&a.likes)),
        SortOption::Name => entries.sort_by(|a, b| compare_names(&a.id, &b.id)),
        SortOption::Recent => entries.sort_by(|a, b| match (a.created_at, b.created_at) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }),
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Distinct known source labels, sorted.
pub fn source_labels(parser: &IdentityParser, entries: &[CatalogEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|e| parser.source_label(&e.id))
        .filter(|label| label != UNKNOWN)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn filter_by_source(
    parser: &IdentityParser,
    entries: Vec<CatalogEntry>,
    source: Option<&str>,
) -> Vec<CatalogEntry> {
    match source {
        Some(wanted) => entries
            .into_iter()
            .filter(|e| parser.source_label(&e.id) == wanted)
            .collect(),
        None => entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParserConfig;
    use chrono::{TimeZone, Utc};

    fn entry(id: &str, downloads: u64, likes: u64) -> CatalogEntry {
        CatalogEntry {
            id: id.to_string(),
            downloads,
            likes,
            tags: Vec::new(),
            created_at: None,
        }
    }

    #[test]
    fn totals_across_lists() {
        let models = vec![entry("TeichAI/a", 100, 5)];
        let datasets = vec![entry("TeichAI/b", 50, 0)];
        let stats = aggregate_stats(&models, &datasets);
        assert_eq!(stats.total_downloads, 150);
        assert_eq!(stats.total_likes, 5);
        assert_eq!(stats.total_models, 1);
        assert_eq!(stats.total_datasets, 1);
    }

    #[test]
    fn dataset_likes_are_not_counted() {
        let datasets = vec![entry("TeichAI/b", 10, 22)];
        assert_eq!(aggregate_stats(&[], &datasets).total_likes, 0);
    }

    #[test]
    fn totals_ignore_order() {
        let models = vec![entry("a", 3, 1), entry("b", 700, 9), entry("c", 41, 0)];
        let datasets = vec![entry("d", 12, 4), entry("e", 0, 2)];
        let expected = aggregate_stats(&models, &datasets);

        let mut rev_models = models.clone();
        rev_models.reverse();
        let mut rev_datasets = datasets.clone();
        rev_datasets.rotate_left(1);
        assert_eq!(aggregate_stats(&rev_models, &rev_datasets), expected);
    }

    #[test]
    fn empty_input_is_zero() {
        let stats = aggregate_stats(&[], &[]);
        assert_eq!(stats, Stats::default());
        assert!(top_by_downloads(&[], 3).is_empty());

        let summary = home_summary(&[], &[]);
        assert_eq!(summary.total_downloads, "0");
        assert!(summary.top_models.is_empty());
    }

    #[test]
    fn top_by_downloads_is_stable() {
        let entries = vec![entry("a", 10, 0), entry("b", 30, 0), entry("c", 10, 0), entry("d", 30, 0)];
        let ids: Vec<_> = top_by_downloads(&entries, 3).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["b", "d", "a"]);

        assert_eq!(top_by_downloads(&entries, 10).len(), 4);
    }

    #[test]
    fn test_format_downloads() {
        assert_eq!(format_downloads(92), "92");
        assert_eq!(format_downloads(1_000), "1.0K");
        assert_eq!(format_downloads(16_900), "16.9K");
        assert_eq!(format_downloads(2_340_000), "2.3M");
    }

    #[test]
    fn sort_options() {
        let mut entries = vec![entry("TeichAI/b", 5, 9), entry("Liontix/C", 50, 1), entry("TeichAI/a", 5, 3)];
        entries[0].created_at = Some(Utc.with_ymd_and_hms(2025, 11, 1, 0, 0, 0).unwrap());
        entries[1].created_at = Some(Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap());

        sort_entries(&mut entries, SortOption::Downloads);
        assert_eq!(entries[0].id, "Liontix/C");
        assert_eq!(entries[1].id, "TeichAI/b");

        sort_entries(&mut entries, SortOption::Likes);
        assert_eq!(entries[0].id, "TeichAI/b");

        sort_entries(&mut entries, SortOption::Name);
        let ids: Vec<_> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["Liontix/C", "TeichAI/a", "TeichAI/b"]);

        sort_entries(&mut entries, SortOption::Recent);
        let ids: Vec<_> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["Liontix/C", "TeichAI/b", "TeichAI/a"]);
    }

    #[test]
    fn sources_and_filtering() {
        let parser = IdentityParser::new(&ParserConfig::default()).unwrap();
        let entries = vec![
            entry("TeichAI/Qwen3-8B-Kimi-K2-Thinking-Distill-GGUF", 1, 0),
            entry("TeichAI/Qwen3-4B-Thinking-2507-GLM-4.6-Distill", 1, 0),
            entry("TeichAI/misc-notes", 1, 0),
            entry("Liontix/Qwen3-4B-Thinking-2507-Gemini-2.5-Pro-Distill", 1, 0),
            entry("TeichAI/glm-4.6-1000x", 1, 0),
        ];

        assert_eq!(
            source_labels(&parser, &entries),
            ["GLM 4.6", "Gemini 2.5 Pro", "Kimi K2 Thinking"]
        );

        let glm = filter_by_source(&parser, entries.clone(), Some("GLM 4.6"));
        assert_eq!(glm.len(), 2);
        assert_eq!(filter_by_source(&parser, entries, None).len(), 5);
    }
}
