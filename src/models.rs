use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const UNKNOWN: &str = "Unknown";

// ===== HUB LISTING TYPES (from the upstream API) =====

/// One model or dataset listing as returned by the hub.
///
/// `downloads` and `likes` are required: a record without them fails
/// deserialization of the whole listing instead of counting as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub downloads: u64,
    pub likes: u64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl CatalogEntry {
    /// Slug part of the id, or the whole id when there is no org prefix.
    pub fn slug(&self) -> &str {
        self.id.split_once('/').map(|(_, slug)| slug).unwrap_or(&self.id)
    }

    pub fn is_gguf(&self) -> bool {
        self.id.contains("GGUF")
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrgData {
    pub models: Vec<CatalogEntry>,
    pub datasets: Vec<CatalogEntry>,
}

// ===== DERIVED IDENTITY =====

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedIdentity {
    pub organization: String,
    pub slug: String,
    pub base_architecture: String,
    pub parameter_label: String,
    pub source_label: String,
    /// True when `source_label` came from the remainder heuristic rather
    /// than a known rule.
    pub source_inferred: bool,
}

// ===== AGGREGATES =====

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_downloads: u64,
    pub total_models: usize,
    pub total_datasets: usize,
    pub total_likes: u64,
}

/// Landing page numbers. `total_downloads` is already formatted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeSummary {
    pub total_downloads: String,
    pub total_models: usize,
    pub total_datasets: usize,
    pub top_models: Vec<CatalogEntry>,
}

impl HomeSummary {
    /// Shown when the hub cannot be reached.
    pub fn fallback() -> Self {
        Self {
            total_downloads: "50K+".to_string(),
            total_models: 30,
            total_datasets: 10,
            top_models: Vec::new(),
        }
    }
}

// ===== LISTING QUERIES =====

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOption {
    #[default]
    Downloads,
    Likes,
    Name,
    Recent,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    #[serde(default)]
    pub sort: SortOption,
    /// Source label to keep; absent or `"all"` keeps everything.
    pub source: Option<String>,
}

impl ListingQuery {
    pub fn source_filter(&self) -> Option<&str> {
        self.source
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("all"))
    }
}

// ===== RESPONSE TYPES =====

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResponse {
    pub models: Vec<CatalogEntry>,
    pub datasets: Vec<CatalogEntry>,
    pub stats: Stats,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelCard {
    #[serde(flatten)]
    pub entry: CatalogEntry,
    pub parsed: ParsedIdentity,
    pub downloads_label: String,
    pub is_gguf: bool,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct TagBadges {
    pub size: Option<String>,
    pub format: Option<String>,
    pub modality: Option<String>,
    pub modality_kind: Option<ModalityKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModalityKind {
    Image,
    Audio,
    Video,
    Text,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetCard {
    #[serde(flatten)]
    pub entry: CatalogEntry,
    pub parsed: ParsedIdentity,
    pub downloads_label: String,
    pub badges: TagBadges,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub sources: Vec<String>,
    pub count: usize,
}
