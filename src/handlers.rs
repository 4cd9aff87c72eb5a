use axum::extract::{Path, Query, State};
use axum::http::header::CACHE_CONTROL;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, warn};

use crate::benchmarks::{get_top_performer, BenchmarkRecord, AVERAGE};
use crate::error::ApiError;
use crate::models::{
    CatalogResponse, DatasetCard, HomeSummary, ListingQuery, Listing, ModelCard, ParsedIdentity,
};
use crate::parser::tags;
use crate::stats::{
    aggregate_stats, filter_by_source, format_downloads, home_summary, sort_entries,
    source_labels,
};
use crate::AppState;

/// Cache policy sent with the catalog payload.
pub const CATALOG_CACHE_CONTROL: &str = "public, s-maxage=3600, stale-while-revalidate=86400";

#[derive(Debug, Deserialize)]
pub struct MetricQuery {
    pub metric: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IdentityQuery {
    pub id: String,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Raw listings plus totals.
pub async fn catalog(State(state): State<AppState>) -> Result<Response, ApiError> {
    match state.hub.fetch_org_data().await {
        Ok(data) => {
            let stats = aggregate_stats(&data.models, &data.datasets);
            let body = CatalogResponse {
                models: data.models,
                datasets: data.datasets,
                stats,
            };
            Ok(([(CACHE_CONTROL, CATALOG_CACHE_CONTROL)], Json(body)).into_response())
        }
        Err(e) => {
            error!("Error fetching hub data: {}", e);
            Err(ApiError::internal("Failed to fetch data"))
        }
    }
}

pub async fn home_stats(State(state): State<AppState>) -> Json<HomeSummary> {
    match state.hub.fetch_org_data().await {
        Ok(data) => Json(home_summary(&data.models, &data.datasets)),
        Err(e) => {
            warn!("Error fetching stats, serving defaults: {}", e);
            Json(HomeSummary::fallback())
        }
    }
}

pub async fn list_models(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Json<Listing<ModelCard>> {
    let models = state.hub.models_or_empty().await;
    let sources = source_labels(&state.parser, &models);

    let mut models = filter_by_source(&state.parser, models, query.source_filter());
    sort_entries(&mut models, query.sort);

    let items: Vec<ModelCard> = models
        .into_iter()
        .map(|entry| ModelCard {
            parsed: state.parser.parse_identity(&entry.id),
            downloads_label: format_downloads(entry.downloads),
            is_gguf: entry.is_gguf(),
            entry,
        })
        .collect();

    Json(Listing {
        count: items.len(),
        items,
        sources,
    })
}

pub async fn list_datasets(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Json<Listing<DatasetCard>> {
    let datasets = state.hub.datasets_or_empty().await;
    let sources = source_labels(&state.parser, &datasets);

    let mut datasets = filter_by_source(&state.parser, datasets, query.source_filter());
    sort_entries(&mut datasets, query.sort);

    let items: Vec<DatasetCard> = datasets
        .into_iter()
        .map(|entry| DatasetCard {
            parsed: state.parser.parse_identity(&entry.id),
            downloads_label: format_downloads(entry.downloads),
            badges: tags::badges(&entry.tags),
            entry,
        })
        .collect();

    Json(Listing {
        count: items.len(),
        items,
        sources,
    })
}

pub async fn benchmarks(
    State(state): State<AppState>,
    Query(query): Query<MetricQuery>,
) -> Result<Response, ApiError> {
    let metric = query.metric.as_deref().unwrap_or(AVERAGE);
    let report = state.benchmarks.report(metric)?;
    Ok(Json(report).into_response())
}

pub async fn top_performer(
    State(state): State<AppState>,
    Path(metric): Path<String>,
) -> Result<Json<BenchmarkRecord>, ApiError> {
    let record = get_top_performer(&state.benchmarks.results, &metric)?;
    Ok(Json(record.clone()))
}

pub async fn identity(
    State(state): State<AppState>,
    Query(query): Query<IdentityQuery>,
) -> Json<ParsedIdentity> {
    Json(state.parser.parse_identity(&query.id))
}
