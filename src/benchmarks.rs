//! Embedded benchmark table and the comparisons built on it.
//!
//! The table ships inside the binary (`data/benchmarks.json`) and is
//! validated once at startup: every record carries every metric and its
//! average matches the mean of those metrics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};

/// Pseudo-metric selecting `average_score`.
pub const AVERAGE: &str = "average";

const AVERAGE_TOLERANCE: f64 = 0.01;

static EMBEDDED: &str = include_str!("../data/benchmarks.json");

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricInfo {
    pub key: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkRecord {
    pub identifier: String,
    pub display_name: String,
    pub source_label: String,
    pub score_per_metric: BTreeMap<String, f64>,
    pub average_score: f64,
}

impl BenchmarkRecord {
    pub fn score(&self, metric: &str) -> Option<f64> {
        if metric == AVERAGE {
            Some(self.average_score)
        } else {
            self.score_per_metric.get(metric).copied()
        }
    }

    fn metric_mean(&self) -> f64 {
        if self.score_per_metric.is_empty() {
            return 0.0;
        }
        self.score_per_metric.values().sum::<f64>() / self.score_per_metric.len() as f64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkSuite {
    pub base_model: String,
    pub metrics: Vec<MetricInfo>,
    pub baseline: BenchmarkRecord,
    pub results: Vec<BenchmarkRecord>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WinSummary<'a> {
    pub record: &'a BenchmarkRecord,
    pub wins: usize,
    pub total_delta: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedScore<'a> {
    pub record: &'a BenchmarkRecord,
    pub score: f64,
    pub delta: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPerformer<'a> {
    pub metric: &'a str,
    pub record: &'a BenchmarkRecord,
    pub score: f64,
}

/// Everything the comparison page shows for one selected metric.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkReport<'a> {
    pub metric: &'a str,
    pub base_model: &'a str,
    pub metrics: &'a [MetricInfo],
    pub baseline: &'a BenchmarkRecord,
    pub ranked: Vec<RankedScore<'a>>,
    pub chart_max: f64,
    pub top_performers: Vec<TopPerformer<'a>>,
    pub best_overall: Option<&'a BenchmarkRecord>,
    pub most_wins: Option<WinSummary<'a>>,
}

/// Record with the highest `metric`; ties go to the earliest record.
pub fn get_top_performer<'a>(records: &'a [BenchmarkRecord], metric: &str) -> Result<&'a BenchmarkRecord> {
    if records.is_empty() {
        return Err(CatalogError::InvalidArgument(
            "no benchmark records to rank".to_string(),
        ));
    }

    let mut best: Option<(&BenchmarkRecord, f64)> = None;
    for record in records {
        let Some(score) = record.score(metric) else {
            continue;
        };
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((record, score)),
        }
    }

    best.map(|(record, _)| record)
        .ok_or_else(|| CatalogError::InvalidArgument(format!("unknown metric '{}'", metric)))
}

/// Difference rounded to two decimals.
pub fn delta(value: f64, base: f64) -> f64 {
    ((value - base) * 100.0).round() / 100.0
}

impl BenchmarkSuite {
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let suite: Self =
            serde_json::from_str(raw).map_err(|e| CatalogError::BenchmarkData(e.to_string()))?;
        suite.validate()?;
        Ok(suite)
    }

    fn validate(&self) -> Result<()> {
        for record in std::iter::once(&self.baseline).chain(&self.results) {
            for metric in &self.metrics {
                if !record.score_per_metric.contains_key(&metric.key) {
                    return Err(CatalogError::BenchmarkData(format!(
                        "{} has no score for {}",
                        record.identifier, metric.key
                    )));
                }
            }
            if record.score_per_metric.len() != self.metrics.len() {
                return Err(CatalogError::BenchmarkData(format!(
                    "{} has scores for unlisted metrics",
                    record.identifier
                )));
            }

            let mean = record.metric_mean();
            if (mean - record.average_score).abs() >= AVERAGE_TOLERANCE {
                return Err(CatalogError::BenchmarkData(format!(
                    "{} lists average {:.2} but its metrics average {:.3}",
                    record.identifier, record.average_score, mean
                )));
            }
        }
        Ok(())
    }

    pub fn is_metric(&self, metric: &str) -> bool {
        metric == AVERAGE || self.metrics.iter().any(|m| m.key == metric)
    }

    fn require_metric(&self, metric: &str) -> Result<()> {
        if self.is_metric(metric) {
            Ok(())
        } else {
            Err(CatalogError::InvalidArgument(format!("unknown metric '{}'", metric)))
        }
    }

    /// Results by `metric`, highest first, ties in table order.
    pub fn sorted_by(&self, metric: &str) -> Result<Vec<&BenchmarkRecord>> {
        self.require_metric(metric)?;
        let mut sorted: Vec<&BenchmarkRecord> = self.results.iter().collect();
        sorted.sort_by(|a, b| {
            let a = a.score(metric).unwrap_or(f64::MIN);
            let b = b.score(metric).unwrap_or(f64::MIN);
            b.total_cmp(&a)
        });
        Ok(sorted)
    }

    pub fn top_performers(&self) -> Vec<TopPerformer<'_>> {
        self.metrics
            .iter()
            .filter_map(|m| {
                let record = get_top_performer(&self.results, &m.key).ok()?;
                Some(TopPerformer {
                    metric: &m.key,
                    record,
                    score: record.score(&m.key)?,
                })
            })
            .collect()
    }

    pub fn best_overall(&self) -> Option<&BenchmarkRecord> {
        get_top_performer(&self.results, AVERAGE).ok()
    }

    /// Result beating the baseline on the most metrics; ties go to the
    /// larger summed delta.
    pub fn most_wins(&self) -> Option<WinSummary<'_>> {
        let mut summaries: Vec<WinSummary<'_>> = self
            .results
            .iter()
            .map(|record| {
                let mut wins = 0;
                let mut total_delta = 0.0;
                for metric in &self.metrics {
                    let value = record.score(&metric.key).unwrap_or_default();
                    let base = self.baseline.score(&metric.key).unwrap_or_default();
                    if value > base {
                        wins += 1;
                    }
                    total_delta += value - base;
                }
                WinSummary {
                    record,
                    wins,
                    total_delta,
                }
            })
            .collect();

        summaries.sort_by(|a, b| {
            b.wins
                .cmp(&a.wins)
                .then_with(|| b.total_delta.total_cmp(&a.total_delta))
        });
        summaries.into_iter().next()
    }

    /// Largest value among results and baseline, used to scale bars.
    pub fn chart_max(&self, metric: &str) -> Result<f64> {
        self.require_metric(metric)?;
        Ok(self
            .results
            .iter()
            .chain(std::iter::once(&self.baseline))
            .filter_map(|r| r.score(metric))
            .fold(0.0, f64::max))
    }

    pub fn report<'a>(&'a self, metric: &'a str) -> Result<BenchmarkReport<'a>> {
        let base = self.baseline.score(metric).unwrap_or_default();
        let ranked = self
            .sorted_by(metric)?
            .into_iter()
            .map(|record| {
                let score = record.score(metric).unwrap_or_default();
                RankedScore {
                    record,
                    score,
                    delta: delta(score, base),
                }
            })
            .collect();

        Ok(BenchmarkReport {
            metric,
            base_model: &self.base_model,
            metrics: &self.metrics,
            baseline: &self.baseline,
            ranked,
            chart_max: self.chart_max(metric)?,
            top_performers: self.top_performers(),
            best_overall: self.best_overall(),
            most_wins: self.most_wins(),
        })
    }
}
