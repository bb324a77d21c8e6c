// src/stats/mod.rs
//
// Client-side summary math behind the dashboard widgets: distribution
// shares for the charts and the impacted-percentage buckets. All pure
// functions over the histogram models.

use crate::model::{IssueAgeBucket, SaveAgeStats, TenureBucket, TobaccoBucket};
use std::collections::HashMap;

/// Share of insureds per tobacco disposition. Empty input yields an empty
/// map rather than NaN shares.
pub fn tobacco_percentages(buckets: &[TobaccoBucket]) -> HashMap<String, f64> {
    let total: u64 = buckets.iter().map(|b| b.count).sum();
    if total == 0 {
        return HashMap::new();
    }
    buckets
        .iter()
        .map(|b| {
            (
                b.tobacco_disposition.clone(),
                b.count as f64 / total as f64,
            )
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TenureSummary {
    /// Count-weighted average tenure in years.
    pub avg: f64,
    pub max: i64,
}

pub fn tenure_summary(buckets: &[TenureBucket]) -> TenureSummary {
    let total: u64 = buckets.iter().map(|b| b.count).sum();
    let max = buckets.iter().map(|b| b.tenure).max().unwrap_or(0);
    if total == 0 {
        return TenureSummary { avg: 0.0, max };
    }
    let avg = buckets
        .iter()
        .map(|b| b.tenure as f64 * (b.count as f64 / total as f64))
        .sum();
    TenureSummary { avg, max }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgePoint {
    pub issue_age: i64,
    pub count: u64,
    /// This age's share of the whole census.
    pub pct: f64,
}

pub fn age_distribution(buckets: &[IssueAgeBucket]) -> Vec<AgePoint> {
    let total: u64 = buckets.iter().map(|b| b.count).sum();
    if total == 0 {
        return Vec::new();
    }
    buckets
        .iter()
        .map(|b| AgePoint {
            issue_age: b.issue_age,
            count: b.count,
            pct: b.count as f64 / total as f64,
        })
        .collect()
}

/// Count-weighted mean issue age, `None` for an empty census.
pub fn average_issue_age(buckets: &[IssueAgeBucket]) -> Option<f64> {
    let total: u64 = buckets.iter().map(|b| b.count).sum();
    if total == 0 {
        return None;
    }
    let weighted: f64 = buckets
        .iter()
        .map(|b| b.issue_age as f64 * b.count as f64)
        .sum();
    Some(weighted / total as f64)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImpactBucket {
    pub label: &'static str,
    /// Insureds in this rate-increase band.
    pub insureds: f64,
    /// Band count over the total report count.
    pub share: f64,
}

/// The "# Impacted" breakdown: how many insureds land in each
/// rate-increase band. The 0-5% and 5-10% bands are presented as one bar.
pub fn impacted_breakdown(stats: &SaveAgeStats) -> Vec<ImpactBucket> {
    let count = stats.count as f64;
    let share = |insureds: f64| if count > 0.0 { insureds / count } else { 0.0 };

    let le_0 = stats.pct_range_le_0.unwrap_or(0.0);
    let up_to_10 = stats.pct_range_00_05.unwrap_or(0.0) + stats.pct_range_05_10.unwrap_or(0.0);
    let to_20 = stats.pct_range_10_20.unwrap_or(0.0);
    let over_20 = stats.pct_range_gt_20.unwrap_or(0.0);

    vec![
        ImpactBucket {
            label: "Same or less",
            insureds: le_0,
            share: share(le_0),
        },
        ImpactBucket {
            label: "0 - 10%",
            insureds: up_to_10,
            share: share(up_to_10),
        },
        ImpactBucket {
            label: "10 - 20%",
            insureds: to_20,
            share: share(to_20),
        },
        ImpactBucket {
            label: "> 20%",
            insureds: over_20,
            share: share(over_20),
        },
    ]
}
