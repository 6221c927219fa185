use std::collections::BTreeMap;

use chrono::Datelike;

use crate::error::Result;
use crate::models::{ConnectionStats, MonthBucket, Timestamped};

/// Count records per calendar month, ordered by (year, month). Months with
/// no records get no bucket.
pub fn bucket_by_month<T: Timestamped>(records: &[T]) -> Result<Vec<MonthBucket>> {
    let mut counts: BTreeMap<(i32, u32), usize> = BTreeMap::new();

    for record in records {
        let date = record.date()?;
        *counts.entry((date.year(), date.month())).or_insert(0) += 1;
    }

    Ok(counts
        .into_iter()
        .map(|((year, month_number), count)| MonthBucket {
            month: format!("{year:04}-{month_number:02}"),
            year,
            month_number,
            count,
        })
        .collect())
}

/// Summary statistics over a bucket list.
///
/// The activity percentage counts buckets with a non-zero count against all
/// buckets present. Buckets from [`bucket_by_month`] are never empty, so any
/// non-empty series reports 100.
pub fn summarize(buckets: &[MonthBucket], total_records: usize) -> ConnectionStats {
    if buckets.is_empty() {
        return ConnectionStats {
            total_contacts: total_records,
            ..ConnectionStats::empty()
        };
    }

    let avg_monthly = total_records as f64 / buckets.len() as f64;

    let mut peak: Option<&MonthBucket> = None;
    for bucket in buckets {
        if bucket.count > peak.map_or(0, |p| p.count) {
            peak = Some(bucket);
        }
    }

    let active = buckets.iter().filter(|bucket| bucket.count > 0).count();
    let activity_percentage = (active as f64 / buckets.len() as f64 * 100.0).round() as u32;

    ConnectionStats {
        total_contacts: total_records,
        avg_monthly: round_to_tenth(avg_monthly),
        peak_month: peak.map(|p| p.month.clone()).unwrap_or_default(),
        peak_count: peak.map_or(0, |p| p.count),
        activity_percentage,
    }
}

/// Bucket then summarize in one pass over `records`.
pub fn connection_stats<T: Timestamped>(records: &[T]) -> Result<(Vec<MonthBucket>, ConnectionStats)> {
    let buckets = bucket_by_month(records)?;
    let stats = summarize(&buckets, records.len());
    Ok((buckets, stats))
}

/// `2021-03` -> `03-21`, the chart's axis label.
pub fn short_month_label(bucket: &MonthBucket) -> String {
    format!("{:02}-{:02}", bucket.month_number, bucket.year.rem_euclid(100))
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
