use crate::error::{AggregateError, AggregateResult};
use crate::model::bucket::{Bucket, BucketKey, BucketOrder, Granularity};
use crate::model::record::DatedRecord;
use crate::model::stats::{MetricSummary, SummaryStats};
use crate::time::{month_bounds, parse_record_date};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use tracing::debug;

/// Groups dated records into day/week/month buckets and derives summary
/// statistics from them.
///
/// The aggregator carries no state besides its ordering choice; every call
/// works only on its arguments, so one instance can be shared freely.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimeSeriesAggregator {
    order: BucketOrder,
}

impl TimeSeriesAggregator {
    pub fn new(order: BucketOrder) -> Self {
        Self { order }
    }

    pub fn order(&self) -> BucketOrder {
        self.order
    }

    pub fn aggregate<S: AsRef<str>>(
        &self,
        records: &[DatedRecord],
        granularity: Granularity,
        metric_keys: &[S],
    ) -> AggregateResult<Vec<Bucket>> {
        aggregate(records, granularity, metric_keys, self.order)
    }

    pub fn summarize<S: AsRef<str>>(
        &self,
        buckets: &[Bucket],
        metric_keys: &[S],
        primary: Option<&str>,
    ) -> AggregateResult<SummaryStats> {
        summarize(buckets, metric_keys, primary)
    }

    pub fn filter_by_period(
        &self,
        records: &[DatedRecord],
        year: i32,
        month: u32,
    ) -> AggregateResult<Vec<DatedRecord>> {
        filter_by_period(records, year, month)
    }
}

// Standalone functions for pure logic

/// Sums the requested metrics of `records` per time bucket.
///
/// Every record date is validated before anything is grouped; a single bad
/// date fails the whole call. Records lacking a requested metric contribute 0.
pub fn aggregate<S: AsRef<str>>(
    records: &[DatedRecord],
    granularity: Granularity,
    metric_keys: &[S],
    order: BucketOrder,
) -> AggregateResult<Vec<Bucket>> {
    let keys = normalize_keys(metric_keys)?;
    let dates = parse_dates(records)?;

    let mut grouped: BTreeMap<BucketKey, Bucket> = BTreeMap::new();
    for (record, date) in records.iter().zip(dates) {
        let key = BucketKey::for_date(date, granularity);
        let bucket = grouped.entry(key).or_insert_with(|| Bucket::new(key, &keys));
        for metric in &keys {
            *bucket.metrics.entry(metric.clone()).or_insert(0.0) += record.metric(metric);
        }
    }

    // BTreeMap iteration is already chronological
    let mut buckets: Vec<Bucket> = grouped.into_values().collect();
    if order == BucketOrder::Lexicographic {
        buckets.sort_by(|a, b| a.label.cmp(&b.label));
    }

    debug!(
        records = records.len(),
        buckets = buckets.len(),
        %granularity,
        "aggregated records"
    );
    Ok(buckets)
}

/// Totals, peaks and averages per metric over a bucket sequence.
///
/// `primary` additionally gets a consistency ratio (average / peak, 0 when the
/// peak is 0).
pub fn summarize<S: AsRef<str>>(
    buckets: &[Bucket],
    metric_keys: &[S],
    primary: Option<&str>,
) -> AggregateResult<SummaryStats> {
    let keys = normalize_keys(metric_keys)?;
    if let Some(p) = primary {
        if !keys.iter().any(|k| k == p) {
            return Err(AggregateError::UnknownMetric(p.to_string()));
        }
    }

    let count = buckets.len();
    let mut metrics = BTreeMap::new();

    for key in &keys {
        let total: f64 = buckets.iter().map(|b| b.value(key)).sum();
        let peak = buckets
            .iter()
            .map(|b| b.value(key))
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
            .unwrap_or(0.0);
        let average = if count == 0 { 0.0 } else { total / count as f64 };

        let consistency_ratio = if primary == Some(key.as_str()) {
            Some(if peak == 0.0 { 0.0 } else { average / peak })
        } else {
            None
        };

        metrics.insert(
            key.clone(),
            MetricSummary {
                total,
                peak,
                average,
                consistency_ratio,
            },
        );
    }

    Ok(SummaryStats {
        bucket_count: count,
        primary: primary.map(str::to_string),
        metrics,
    })
}

/// Keeps the records dated within the given calendar month.
pub fn filter_by_period(
    records: &[DatedRecord],
    year: i32,
    month: u32,
) -> AggregateResult<Vec<DatedRecord>> {
    if !(1..=12).contains(&month) {
        return Err(AggregateError::InvalidPeriod { month });
    }
    let (first, last) = month_bounds(year, month).ok_or(AggregateError::YearOutOfRange { year })?;
    filter_dates(records, |d| d >= first && d <= last)
}

/// Keeps the records dated within the given calendar year.
pub fn filter_by_year(records: &[DatedRecord], year: i32) -> AggregateResult<Vec<DatedRecord>> {
    filter_dates(records, |d| d.year() == year)
}

/// Sum of each metric straight over the raw records, without bucketing.
pub fn metric_totals<S: AsRef<str>>(
    records: &[DatedRecord],
    metric_keys: &[S],
) -> BTreeMap<String, f64> {
    metric_keys
        .iter()
        .map(|k| {
            let k = k.as_ref();
            (k.to_string(), records.iter().map(|r| r.metric(k)).sum::<f64>())
        })
        .collect()
}

fn filter_dates<F>(records: &[DatedRecord], keep: F) -> AggregateResult<Vec<DatedRecord>>
where
    F: Fn(NaiveDate) -> bool,
{
    let dates = parse_dates(records)?;
    Ok(records
        .iter()
        .zip(dates)
        .filter(|(_, d)| keep(*d))
        .map(|(r, _)| r.clone())
        .collect())
}

fn parse_dates(records: &[DatedRecord]) -> AggregateResult<Vec<NaiveDate>> {
    records
        .iter()
        .enumerate()
        .map(|(index, r)| {
            parse_record_date(&r.date).map_err(|_| AggregateError::MalformedRecord {
                index,
                date: r.date.clone(),
            })
        })
        .collect()
}

fn normalize_keys<S: AsRef<str>>(metric_keys: &[S]) -> AggregateResult<Vec<String>> {
    let mut keys: Vec<String> = Vec::with_capacity(metric_keys.len());
    for k in metric_keys {
        let k = k.as_ref();
        if !keys.iter().any(|existing| existing == k) {
            keys.push(k.to_string());
        }
    }
    if keys.is_empty() {
        return Err(AggregateError::EmptyMetricKeys);
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ATTENDANCE: [&str; 2] = ["presentShifts", "absentShifts"];

    fn attendance(date: &str, present: f64, absent: f64) -> DatedRecord {
        DatedRecord::new(date)
            .with_metric("presentShifts", present)
            .with_metric("absentShifts", absent)
    }

    fn stitched(date: &str, count: f64) -> DatedRecord {
        DatedRecord::new(date).with_metric("stitchedCount", count)
    }

    fn labels(buckets: &[Bucket]) -> Vec<&str> {
        buckets.iter().map(|b| b.label.as_str()).collect()
    }

    #[test]
    fn test_weekly_attendance_scenario() {
        let records = vec![
            attendance("2024-01-01", 1.0, 0.0),
            attendance("2024-01-02", 0.0, 1.0),
            attendance("2024-01-08", 1.0, 0.0),
        ];
        let buckets = TimeSeriesAggregator::default()
            .aggregate(&records, Granularity::Weekly, &ATTENDANCE)
            .unwrap();

        assert_eq!(labels(&buckets), vec!["Week 1", "Week 2"]);
        assert_eq!(buckets[0].value("presentShifts"), 1.0);
        assert_eq!(buckets[0].value("absentShifts"), 1.0);
        assert_eq!(buckets[1].value("presentShifts"), 1.0);
        assert_eq!(buckets[1].value("absentShifts"), 0.0);
    }

    #[test]
    fn test_stitching_summary_scenario() {
        let records = vec![stitched("2024-03-05", 40.0), stitched("2024-03-12", 60.0)];
        let aggregator = TimeSeriesAggregator::default();
        let buckets = aggregator.aggregate(&records, Granularity::Daily, &["stitchedCount"]).unwrap();
        let stats = aggregator.summarize(&buckets, &["stitchedCount"], Some("stitchedCount")).unwrap();

        let s = stats.metric("stitchedCount").unwrap();
        assert_eq!(s.total, 100.0);
        assert_eq!(s.peak, 60.0);
        assert_eq!(s.average, 50.0);
        let ratio = s.consistency_ratio.unwrap();
        assert!((ratio - 50.0 / 60.0).abs() < 1e-9);
        assert_eq!(stats.consistency_ratio(), Some(ratio));
    }

    #[test]
    fn test_malformed_date_fails_whole_call() {
        let records = vec![attendance("2024-01-01", 1.0, 0.0), attendance("not-a-date", 1.0, 0.0)];
        let err = aggregate(&records, Granularity::Daily, &ATTENDANCE, BucketOrder::default()).unwrap_err();
        assert_eq!(
            err,
            AggregateError::MalformedRecord { index: 1, date: "not-a-date".to_string() }
        );
        assert!(err.to_string().contains("not-a-date"));
    }

    #[test]
    fn test_empty_metric_keys() {
        let records = vec![attendance("2024-01-01", 1.0, 0.0)];
        let none: [&str; 0] = [];
        assert_eq!(
            aggregate(&records, Granularity::Daily, &none, BucketOrder::default()),
            Err(AggregateError::EmptyMetricKeys)
        );
        assert_eq!(summarize(&[], &none, None), Err(AggregateError::EmptyMetricKeys));
    }

    #[test]
    fn test_empty_records_give_no_buckets() {
        for granularity in Granularity::ALL {
            let buckets = aggregate(&[], granularity, &ATTENDANCE, BucketOrder::default()).unwrap();
            assert!(buckets.is_empty());
        }
    }

    #[test]
    fn test_daily_sums_records_sharing_a_date() {
        let records = vec![
            attendance("2024-01-02", 1.0, 0.0),
            attendance("2024-01-01", 0.0, 1.0),
            attendance("2024-01-02T00:00:00.000Z", 1.0, 0.0),
        ];
        let buckets = aggregate(&records, Granularity::Daily, &ATTENDANCE, BucketOrder::default()).unwrap();

        assert_eq!(labels(&buckets), vec!["2024-01-01", "2024-01-02"]);
        assert!(buckets.len() <= records.len());
        assert_eq!(buckets[1].value("presentShifts"), 2.0);
    }

    #[test]
    fn test_missing_metric_defaults_to_zero() {
        let records = vec![DatedRecord::new("2024-01-01").with_metric("presentShifts", 1.0)];
        let buckets = aggregate(&records, Granularity::Monthly, &ATTENDANCE, BucketOrder::default()).unwrap();

        assert_eq!(buckets.len(), 1);
        let keys: Vec<&String> = buckets[0].metrics.keys().collect();
        assert_eq!(keys, vec!["absentShifts", "presentShifts"]);
        assert_eq!(buckets[0].value("absentShifts"), 0.0);
    }

    #[test]
    fn test_unrequested_metrics_are_ignored() {
        let records = vec![attendance("2024-01-01", 1.0, 0.0).with_metric("salary", 500.0)];
        let buckets = aggregate(&records, Granularity::Daily, &["presentShifts"], BucketOrder::default()).unwrap();
        assert_eq!(buckets[0].metrics.len(), 1);
    }

    #[test]
    fn test_duplicate_metric_keys_are_counted_once() {
        let records = vec![stitched("2024-03-05", 40.0)];
        let buckets = aggregate(
            &records,
            Granularity::Daily,
            &["stitchedCount", "stitchedCount"],
            BucketOrder::default(),
        )
        .unwrap();
        assert_eq!(buckets[0].value("stitchedCount"), 40.0);
    }

    #[test]
    fn test_total_is_granularity_invariant() {
        let records = vec![
            attendance("2023-12-28", 1.0, 0.0),
            attendance("2024-01-01", 1.0, 1.0),
            attendance("2024-01-15", 0.0, 1.0),
            attendance("2024-02-29", 1.0, 0.0),
            attendance("2024-03-03", 1.0, 0.0),
        ];
        let expected: f64 = metric_totals(&records, &ATTENDANCE).values().sum();
        assert_eq!(expected, 6.0);

        for order in [BucketOrder::Chronological, BucketOrder::Lexicographic] {
            for granularity in Granularity::ALL {
                let buckets = aggregate(&records, granularity, &ATTENDANCE, order).unwrap();
                let stats = summarize(&buckets, &ATTENDANCE, None).unwrap();
                assert_eq!(stats.grand_total(), expected, "{granularity} / {order:?}");
            }
        }
    }

    #[test]
    fn test_lexicographic_order_reproduces_label_sort() {
        let records = vec![stitched("2024-01-08", 1.0), stitched("2024-03-04", 2.0)];

        let chrono = aggregate(&records, Granularity::Weekly, &["stitchedCount"], BucketOrder::Chronological).unwrap();
        assert_eq!(labels(&chrono), vec!["Week 2", "Week 10"]);

        let lexi = aggregate(&records, Granularity::Weekly, &["stitchedCount"], BucketOrder::Lexicographic).unwrap();
        assert_eq!(labels(&lexi), vec!["Week 10", "Week 2"]);

        let months = vec![stitched("2024-01-08", 1.0), stitched("2024-04-02", 2.0)];
        let chrono = aggregate(&months, Granularity::Monthly, &["stitchedCount"], BucketOrder::Chronological).unwrap();
        assert_eq!(labels(&chrono), vec!["January", "April"]);
        let lexi = aggregate(&months, Granularity::Monthly, &["stitchedCount"], BucketOrder::Lexicographic).unwrap();
        assert_eq!(labels(&lexi), vec!["April", "January"]);
    }

    #[test]
    fn test_weeks_of_different_years_stay_separate() {
        let records = vec![
            stitched("2024-01-02", 1.0),  // 2024-W01
            stitched("2024-01-10", 2.0),  // 2024-W02
            stitched("2024-12-30", 4.0),  // 2025-W01
        ];

        let chrono = aggregate(&records, Granularity::Weekly, &["stitchedCount"], BucketOrder::Chronological).unwrap();
        assert_eq!(labels(&chrono), vec!["Week 1", "Week 2", "Week 1"]);
        assert_eq!(chrono[2].key, BucketKey::Week { year: 2025, week: 1 });

        let lexi = aggregate(&records, Granularity::Weekly, &["stitchedCount"], BucketOrder::Lexicographic).unwrap();
        assert_eq!(labels(&lexi), vec!["Week 1", "Week 1", "Week 2"]);
        assert_eq!(lexi[0].value("stitchedCount"), 1.0);
        assert_eq!(lexi[1].value("stitchedCount"), 4.0);
    }

    #[test]
    fn test_summarize_empty_buckets() {
        let stats = summarize(&[], &["stitchedCount"], Some("stitchedCount")).unwrap();
        let s = stats.metric("stitchedCount").unwrap();
        assert_eq!(stats.bucket_count, 0);
        assert_eq!(s.total, 0.0);
        assert_eq!(s.peak, 0.0);
        assert_eq!(s.average, 0.0);
        assert_eq!(s.consistency_ratio, Some(0.0));
    }

    #[test]
    fn test_summarize_zero_peak_gives_zero_ratio() {
        let records = vec![stitched("2024-03-05", 0.0), stitched("2024-03-06", 0.0)];
        let buckets = aggregate(&records, Granularity::Daily, &["stitchedCount"], BucketOrder::default()).unwrap();
        let stats = summarize(&buckets, &["stitchedCount"], Some("stitchedCount")).unwrap();
        assert_eq!(stats.consistency_ratio(), Some(0.0));
    }

    #[test]
    fn test_summarize_only_primary_gets_ratio() {
        let records = vec![attendance("2024-01-01", 1.0, 0.0), attendance("2024-01-02", 1.0, 1.0)];
        let buckets = aggregate(&records, Granularity::Daily, &ATTENDANCE, BucketOrder::default()).unwrap();
        let stats = summarize(&buckets, &ATTENDANCE, Some("presentShifts")).unwrap();

        assert_eq!(stats.metric("presentShifts").unwrap().consistency_ratio, Some(1.0));
        assert_eq!(stats.metric("absentShifts").unwrap().consistency_ratio, None);
        assert_eq!(stats.metric("absentShifts").unwrap().average, 0.5);
    }

    #[test]
    fn test_summarize_unknown_primary() {
        assert_eq!(
            summarize(&[], &ATTENDANCE, Some("salary")),
            Err(AggregateError::UnknownMetric("salary".to_string()))
        );
    }

    #[test]
    fn test_filter_by_period_then_daily() {
        let records = vec![
            attendance("2024-01-31", 1.0, 0.0),
            attendance("2024-02-01", 1.0, 0.0),
            attendance("2024-02-29", 0.0, 1.0),
            attendance("2023-02-15", 1.0, 0.0),
            attendance("2024-03-01", 1.0, 0.0),
        ];
        let aggregator = TimeSeriesAggregator::default();
        let february = aggregator.filter_by_period(&records, 2024, 2).unwrap();
        assert_eq!(february.len(), 2);

        let buckets = aggregator.aggregate(&february, Granularity::Daily, &ATTENDANCE).unwrap();
        for bucket in &buckets {
            match bucket.key {
                BucketKey::Day { date } => {
                    assert_eq!((date.year(), date.month()), (2024, 2));
                }
                other => panic!("unexpected key {:?}", other),
            }
        }
    }

    #[test]
    fn test_filter_by_period_invalid_month() {
        assert_eq!(filter_by_period(&[], 2024, 0), Err(AggregateError::InvalidPeriod { month: 0 }));
        assert_eq!(filter_by_period(&[], 2024, 13), Err(AggregateError::InvalidPeriod { month: 13 }));
        assert_eq!(filter_by_period(&[], i32::MAX, 3), Err(AggregateError::YearOutOfRange { year: i32::MAX }));
    }

    #[test]
    fn test_filter_by_period_rejects_malformed() {
        let records = vec![attendance("2024-13-01", 1.0, 0.0)];
        assert!(matches!(
            filter_by_period(&records, 2024, 1),
            Err(AggregateError::MalformedRecord { index: 0, .. })
        ));
    }

    #[test]
    fn test_filter_by_year() {
        let records = vec![stitched("2023-12-31", 1.0), stitched("2024-01-01", 2.0)];
        let kept = filter_by_year(&records, 2024).unwrap();
        assert_eq!(kept, vec![stitched("2024-01-01", 2.0)]);
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let records = vec![stitched("2024-03-05", 40.0), stitched("2024-03-12", 60.0)];
        let aggregator = TimeSeriesAggregator::new(BucketOrder::Lexicographic);
        let first = aggregator.aggregate(&records, Granularity::Weekly, &["stitchedCount"]).unwrap();
        let second = aggregator.aggregate(&records, Granularity::Weekly, &["stitchedCount"]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_shared_across_threads() {
        let records: Vec<DatedRecord> = (1..=28)
            .map(|d| stitched(&format!("2024-02-{:02}", d), d as f64))
            .collect();
        let aggregator = TimeSeriesAggregator::default();

        let results: Vec<Vec<Bucket>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| aggregator.aggregate(&records, Granularity::Weekly, &["stitchedCount"]).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for buckets in &results[1..] {
            assert_eq!(buckets, &results[0]);
        }
        let total: f64 = results[0].iter().map(|b| b.value("stitchedCount")).sum();
        assert_eq!(total, 406.0);
    }
}
