use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use chrono::Month;
use serde::{Serialize, Serializer};

use crate::error::{DashError, Result};
use crate::loader::SalesData;
use crate::models::{
    month_from_number, ReportRequest, ReportType, SalesRecord, TrendScope, YearRange,
};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Bar,
    Pie,
    GroupedBar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reduction {
    Mean,
    Sum,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GroupKey {
    Year(i32),
    Month(Month),
    Category(String),
    Rate(f64),
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Year(y) => write!(f, "{y}"),
            Self::Month(m) => f.write_str(m.name()),
            Self::Category(c) => f.write_str(c),
            Self::Rate(r) => write!(f, "{r}"),
        }
    }
}

impl Serialize for GroupKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Year(y) => serializer.serialize_i32(*y),
            Self::Month(m) => serializer.serialize_str(m.name()),
            Self::Category(c) => serializer.serialize_str(c),
            Self::Rate(r) => serializer.serialize_f64(*r),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub key: GroupKey,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub points: Vec<Point>,
}

/// One chart's worth of grouped data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregate {
    pub title: String,
    pub chart: ChartKind,
    pub key_label: &'static str,
    pub value_label: &'static str,
    pub reduction: Reduction,
    pub series: Vec<Series>,
}

impl Aggregate {
    fn single(
        title: impl Into<String>,
        chart: ChartKind,
        key_label: &'static str,
        value_label: &'static str,
        reduction: Reduction,
        points: Vec<Point>,
    ) -> Self {
        Self {
            title: title.into(),
            chart,
            key_label,
            value_label,
            reduction,
            series: vec![Series { name: None, points }],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.points.is_empty())
    }

    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }

    pub fn total(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|s| s.points.iter())
            .map(|p| p.value)
            .sum()
    }

    /// Percentage of the total per point, in point order. All zero when the total is zero.
    pub fn shares(&self) -> Vec<f64> {
        let total = self.total();
        self.series
            .iter()
            .flat_map(|s| s.points.iter())
            .map(|p| if total != 0.0 { p.value / total * 100.0 } else { 0.0 })
            .collect()
    }
}

/// The answer to one `ReportRequest`: four aggregates, or none when nothing is selected.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    pub report_type: Option<ReportType>,
    pub year: Option<i32>,
    pub aggregates: Vec<Aggregate>,
}

impl Report {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.aggregates.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    pub years: YearRange,
    pub trend: TrendScope,
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
struct Acc {
    sum: f64,
    count: usize,
}

impl Acc {
    fn reduce(&self, reduction: Reduction) -> f64 {
        match reduction {
            Reduction::Sum => self.sum,
            Reduction::Mean => self.sum / self.count as f64,
        }
    }
}

/// Group records by `key`, accumulating `value`. Keys come back in first-appearance order;
/// a key with no records never appears.
fn group_by<'a, K, I, FK, FV>(records: I, key: FK, value: FV) -> Vec<(K, Acc)>
where
    K: Hash + Eq + Clone,
    I: IntoIterator<Item = &'a SalesRecord>,
    FK: Fn(&SalesRecord) -> K,
    FV: Fn(&SalesRecord) -> f64,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Acc)> = Vec::new();
    for record in records {
        let k = key(record);
        let slot = *index.entry(k.clone()).or_insert_with(|| {
            groups.push((k, Acc::default()));
            groups.len() - 1
        });
        let acc = &mut groups[slot].1;
        acc.sum += value(record);
        acc.count += 1;
    }
    groups
}

/// Rates are grouped by bit pattern; `-0.0` folds into `0.0`.
fn rate_bits(rate: f64) -> u64 {
    if rate == 0.0 {
        0.0f64.to_bits()
    } else {
        rate.to_bits()
    }
}

fn sales(r: &SalesRecord) -> f64 {
    r.automobile_sales
}

fn expenditure(r: &SalesRecord) -> f64 {
    r.total_expenditure
}

fn by_year(records: &[&SalesRecord], reduction: Reduction) -> Vec<Point> {
    let mut groups = group_by(records.iter().copied(), |r| r.year, sales);
    groups.sort_by_key(|(year, _)| *year);
    groups
        .into_iter()
        .map(|(year, acc)| Point {
            key: GroupKey::Year(year),
            value: acc.reduce(reduction),
        })
        .collect()
}

fn by_month(records: &[&SalesRecord], reduction: Reduction) -> Vec<Point> {
    let mut groups = group_by(records.iter().copied(), |r| r.month.number_from_month(), sales);
    groups.sort_by_key(|(n, _)| *n);
    groups
        .into_iter()
        .filter_map(|(n, acc)| {
            month_from_number(n).map(|m| Point {
                key: GroupKey::Month(m),
                value: acc.reduce(reduction),
            })
        })
        .collect()
}

fn by_vehicle(
    records: &[&SalesRecord],
    value: fn(&SalesRecord) -> f64,
    reduction: Reduction,
) -> Vec<Point> {
    group_by(records.iter().copied(), |r| r.vehicle_type.clone(), value)
        .into_iter()
        .map(|(vehicle, acc)| Point {
            key: GroupKey::Category(vehicle),
            value: acc.reduce(reduction),
        })
        .collect()
}

/// Mean sales per (vehicle type, unemployment rate), one series per vehicle type.
fn by_vehicle_and_rate(records: &[&SalesRecord]) -> Vec<Series> {
    let groups = group_by(
        records.iter().copied(),
        |r| (r.vehicle_type.clone(), rate_bits(r.unemployment_rate)),
        sales,
    );
    let mut series: Vec<Series> = Vec::new();
    for ((vehicle, bits), acc) in groups {
        let point = Point {
            key: GroupKey::Rate(f64::from_bits(bits)),
            value: acc.reduce(Reduction::Mean),
        };
        match series.iter_mut().find(|s| s.name.as_deref() == Some(vehicle.as_str())) {
            Some(s) => s.points.push(point),
            None => series.push(Series {
                name: Some(vehicle),
                points: vec![point],
            }),
        }
    }
    series
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Compute the aggregates behind one dashboard view.
///
/// No report type, or a yearly report without a year, yields the empty report.
/// A yearly year outside `options.years` is a validation error.
pub fn compute_report(
    data: &SalesData,
    request: &ReportRequest,
    options: &ReportOptions,
) -> Result<Report> {
    let report = match (request.report_type, request.year) {
        (None, _) | (Some(ReportType::Yearly), None) => Report::empty(),
        (Some(ReportType::RecessionPeriod), _) => recession_report(data),
        (Some(ReportType::Yearly), Some(year)) => {
            if !options.years.contains(year) {
                return Err(DashError::Validation(format!(
                    "year {year} is outside {}",
                    options.years
                )));
            }
            yearly_report(data, year, options.trend)
        }
    };
    tracing::debug!(
        report_type = ?report.report_type,
        year = ?report.year,
        points = ?report.aggregates.iter().map(Aggregate::point_count).collect::<Vec<_>>(),
        "computed report"
    );
    Ok(report)
}

fn recession_report(data: &SalesData) -> Report {
    let rows: Vec<&SalesRecord> = data.records().iter().filter(|r| r.recession).collect();

    let aggregates = vec![
        Aggregate::single(
            "Average Automobile Sales fluctuation over Recession Period",
            ChartKind::Line,
            "Year",
            "Automobile_Sales",
            Reduction::Mean,
            by_year(&rows, Reduction::Mean),
        ),
        Aggregate::single(
            "Average Number of Vehicles Sold by Vehicle Type",
            ChartKind::Bar,
            "Vehicle_Type",
            "Automobile_Sales",
            Reduction::Mean,
            by_vehicle(&rows, sales, Reduction::Mean),
        ),
        Aggregate::single(
            "Total Expenditure Share by Vehicle Type during Recessions",
            ChartKind::Pie,
            "Vehicle_Type",
            "Total_Expenditure",
            Reduction::Sum,
            by_vehicle(&rows, expenditure, Reduction::Sum),
        ),
        Aggregate {
            title: "Effect of Unemployment Rate on Vehicle Type and Sales".to_string(),
            chart: ChartKind::GroupedBar,
            key_label: "Unemployment_Rate",
            value_label: "Automobile_Sales",
            reduction: Reduction::Mean,
            series: by_vehicle_and_rate(&rows),
        },
    ];

    Report {
        report_type: Some(ReportType::RecessionPeriod),
        year: None,
        aggregates,
    }
}

fn yearly_report(data: &SalesData, year: i32, trend: TrendScope) -> Report {
    let all: Vec<&SalesRecord> = data.records().iter().collect();
    let rows: Vec<&SalesRecord> = all.iter().copied().filter(|r| r.year == year).collect();
    let trend_rows = match trend {
        TrendScope::AllYears => &all,
        TrendScope::SelectedYear => &rows,
    };

    let aggregates = vec![
        Aggregate::single(
            "Yearly Automobile Sales",
            ChartKind::Line,
            "Year",
            "Automobile_Sales",
            Reduction::Mean,
            by_year(trend_rows, Reduction::Mean),
        ),
        Aggregate::single(
            format!("Average Monthly Automobile Sales in {year}"),
            ChartKind::Line,
            "Month",
            "Automobile_Sales",
            Reduction::Mean,
            by_month(&rows, Reduction::Mean),
        ),
        Aggregate::single(
            format!("Average Vehicles Sold by Vehicle Type in the year {year}"),
            ChartKind::Bar,
            "Vehicle_Type",
            "Automobile_Sales",
            Reduction::Mean,
            by_vehicle(&rows, sales, Reduction::Mean),
        ),
        Aggregate::single(
            "Total Advertisement Expenditure by Vehicle Type",
            ChartKind::Pie,
            "Vehicle_Type",
            "Total_Expenditure",
            Reduction::Sum,
            by_vehicle(&rows, expenditure, Reduction::Sum),
        ),
    ];

    Report {
        report_type: Some(ReportType::Yearly),
        year: Some(year),
        aggregates,
    }
}
