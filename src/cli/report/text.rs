use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::fmt::{number, percent};
use crate::stats::{Aggregate, ChartKind, Reduction, Report};

fn value_header(aggregate: &Aggregate) -> String {
    let prefix = match aggregate.reduction {
        Reduction::Mean => "Mean",
        Reduction::Sum => "Sum",
    };
    format!("{prefix} {}", aggregate.value_label)
}

fn report_heading(report: &Report) -> String {
    match (report.report_type, report.year) {
        (Some(t), Some(year)) => format!("{t} - {year}"),
        (Some(t), None) => t.to_string(),
        (None, _) => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Pure formatting functions (report data → String)
// ---------------------------------------------------------------------------

pub fn format_report(report: &Report) -> String {
    if report.is_empty() {
        return "No report selected.".to_string();
    }
    let mut out = format!("{}\n", report_heading(report).bold());
    for aggregate in &report.aggregates {
        out.push('\n');
        out.push_str(&format_aggregate(aggregate));
        out.push('\n');
    }
    out
}

pub fn format_aggregate(aggregate: &Aggregate) -> String {
    let title = aggregate.title.as_str().bold();
    if aggregate.is_empty() {
        return format!("{title}\n(no data)");
    }
    let table = match aggregate.chart {
        ChartKind::GroupedBar => grouped_table(aggregate),
        ChartKind::Pie => share_table(aggregate),
        ChartKind::Line | ChartKind::Bar => simple_table(aggregate),
    };
    format!("{title}\n{table}")
}

fn simple_table(aggregate: &Aggregate) -> Table {
    let mut table = Table::new();
    table.set_header(vec![aggregate.key_label.to_string(), value_header(aggregate)]);
    for point in aggregate.series.iter().flat_map(|s| s.points.iter()) {
        table.add_row(vec![
            Cell::new(point.key.to_string()),
            Cell::new(number(point.value)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

fn share_table(aggregate: &Aggregate) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        aggregate.key_label.to_string(),
        value_header(aggregate),
        "Share".to_string(),
    ]);
    let points = aggregate.series.iter().flat_map(|s| s.points.iter());
    for (point, share) in points.zip(aggregate.shares()) {
        table.add_row(vec![
            Cell::new(point.key.to_string()),
            Cell::new(number(point.value)).set_alignment(CellAlignment::Right),
            Cell::new(percent(share)).set_alignment(CellAlignment::Right),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(number(aggregate.total())).set_alignment(CellAlignment::Right),
        Cell::new(""),
    ]);
    table
}

fn grouped_table(aggregate: &Aggregate) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "Vehicle_Type".to_string(),
        aggregate.key_label.to_string(),
        value_header(aggregate),
    ]);
    for series in &aggregate.series {
        let name = series.name.as_deref().unwrap_or("");
        for point in &series.points {
            table.add_row(vec![
                Cell::new(name),
                Cell::new(point.key.to_string()).set_alignment(CellAlignment::Right),
                Cell::new(number(point.value)).set_alignment(CellAlignment::Right),
            ]);
        }
    }
    table
}

pub fn format_json(report: &Report) -> crate::error::Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::SalesData;
    use crate::models::{month_from_number, ReportRequest, SalesRecord};
    use crate::stats::{compute_report, ReportOptions};

    fn data() -> SalesData {
        let rec = |year, vehicle: &str, sales, rate, recession| SalesRecord {
            year,
            month: month_from_number(2).unwrap(),
            automobile_sales: sales,
            vehicle_type: vehicle.to_string(),
            total_expenditure: 1500.0,
            unemployment_rate: rate,
            recession,
        };
        SalesData::new(vec![
            rec(2020, "Sports", 1000.0, 6.5, true),
            rec(2020, "Superminicar", 3000.0, 7.0, true),
            rec(2019, "Sports", 500.0, 4.0, false),
        ])
    }

    #[test]
    fn test_empty_report_text() {
        assert_eq!(format_report(&crate::stats::Report::empty()), "No report selected.");
    }

    #[test]
    fn test_recession_text_has_every_chart() {
        colored::control::set_override(false);
        let options = ReportOptions::default();
        let report = compute_report(&data(), &ReportRequest::recession(), &options).unwrap();
        let text = format_report(&report);
        assert!(text.contains("Recession Period Statistics"));
        assert!(text.contains("Average Automobile Sales fluctuation over Recession Period"));
        assert!(text.contains("Mean Automobile_Sales"));
        assert!(text.contains("Sum Total_Expenditure"));
        assert!(text.contains("3,000.00"));
        assert!(text.contains("50.0%"));
        assert!(text.contains("6.5"));
    }

    #[test]
    fn test_yearly_text_marks_empty_aggregates() {
        colored::control::set_override(false);
        let options = ReportOptions::default();
        let report = compute_report(&data(), &ReportRequest::yearly(1999), &options).unwrap();
        let text = format_report(&report);
        assert!(text.contains("Yearly Statistics - 1999"));
        assert!(text.contains("(no data)"));
    }

    #[test]
    fn test_json_output() {
        let options = ReportOptions::default();
        let report = compute_report(&data(), &ReportRequest::yearly(2020), &options).unwrap();
        let json: serde_json::Value = serde_json::from_str(&format_json(&report).unwrap()).unwrap();
        assert_eq!(json["year"], 2020);
        assert_eq!(json["aggregates"][1]["series"][0]["points"][0]["key"], "February");
        assert_eq!(json["aggregates"][1]["series"][0]["points"][0]["value"], 2000.0);
    }
}
