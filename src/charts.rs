//! Draws one `Aggregate` into a rectangle of the terminal.
//!
//! Line aggregates use ratatui's `Chart`, bar and grouped-bar aggregates use
//! `BarChart`, and pie aggregates are drawn as one share bar per category
//! (the terminal has no good way to draw a circle).

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Style, Stylize},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::fmt::{compact, percent};
use crate::stats::{Aggregate, ChartKind, GroupKey, Point};
use crate::tui::{palette, FOOTER_STYLE, TITLE_STYLE};

pub fn render(frame: &mut Frame, area: Rect, aggregate: &Aggregate) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(FOOTER_STYLE)
        .title(Span::styled(format!(" {} ", aggregate.title), TITLE_STYLE));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if aggregate.is_empty() {
        frame.render_widget(Paragraph::new(" (no data)").style(FOOTER_STYLE), inner);
        return;
    }

    match aggregate.chart {
        ChartKind::Line => render_line(frame, inner, aggregate),
        ChartKind::Bar => render_bar(frame, inner, aggregate),
        ChartKind::Pie => render_shares(frame, inner, aggregate),
        ChartKind::GroupedBar => render_grouped(frame, inner, aggregate),
    }
}

/// Numeric x position for a key; categories fall back to their index.
fn x_value(key: &GroupKey, index: usize) -> f64 {
    match key {
        GroupKey::Year(y) => *y as f64,
        GroupKey::Month(m) => m.number_from_month() as f64,
        GroupKey::Rate(r) => *r,
        GroupKey::Category(_) => index as f64,
    }
}

fn axis_label(key: &GroupKey) -> String {
    match key {
        GroupKey::Month(m) => crate::models::month_abbrev(*m).to_string(),
        other => other.to_string(),
    }
}

fn padded_bounds(min: f64, max: f64) -> [f64; 2] {
    if min == max {
        [min - 1.0, max + 1.0]
    } else {
        [min, max]
    }
}

fn render_line(frame: &mut Frame, area: Rect, aggregate: &Aggregate) {
    let Some(series) = aggregate.series.first() else {
        return;
    };
    let points: Vec<(f64, f64)> = series
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| (x_value(&p.key, i), p.value))
        .collect();

    let x_min = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let x_max = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    let y_max = points.iter().map(|p| p.1).fold(0.0, f64::max);
    let y_top = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

    let first = series.points.first().map(|p| axis_label(&p.key)).unwrap_or_default();
    let last = series.points.last().map(|p| axis_label(&p.key)).unwrap_or_default();
    let x_labels = if series.points.len() > 1 {
        vec![first, last]
    } else {
        vec![String::new(), first, String::new()]
    };

    // A line needs two points; a lone point is drawn as a marker instead.
    let graph_type = if points.len() > 1 {
        GraphType::Line
    } else {
        GraphType::Scatter
    };
    let dataset = Dataset::default()
        .marker(Marker::Braille)
        .graph_type(graph_type)
        .style(Style::default().fg(palette(0)))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .x_axis(
            Axis::default()
                .title(Span::styled(aggregate.key_label, FOOTER_STYLE))
                .style(FOOTER_STYLE)
                .bounds(padded_bounds(x_min, x_max))
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(FOOTER_STYLE)
                .bounds([0.0, y_top])
                .labels(vec![
                    "0".to_string(),
                    compact(y_top / 2.0),
                    compact(y_top),
                ]),
        );
    frame.render_widget(chart, area);
}

fn bar_value(v: f64) -> u64 {
    v.max(0.0).round() as u64
}

fn render_bar(frame: &mut Frame, area: Rect, aggregate: &Aggregate) {
    let Some(series) = aggregate.series.first() else {
        return;
    };
    let bars: Vec<Bar> = series
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            Bar::default()
                .value(bar_value(p.value))
                .text_value(compact(p.value))
                .label(Line::from(axis_label(&p.key)))
                .style(Style::default().fg(palette(i)))
        })
        .collect();

    let n = bars.len().max(1) as u16;
    let bar_width = (area.width.saturating_sub(n) / n).clamp(3, 14);
    let chart = BarChart::default()
        .bar_width(bar_width)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, area);
}

/// Width of the share bar for one category, in cells.
pub(crate) fn share_cells(share: f64, width: u16) -> u16 {
    ((share / 100.0) * width as f64).round().clamp(0.0, width as f64) as u16
}

fn render_shares(frame: &mut Frame, area: Rect, aggregate: &Aggregate) {
    let points: Vec<&Point> = aggregate.series.iter().flat_map(|s| s.points.iter()).collect();
    let shares = aggregate.shares();
    let name_width = points
        .iter()
        .map(|p| p.key.to_string().len())
        .max()
        .unwrap_or(8);
    // name, gap, bar, gap, "100.0%"
    let bar_width = area.width.saturating_sub(name_width as u16 + 10);

    let mut lines: Vec<Line> = points
        .iter()
        .zip(shares.iter())
        .enumerate()
        .map(|(i, (p, share))| {
            let cells = share_cells(*share, bar_width) as usize;
            Line::from(vec![
                Span::raw(format!(" {:<width$} ", p.key.to_string(), width = name_width)),
                Span::styled("\u{2588}".repeat(cells), Style::default().fg(palette(i))),
                Span::raw(" ".repeat(bar_width as usize - cells + 1)),
                Span::styled(format!("{:>6}", percent(*share)), FOOTER_STYLE),
            ])
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(" Total {}", compact(aggregate.total())),
        FOOTER_STYLE,
    )));
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_grouped(frame: &mut Frame, area: Rect, aggregate: &Aggregate) {
    let [legend_area, chart_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(area);

    let legend: Vec<Span> = aggregate
        .series
        .iter()
        .enumerate()
        .flat_map(|(i, s)| {
            [
                Span::styled(" \u{25a0} ", Style::default().fg(palette(i))),
                Span::raw(s.name.clone().unwrap_or_default()),
            ]
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(legend)), legend_area);

    // One group per unemployment rate, ascending; one bar per series that has the rate.
    let mut rates: Vec<f64> = Vec::new();
    for point in aggregate.series.iter().flat_map(|s| s.points.iter()) {
        let x = x_value(&point.key, 0);
        if !rates.contains(&x) {
            rates.push(x);
        }
    }
    rates.sort_by(|a, b| a.total_cmp(b));

    let groups: Vec<BarGroup> = rates
        .iter()
        .map(|rate| {
            let bars: Vec<Bar> = aggregate
                .series
                .iter()
                .enumerate()
                .filter_map(|(i, s)| {
                    s.points
                        .iter()
                        .find(|p| x_value(&p.key, 0) == *rate)
                        .map(|p| {
                            Bar::default()
                                .value(bar_value(p.value))
                                .text_value(String::new())
                                .style(Style::default().fg(palette(i)))
                        })
                })
                .collect();
            BarGroup::default()
                .label(Line::from(format!("{rate}").dim()))
                .bars(&bars)
        })
        .collect();

    let mut chart = BarChart::default().bar_width(2).bar_gap(0).group_gap(1);
    for group in &groups {
        chart = chart.data(group.clone());
    }
    frame.render_widget(chart, chart_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{Reduction, Series};

    #[test]
    fn test_share_cells() {
        assert_eq!(share_cells(50.0, 20), 10);
        assert_eq!(share_cells(0.0, 20), 0);
        assert_eq!(share_cells(100.0, 20), 20);
        assert_eq!(share_cells(120.0, 20), 20);
    }

    #[test]
    fn test_padded_bounds() {
        assert_eq!(padded_bounds(2020.0, 2020.0), [2019.0, 2021.0]);
        assert_eq!(padded_bounds(1980.0, 2023.0), [1980.0, 2023.0]);
    }

    #[test]
    fn test_x_values() {
        assert_eq!(x_value(&GroupKey::Year(1999), 5), 1999.0);
        assert_eq!(x_value(&GroupKey::Month(chrono::Month::March), 0), 3.0);
        assert_eq!(x_value(&GroupKey::Category("Sports".into()), 2), 2.0);
        assert_eq!(axis_label(&GroupKey::Month(chrono::Month::March)), "Mar");
    }

    #[test]
    fn test_render_every_kind_without_panicking() {
        use ratatui::{backend::TestBackend, Terminal};

        let points = vec![
            Point {
                key: GroupKey::Category("Sports".into()),
                value: 10.0,
            },
            Point {
                key: GroupKey::Category("Executivecar".into()),
                value: 30.0,
            },
        ];
        let mut terminal = Terminal::new(TestBackend::new(60, 16)).unwrap();
        for chart in [ChartKind::Line, ChartKind::Bar, ChartKind::Pie] {
            let aggregate = Aggregate {
                title: "Test".into(),
                chart,
                key_label: "Vehicle_Type",
                value_label: "Automobile_Sales",
                reduction: Reduction::Mean,
                series: vec![Series {
                    name: None,
                    points: points.clone(),
                }],
            };
            terminal.draw(|f| render(f, f.area(), &aggregate)).unwrap();
        }

        let grouped = Aggregate {
            title: "Grouped".into(),
            chart: ChartKind::GroupedBar,
            key_label: "Unemployment_Rate",
            value_label: "Automobile_Sales",
            reduction: Reduction::Mean,
            series: vec![
                Series {
                    name: Some("Sports".into()),
                    points: vec![Point {
                        key: GroupKey::Rate(5.5),
                        value: 12.0,
                    }],
                },
                Series {
                    name: Some("Superminicar".into()),
                    points: vec![
                        Point {
                            key: GroupKey::Rate(5.5),
                            value: 8.0,
                        },
                        Point {
                            key: GroupKey::Rate(3.0),
                            value: 4.0,
                        },
                    ],
                },
            ],
        };
        terminal.draw(|f| render(f, f.area(), &grouped)).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Superminicar"));
    }

    #[test]
    fn test_empty_aggregate_says_no_data() {
        use ratatui::{backend::TestBackend, Terminal};

        let aggregate = Aggregate {
            title: "Empty".into(),
            chart: ChartKind::Pie,
            key_label: "Vehicle_Type",
            value_label: "Total_Expenditure",
            reduction: Reduction::Sum,
            series: vec![Series {
                name: None,
                points: vec![],
            }],
        };
        let mut terminal = Terminal::new(TestBackend::new(40, 6)).unwrap();
        terminal.draw(|f| render(f, f.area(), &aggregate)).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("(no data)"));
    }
}
