use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::charts;
use crate::error::Result;
use crate::loader::{load_file, SalesData};
use crate::models::{ReportRequest, ReportType};
use crate::settings::{load_settings, resolve_data_file};
use crate::stats::{compute_report, Report, ReportOptions};
use crate::tui::{
    run_view, View, ViewAction, DISABLED_STYLE, ERROR_STYLE, FOOTER_STYLE, HEADER_STYLE,
    SELECTED_STYLE,
};

const DASHBOARD_TITLE: &str = "Automobile Sales Statistics Dashboard";
const REPORT_PLACEHOLDER: &str = "Select a report type.";

pub fn run(file: Option<String>) -> Result<()> {
    let settings = load_settings();
    let options = settings.report_options()?;
    let path = resolve_data_file(&settings, file.as_deref());
    let data = load_file(&path)?;

    let mut dashboard = Dashboard::new(data, options, settings.default_year);
    run_view(&mut dashboard)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Focus {
    ReportType,
    Year,
}

pub(crate) struct Dashboard {
    data: SalesData,
    options: ReportOptions,
    years: Vec<i32>,
    report_type: Option<ReportType>,
    year_idx: usize,
    focus: Focus,
    report: Report,
    status_message: Option<String>,
}

impl Dashboard {
    pub(crate) fn new(data: SalesData, options: ReportOptions, default_year: i32) -> Self {
        let years = options.years.years();
        let start = options.years.clamp(default_year);
        let year_idx = years.iter().position(|y| *y == start).unwrap_or(0);
        let mut dashboard = Self {
            data,
            options,
            years,
            report_type: None,
            year_idx,
            focus: Focus::ReportType,
            report: Report::empty(),
            status_message: None,
        };
        dashboard.refresh();
        dashboard
    }

    fn year(&self) -> i32 {
        self.years[self.year_idx]
    }

    fn year_enabled(&self) -> bool {
        self.report_type == Some(ReportType::Yearly)
    }

    fn request(&self) -> ReportRequest {
        let year = self.year_enabled().then(|| self.year());
        ReportRequest::new(self.report_type, year)
    }

    /// Recompute the report for the current selection. Validation problems leave the
    /// chart area empty and show up in the status line.
    fn refresh(&mut self) {
        match compute_report(&self.data, &self.request(), &self.options) {
            Ok(report) => {
                self.report = report;
                self.status_message = None;
            }
            Err(e) => {
                if !e.is_validation() {
                    tracing::warn!(error = %e, "report failed");
                }
                self.report = Report::empty();
                self.status_message = Some(e.to_string());
            }
        }
    }

    fn step_report_type(&mut self, forward: bool) {
        self.report_type = match (self.report_type, forward) {
            (None, true) | (Some(ReportType::RecessionPeriod), true) => Some(ReportType::Yearly),
            (None, false) | (Some(ReportType::Yearly), _) => Some(ReportType::RecessionPeriod),
            (Some(ReportType::RecessionPeriod), false) => Some(ReportType::Yearly),
        };
        if !self.year_enabled() {
            self.focus = Focus::ReportType;
        }
        self.refresh();
    }

    fn clear_report_type(&mut self) {
        self.report_type = None;
        self.focus = Focus::ReportType;
        self.refresh();
    }

    fn step_year(&mut self, delta: i32) {
        let last = self.years.len().saturating_sub(1) as i32;
        let next = (self.year_idx as i32 + delta).clamp(0, last) as usize;
        if next != self.year_idx {
            self.year_idx = next;
            self.refresh();
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::ReportType if self.year_enabled() => Focus::Year,
            _ => Focus::ReportType,
        };
    }

    fn selector_span(label: &str, focused: bool, enabled: bool) -> Span<'static> {
        let style = if !enabled {
            DISABLED_STYLE
        } else if focused {
            SELECTED_STYLE
        } else {
            Style::default()
        };
        Span::styled(format!(" {label} \u{25be} "), style)
    }

    fn draw_selectors(&self, frame: &mut Frame, area: Rect) {
        let type_label = self
            .report_type
            .map(|t| t.label().to_string())
            .unwrap_or_else(|| REPORT_PLACEHOLDER.to_string());
        let year_enabled = self.year_enabled();
        let line = Line::from(vec![
            Span::raw(" Select Statistics: "),
            Self::selector_span(&type_label, self.focus == Focus::ReportType, true),
            Span::raw("   Year: "),
            Self::selector_span(
                &self.year().to_string(),
                self.focus == Focus::Year,
                year_enabled,
            ),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn draw_output(&self, frame: &mut Frame, area: Rect) {
        if self.report.is_empty() {
            let hint = if self.status_message.is_some() {
                ""
            } else {
                " Select a report type to view statistics."
            };
            frame.render_widget(Paragraph::new(hint).style(FOOTER_STYLE), area);
            return;
        }

        let [top, bottom] =
            Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);
        let [a, b] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(top);
        let [c, d] = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .areas(bottom);

        for (aggregate, cell) in self.report.aggregates.iter().zip([a, b, c, d]) {
            charts::render(frame, cell, aggregate);
        }
    }
}

impl View for Dashboard {
    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let border_style = Style::default().fg(Color::DarkGray);

        let [header_area, sep, selector_area, output_area, hints_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new(format!(" {DASHBOARD_TITLE}")).style(HEADER_STYLE),
            header_area,
        );
        let sep_line = "\u{2501}".repeat(area.width as usize);
        frame.render_widget(Paragraph::new(sep_line.as_str()).style(border_style), sep);

        self.draw_selectors(frame, selector_area);
        self.draw_output(frame, output_area);

        if let Some(msg) = &self.status_message {
            frame.render_widget(Paragraph::new(format!(" {msg}")).style(ERROR_STYLE), hints_area);
        } else {
            frame.render_widget(
                Paragraph::new(
                    " Tab=switch  Left/Right=change  Home/End=first/last year  Del=clear  q=quit",
                )
                .style(FOOTER_STYLE),
                hints_area,
            );
        }
    }

    fn handle_key(&mut self, code: KeyCode) -> ViewAction {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Close,
            KeyCode::Tab | KeyCode::BackTab => self.toggle_focus(),
            KeyCode::Backspace | KeyCode::Delete => self.clear_report_type(),
            KeyCode::Left | KeyCode::Up | KeyCode::Right | KeyCode::Down => {
                let forward = matches!(code, KeyCode::Right | KeyCode::Down);
                match self.focus {
                    Focus::ReportType => self.step_report_type(forward),
                    Focus::Year => self.step_year(if forward { 1 } else { -1 }),
                }
            }
            KeyCode::Home if self.focus == Focus::Year => self.step_year(-(self.year_idx as i32)),
            KeyCode::End if self.focus == Focus::Year => self.step_year(self.years.len() as i32),
            _ => {}
        }
        ViewAction::Continue
    }
}
