pub mod text;

use std::path::PathBuf;

use crate::cli::ReportArgs;
use crate::error::{DashError, Result};
use crate::loader::load_file;
use crate::models::ReportRequest;
use crate::settings::{load_settings, resolve_data_file};
use crate::stats::{compute_report, Report};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            None | Some("table") | Some("text") => Ok(Self::Table),
            Some("json") => Ok(Self::Json),
            Some(other) => Err(DashError::Other(format!(
                "unknown format '{other}' (expected 'table' or 'json')"
            ))),
        }
    }
}

pub fn run(args: ReportArgs) -> Result<()> {
    let format = OutputFormat::parse(args.format.as_deref())?;
    let request = ReportRequest::parse(args.report_type.as_deref(), args.year.as_deref())?;

    let settings = load_settings();
    let options = settings.report_options()?;
    let path = resolve_data_file(&settings, args.file.as_deref());
    let data = load_file(&path)?;

    let report = compute_report(&data, &request, &options)?;
    let rendered = render(&report, format)?;

    match args.output {
        Some(output) => {
            let p = PathBuf::from(&output);
            if let Some(parent) = p.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&p, &rendered)?;
            println!("Wrote {}", p.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

pub(crate) fn render(report: &Report, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(text::format_report(report)),
        OutputFormat::Json => text::format_json(report),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse(None).unwrap(), OutputFormat::Table);
        assert_eq!(OutputFormat::parse(Some("JSON")).unwrap(), OutputFormat::Json);
        assert!(OutputFormat::parse(Some("pdf")).is_err());
    }

    #[test]
    fn test_render_empty_report_as_json() {
        let s = render(&Report::empty(), OutputFormat::Json).unwrap();
        let v: serde_json::Value = serde_json::from_str(&s).unwrap();
        assert!(v["report_type"].is_null());
        assert_eq!(v["aggregates"].as_array().unwrap().len(), 0);
    }
}
