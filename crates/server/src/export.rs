//! Report rendering: CSV and PDF, from the same column layout.
//!
//! A report is a title block, an optional period caption, a generation
//! timestamp and a table. Columns map a header to a key in the row maps;
//! `width` drives the PDF column weights and is ignored by CSV.

use std::path::Path;

use chrono::{DateTime, Utc};
use genpdf::{Element, elements, style};
use serde_json::{Map, Value};

use crate::ServerError;

const FONT_FAMILY: &str = "LiberationSans";

#[derive(Clone, Copy, Debug)]
pub struct ReportColumn {
    pub header: &'static str,
    pub data_key: &'static str,
    pub width: usize,
}

#[derive(Clone, Debug)]
pub struct Report {
    pub title: String,
    /// Human caption of the date filter, e.g. "2026-02-01 to 2026-02-28".
    pub period: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub columns: Vec<ReportColumn>,
    pub rows: Vec<Map<String, Value>>,
}

/// Text rendering of one cell. Missing keys come out empty, not as an
/// error: report rows are plain JSON maps.
fn cell_text(row: &Map<String, Value>, key: &str) -> String {
    match row.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Bool(true)) => "yes".to_string(),
        Some(Value::Bool(false)) => "no".to_string(),
        Some(other) => other.to_string(),
    }
}

pub fn render_csv(report: &Report) -> Result<Vec<u8>, ServerError> {
    let mut writer = csv::Writer::from_writer(vec![]);

    writer
        .write_record(report.columns.iter().map(|column| column.header))
        .map_err(|err| ServerError::Report(err.to_string()))?;
    for row in &report.rows {
        writer
            .write_record(
                report
                    .columns
                    .iter()
                    .map(|column| cell_text(row, column.data_key)),
            )
            .map_err(|err| ServerError::Report(err.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|err| ServerError::Report(err.to_string()))
}

pub fn render_pdf(report: &Report, fonts_dir: &Path) -> Result<Vec<u8>, ServerError> {
    let font_family = genpdf::fonts::from_files(fonts_dir, FONT_FAMILY, None)
        .map_err(|err| ServerError::Report(format!("font loading failed: {err}")))?;

    let mut doc = genpdf::Document::new(font_family);
    doc.set_title(report.title.clone());
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);

    doc.push(
        elements::Paragraph::new(report.title.clone())
            .styled(style::Style::new().bold().with_font_size(18)),
    );
    if let Some(period) = &report.period {
        doc.push(
            elements::Paragraph::new(format!("Period: {period}"))
                .styled(style::Style::new().with_font_size(10)),
        );
    }
    doc.push(
        elements::Paragraph::new(format!(
            "Generated: {}",
            report.generated_at.format("%Y-%m-%d %H:%M UTC")
        ))
        .styled(style::Style::new().with_font_size(10)),
    );
    doc.push(elements::Break::new(1));

    let weights: Vec<usize> = report.columns.iter().map(|column| column.width).collect();
    let mut table = elements::TableLayout::new(weights);
    table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

    let style_bold = style::Style::new().bold();
    let mut header = table.row();
    for column in &report.columns {
        header = header.element(elements::Paragraph::new(column.header).styled(style_bold));
    }
    header
        .push()
        .map_err(|err| ServerError::Report(err.to_string()))?;

    for row in &report.rows {
        let mut table_row = table.row();
        for column in &report.columns {
            table_row =
                table_row.element(elements::Paragraph::new(cell_text(row, column.data_key)));
        }
        table_row
            .push()
            .map_err(|err| ServerError::Report(err.to_string()))?;
    }
    doc.push(table);

    let mut buffer = Vec::new();
    doc.render(&mut buffer)
        .map_err(|err| ServerError::Report(err.to_string()))?;
    Ok(buffer)
}

/// `{slugified-title}_{ISO-date}.{ext}` for the Content-Disposition
/// header. The slug is lowercased with whitespace runs collapsed to `_`.
pub fn export_filename(title: &str, date: DateTime<Utc>, ext: &str) -> String {
    let slug = title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    format!("{slug}_{}.{ext}", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn filename_is_slugged_and_dated() {
        let date = Utc.with_ymd_and_hms(2026, 2, 10, 18, 30, 0).unwrap();
        assert_eq!(
            export_filename("Accounting  Entries Report", date, "pdf"),
            "accounting_entries_report_2026-02-10.pdf"
        );
        assert_eq!(export_filename("Sales", date, "csv"), "sales_2026-02-10.csv");
    }

    #[test]
    fn csv_has_headers_and_rendered_cells() {
        let report = Report {
            title: "Sales".to_string(),
            period: None,
            generated_at: Utc::now(),
            columns: vec![
                ReportColumn {
                    header: "Product",
                    data_key: "productName",
                    width: 4,
                },
                ReportColumn {
                    header: "Value",
                    data_key: "productValue",
                    width: 2,
                },
                ReportColumn {
                    header: "Paid",
                    data_key: "paid",
                    width: 1,
                },
            ],
            rows: vec![
                row(&[
                    ("productName", json!("panela block")),
                    ("productValue", json!(8000)),
                    ("paid", json!(true)),
                ]),
                row(&[("productName", json!("coffee bag"))]),
            ],
        };

        let bytes = render_csv(&report).ok().unwrap_or_default();
        let text = String::from_utf8(bytes).ok().unwrap_or_default();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Product,Value,Paid"));
        assert_eq!(lines.next(), Some("panela block,8000,yes"));
        assert_eq!(lines.next(), Some("coffee bag,,"));
    }

    #[test]
    fn missing_and_null_cells_are_empty() {
        let data = row(&[("a", json!(null))]);
        assert_eq!(cell_text(&data, "a"), "");
        assert_eq!(cell_text(&data, "b"), "");
    }
}
