//! Report rendering: summary text + result entries → one HTML document.
//!
//! The output is self-contained (inline CSS, no external resources) so the
//! same string can be shown inline and saved for download. Every string that
//! came from the model or from an uploaded filename is escaped before it is
//! inserted. Rendering is a pure function: identical inputs give
//! byte-identical output.

use crate::pipeline::parse::{ChecklistResultEntry, Found};
use std::fmt::Write;

/// Heading of the rendered report.
pub const REPORT_TITLE: &str = "Reporte de Verificación de Contratación";

const NOT_AVAILABLE: &str = "N/A";
const NO_INFORMATION: &str = "No se encontró información.";

const AFFIRMATIVE_STYLE: &str = "color: green; font-weight: bold;";
const CAUTION_STYLE: &str = "color: red;";

const STYLE: &str = r#"        body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; }
        .container { max-width: 1000px; margin: auto; background: #fff; padding: 30px; border-radius: 8px; box-shadow: 0 0 15px rgba(0,0,0,0.1); }
        h1, h2 { color: #003366; border-bottom: 2px solid #ddd; padding-bottom: 10px; }
        table { width: 100%; border-collapse: collapse; margin-top: 20px; }
        th, td { border: 1px solid #ddd; padding: 12px; text-align: left; vertical-align: top; }
        th { background-color: #003366; color: white; }
        tr:nth-child(even) { background-color: #f9f9f9; }
        p strong { color: #003366; }
        td:nth-child(2) { text-align: center; }
"#;

/// Render the full report.
pub fn render_report(summary: &str, entries: &[ChecklistResultEntry]) -> String {
    let mut html = String::with_capacity(4096 + entries.len() * 512);

    html.push_str("<!DOCTYPE html>\n<html lang=\"es\">\n<head>\n");
    html.push_str("    <meta charset=\"UTF-8\">\n");
    html.push_str("    <title>Reporte de Verificación</title>\n");
    html.push_str("    <style>\n");
    html.push_str(STYLE);
    html.push_str("    </style>\n</head>\n<body>\n    <div class=\"container\">\n");
    let _ = writeln!(html, "        <h1>{REPORT_TITLE}</h1>");
    html.push_str("        <h2>Resumen Ejecutivo</h2>\n");
    html.push_str(&render_summary(summary));
    html.push_str("        <h2>Tabla de Verificación del Pliego de Condiciones</h2>\n");
    html.push_str("        <table>\n            <thead>\n");
    html.push_str(
        "                <tr><th>Requisito</th><th>Cumple</th><th>Observaciones</th></tr>\n",
    );
    html.push_str("            </thead>\n            <tbody>\n");
    for entry in entries {
        html.push_str(&render_row(entry));
    }
    html.push_str("            </tbody>\n        </table>\n    </div>\n</body>\n</html>\n");
    html
}

/// Render the executive summary as paragraphs.
///
/// `- Label: value` lines become a bold label followed by the value; other
/// non-blank lines become plain paragraphs.
pub fn render_summary(summary: &str) -> String {
    let mut out = String::new();
    for line in summary.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let labelled = trimmed
            .strip_prefix('-')
            .and_then(|rest| rest.trim_start_matches(['-', ' ']).split_once(':'));
        match labelled {
            Some((label, value)) => {
                let _ = writeln!(
                    out,
                    "        <p><strong>{}:</strong> {}</p>",
                    escape_html(label.trim()),
                    escape_html(value.trim())
                );
            }
            None => {
                let _ = writeln!(out, "        <p>{}</p>", escape_html(trimmed));
            }
        }
    }
    out
}

fn render_row(entry: &ChecklistResultEntry) -> String {
    let result = &entry.result;
    let found_style = match result.found {
        Found::Yes => AFFIRMATIVE_STYLE,
        Found::No | Found::Error => CAUTION_STYLE,
    };

    let file = field_or(result.source_file.as_deref(), NOT_AVAILABLE);
    let clause = field_or(result.clause.as_deref(), NOT_AVAILABLE);
    let text = field_or(result.relevant_text.as_deref(), NO_INFORMATION);

    format!(
        "                <tr>\n\
         \x20                   <td>{}</td>\n\
         \x20                   <td style=\"{}\">{}</td>\n\
         \x20                   <td><strong>Archivo:</strong> {}<br><strong>Cláusula:</strong> {}<br><strong>Texto:</strong> {}</td>\n\
         \x20               </tr>\n",
        escape_html(&entry.requirement),
        found_style,
        result.found.label(),
        escape_html(file),
        escape_html(clause),
        escape_html(text),
    )
}

/// Present values verbatim; blank or absent ones as `placeholder`.
fn field_or<'a>(value: Option<&'a str>, placeholder: &'a str) -> &'a str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => placeholder,
    }
}

/// Escape the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}
