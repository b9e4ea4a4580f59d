use crate::constant::{DELETION_CLASS, INSERTION_CLASS};
use crate::diff::{DiffPart, DiffResult, Stats, compute_stats};
use crate::document::fingerprint;
use crate::render::{Side, escape_html};
use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything a regeneration collaborator needs for one side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub side: Side,
    pub label: String,
    pub original_text: String,
    pub marked_markup: String,
}

/// Receives marked markup after each marking operation
pub trait Publisher {
    fn publish(&mut self, request: &ExportRequest) -> Result<(), ExportError>;
}

/// Publisher that discards everything
#[derive(Debug, Default)]
pub struct NullPublisher;

impl Publisher for NullPublisher {
    fn publish(&mut self, _request: &ExportRequest) -> Result<(), ExportError> {
        Ok(())
    }
}

/// Writes each marked side as a standalone HTML page
pub struct HtmlExporter {
    output_dir: PathBuf,
    written: Vec<PathBuf>,
}

impl HtmlExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self, ExportError> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;
        Ok(Self {
            output_dir,
            written: Vec::new(),
        })
    }

    /// Files written so far, in order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn file_name(request: &ExportRequest) -> String {
        let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let side = match request.side {
            Side::Base => "base",
            Side::Compare => "compare",
        };
        format!("{}_{}.html", side, timestamp)
    }
}

impl Publisher for HtmlExporter {
    fn publish(&mut self, request: &ExportRequest) -> Result<(), ExportError> {
        let path = self.output_dir.join(Self::file_name(request));
        fs::write(&path, render_page(request))?;
        info!("Exported {} to {:?}", request.label, path);
        self.written.push(path);
        Ok(())
    }
}

/// Standalone HTML page with the highlight stylesheet
pub fn render_page(request: &ExportRequest) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>\n\
         .{del} {{ background-color: #fde2e2; color: #b91c1c; text-decoration: line-through; }}\n\
         .{ins} {{ background-color: #dcfce7; color: #15803d; }}\n\
         table {{ border-collapse: collapse; }}\n\
         td, th {{ border: 1px solid #ddd; padding: 8px; }}\n\
         </style>\n</head>\n<body>\n<h1>{title}</h1>\n{body}\n</body>\n</html>\n",
        title = escape_html(&request.label),
        del = DELETION_CLASS,
        ins = INSERTION_CLASS,
        body = request.marked_markup,
    )
}

/// Serializable summary of one comparison
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub compared_at: DateTime<Utc>,
    pub base_fingerprint: String,
    pub compare_fingerprint: String,
    pub stats: Stats,
    pub parts: Vec<DiffPart>,
}

impl ComparisonReport {
    pub fn from_result(result: &DiffResult) -> Self {
        Self {
            compared_at: result.compared_at(),
            base_fingerprint: format!("{:016x}", fingerprint(result.base_text())),
            compare_fingerprint: format!("{:016x}", fingerprint(result.compare_text())),
            stats: compute_stats(result),
            parts: result.parts().to_vec(),
        }
    }
}

/// Write a comparison report as pretty JSON into `dir`
pub fn write_report(dir: &Path, report: &ComparisonReport) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir)?;
    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let path = dir.join(format!("report_{}.json", timestamp));
    let content = serde_json::to_string_pretty(report)?;
    fs::write(&path, content)?;
    info!("Saved comparison report to {:?}", path);
    Ok(path)
}
