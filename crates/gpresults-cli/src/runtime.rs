// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use gpresults_app::{
    Embedder, RenderTarget, ResultsBackend, ResultsPage, TableResult, ViewError, ViewKey,
    ViewKind, ViewStatus, VisualizationDescription,
};
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use time::format_description::well_known::Rfc3339;
use tracing::debug;

const COMPLETION_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct HtmlEmbedder {
    dir: PathBuf,
    bokeh_js: String,
}

impl HtmlEmbedder {
    pub fn new(dir: impl Into<PathBuf>, bokeh_js: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            bokeh_js: bokeh_js.into(),
        }
    }

    pub fn page_path(&self, target: &RenderTarget) -> PathBuf {
        self.dir.join(format!("{}.html", file_stem(target.as_str())))
    }
}

impl Embedder for HtmlEmbedder {
    fn embed(
        &mut self,
        target: &RenderTarget,
        description: &VisualizationDescription,
    ) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create plot directory {}", self.dir.display()))?;
        let path = self.page_path(target);
        let html = plot_page(target, description, &self.bokeh_js)?;
        fs::write(&path, html).with_context(|| format!("write plot page {}", path.display()))?;
        debug!(path = %path.display(), "plot page written");
        Ok(())
    }
}

pub fn plot_page(
    target: &RenderTarget,
    description: &VisualizationDescription,
    bokeh_js: &str,
) -> Result<String> {
    let item = serde_json::to_string(description.as_value())
        .context("serialize visualization description")?
        .replace("</", "<\\/");
    let target_json = serde_json::to_string(target.as_str()).context("serialize render target")?;
    let escaped = escape_html(target.as_str());
    Ok(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{escaped}</title>\n<script src=\"{src}\"></script>\n</head>\n<body>\n<div id=\"{escaped}\"></div>\n<script>\nBokeh.embed.embed_item({item}, {target_json});\n</script>\n</body>\n</html>\n",
        src = escape_html(bokeh_js),
    ))
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

fn file_stem(target: &str) -> String {
    urlencoding::encode(target).into_owned()
}

pub fn render_table(table: &TableResult) -> String {
    if table.is_empty() {
        return "(no rows)\n".to_owned();
    }

    let columns = table.columns();
    let mut out = String::new();
    out.push_str(&columns.join(" | "));
    out.push('\n');
    for row in &table.rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|column| row.get(column).map(cell_text).unwrap_or_default())
            .collect();
        out.push_str(&cells.join(" | "));
        out.push('\n');
    }
    out
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

pub fn await_view<B: ResultsBackend, E: Embedder>(
    page: &mut ResultsPage<B, E>,
    key: ViewKey,
    timeout: Duration,
) -> Result<()> {
    let budget = timeout.saturating_add(COMPLETION_GRACE);
    let deadline = Instant::now() + budget;
    page.process_events();
    while page.status(key) == ViewStatus::Pending {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(anyhow!(
                "{key} did not complete within {budget:?} -- raise [server] timeout"
            ));
        }
        page.wait_for_completion(remaining);
    }
    Ok(())
}

pub fn report_view<B: ResultsBackend, W: Write>(
    page: &ResultsPage<B, HtmlEmbedder>,
    key: ViewKey,
    out: &mut W,
) -> Result<()> {
    match page.status(key) {
        ViewStatus::Failed(message) => {
            return Err(ViewError::FetchFailure {
                key: key.as_str().to_owned(),
                message,
            }
            .into());
        }
        ViewStatus::NotRequested | ViewStatus::Pending => {
            return Err(anyhow!("{key} has no result yet"));
        }
        ViewStatus::Empty => {
            let empty = ViewError::EmptyResult {
                key: key.as_str().to_owned(),
            };
            writeln!(out, "{empty}")?;
            return Ok(());
        }
        ViewStatus::Ready => {}
    }

    match key.kind() {
        ViewKind::Table => {
            let table = page
                .table_result(key)
                .ok_or_else(|| anyhow!("{key} finished without a table"))?;
            out.write_all(render_table(table).as_bytes())?;
        }
        ViewKind::Plot => match page.plot_result(key) {
            Some(plot) if !plot.description.is_empty() => {
                let path = page.embedder().page_path(&plot.target);
                writeln!(out, "{}", path.display())?;
            }
            _ => writeln!(out, "(no plot data)")?,
        },
    }

    if let Some(at) = page.view_slot(key).and_then(|slot| slot.completed_at()) {
        let stamp = at.format(&Rfc3339).context("format completion time")?;
        debug!(view = %key, completed_at = %stamp, "reported view");
    }
    Ok(())
}
