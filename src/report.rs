// ============================================================================
// Report Output
// ============================================================================

use chrono::{Local, Utc};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use uuid::Uuid;

use crate::assembler::{render_document, REPORT_TITLE};
use crate::error::{ReportError, Result};
use crate::model::ReportContext;
use crate::pdf::render_pdf;
use crate::theme::RenderConfig;

/// Content type collaborators should serve report files with
pub const CONTENT_TYPE: &str = "application/pdf";

/// Renders reports into one output directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
    config: RenderConfig,
}

impl ReportWriter {
    /// Create the output directory if needed, using the default theme and A4 layout
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::with_config(output_dir, RenderConfig::default())
    }

    pub fn with_config(output_dir: impl Into<PathBuf>, config: RenderConfig) -> Result<Self> {
        let output_dir = output_dir.into();
        std::fs::create_dir_all(&output_dir).map_err(|source| ReportError::OutputDir {
            path: output_dir.clone(),
            source,
        })?;
        Ok(Self { output_dir, config })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// A file name no concurrent render will pick: owner, period, clock and a random suffix
    pub fn target_path(&self, ctx: &ReportContext) -> PathBuf {
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let name = format!(
            "report-{}-{}-{:02}-{}-{}.pdf",
            sanitize(&ctx.owner.id),
            ctx.period.year,
            ctx.period.month,
            nanos,
            generate_short_id()
        );
        self.output_dir.join(name)
    }

    /// Lay out, serialize and write one report; resolves once the file is flushed to disk
    pub async fn generate_report(&self, ctx: ReportContext) -> Result<PathBuf> {
        let t0 = Instant::now();
        let path = self.target_path(&ctx);
        let owner_id = ctx.owner.id.clone();
        let theme = self.config.theme.clone();
        let layout = self.config.layout.clone();
        let generated_at = Local::now().naive_local();

        let (bytes, page_count) = tokio::task::spawn_blocking(move || {
            let document = render_document(&ctx, &theme, &layout, generated_at);
            render_pdf(&document, &layout, REPORT_TITLE).map(|bytes| (bytes, document.page_count()))
        })
        .await
        .map_err(|e| ReportError::Task(e.to_string()))??;
        let t_render = t0.elapsed();

        write_report(&path, &bytes).await?;

        info!(
            "Report for owner {}: {} page(s), {} bytes, render={:.1}ms, total={:.1}ms -> {}",
            owner_id,
            page_count,
            bytes.len(),
            t_render.as_secs_f64() * 1000.0,
            t0.elapsed().as_secs_f64() * 1000.0,
            path.display()
        );
        Ok(path)
    }
}

/// Write `bytes` to a new file at `path`, removing it again if any write fails
async fn write_report(path: &Path, bytes: &[u8]) -> Result<()> {
    let file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
        .map_err(|source| ReportError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    let file = write_through(path, file, bytes).await?;
    if let Err(source) = file.sync_all().await {
        drop(file);
        return Err(discard_partial(path, source).await);
    }
    Ok(())
}

/// Write and flush `bytes` into `sink`, which backs the file at `path`
async fn write_through<W>(path: &Path, mut sink: W, bytes: &[u8]) -> Result<W>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        sink.write_all(bytes).await?;
        sink.flush().await
    }
    .await;

    match written {
        Ok(()) => Ok(sink),
        Err(source) => {
            drop(sink);
            Err(discard_partial(path, source).await)
        }
    }
}

async fn discard_partial(path: &Path, source: std::io::Error) -> ReportError {
    if let Err(e) = tokio::fs::remove_file(path).await {
        debug!("Could not remove partial report {}: {}", path.display(), e);
    }
    ReportError::Write {
        path: path.to_path_buf(),
        source,
    }
}

fn generate_short_id() -> String {
    let uuid = Uuid::new_v4();
    let hex = format!("{:x}", uuid);
    hex[..8].to_uppercase()
}

fn sanitize(value: &str) -> String {
    let cleaned: String = value
        .to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-')
        .collect();
    if cleaned.is_empty() {
        "owner".to_string()
    } else {
        cleaned
    }
}
