pub mod html;
pub mod pages;

pub use html::HtmlPageRenderer;
pub use pages::{build_pages, ChartKind, MarkerShape, PageSpec, Series, XAxis};

use crate::error::{AppError, Result};
use crate::models::Summaries;
use chrono::NaiveDateTime;
use maud::{html, PreEscaped, DOCTYPE};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

const PAGE_CSS: &str = "
body { font-family: Arial, Helvetica, sans-serif; margin: 0; }
.generated { color: #666; font-size: 12px; margin: 8px 24px; }
.page { padding: 24px; page-break-after: always; break-after: page; }
.page:last-of-type { page-break-after: auto; break-after: auto; }
.page h2 { margin-top: 0; }
";

/// Turns one page spec into an HTML fragment. An `Err` carries the reason.
pub trait PageRenderer {
    fn render_page(&self, page: &PageSpec) -> std::result::Result<String, String>;
}

/// Writes the paginated report: all pages or no file at all.
pub struct ReportWriter<R = HtmlPageRenderer> {
    renderer: R,
    title: String,
}

impl ReportWriter<HtmlPageRenderer> {
    pub fn new() -> Self {
        Self::with_renderer(HtmlPageRenderer)
    }
}

impl Default for ReportWriter<HtmlPageRenderer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: PageRenderer> ReportWriter<R> {
    pub fn with_renderer(renderer: R) -> Self {
        Self {
            renderer,
            title: "SCADA data analysis".into(),
        }
    }

    /// Render every page in memory, then move the finished document into `dest`.
    ///
    /// The document is staged in a temp file next to `dest` and renamed into
    /// place, so a failure at any point leaves nothing at `dest`.
    pub fn write(&self, pages: &[PageSpec], generated_at: NaiveDateTime, dest: &Path) -> Result<()> {
        let artifact = dest.display().to_string();
        let render_error = |page: Option<usize>, message: String| AppError::Render {
            artifact: artifact.clone(),
            page,
            message,
        };

        let mut fragments = Vec::with_capacity(pages.len());
        for page in pages {
            debug!(page = page.number, title = %page.title, "rendering report page");
            let fragment = self
                .renderer
                .render_page(page)
                .map_err(|message| render_error(Some(page.number), message))?;
            fragments.push(fragment);
        }

        let document = html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    title { (self.title) }
                    script src=(PLOTLY_JS) {}
                    style { (PreEscaped(PAGE_CSS)) }
                }
                body {
                    p class="generated" {
                        "Generated on: " (generated_at.format("%Y-%m-%d %H:%M:%S"))
                    }
                    @for fragment in &fragments {
                        (PreEscaped(fragment))
                    }
                }
            }
        }
        .into_string();

        let dir = dest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut staged =
            NamedTempFile::new_in(dir).map_err(|e| render_error(None, e.to_string()))?;
        staged
            .write_all(document.as_bytes())
            .map_err(|e| render_error(None, e.to_string()))?;
        staged
            .as_file()
            .sync_all()
            .map_err(|e| render_error(None, e.to_string()))?;
        staged
            .persist(dest)
            .map_err(|e| render_error(None, e.error.to_string()))?;

        info!(path = %artifact, pages = pages.len(), "report written");
        Ok(())
    }
}

/// Build the six standard pages from `summaries` and write them to `dest`.
pub fn render_report(
    summaries: &Summaries,
    top_devices: usize,
    generated_at: NaiveDateTime,
    dest: &Path,
) -> Result<()> {
    let pages = build_pages(summaries, top_devices);
    ReportWriter::new().write(&pages, generated_at, dest)
}
