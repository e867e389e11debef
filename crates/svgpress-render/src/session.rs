//! Headless browser sessions for frame sampling.
//!
//! [`Renderer`] and [`RenderSession`] are the seams between the export
//! pipeline and a real browser; tests substitute in-memory fakes. The
//! production implementation drives a Chromium-family browser over the
//! DevTools protocol: one launched browser and one page per session, with a
//! minimal stage document hosting the injected SVG.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::Engine;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::dom::Rgba;
use chromiumoxide::cdp::browser_protocol::emulation::{
    SetDefaultBackgroundColorOverrideParams, SetDeviceMetricsOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams, Viewport,
};
use chromiumoxide::page::Page;
use futures::StreamExt;

use svgpress_core::{Error, Result, ToolsConfig};

use crate::tools::resolve_browser;

/// Stage document hosting the injected SVG. Transparent body, no margins,
/// and a centered flex container filling the viewport.
const STAGE_HTML: &str = "<!doctype html><html><head><meta charset='utf-8'></head>\
<body style='margin:0;padding:0;overflow:hidden;background:transparent;'>\
<div id='stage' style='width:100vw;height:100vh;display:flex;align-items:center;justify-content:center;'></div>\
</body></html>";

/// Opens render sessions for SVG documents.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Launch a session with the SVG staged and its animations paused.
    async fn open(&self, svg: &str) -> Result<Box<dyn RenderSession>>;
}

/// A live browser page hosting one staged SVG.
///
/// Sessions are single-use: drive the viewport and animation clock, capture
/// frames, then [`close`](RenderSession::close). Close is infallible by
/// contract; implementations log teardown problems instead of surfacing them
/// over a more interesting primary error.
#[async_trait]
pub trait RenderSession: Send {
    /// Resize the page viewport to exactly `width` x `height` CSS pixels.
    async fn set_viewport(&mut self, width: u32, height: u32) -> Result<()>;

    /// Evaluate a script in the page, returning its JSON value.
    async fn evaluate(&mut self, script: &str) -> Result<serde_json::Value>;

    /// Capture a PNG screenshot clipped to `width` x `height` at the origin.
    async fn screenshot(&mut self, width: u32, height: u32) -> Result<Vec<u8>>;

    /// Tear the session down. Safe to call more than once.
    async fn close(&mut self);
}

/// [`Renderer`] backed by a local Chromium-family binary.
#[derive(Debug, Clone)]
pub struct ChromiumRenderer {
    browser_path: PathBuf,
}

impl ChromiumRenderer {
    /// Use the given browser binary.
    pub fn new(browser_path: PathBuf) -> Self {
        Self { browser_path }
    }

    /// Discover a browser binary from config, environment, and well-known
    /// locations.
    pub fn discover(tools: &ToolsConfig) -> Result<Self> {
        resolve_browser(tools).map(Self::new)
    }

    /// Path of the browser binary this renderer launches.
    pub fn browser_path(&self) -> &Path {
        &self.browser_path
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn open(&self, svg: &str) -> Result<Box<dyn RenderSession>> {
        let mut session = ChromiumSession::launch(&self.browser_path).await?;
        if let Err(e) = session.stage(svg).await {
            session.close().await;
            return Err(e);
        }
        Ok(Box::new(session))
    }
}

/// One launched browser plus the page hosting the stage document.
pub struct ChromiumSession {
    browser: Option<Browser>,
    page: Option<Page>,
    handler_task: Option<tokio::task::JoinHandle<()>>,
}

impl ChromiumSession {
    async fn launch(browser_path: &Path) -> Result<Self> {
        let config = BrowserConfig::builder()
            .no_sandbox()
            .chrome_executable(browser_path)
            .arg("--disable-dev-shm-usage")
            .build()
            .map_err(|e| Error::Render(format!("browser config: {e}")))?;

        tracing::debug!("launching browser {}", browser_path.display());
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| Error::RendererUnavailable(format!("browser launch failed: {e}")))?;

        // The handler must be pumped for the whole session lifetime.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let mut session = Self {
                    browser: Some(browser),
                    page: None,
                    handler_task: Some(handler_task),
                };
                session.close().await;
                return Err(Error::Render(format!("browser page: {e}")));
            }
        };

        Ok(Self {
            browser: Some(browser),
            page: Some(page),
            handler_task: Some(handler_task),
        })
    }

    /// Navigate to the stage document and inject the SVG.
    async fn stage(&mut self, svg: &str) -> Result<()> {
        let url = stage_data_url();
        let page = self.page()?;

        page.goto(url.as_str())
            .await
            .map_err(|e| Error::Render(format!("stage navigation: {e}")))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| Error::Render(format!("stage load: {e}")))?;

        // Keep PNG captures transparent where the SVG does not paint.
        let background = SetDefaultBackgroundColorOverrideParams::builder()
            .color(Rgba {
                r: 0,
                g: 0,
                b: 0,
                a: Some(0.0),
            })
            .build();
        page.execute(background)
            .await
            .map_err(|e| Error::Render(format!("background override: {e}")))?;

        let status: String = page
            .evaluate(inject_svg_script(svg))
            .await
            .map_err(|e| Error::Render(format!("svg injection: {e}")))?
            .into_value()
            .map_err(|e| Error::Render(format!("svg injection result: {e}")))?;

        match status.as_str() {
            "ok" => Ok(()),
            "missing-root" => Err(Error::MalformedSvg("no root <svg> element".into())),
            other => Err(Error::Internal(format!(
                "unexpected svg injection status: {other}"
            ))),
        }
    }

    fn page(&self) -> Result<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| Error::Internal("render session already closed".into()))
    }
}

#[async_trait]
impl RenderSession for ChromiumSession {
    async fn set_viewport(&mut self, width: u32, height: u32) -> Result<()> {
        let params = SetDeviceMetricsOverrideParams::builder()
            .width(i64::from(width))
            .height(i64::from(height))
            .device_scale_factor(1.0)
            .mobile(false)
            .build()
            .map_err(|e| Error::Render(format!("viewport params: {e}")))?;
        self.page()?
            .execute(params)
            .await
            .map_err(|e| Error::Render(format!("viewport override: {e}")))?;
        Ok(())
    }

    async fn evaluate(&mut self, script: &str) -> Result<serde_json::Value> {
        self.page()?
            .evaluate(script)
            .await
            .map_err(|e| Error::Render(format!("script evaluation: {e}")))?
            .into_value()
            .map_err(|e| Error::Render(format!("script result: {e}")))
    }

    async fn screenshot(&mut self, width: u32, height: u32) -> Result<Vec<u8>> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .clip(Viewport {
                x: 0.0,
                y: 0.0,
                width: f64::from(width),
                height: f64::from(height),
                scale: 1.0,
            })
            .build();
        let shot = self
            .page()?
            .execute(params)
            .await
            .map_err(|e| Error::Render(format!("screenshot: {e}")))?;
        base64::engine::general_purpose::STANDARD
            .decode(&shot.data)
            .map_err(|e| Error::Render(format!("screenshot decode: {e}")))
    }

    async fn close(&mut self) {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                tracing::debug!("page close failed: {e}");
            }
        }
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                tracing::debug!("browser close failed: {e}");
            }
        }
        if let Some(task) = self.handler_task.take() {
            task.abort();
        }
    }
}

fn stage_data_url() -> String {
    format!(
        "data:text/html;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(STAGE_HTML)
    )
}

/// Script that parses the SVG into the stage and normalizes it for capture.
///
/// Returns a status string rather than throwing so transport errors stay
/// distinguishable from bad input: `ok` or `missing-root`.
fn inject_svg_script(svg: &str) -> String {
    let literal = serde_json::Value::String(svg.to_string()).to_string();
    format!(
        r#"(() => {{
  const stage = document.getElementById('stage');
  stage.innerHTML = {literal};
  const svg = stage.querySelector('svg');
  if (!svg) {{
    return 'missing-root';
  }}
  svg.setAttribute('width', '100%');
  svg.setAttribute('height', '100%');
  if (!svg.hasAttribute('preserveAspectRatio')) {{
    svg.setAttribute('preserveAspectRatio', 'xMidYMid meet');
  }}
  if (typeof svg.pauseAnimations === 'function') {{
    svg.pauseAnimations();
  }}
  return 'ok';
}})()"#
    )
}
