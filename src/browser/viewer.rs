//! The document viewer driven over CDP
//!
//! Every DOM interaction is a small script evaluated in the page. Selectors
//! are embedded as JSON string literals so they never need manual escaping.

use crate::browser::capture::{ClipRect, PageCapture};
use crate::browser::PageHandle;
use crate::config::{ImageFormat, ViewerSelectors};
use crate::error::{BrowserError, Result};
use crate::page::DocumentPage;
use crate::types::{CaptureViewport, ElementSize, ScrollMetrics};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

/// Id of the stylesheet injected while a page is isolated for printing
const ISOLATION_STYLE_ID: &str = "__vcap_isolation";

/// Attribute marking the container currently being printed
const ISOLATION_ATTR: &str = "data-vcap-isolated";

/// A navigated viewer tab
pub struct ViewerPage {
    handle: PageHandle,
    selectors: ViewerSelectors,
}

impl ViewerPage {
    /// Wrap a page that has already been navigated to the viewer
    pub fn new(handle: PageHandle, selectors: ViewerSelectors) -> Self {
        Self { handle, selectors }
    }

    /// The underlying page handle
    pub fn handle(&self) -> &PageHandle {
        &self.handle
    }

    async fn eval<T: DeserializeOwned>(&self, script: String) -> Result<T> {
        let value = self
            .handle
            .page
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::ScriptFailed(e.to_string()))?
            .into_value::<T>()
            .map_err(|e| BrowserError::ScriptFailed(e.to_string()))?;
        Ok(value)
    }

    async fn container_rect(&self, index: usize) -> Result<ClipRect> {
        let script = format!(
            r#"(() => {{
                const el = document.querySelectorAll({pages})[{index}];
                if (!el) throw new Error('page container {index} not found');
                el.scrollIntoView({{ block: 'start' }});
                const r = el.getBoundingClientRect();
                return {{
                    x: r.left + window.scrollX,
                    y: r.top + window.scrollY,
                    width: r.width,
                    height: r.height,
                }};
            }})()"#,
            pages = js_str(&self.selectors.page_container)?,
            index = index,
        );
        self.eval(script).await
    }
}

#[async_trait]
impl DocumentPage for ViewerPage {
    #[instrument(skip(self))]
    async fn remove_overlays(&self) -> Result<usize> {
        let selectors = serde_json::to_string(&self.selectors.consent_overlays)?;
        let script = format!(
            r#"(() => {{
                let removed = 0;
                for (const sel of {selectors}) {{
                    document.querySelectorAll(sel).forEach(el => {{
                        el.remove();
                        removed += 1;
                    }});
                }}
                if (removed > 0) {{
                    document.body.style.overflow = '';
                    document.documentElement.style.overflow = '';
                }}
                return removed;
            }})()"#
        );
        let removed: u64 = self.eval(script).await?;
        Ok(removed as usize)
    }

    async fn document_title(&self) -> Result<Option<String>> {
        let script = match self.selectors.title {
            Some(ref sel) => format!(
                r#"(() => {{
                    const el = document.querySelector({});
                    return el && el.textContent ? el.textContent.trim() : '';
                }})()"#,
                js_str(sel)?
            ),
            None => "(document.title || '').trim()".to_string(),
        };
        let title: String = self.eval(script).await?;
        Ok(Some(title).filter(|t| !t.is_empty()))
    }

    async fn page_down(&self) -> Result<()> {
        let script = format!(
            r#"(() => {{
                const el = document.querySelector({});
                if (!el) return false;
                el.scrollBy(0, el.clientHeight);
                return true;
            }})()"#,
            js_str(&self.selectors.scroll_container)?
        );
        let scrolled: bool = self.eval(script).await?;
        if !scrolled {
            return Err(BrowserError::ElementNotFound(self.selectors.scroll_container.clone()).into());
        }
        Ok(())
    }

    async fn scroll_metrics(&self) -> Result<ScrollMetrics> {
        let script = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                if (!el) throw new Error('scroll container ' + {sel} + ' not found');
                return {{
                    scrollTop: el.scrollTop,
                    clientHeight: el.clientHeight,
                    scrollHeight: el.scrollHeight,
                }};
            }})()"#,
            sel = js_str(&self.selectors.scroll_container)?
        );
        self.eval(script).await
    }

    async fn page_count(&self) -> Result<usize> {
        let script = format!(
            "document.querySelectorAll({}).length",
            js_str(&self.selectors.page_container)?
        );
        let count: u64 = self.eval(script).await?;
        Ok(count as usize)
    }

    async fn page_size(&self, index: usize) -> Result<ElementSize> {
        let script = format!(
            r#"(() => {{
                const el = document.querySelectorAll({pages})[{index}];
                if (!el) throw new Error('page container {index} not found');
                const cs = window.getComputedStyle(el);
                const r = el.getBoundingClientRect();
                return {{
                    width: parseFloat(cs.width) || r.width,
                    height: parseFloat(cs.height) || r.height,
                }};
            }})()"#,
            pages = js_str(&self.selectors.page_container)?,
            index = index,
        );
        self.eval(script).await
    }

    #[instrument(skip(self))]
    async fn print_isolated(&self, index: usize, size: ElementSize) -> Result<Vec<u8>> {
        let isolate = format!(
            r#"(() => {{
                const pages = document.querySelectorAll({pages});
                const target = pages[{index}];
                if (!target) throw new Error('page container {index} not found');
                pages.forEach((p, i) => {{ p.style.display = i === {index} ? '' : 'none'; }});
                document.querySelectorAll('[{attr}]').forEach(el => el.removeAttribute('{attr}'));
                target.setAttribute('{attr}', '');
                let style = document.getElementById('{style_id}');
                if (!style) {{
                    style = document.createElement('style');
                    style.id = '{style_id}';
                    document.head.appendChild(style);
                }}
                style.textContent = `
                    @page {{ size: {w}px {h}px; margin: 0; }}
                    @media print {{
                        html, body {{ margin: 0 !important; padding: 0 !important; }}
                        body * {{ visibility: hidden !important; }}
                        [{attr}], [{attr}] * {{ visibility: visible !important; }}
                        [{attr}] {{ position: fixed !important; left: 0 !important; top: 0 !important; margin: 0 !important; }}
                    }}`;
                return true;
            }})()"#,
            pages = js_str(&self.selectors.page_container)?,
            index = index,
            attr = ISOLATION_ATTR,
            style_id = ISOLATION_STYLE_ID,
            w = size.width,
            h = size.height,
        );
        let _: bool = self.eval(isolate).await?;

        let printed = PageCapture::print(&self.handle, size).await;

        let rehide = format!(
            r#"(() => {{
                const el = document.querySelectorAll({pages})[{index}];
                if (el) {{
                    el.style.display = 'none';
                    el.removeAttribute('{attr}');
                }}
                return true;
            }})()"#,
            pages = js_str(&self.selectors.page_container)?,
            index = index,
            attr = ISOLATION_ATTR,
        );
        let _: bool = self.eval(rehide).await?;

        let data = printed?;
        debug!("Printed page container {} ({} bytes)", index, data.len());
        Ok(data)
    }

    async fn restore_layout(&self) -> Result<()> {
        let script = format!(
            r#"(() => {{
                document.querySelectorAll({pages}).forEach(p => {{
                    p.style.display = '';
                    p.removeAttribute('{attr}');
                }});
                const style = document.getElementById('{style_id}');
                if (style) style.remove();
                return true;
            }})()"#,
            pages = js_str(&self.selectors.page_container)?,
            attr = ISOLATION_ATTR,
            style_id = ISOLATION_STYLE_ID,
        );
        let _: bool = self.eval(script).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn screenshot_page(
        &self,
        index: usize,
        viewport: CaptureViewport,
        format: ImageFormat,
    ) -> Result<Vec<u8>> {
        let rect = self.container_rect(index).await?;
        let size = rect.size();
        if !size.is_usable() {
            return Err(BrowserError::ElementNotFound(format!(
                "page container {} has no layout box",
                index
            ))
            .into());
        }
        PageCapture::screenshot(&self.handle, rect, viewport.scale_for(size), format).await
    }

    async fn close(&self) -> Result<()> {
        self.handle.page.clone().close().await?;
        Ok(())
    }
}

/// Quote `s` as a JavaScript string literal
fn js_str(s: &str) -> Result<String> {
    Ok(serde_json::to_string(s)?)
}
