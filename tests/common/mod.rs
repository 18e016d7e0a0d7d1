//! In-memory viewer used by the integration tests
//!
//! `FakeViewer` implements the page traits without a browser. Printed pages
//! are real one-page PDFs whose media box width is the container width, so
//! tests can read page order back out of the merged document.

#![allow(dead_code)]

use async_trait::async_trait;
use image::{ImageFormat as Encoding, Rgb, RgbImage};
use lopdf::{dictionary, Document, Object, Stream};
use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use viewer_capture::config::ViewerSelectors;
use viewer_capture::error::{BrowserError, NavigationError};
use viewer_capture::types::{CaptureViewport, ElementSize, ScrollMetrics};
use viewer_capture::{DocumentPage, ImageFormat, PageProvider, ProgressEvent, ProgressSink, Result};

/// One page container in the fake viewer
#[derive(Debug, Clone)]
pub struct FakePage {
    pub width: f64,
    pub height: f64,
    /// Overrides the screenshot pixel size the viewport asks for
    pub image_size: Option<(u32, u32)>,
}

impl FakePage {
    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            image_size: None,
        }
    }
}

/// Shared state of one fake viewer tab
pub struct ViewerState {
    pub title: Option<String>,
    pub pages: Vec<FakePage>,
    pub failing: HashSet<usize>,
    pub overlays: usize,
    pub scroll: Mutex<ScrollMetrics>,
    pub growth: Mutex<Vec<f64>>,
    pub closed: AtomicBool,
    pub restored: AtomicBool,
    pub page_downs: AtomicUsize,
}

/// Builder for a fake viewer
pub struct ViewerBuilder {
    title: Option<String>,
    pages: Vec<FakePage>,
    failing: HashSet<usize>,
    overlays: usize,
    scroll_height: f64,
    client_height: f64,
    growth: Vec<f64>,
}

impl ViewerBuilder {
    /// `n` pages whose widths are 100, 101, ... so order is observable
    pub fn numbered(n: usize) -> Self {
        Self::with_pages((0..n).map(|i| FakePage::sized(100.0 + i as f64, 140.0)).collect())
    }

    pub fn with_pages(pages: Vec<FakePage>) -> Self {
        Self {
            title: None,
            pages,
            failing: HashSet::new(),
            overlays: 0,
            scroll_height: 1000.0,
            client_height: 250.0,
            growth: Vec::new(),
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn failing(mut self, indices: &[usize]) -> Self {
        self.failing.extend(indices.iter().copied());
        self
    }

    pub fn overlays(mut self, n: usize) -> Self {
        self.overlays = n;
        self
    }

    /// Content height added on each of the next page-downs
    pub fn growing(mut self, growth: &[f64]) -> Self {
        self.growth = growth.iter().rev().copied().collect();
        self
    }

    pub fn build(self) -> Arc<ViewerState> {
        Arc::new(ViewerState {
            title: self.title,
            pages: self.pages,
            failing: self.failing,
            overlays: self.overlays,
            scroll: Mutex::new(ScrollMetrics {
                scroll_top: 0.0,
                client_height: self.client_height,
                scroll_height: self.scroll_height,
            }),
            growth: Mutex::new(self.growth),
            closed: AtomicBool::new(false),
            restored: AtomicBool::new(false),
            page_downs: AtomicUsize::new(0),
        })
    }
}

/// Handle to a fake viewer tab
pub struct FakeViewer {
    pub state: Arc<ViewerState>,
}

impl FakeViewer {
    fn page(&self, index: usize) -> Result<&FakePage> {
        self.state
            .pages
            .get(index)
            .ok_or_else(|| BrowserError::ElementNotFound(format!("page {}", index)).into())
    }

    fn check_failing(&self, index: usize) -> Result<()> {
        if self.state.failing.contains(&index) {
            return Err(BrowserError::ScriptFailed(format!("page {} did not render", index)).into());
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentPage for FakeViewer {
    async fn remove_overlays(&self) -> Result<usize> {
        Ok(self.state.overlays)
    }

    async fn document_title(&self) -> Result<Option<String>> {
        Ok(self.state.title.clone())
    }

    async fn page_down(&self) -> Result<()> {
        self.state.page_downs.fetch_add(1, Ordering::SeqCst);
        let mut scroll = self.state.scroll.lock().unwrap();
        if let Some(extra) = self.state.growth.lock().unwrap().pop() {
            scroll.scroll_height += extra;
        }
        let max_top = (scroll.scroll_height - scroll.client_height).max(0.0);
        scroll.scroll_top = (scroll.scroll_top + scroll.client_height).min(max_top);
        Ok(())
    }

    async fn scroll_metrics(&self) -> Result<ScrollMetrics> {
        Ok(*self.state.scroll.lock().unwrap())
    }

    async fn page_count(&self) -> Result<usize> {
        Ok(self.state.pages.len())
    }

    async fn page_size(&self, index: usize) -> Result<ElementSize> {
        let page = self.page(index)?;
        Ok(ElementSize::new(page.width, page.height))
    }

    async fn print_isolated(&self, index: usize, size: ElementSize) -> Result<Vec<u8>> {
        self.check_failing(index)?;
        Ok(single_page_pdf(size.width as i64, size.height as i64))
    }

    async fn restore_layout(&self) -> Result<()> {
        self.state.restored.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn screenshot_page(
        &self,
        index: usize,
        viewport: CaptureViewport,
        format: ImageFormat,
    ) -> Result<Vec<u8>> {
        self.check_failing(index)?;
        let (width, height) = self.page(index)?.image_size.unwrap_or(viewport.pixel_size());
        let encoding = match format {
            ImageFormat::Png => Encoding::Png,
            ImageFormat::Jpeg => Encoding::Jpeg,
        };
        let mut out = Cursor::new(Vec::new());
        RgbImage::from_pixel(width, height, Rgb([240, 240, 240]))
            .write_to(&mut out, encoding)
            .unwrap();
        Ok(out.into_inner())
    }

    async fn close(&self) -> Result<()> {
        self.state.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out tabs on one fake viewer and counts how often it was asked
pub struct FakeProvider {
    pub state: Arc<ViewerState>,
    pub acquired: AtomicUsize,
    pub urls: Mutex<Vec<String>>,
    pub fail_navigation: bool,
}

impl FakeProvider {
    pub fn new(state: Arc<ViewerState>) -> Arc<Self> {
        Arc::new(Self {
            state,
            acquired: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
            fail_navigation: false,
        })
    }

    pub fn unreachable(state: Arc<ViewerState>) -> Arc<Self> {
        Arc::new(Self {
            state,
            acquired: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
            fail_navigation: true,
        })
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageProvider for FakeProvider {
    type Page = FakeViewer;

    async fn acquire(&self, url: &str, _selectors: &ViewerSelectors) -> Result<FakeViewer> {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());
        if self.fail_navigation {
            return Err(NavigationError::Timeout(30000).into());
        }
        Ok(FakeViewer {
            state: self.state.clone(),
        })
    }
}

/// Progress sink that keeps every event
#[derive(Default)]
pub struct Recorder {
    pub events: Mutex<Vec<ProgressEvent>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn loading(&self) -> Vec<u8> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ProgressEvent::Loading(p) => Some(p),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for Recorder {
    fn report(&self, event: &ProgressEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// A one-page PDF with media box `[0 0 width height]`
pub fn single_page_pdf(width: i64, height: i64) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let content_id = doc.add_object(Stream::new(dictionary! {}, b"q Q".to_vec()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "MediaBox" => Object::Array(vec![0.into(), 0.into(), width.into(), height.into()]),
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

/// Media box `[width, height]` of every page, in document order
pub fn page_sizes(path: &Path) -> Vec<(f64, f64)> {
    let doc = Document::load(path).unwrap();
    doc.get_pages()
        .values()
        .map(|id| {
            let media_box = doc
                .get_dictionary(*id)
                .unwrap()
                .get(b"MediaBox")
                .unwrap()
                .as_array()
                .unwrap()
                .clone();
            (number(&media_box[2]), number(&media_box[3]))
        })
        .collect()
}

fn number(obj: &Object) -> f64 {
    match obj {
        Object::Integer(i) => *i as f64,
        Object::Real(r) => *r as f64,
        other => panic!("not a number: {:?}", other),
    }
}
