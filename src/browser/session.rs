//! A lazily launched, explicitly released browser
//!
//! The session owns at most one Chromium process. The first `acquire`
//! launches it; every later job reuses it and gets its own tab. `release`
//! shuts it down and is safe to call when nothing was launched.

use crate::browser::{BrowserConfig, BrowserController, NavigationOptions, PageNavigator, ViewerPage};
use crate::config::ViewerSelectors;
use crate::error::Result;
use crate::page::PageProvider;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

/// Shared browser for capture jobs
pub struct BrowserSession {
    config: BrowserConfig,
    navigation: NavigationOptions,
    controller: Mutex<Option<BrowserController>>,
}

impl BrowserSession {
    /// Create a session; nothing is launched until the first page is needed
    pub fn new(config: BrowserConfig) -> Self {
        let navigation = NavigationOptions {
            timeout_ms: config.timeout_ms,
            ..Default::default()
        };
        Self {
            config,
            navigation,
            controller: Mutex::new(None),
        }
    }

    /// Override navigation behaviour
    pub fn with_navigation(mut self, navigation: NavigationOptions) -> Self {
        self.navigation = navigation;
        self
    }

    /// Whether a browser process is currently held
    pub async fn is_running(&self) -> bool {
        self.controller.lock().await.is_some()
    }

    /// Open a tab at `url` and wait until the viewer has rendered a page
    #[instrument(skip(self, selectors))]
    pub async fn open(&self, url: &str, selectors: &ViewerSelectors) -> Result<ViewerPage> {
        let handle = {
            let mut guard = self.controller.lock().await;
            let controller = match guard.take() {
                Some(controller) => controller,
                None => BrowserController::with_config(self.config.clone()).await?,
            };
            let page = controller.new_page().await;
            *guard = Some(controller);
            page?
        };

        let settled = async {
            PageNavigator::goto(&handle, url, Some(self.navigation.clone())).await?;
            PageNavigator::wait_for_selector(
                &handle,
                &selectors.page_container,
                self.navigation.timeout_ms,
            )
            .await
        }
        .await;

        if let Err(e) = settled {
            if let Err(close_err) = handle.page.clone().close().await {
                warn!("Failed to close page after navigation error: {}", close_err);
            }
            return Err(e);
        }

        info!("Viewer ready at {}", handle.url().await);
        Ok(ViewerPage::new(handle, selectors.clone()))
    }

    /// Shut the browser down, if one was launched
    #[instrument(skip(self))]
    pub async fn release(&self) -> Result<()> {
        let controller = self.controller.lock().await.take();
        match controller {
            Some(controller) => controller.close().await,
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PageProvider for BrowserSession {
    type Page = ViewerPage;

    async fn acquire(&self, url: &str, selectors: &ViewerSelectors) -> Result<ViewerPage> {
        self.open(url, selectors).await
    }
}
