//! Browser automation module
//!
//! This module provides high-level browser control through ChromiumOxide:
//! lifecycle management, navigation, capture requests, and the viewer page
//! the capture pipeline drives.

pub mod capture;
pub mod controller;
pub mod navigation;
pub mod session;
pub mod viewer;

pub use capture::{ClipRect, PageCapture};
pub use controller::{BrowserConfig, BrowserConfigBuilder, BrowserController, PageHandle};
pub use navigation::{NavigationOptions, NavigationResult, PageNavigator, WaitUntil};
pub use session::BrowserSession;
pub use viewer::ViewerPage;
