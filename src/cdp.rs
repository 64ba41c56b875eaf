//! Chrome DevTools Protocol engine implementation

use crate::{ConverterConfig, Engine, Error, PageConfiguration, Result};
use headless_chrome::browser::tab::Tab;
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions};
use log::debug;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(60 * 60 * 24);

/// CDP-based engine implementation (uses the `headless_chrome` crate)
///
/// This adapter launches a headless Chrome instance, manages a single tab,
/// and provides the `Engine` trait implementation over it.
pub struct CdpEngine {
    browser: Browser,
    tab: Arc<Tab>,
    print_background: bool,
}

impl Engine for CdpEngine {
    fn new(config: &ConverterConfig) -> Result<Self>
    where
        Self: Sized,
    {
        let timeout = Duration::from_millis(config.timeout_ms);

        // Keep the browser alive while a worker sits idle between conversions
        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(config.sandbox)
            .path(config.chrome_path.clone())
            .idle_browser_timeout(IDLE_BROWSER_TIMEOUT)
            .build()
            .map_err(|e| Error::InitializationError(format!("Failed to build launch options: {}", e)))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| Error::InitializationError(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| Error::InitializationError(format!("Failed to create tab: {}", e)))?;
        tab.set_default_timeout(timeout);

        debug!("launched headless Chrome (sandbox: {})", config.sandbox);

        Ok(Self {
            browser,
            tab,
            print_background: config.print_background,
        })
    }

    fn load_file(&mut self, url: &Url) -> Result<()> {
        self.tab
            .navigate_to(url.as_str())
            .map_err(|e| Error::RenderError(format!("Navigation failed: {}", e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| Error::RenderError(format!("Wait for navigation failed: {}", e)))?;

        Ok(())
    }

    fn print_pdf(&mut self, page: &PageConfiguration) -> Result<Vec<u8>> {
        let options = print_options(page, self.print_background);

        let pdf = self
            .tab
            .print_to_pdf(Some(options))
            .map_err(|e| Error::RenderError(format!("PDF export failed: {}", e)))?;

        if pdf.is_empty() {
            return Err(Error::RenderError("Engine returned an empty PDF".into()));
        }
        Ok(pdf)
    }

    fn close(self) -> Result<()> {
        // Drop the tab before the browser so the child process exits promptly
        drop(self.tab);
        drop(self.browser);
        Ok(())
    }
}

/// Map page geometry onto Chrome's paper model (inches).
///
/// CSS `@page` sizes are ignored so the configured geometry always wins.
pub(crate) fn print_options(page: &PageConfiguration, print_background: bool) -> PrintToPdfOptions {
    let geo = page.print_geometry().to_inches();
    PrintToPdfOptions {
        print_background: Some(print_background),
        prefer_css_page_size: Some(false),
        paper_width: Some(geo.paper_width),
        paper_height: Some(geo.paper_height),
        margin_top: Some(geo.margin_top),
        margin_bottom: Some(geo.margin_bottom),
        margin_left: Some(geo.margin_left),
        margin_right: Some(geo.margin_right),
        ..Default::default()
    }
}
