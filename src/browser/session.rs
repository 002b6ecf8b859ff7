use crate::{browser::config::{CaptureOptions, ConnectionOptions, LaunchOptions},
            browser::tab_host::{TabHost, TabOverlay},
            dom::{Descriptor, Marker, PageHost},
            error::{BrowserError, Result},
            tools::{ToolContext, ToolRegistry}};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use headless_chrome::{Browser, Tab, protocol::cdp::Page::CaptureScreenshotFormatOption};
use serde::{Deserialize, Serialize};
use std::{ffi::OsStr,
          sync::{Arc, Mutex, MutexGuard, PoisonError},
          time::Duration};

/// Marks currently drawn by a session, and the tab they were drawn in
struct PageMarks<T = Arc<Tab>, O = TabOverlay> {
    tab: Option<T>,
    marker: Marker<O>,
}

impl<T, O> Default for PageMarks<T, O> {
    fn default() -> Self {
        Self {
            tab: None,
            marker: Marker::new(),
        }
    }
}

impl<T: Clone, O> PageMarks<T, O> {
    /// Remove the marks through a host opened on their tab. The tab is
    /// remembered while any overlay is left to remove.
    fn clear_with<H>(&mut self, open: impl FnOnce(T) -> H) -> Result<()>
    where
        H: PageHost<Overlay = O>,
    {
        let Some(tab) = self.tab.clone() else {
            return Ok(());
        };

        let result = self.marker.unmark(&mut open(tab));
        if self.marker.overlay_count() == 0 {
            self.tab = None;
        }
        result
    }

    /// Clear ahead of marking another page. Marks that cannot be removed from
    /// a tab other than the one about to be marked are logged and forgotten.
    fn clear_before_mark<H>(&mut self, elsewhere: impl FnOnce(&T) -> bool, open: impl FnOnce(T) -> H) -> Result<()>
    where
        H: PageHost<Overlay = O>,
    {
        let elsewhere = self.tab.as_ref().is_some_and(elsewhere);

        match self.clear_with(open) {
            Err(e) if elsewhere => {
                log::warn!("Dropping {} marks left in another tab: {}", self.marker.overlay_count(), e);
                *self = Self::default();
                Ok(())
            }
            result => result,
        }
    }
}

/// Result of the mark, screenshot, unmark workflow
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarkedPage {
    /// Descriptors of the marked rectangles, in label order
    pub descriptors: Vec<Descriptor>,

    /// Base64-encoded PNG of the page with its marks
    pub screenshot: String,
}

/// Browser session that manages a Chrome/Chromium instance
pub struct BrowserSession {
    /// The underlying headless_chrome Browser instance
    browser: Browser,

    /// Overlays drawn by [`BrowserSession::mark_page`]
    marks: Mutex<PageMarks>,

    /// Tool registry for executing browser automation tools
    tool_registry: ToolRegistry,
}

impl BrowserSession {
    /// Launch a new browser instance with the given options
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // Keep pages from detecting automation and hiding content behind it
        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));

        // Agents pause between marks; the default 30s idle timeout is too short
        launch_opts.idle_browser_timeout = Duration::from_secs(60 * 60);

        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));
        launch_opts.path = options.chrome_path;
        launch_opts.user_data_dir = options.user_data_dir;
        launch_opts.sandbox = options.sandbox;

        let browser = Browser::new(launch_opts).map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        browser.new_tab().map_err(|e| BrowserError::LaunchFailed(format!("Failed to create tab: {}", e)))?;

        Ok(Self::with_browser(browser))
    }

    /// Connect to an existing browser instance via WebSocket
    pub fn connect(options: ConnectionOptions) -> Result<Self> {
        let browser = Browser::connect_with_timeout(options.ws_url, Duration::from_millis(options.timeout))
            .map_err(|e| BrowserError::ConnectionFailed(e.to_string()))?;

        Ok(Self::with_browser(browser))
    }

    /// Launch a browser with default options
    pub fn new() -> Result<Self> {
        Self::launch(LaunchOptions::default())
    }

    fn with_browser(browser: Browser) -> Self {
        Self {
            browser,
            marks: Mutex::new(PageMarks::default()),
            tool_registry: ToolRegistry::with_defaults(),
        }
    }

    /// Get the active tab
    pub fn tab(&self) -> Result<Arc<Tab>> {
        self.get_active_tab()
    }

    /// Get all tabs
    pub fn get_tabs(&self) -> Result<Vec<Arc<Tab>>> {
        let tabs = self
            .browser
            .get_tabs()
            .lock()
            .map_err(|e| BrowserError::TabOperationFailed(format!("Failed to get tabs: {}", e)))?
            .clone();

        Ok(tabs)
    }

    /// Get the currently active tab by checking the document visibility and focus state
    pub fn get_active_tab(&self) -> Result<Arc<Tab>> {
        let tabs = self.get_tabs()?;

        // Visible and focused is the strongest signal, visible alone the fallback
        for check in [
            "document.visibilityState === 'visible' && document.hasFocus()",
            "document.visibilityState === 'visible'",
        ] {
            for tab in &tabs {
                match tab.evaluate(check, false) {
                    Ok(remote_object) => {
                        if remote_object.value.and_then(|v| v.as_bool()).unwrap_or(false) {
                            return Ok(tab.clone());
                        }
                    }
                    Err(e) => log::debug!("Failed to check tab status: {}", e),
                }
            }
        }

        Err(BrowserError::TabOperationFailed("No active tab found".to_string()))
    }

    /// Get the underlying Browser instance
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Navigate to a URL using the active tab
    pub fn navigate(&self, url: &str) -> Result<()> {
        self.tab()?
            .navigate_to(url)
            .map_err(|e| BrowserError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e)))?;

        Ok(())
    }

    /// Wait for navigation to complete
    pub fn wait_for_navigation(&self) -> Result<()> {
        self.tab()?
            .wait_until_navigated()
            .map_err(|e| BrowserError::NavigationFailed(format!("Navigation timeout: {}", e)))?;

        Ok(())
    }

    fn lock_marks(&self) -> MutexGuard<'_, PageMarks> {
        // The mark list is valid after a panic mid-call: at worst it names
        // overlays that are already gone
        self.marks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark the interactive elements of the active tab.
    ///
    /// Overlays from the previous mark are removed first, from whichever tab
    /// they were drawn in.
    pub fn mark_page(&self) -> Result<Vec<Descriptor>> {
        let tab = self.tab()?;
        let mut marks = self.lock_marks();
        marks.clear_before_mark(|marked| !Arc::ptr_eq(marked, &tab), TabHost::new)?;

        let mut host = TabHost::capture(tab.clone())?;
        marks.tab = Some(tab);
        let descriptors = marks.marker.mark(&mut host)?;

        log::debug!("Marked {} rectangles", descriptors.len());
        Ok(descriptors)
    }

    /// Remove every overlay drawn by [`BrowserSession::mark_page`]
    pub fn unmark_page(&self) -> Result<()> {
        self.lock_marks().clear_with(TabHost::new)
    }

    /// Number of overlays currently drawn by this session
    pub fn overlay_count(&self) -> usize {
        self.lock_marks().marker.overlay_count()
    }

    /// Capture a PNG screenshot of the active tab's viewport
    pub fn screenshot(&self) -> Result<Vec<u8>> {
        self.tab()?
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| BrowserError::ScreenshotFailed(e.to_string()))
    }

    /// Mark the page, screenshot it with its marks, then unmark it.
    ///
    /// Marking is retried on failure and when it finds nothing. Failing to
    /// unmark afterwards is logged, not returned.
    pub fn capture_marked(&self, options: &CaptureOptions) -> Result<MarkedPage> {
        let descriptors = self.mark_with_retries(options)?;

        let screenshot = self.screenshot();
        self.unmark_with_retries(options);

        Ok(MarkedPage {
            descriptors,
            screenshot: STANDARD.encode(screenshot?),
        })
    }

    fn mark_with_retries(&self, options: &CaptureOptions) -> Result<Vec<Descriptor>> {
        let attempts = options.attempts.max(1);
        let mut outcome = Ok(Vec::new());

        for attempt in 1..=attempts {
            outcome = self.mark_page();
            match &outcome {
                Ok(descriptors) if !descriptors.is_empty() => break,
                Ok(_) => log::debug!("Attempt {}/{}: no elements marked", attempt, attempts),
                Err(e) => {
                    log::warn!("Attempt {}/{}: marking failed: {}", attempt, attempts, e);
                    if attempt < attempts {
                        std::thread::sleep(options.retry_delay);
                    }
                }
            }
        }

        outcome
    }

    fn unmark_with_retries(&self, options: &CaptureOptions) {
        let attempts = options.unmark_attempts.max(1);

        for attempt in 1..=attempts {
            match self.unmark_page() {
                Ok(()) => return,
                Err(e) => {
                    log::warn!("Attempt {}/{}: unmarking failed: {}", attempt, attempts, e);
                    if attempt < attempts {
                        std::thread::sleep(options.retry_delay);
                    }
                }
            }
        }
    }

    /// Get the tool registry
    pub fn tool_registry(&self) -> &ToolRegistry {
        &self.tool_registry
    }

    /// Get mutable tool registry
    pub fn tool_registry_mut(&mut self) -> &mut ToolRegistry {
        &mut self.tool_registry
    }

    /// Execute a tool by name
    pub fn execute_tool(&self, name: &str, params: serde_json::Value) -> Result<crate::tools::ToolResult> {
        let mut context = ToolContext::new(self);
        self.tool_registry.execute(name, params, &mut context)
    }

    /// Close the browser
    pub fn close(&self) -> Result<()> {
        if let Err(e) = self.unmark_page() {
            log::debug!("Failed to unmark before closing: {}", e);
        }

        // headless_chrome closes the browser when it is dropped; closing
        // every tab shuts it down now
        for tab in self.get_tabs()? {
            let _ = tab.close(false);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::snapshot::SnapshotOverlay;
    use crate::dom::snapshot::flaky::FlakyPage;
    use crate::dom::{PageSnapshot, SnapshotNode, Viewport};

    #[test]
    fn test_launch_options_builder() {
        let opts = LaunchOptions::new().headless(true).window_size(800, 600);

        assert!(opts.headless);
        assert_eq!(opts.window_width, 800);
        assert_eq!(opts.window_height, 600);
    }

    #[test]
    fn test_connection_options() {
        let opts = ConnectionOptions::new("ws://localhost:9222").timeout(5000);

        assert_eq!(opts.ws_url, "ws://localhost:9222");
        assert_eq!(opts.timeout, 5000);
    }

    #[test]
    fn test_marked_page_serialization() {
        let page = MarkedPage {
            descriptors: vec![],
            screenshot: "iVBORw0KGgo=".to_string(),
        };

        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["screenshot"], "iVBORw0KGgo=");
        assert!(json["descriptors"].as_array().unwrap().is_empty());
    }

    type TabId = u32;

    fn blank() -> FlakyPage {
        FlakyPage::new(PageSnapshot::new(Viewport::new(800.0, 600.0)))
    }

    fn marked_in(tab: TabId) -> (PageMarks<TabId, SnapshotOverlay>, FlakyPage) {
        let mut page = PageSnapshot::new(Viewport::new(800.0, 600.0));
        page.push(SnapshotNode::new("BUTTON").with_rect(10.0, 10.0, 100.0, 30.0));
        let mut host = FlakyPage::new(page);

        let mut marks = PageMarks::default();
        marks.marker.mark(&mut host).unwrap();
        marks.tab = Some(tab);
        (marks, host)
    }

    #[test]
    fn test_clear_forgets_tab_once_removed() {
        let (mut marks, host) = marked_in(1);

        marks.clear_with(move |_| host).unwrap();
        assert_eq!(marks.marker.overlay_count(), 0);
        assert!(marks.tab.is_none());

        // Nothing left: no host is opened
        marks.clear_with(|_| -> FlakyPage { panic!("no marks to clear") }).unwrap();
    }

    #[test]
    fn test_clear_keeps_tab_while_overlays_remain() {
        let (mut marks, host) = marked_in(1);

        assert!(marks.clear_with(move |_| host.fail_removals(1)).is_err());
        assert_eq!(marks.tab, Some(1));
        assert_eq!(marks.marker.overlay_count(), 1);

        marks.clear_with(|tab| {
            assert_eq!(tab, 1);
            blank()
        })
        .unwrap();
        assert!(marks.tab.is_none());
        assert_eq!(marks.marker.overlay_count(), 0);
    }

    #[test]
    fn test_unreachable_marks_in_other_tab_do_not_block_marking() {
        let (mut marks, host) = marked_in(1);

        marks
            .clear_before_mark(|marked| *marked != 2, move |_| host.fail_removals(1))
            .unwrap();
        assert!(marks.tab.is_none());
        assert_eq!(marks.marker.overlay_count(), 0);
    }

    #[test]
    fn test_unremovable_marks_in_marked_tab_fail() {
        let (mut marks, host) = marked_in(1);

        let result = marks.clear_before_mark(|marked| *marked != 1, move |_| host.fail_removals(1));
        assert!(result.is_err());
        assert_eq!(marks.tab, Some(1));
        assert_eq!(marks.marker.overlay_count(), 1);
    }

    // Integration tests (require Chrome to be installed)
    #[test]
    #[ignore] // Ignore by default, run with: cargo test -- --ignored
    fn test_launch_browser() {
        let result = BrowserSession::launch(LaunchOptions::new().headless(true));
        assert!(result.is_ok());
    }

    #[test]
    #[ignore]
    fn test_unmark_without_marks() {
        let session = BrowserSession::launch(LaunchOptions::new().headless(true)).expect("Failed to launch browser");

        session.unmark_page().expect("Unmark should be a no-op");
        session.unmark_page().expect("Unmark should be a no-op");
        assert_eq!(session.overlay_count(), 0);
    }
}
