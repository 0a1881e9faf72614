//! Scripted in-memory sites.
//!
//! A [`MockSite`] is a set of pages keyed by URL. Sessions opened on it
//! implement [`BrowserActions`], so drivers can be exercised without a
//! browser. Pages hold elements by [`Locator`]; clicking a submit element
//! swaps in the result page registered for the last typed query.

use crate::actions::BrowserActions;
use crate::error::{BrowserError, Result};
use scout_core::Locator;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// What clicking an element does
#[derive(Debug, Clone, PartialEq, Eq)]
enum ClickAction {
    None,
    Submit,
    Goto(String),
}

/// A scripted element.
#[derive(Debug, Clone)]
pub struct MockElement {
    text: String,
    attributes: HashMap<String, String>,
    visible: bool,
    appear_after: usize,
    hide_after: Option<usize>,
    on_click: ClickAction,
    polls: usize,
}

impl MockElement {
    /// Visible element with the given text
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attributes: HashMap::new(),
            visible: true,
            appear_after: 0,
            hide_after: None,
            on_click: ClickAction::None,
            polls: 0,
        }
    }

    /// Empty text input
    pub fn input() -> Self {
        Self::text("")
    }

    /// Button that submits the last typed query
    pub fn submit() -> Self {
        Self {
            on_click: ClickAction::Submit,
            ..Self::text("")
        }
    }

    /// Link that loads another registered page
    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            on_click: ClickAction::Goto(url.into()),
            ..Self::text(text)
        }
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// In the DOM but not rendered
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Absent for the first `polls` presence checks
    #[must_use]
    pub fn appearing_after(mut self, polls: usize) -> Self {
        self.appear_after = polls;
        self
    }

    /// Visible for the first `polls` visibility checks, hidden afterwards
    #[must_use]
    pub fn hidden_after(mut self, polls: usize) -> Self {
        self.hide_after = Some(polls);
        self
    }

    fn check_present(&mut self) -> bool {
        self.polls += 1;
        self.polls > self.appear_after
    }

    fn check_visible(&mut self) -> bool {
        self.polls += 1;
        let shown = self.hide_after.map_or(true, |limit| self.polls <= limit);
        self.polls > self.appear_after && self.visible && shown
    }
}

/// A scripted page.
#[derive(Debug, Clone, Default)]
pub struct MockPage {
    elements: HashMap<Locator, MockElement>,
    searches: HashMap<String, MockPage>,
    no_match: Option<Box<MockPage>>,
}

impl MockPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element
    #[must_use]
    pub fn element(mut self, locator: Locator, element: MockElement) -> Self {
        self.elements.insert(locator, element);
        self
    }

    /// Page shown when `query` is submitted from this page
    #[must_use]
    pub fn on_search(mut self, query: impl Into<String>, results: MockPage) -> Self {
        self.searches.insert(query.into(), results);
        self
    }

    /// Page shown when a submitted query has no registered results.
    /// Defaults to an empty page.
    #[must_use]
    pub fn on_no_match(mut self, page: MockPage) -> Self {
        self.no_match = Some(Box::new(page));
        self
    }
}

#[derive(Debug, Default)]
struct SiteState {
    pages: HashMap<String, MockPage>,
    navigation_failures: HashMap<String, usize>,
    typing_failures: HashSet<String>,
    navigation_delay: Duration,
    crashed: bool,
    navigations: Vec<String>,
    typed: Vec<String>,
    sessions_opened: usize,
    sessions_closed: usize,
    in_flight: usize,
    peak_in_flight: usize,
}

/// Builder for [`MockSite`]
#[derive(Debug, Default)]
pub struct MockSiteBuilder {
    state: SiteState,
}

impl MockSiteBuilder {
    /// Register a page reachable by navigation or link
    #[must_use]
    pub fn page(mut self, url: impl Into<String>, page: MockPage) -> Self {
        self.state.pages.insert(url.into(), page);
        self
    }

    /// Fail the next `times` navigations to `url`
    #[must_use]
    pub fn fail_navigation(mut self, url: impl Into<String>, times: usize) -> Self {
        self.state.navigation_failures.insert(url.into(), times);
        self
    }

    /// Fail every attempt to type `value`
    #[must_use]
    pub fn fail_typing(mut self, value: impl Into<String>) -> Self {
        self.state.typing_failures.insert(value.into());
        self
    }

    /// Make each navigation take `delay`
    #[must_use]
    pub fn navigation_delay(mut self, delay: Duration) -> Self {
        self.state.navigation_delay = delay;
        self
    }

    pub fn build(self) -> MockSite {
        MockSite {
            state: Arc::new(Mutex::new(self.state)),
        }
    }
}

/// Shared scripted site with an interaction log.
#[derive(Debug, Clone)]
pub struct MockSite {
    state: Arc<Mutex<SiteState>>,
}

impl MockSite {
    pub fn builder() -> MockSiteBuilder {
        MockSiteBuilder::default()
    }

    /// Open a new session on the site
    pub fn session(&self) -> MockSession {
        lock(&self.state).sessions_opened += 1;
        MockSession {
            site: Arc::clone(&self.state),
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Make every session operation fail as if the browser died
    pub fn crash(&self) {
        lock(&self.state).crashed = true;
    }

    /// URLs passed to `navigate`, in order
    pub fn navigations(&self) -> Vec<String> {
        lock(&self.state).navigations.clone()
    }

    /// Number of `navigate` calls for `url`
    pub fn navigation_count(&self, url: &str) -> usize {
        lock(&self.state)
            .navigations
            .iter()
            .filter(|visited| *visited == url)
            .count()
    }

    /// Values passed to `clear_and_type`, in order
    pub fn typed(&self) -> Vec<String> {
        lock(&self.state).typed.clone()
    }

    pub fn sessions_opened(&self) -> usize {
        lock(&self.state).sessions_opened
    }

    pub fn sessions_closed(&self) -> usize {
        lock(&self.state).sessions_closed
    }

    /// Most navigations observed in progress at once
    pub fn peak_concurrency(&self) -> usize {
        lock(&self.state).peak_in_flight
    }
}

#[derive(Debug, Default)]
struct SessionState {
    current: Option<MockPage>,
    last_typed: Option<String>,
    closed: bool,
}

/// One session on a [`MockSite`]
#[derive(Debug)]
pub struct MockSession {
    site: Arc<Mutex<SiteState>>,
    state: Mutex<SessionState>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn not_found(locator: &Locator) -> BrowserError {
    BrowserError::ElementError {
        locator: locator.to_string(),
        reason: "not found".to_string(),
    }
}

impl MockSession {
    fn ensure_open(&self) -> Result<()> {
        if lock(&self.site).crashed || lock(&self.state).closed {
            Err(BrowserError::SessionClosed)
        } else {
            Ok(())
        }
    }

    /// Run `f` against a present element on the current page
    fn with_element<T>(
        &self,
        locator: &Locator,
        f: impl FnOnce(&mut MockElement) -> T,
    ) -> Result<T> {
        self.ensure_open()?;
        let mut state = lock(&self.state);
        let element = state
            .current
            .as_mut()
            .and_then(|page| page.elements.get_mut(locator))
            .filter(|element| element.polls >= element.appear_after)
            .ok_or_else(|| not_found(locator))?;
        Ok(f(element))
    }

    fn probe(&self, locator: &Locator, f: impl FnOnce(&mut MockElement) -> bool) -> Result<bool> {
        self.ensure_open()?;
        let mut state = lock(&self.state);
        Ok(state
            .current
            .as_mut()
            .and_then(|page| page.elements.get_mut(locator))
            .map_or(false, f))
    }
}

#[async_trait::async_trait]
impl BrowserActions for MockSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.ensure_open()?;

        let delay = {
            let mut site = lock(&self.site);
            site.navigations.push(url.to_string());
            site.in_flight += 1;
            site.peak_in_flight = site.peak_in_flight.max(site.in_flight);
            site.navigation_delay
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let page = {
            let mut site = lock(&self.site);
            site.in_flight -= 1;

            let failing = site
                .navigation_failures
                .get_mut(url)
                .filter(|remaining| **remaining > 0);
            if let Some(remaining) = failing {
                *remaining -= 1;
                return Err(BrowserError::NavigationError(format!(
                    "{url}: net::ERR_CONNECTION_RESET"
                )));
            }

            site.pages
                .get(url)
                .cloned()
                .ok_or_else(|| BrowserError::NavigationError(format!("{url}: 404")))?
        };

        let mut state = lock(&self.state);
        state.current = Some(page);
        state.last_typed = None;
        Ok(())
    }

    async fn is_present(&self, locator: &Locator) -> Result<bool> {
        self.probe(locator, MockElement::check_present)
    }

    async fn is_visible(&self, locator: &Locator) -> Result<bool> {
        self.probe(locator, MockElement::check_visible)
    }

    async fn clear_and_type(&self, locator: &Locator, value: &str) -> Result<()> {
        self.with_element(locator, |_| ())?;

        {
            let mut site = lock(&self.site);
            site.typed.push(value.to_string());
            if site.typing_failures.contains(value) {
                return Err(BrowserError::ElementError {
                    locator: locator.to_string(),
                    reason: "element is not interactable".to_string(),
                });
            }
        }

        self.with_element(locator, |element| element.text = value.to_string())?;
        lock(&self.state).last_typed = Some(value.to_string());
        Ok(())
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        let action = self.with_element(locator, |element| element.on_click.clone())?;

        let next = match action {
            ClickAction::None => return Ok(()),
            ClickAction::Goto(url) => lock(&self.site)
                .pages
                .get(&url)
                .cloned()
                .ok_or_else(|| BrowserError::NavigationError(format!("{url}: 404")))?,
            ClickAction::Submit => {
                let state = lock(&self.state);
                let current = state.current.as_ref().ok_or_else(|| not_found(locator))?;
                state
                    .last_typed
                    .as_ref()
                    .and_then(|query| current.searches.get(query))
                    .cloned()
                    .or_else(|| current.no_match.as_deref().cloned())
                    .unwrap_or_default()
            }
        };

        let mut state = lock(&self.state);
        state.current = Some(next);
        state.last_typed = None;
        Ok(())
    }

    async fn text(&self, locator: &Locator) -> Result<String> {
        self.with_element(locator, |element| element.text.clone())
    }

    async fn attribute(&self, locator: &Locator, name: &str) -> Result<Option<String>> {
        self.with_element(locator, |element| element.attributes.get(name).cloned())
    }

    async fn close(&self) -> Result<()> {
        let newly_closed = {
            let mut state = lock(&self.state);
            !std::mem::replace(&mut state.closed, true)
        };
        if newly_closed {
            lock(&self.site).sessions_closed += 1;
        }
        Ok(())
    }
}
