//! テスト用のスタブドライバ

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::DriverError;
use crate::traits::{BrowserDriver, ElementHandle, Locator};

type ClickAction = Box<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct StubState {
    hidden: HashSet<Locator>,
    appear_after: HashMap<Locator, usize>,
    not_interactable: HashSet<Locator>,
    broken: HashSet<Locator>,
    top_level_only: HashSet<Locator>,
    in_frame_only: HashSet<Locator>,
    reject_navigation: bool,
    on_click: HashMap<Locator, ClickAction>,

    find_attempts: HashMap<Locator, usize>,
    navigated: Vec<String>,
    frame: Option<Locator>,
    entered_frames: Vec<Locator>,
    typed: HashMap<Locator, String>,
    clicks: HashMap<Locator, usize>,
    close_count: usize,
    quit_count: usize,
}

/// 呼び出しを記録するドライバ。クローンは状態を共有する。
#[derive(Clone, Default)]
pub struct StubDriver {
    state: Arc<Mutex<StubState>>,
}

impl StubDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut StubState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn hide(&self, locator: &Locator) {
        self.with(|s| s.hidden.insert(locator.clone()));
    }

    /// `attempts` 回失敗した後に見つかる
    pub fn appear_after(&self, locator: &Locator, attempts: usize) {
        self.with(|s| s.appear_after.insert(locator.clone(), attempts));
    }

    pub fn never_interactable(&self, locator: &Locator) {
        self.with(|s| s.not_interactable.insert(locator.clone()));
    }

    /// 検索時に `DriverError::Browser` を返す
    pub fn break_element(&self, locator: &Locator) {
        self.with(|s| s.broken.insert(locator.clone()));
    }

    /// iframe に入っている間は見つからない
    pub fn top_level_only(&self, locator: &Locator) {
        self.with(|s| s.top_level_only.insert(locator.clone()));
    }

    /// iframe に入っている間だけ見つかる
    pub fn in_frame_only(&self, locator: &Locator) {
        self.with(|s| s.in_frame_only.insert(locator.clone()));
    }

    pub fn reject_navigation(&self) {
        self.with(|s| s.reject_navigation = true);
    }

    pub fn on_click(&self, locator: &Locator, action: impl Fn() + Send + Sync + 'static) {
        self.with(|s| s.on_click.insert(locator.clone(), Box::new(action)));
    }

    pub fn find_attempts(&self, locator: &Locator) -> usize {
        self.with(|s| s.find_attempts.get(locator).copied().unwrap_or(0))
    }

    pub fn navigated(&self) -> Vec<String> {
        self.with(|s| s.navigated.clone())
    }

    pub fn frame(&self) -> Option<Locator> {
        self.with(|s| s.frame.clone())
    }

    pub fn entered_frames(&self) -> Vec<Locator> {
        self.with(|s| s.entered_frames.clone())
    }

    pub fn typed(&self, locator: &Locator) -> Option<String> {
        self.with(|s| s.typed.get(locator).cloned())
    }

    pub fn clicks(&self, locator: &Locator) -> usize {
        self.with(|s| s.clicks.get(locator).copied().unwrap_or(0))
    }

    pub fn close_count(&self) -> usize {
        self.with(|s| s.close_count)
    }

    pub fn quit_count(&self) -> usize {
        self.with(|s| s.quit_count)
    }

    fn lookup(&self, locator: &Locator) -> Result<(), DriverError> {
        self.with(|s| {
            let attempts = s.find_attempts.entry(locator.clone()).or_insert(0);
            *attempts += 1;
            if s.broken.contains(locator) {
                return Err(DriverError::Browser(format!("target crashed: {}", locator)));
            }
            let pending = s
                .appear_after
                .get(locator)
                .is_some_and(|after| *attempts <= *after);
            let wrong_context = if s.frame.is_some() {
                s.top_level_only.contains(locator)
            } else {
                s.in_frame_only.contains(locator)
            };
            if s.hidden.contains(locator) || pending || wrong_context {
                return Err(DriverError::NoSuchElement(locator.to_string()));
            }
            Ok(())
        })
    }
}

struct StubElement {
    locator: Locator,
    driver: StubDriver,
}

#[async_trait]
impl ElementHandle for StubElement {
    async fn send_keys(&self, text: &str) -> Result<(), DriverError> {
        self.driver.with(|s| {
            s.typed
                .entry(self.locator.clone())
                .or_default()
                .push_str(text)
        });
        Ok(())
    }

    async fn click(&self) -> Result<(), DriverError> {
        self.driver.with(|s| {
            *s.clicks.entry(self.locator.clone()).or_insert(0) += 1;
            if let Some(action) = s.on_click.get(&self.locator) {
                action();
            }
        });
        Ok(())
    }

    async fn is_interactable(&self) -> Result<bool, DriverError> {
        Ok(self
            .driver
            .with(|s| !s.not_interactable.contains(&self.locator)))
    }
}

#[async_trait]
impl BrowserDriver for StubDriver {
    async fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        self.with(|s| {
            if s.reject_navigation {
                return Err(DriverError::InvalidArgument(url.to_string()));
            }
            s.navigated.push(url.to_string());
            Ok(())
        })
    }

    async fn find_element(
        &mut self,
        locator: &Locator,
    ) -> Result<Box<dyn ElementHandle>, DriverError> {
        self.lookup(locator)?;
        Ok(Box::new(StubElement {
            locator: locator.clone(),
            driver: self.clone(),
        }))
    }

    async fn switch_to_frame(&mut self, locator: &Locator) -> Result<(), DriverError> {
        self.lookup(locator)?;
        self.with(|s| {
            s.frame = Some(locator.clone());
            s.entered_frames.push(locator.clone());
        });
        Ok(())
    }

    async fn switch_to_default_content(&mut self) -> Result<(), DriverError> {
        self.with(|s| s.frame = None);
        Ok(())
    }

    async fn close_window(&mut self) -> Result<(), DriverError> {
        self.with(|s| s.close_count += 1);
        Ok(())
    }

    async fn quit(&mut self) -> Result<(), DriverError> {
        self.with(|s| s.quit_count += 1);
        Ok(())
    }
}
