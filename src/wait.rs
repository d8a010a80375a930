//! 明示的なポーリング待機
//!
//! 条件を `poll_interval` ごとに評価し、`timeout` を超えたら失敗とする。
//! 条件はタイムアウト到達時にもう一度評価される。

use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::config::WaitConfig;
use crate::error::{DriverError, ElementWaitError, WaitTimeout};
use crate::traits::{BrowserDriver, ElementHandle, Locator};

struct Deadline {
    start: Instant,
    wait: WaitConfig,
}

impl Deadline {
    fn start(wait: &WaitConfig) -> Self {
        Self {
            start: Instant::now(),
            wait: *wait,
        }
    }

    fn expired(&self) -> bool {
        self.start.elapsed() >= self.wait.timeout
    }

    async fn sleep(&self) {
        let remaining = self.wait.timeout.saturating_sub(self.start.elapsed());
        sleep(self.wait.poll_interval.min(remaining)).await;
    }
}

/// `predicate` が true を返すまで待機
pub async fn poll_until<F>(wait: &WaitConfig, mut predicate: F) -> Result<(), WaitTimeout>
where
    F: FnMut() -> bool,
{
    let deadline = Deadline::start(wait);
    loop {
        if predicate() {
            return Ok(());
        }
        if deadline.expired() {
            return Err(WaitTimeout(wait.timeout));
        }
        deadline.sleep().await;
    }
}

/// 要素が現れるまで待機（`interactable` なら操作可能になるまで）
///
/// `NoSuchElement` は未出現として扱い、それ以外のドライバエラーは即座に返す。
pub async fn wait_for_element<D>(
    driver: &mut D,
    locator: &Locator,
    wait: &WaitConfig,
    interactable: bool,
) -> Result<Box<dyn ElementHandle>, ElementWaitError>
where
    D: BrowserDriver + ?Sized,
{
    let deadline = Deadline::start(wait);
    let mut found = false;
    loop {
        match driver.find_element(locator).await {
            Ok(element) => {
                found = true;
                if !interactable || element.is_interactable().await? {
                    return Ok(element);
                }
                debug!("要素 {} はまだ操作できません", locator);
            }
            Err(DriverError::NoSuchElement(_)) => {
                debug!("要素 {} はまだありません", locator);
            }
            Err(e) => return Err(e.into()),
        }

        if deadline.expired() {
            return Err(if found {
                ElementWaitError::NotInteractable(locator.to_string(), wait.timeout)
            } else {
                ElementWaitError::NotFound(locator.to_string(), wait.timeout)
            });
        }
        deadline.sleep().await;
    }
}

/// iframe が現れるまで待機して切り替える
pub async fn wait_for_frame<D>(
    driver: &mut D,
    locator: &Locator,
    wait: &WaitConfig,
) -> Result<(), ElementWaitError>
where
    D: BrowserDriver + ?Sized,
{
    let deadline = Deadline::start(wait);
    loop {
        match driver.switch_to_frame(locator).await {
            Ok(()) => return Ok(()),
            Err(DriverError::NoSuchElement(_)) => {
                debug!("iframe {} はまだありません", locator);
            }
            Err(e) => return Err(e.into()),
        }

        if deadline.expired() {
            return Err(ElementWaitError::NotFound(locator.to_string(), wait.timeout));
        }
        deadline.sleep().await;
    }
}
