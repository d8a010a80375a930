//! レポートセッション
//!
//! ログイン → エクスポート → ダウンロード待機 → 最新ファイル解決を一直線に実行する。
//! どの経路で終了してもブラウザは一度だけ解放される。

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::{ReportConfig, WaitConfig};
use crate::downloads::{newest_matching, DirectorySnapshot, DownloadWatcher};
use crate::error::{DriverError, ElementWaitError, SessionError};
use crate::traits::{BrowserDriver, Locator};
use crate::wait::{poll_until, wait_for_element, wait_for_frame};

const AUTH_FRAME_XPATH: &str = "//iframe[@id='gauth-widget-frame-gauth-widget']";
const USERNAME_FIELD_ID: &str = "username";
const PASSWORD_FIELD_ID: &str = "password";
const EXPORT_BUTTON_XPATH: &str = "//button[contains(text(), 'Export')]";

/// セッションの進行状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStage {
    Init,
    BrowserOpened,
    AuthenticationFormLocated,
    CredentialsSubmitted,
    ExportTriggered,
    AwaitingDownload,
    Resolved,
    Failed,
}

impl fmt::Display for SessionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStage::Init => "init",
            SessionStage::BrowserOpened => "browser-opened",
            SessionStage::AuthenticationFormLocated => "authentication-form-located",
            SessionStage::CredentialsSubmitted => "credentials-submitted",
            SessionStage::ExportTriggered => "export-triggered",
            SessionStage::AwaitingDownload => "awaiting-download",
            SessionStage::Resolved => "resolved",
            SessionStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

pub struct ReportSession {
    username: String,
    password: String,
    download_dir: PathBuf,
    suffix: String,
    wait: WaitConfig,
    grace_period: Duration,
    stage: SessionStage,
}

impl ReportSession {
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            username: config.username.clone(),
            password: config.password.clone(),
            download_dir: config.download_dir.clone(),
            suffix: config.suffix.clone(),
            wait: config.wait,
            grace_period: config.grace_period,
            stage: SessionStage::Init,
        }
    }

    pub fn stage(&self) -> SessionStage {
        self.stage
    }

    fn advance(&mut self, stage: SessionStage) {
        info!("セッション状態: {} -> {}", self.stage, stage);
        self.stage = stage;
    }

    /// セッションを実行してダウンロードされたファイル名を返す
    ///
    /// `baseline` はブラウザ操作を始める前に取得したものでなければならない。
    /// `driver` は成功・失敗に関わらずこの関数内で終了される。
    pub async fn run<D>(
        &mut self,
        mut driver: D,
        url: &str,
        baseline: DirectorySnapshot,
    ) -> Result<String, SessionError>
    where
        D: BrowserDriver,
    {
        let result = self.drive(&mut driver, url, baseline).await;

        match &result {
            Ok(name) => {
                self.advance(SessionStage::Resolved);
                info!("レポートダウンロード完了: {}", name);
            }
            Err(e) => {
                self.advance(SessionStage::Failed);
                warn!("セッション失敗: {} ({})", e, e.detail());
            }
        }

        self.teardown(&mut driver).await;
        result
    }

    async fn drive<D>(
        &mut self,
        driver: &mut D,
        url: &str,
        baseline: DirectorySnapshot,
    ) -> Result<String, SessionError>
    where
        D: BrowserDriver,
    {
        driver.navigate(url).await.map_err(|e| match e {
            DriverError::InvalidArgument(msg) => SessionError::InvalidInput(msg),
            other => unexpected(other),
        })?;
        self.advance(SessionStage::BrowserOpened);

        // ログインフォーム（iframe内）
        wait_for_frame(driver, &Locator::xpath(AUTH_FRAME_XPATH), &self.wait)
            .await
            .map_err(missing_element)?;
        let username_field = wait_for_element(
            driver,
            &Locator::id(USERNAME_FIELD_ID),
            &self.wait,
            true,
        )
        .await
        .map_err(missing_element)?;
        let password_field = wait_for_element(
            driver,
            &Locator::id(PASSWORD_FIELD_ID),
            &self.wait,
            true,
        )
        .await
        .map_err(missing_element)?;
        self.advance(SessionStage::AuthenticationFormLocated);

        info!("ログイン処理開始: user={}", self.username);
        username_field
            .send_keys(&self.username)
            .await
            .map_err(unexpected)?;
        password_field
            .send_keys(&format!("{}\n", self.password))
            .await
            .map_err(unexpected)?;
        self.advance(SessionStage::CredentialsSubmitted);

        // ログイン後はレポートページのトップレベルで操作する
        driver
            .switch_to_default_content()
            .await
            .map_err(unexpected)?;

        let export_button = wait_for_element(
            driver,
            &Locator::xpath(EXPORT_BUTTON_XPATH),
            &self.wait,
            true,
        )
        .await
        .map_err(|e| match e {
            ElementWaitError::Driver(d) => unexpected(d),
            other => SessionError::Timeout(other.to_string()),
        })?;
        export_button.click().await.map_err(unexpected)?;
        self.advance(SessionStage::ExportTriggered);

        let watcher = DownloadWatcher::new(&self.download_dir, &self.suffix, baseline);
        self.advance(SessionStage::AwaitingDownload);
        poll_until(&self.wait, || match watcher.has_new_file() {
            Ok(grown) => grown,
            Err(e) => {
                debug!("ダウンロードディレクトリの読み取り失敗: {}", e);
                false
            }
        })
        .await
        .map_err(|e| SessionError::Timeout(format!("download: {}", e)))?;

        resolve_download(&self.download_dir, &self.suffix)
    }

    /// ウィンドウを閉じ、猶予の後にブラウザを終了
    async fn teardown<D>(&self, driver: &mut D)
    where
        D: BrowserDriver,
    {
        if let Err(e) = driver.close_window().await {
            warn!("ウィンドウを閉じられませんでした: {}", e);
        }
        sleep(self.grace_period).await;
        if let Err(e) = driver.quit().await {
            warn!("ブラウザを終了できませんでした: {}", e);
        }
        debug!("ブラウザ解放完了");
    }
}

/// 最新の対象ファイル名（見つからなければ Unexpected）
fn resolve_download(dir: &Path, suffix: &str) -> Result<String, SessionError> {
    newest_matching(dir, suffix)?.ok_or_else(|| {
        SessionError::Unexpected(format!("no {} file in {}", suffix, dir.display()))
    })
}

fn unexpected(e: DriverError) -> SessionError {
    SessionError::Unexpected(e.to_string())
}

fn missing_element(e: ElementWaitError) -> SessionError {
    match e {
        ElementWaitError::Driver(d) => unexpected(d),
        other => SessionError::ElementNotFound(other.to_string()),
    }
}
