use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::{
    SetDownloadBehaviorBehavior, SetDownloadBehaviorParams,
};
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchKeyEventParams, DispatchKeyEventType, InsertTextParams,
};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::script;
use crate::config::ReportConfig;
use crate::error::DriverError;
use crate::traits::{BrowserDriver, ElementHandle, Locator};

const WINDOW_WIDTH: u32 = 1280;
const WINDOW_HEIGHT: u32 = 800;
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// ページ遷移中に `Runtime.evaluate` が返すエラー
const CONTEXT_LOST_MESSAGES: [&str; 4] = [
    "cannot find context with specified id",
    "execution context was destroyed",
    "inspected target navigated or closed",
    "uniquecontextid not found",
];

/// Chrome DevTools Protocol 経由のドライバ
pub struct ChromeDriver {
    browser: Option<Browser>,
    page: Option<Page>,
    handler: Option<JoinHandle<()>>,
    /// 切り替え中の iframe 要素を指すJavaScript式
    frame: Option<String>,
    user_data_dir: PathBuf,
}

impl ChromeDriver {
    /// ブラウザを起動し、ダウンロード先を `config.download_dir` に設定する
    pub async fn launch(config: &ReportConfig) -> Result<Self, DriverError> {
        info!("ブラウザを起動中...");

        let download_dir = config
            .download_dir
            .canonicalize()
            .unwrap_or_else(|_| config.download_dir.clone());

        // プロファイルのロック競合を避けるため起動ごとに別ディレクトリ
        let unique_id = format!(
            "{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        );
        let user_data_dir = std::env::temp_dir().join(format!("garmin-report-{}", unique_id));

        let mut builder = BrowserConfig::builder()
            .window_size(WINDOW_WIDTH, WINDOW_HEIGHT)
            .user_data_dir(&user_data_dir)
            .request_timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            // サインインフォームの iframe をトップドキュメントから操作するため
            .arg("--disable-web-security")
            .arg("--disable-site-isolation-trials")
            .arg("--disable-features=IsolateOrigins,site-per-process");

        if let Some(path) = &config.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        if !config.headless {
            builder = builder.with_head();
        }

        let browser_config = builder
            .build()
            .map_err(|e| DriverError::Browser(format!("browser config: {}", e)))?;

        let (mut browser, mut handler) = match Browser::launch(browser_config).await {
            Ok(launched) => launched,
            Err(e) => {
                remove_profile(&user_data_dir);
                return Err(DriverError::Browser(e.to_string()));
            }
        };

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                debug!("ブラウザイベント: {:?}", event);
            }
        });

        let page = match open_download_page(&browser, &download_dir).await {
            Ok(page) => page,
            Err(e) => {
                // 起動済みのブラウザを終了してからプロファイルを削除
                if let Err(close_err) = browser.close().await {
                    debug!("ブラウザ終了失敗: {}", close_err);
                }
                if let Err(wait_err) = browser.wait().await {
                    debug!("ブラウザ終了待機失敗: {}", wait_err);
                }
                handler.abort();
                remove_profile(&user_data_dir);
                return Err(e);
            }
        };

        info!("ブラウザ起動完了 (ダウンロード先: {:?})", download_dir);
        Ok(Self {
            browser: Some(browser),
            page: Some(page),
            handler: Some(handler),
            frame: None,
            user_data_dir,
        })
    }

    /// 現在のドキュメントを指すJavaScript式
    fn document(&self) -> String {
        match &self.frame {
            Some(frame) => script::frame_document_expr(frame),
            None => script::TOP_DOCUMENT.to_string(),
        }
    }

    /// 要素探索用の評価。ページ遷移中のエラーは「未出現」とみなす
    async fn evaluate_condition(&self, expression: String) -> Result<bool, DriverError> {
        match self.evaluate_bool(expression).await {
            Err(DriverError::Browser(msg)) if is_context_lost(&msg) => {
                debug!("実行コンテキストなし（ページ遷移中）: {}", msg);
                Ok(false)
            }
            other => other,
        }
    }

    /// 切り替え先の iframe が消えていればトップレベルに戻す
    async fn drop_stale_frame(&mut self) -> Result<(), DriverError> {
        let Some(frame) = &self.frame else {
            return Ok(());
        };
        if !self.evaluate_condition(script::exists(frame)).await? {
            info!("iframe が無くなったためトップレベルのドキュメントに戻ります");
            self.frame = None;
        }
        Ok(())
    }

    fn get_page(&self) -> Result<&Page, DriverError> {
        self.page
            .as_ref()
            .ok_or_else(|| DriverError::Browser("browser window is closed".into()))
    }

    async fn evaluate_bool(&self, expression: String) -> Result<bool, DriverError> {
        evaluate_bool(self.get_page()?, expression).await
    }
}

async fn evaluate_bool(page: &Page, expression: String) -> Result<bool, DriverError> {
    let result = page
        .evaluate(expression.as_str())
        .await
        .map_err(|e| DriverError::Browser(e.to_string()))?;
    Ok(result.into_value::<bool>().unwrap_or(false))
}

async fn open_download_page(browser: &Browser, download_dir: &Path) -> Result<Page, DriverError> {
    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| DriverError::Browser(e.to_string()))?;

    // ダウンロード先を設定
    let download_params = SetDownloadBehaviorParams::builder()
        .behavior(SetDownloadBehaviorBehavior::Allow)
        .download_path(download_dir.to_string_lossy().to_string())
        .build()
        .map_err(|e| DriverError::Browser(format!("download behavior: {}", e)))?;
    page.execute(download_params)
        .await
        .map_err(|e| DriverError::Browser(format!("download behavior: {}", e)))?;

    Ok(page)
}

fn is_context_lost(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    CONTEXT_LOST_MESSAGES.iter().any(|m| message.contains(m))
}

fn remove_profile(dir: &Path) {
    if !dir.exists() {
        return;
    }
    if let Err(e) = std::fs::remove_dir_all(dir) {
        debug!("プロファイル削除失敗 {:?}: {}", dir, e);
    }
}

struct ChromeElement {
    page: Page,
    expr: String,
    description: String,
}

impl ChromeElement {
    async fn press_enter(&self) -> Result<(), DriverError> {
        for (kind, is_down) in [
            (DispatchKeyEventType::KeyDown, true),
            (DispatchKeyEventType::KeyUp, false),
        ] {
            let mut builder = DispatchKeyEventParams::builder()
                .r#type(kind)
                .key("Enter")
                .code("Enter")
                .windows_virtual_key_code(13)
                .native_virtual_key_code(13);
            if is_down {
                builder = builder.text("\r");
            }
            let params = builder.build().map_err(DriverError::Browser)?;
            self.page
                .execute(params)
                .await
                .map_err(|e| DriverError::Browser(e.to_string()))?;
        }
        Ok(())
    }

    async fn insert_text(&self, text: &str) -> Result<(), DriverError> {
        self.page
            .execute(InsertTextParams::new(text))
            .await
            .map_err(|e| DriverError::Browser(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ElementHandle for ChromeElement {
    async fn send_keys(&self, text: &str) -> Result<(), DriverError> {
        if !evaluate_bool(&self.page, script::focus(&self.expr)).await? {
            return Err(DriverError::NotInteractable(self.description.clone()));
        }

        let mut lines = text.split('\n').peekable();
        while let Some(line) = lines.next() {
            if !line.is_empty() {
                self.insert_text(line).await?;
            }
            if lines.peek().is_some() {
                self.press_enter().await?;
            }
        }
        Ok(())
    }

    async fn click(&self) -> Result<(), DriverError> {
        if evaluate_bool(&self.page, script::click(&self.expr)).await? {
            Ok(())
        } else {
            Err(DriverError::NoSuchElement(self.description.clone()))
        }
    }

    async fn is_interactable(&self) -> Result<bool, DriverError> {
        match evaluate_bool(&self.page, script::interactable(&self.expr)).await {
            Err(DriverError::Browser(msg)) if is_context_lost(&msg) => Ok(false),
            other => other,
        }
    }
}

#[async_trait]
impl BrowserDriver for ChromeDriver {
    async fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        url::Url::parse(url)
            .map_err(|e| DriverError::InvalidArgument(format!("{}: {}", url, e)))?;

        info!("ページに移動: {}", url);
        let page = self.get_page()?;
        page.goto(url)
            .await
            .map_err(|e| DriverError::Browser(format!("navigation to {}: {}", url, e)))?;
        self.frame = None;
        Ok(())
    }

    async fn find_element(
        &mut self,
        locator: &Locator,
    ) -> Result<Box<dyn ElementHandle>, DriverError> {
        self.drop_stale_frame().await?;
        let expr = script::element_expr(&self.document(), locator);
        if !self.evaluate_condition(script::exists(&expr)).await? {
            return Err(DriverError::NoSuchElement(locator.to_string()));
        }
        Ok(Box::new(ChromeElement {
            page: self.get_page()?.clone(),
            expr,
            description: locator.to_string(),
        }))
    }

    async fn switch_to_frame(&mut self, locator: &Locator) -> Result<(), DriverError> {
        self.drop_stale_frame().await?;
        let frame = script::element_expr(&self.document(), locator);
        if !self.evaluate_condition(script::frame_ready(&frame)).await? {
            return Err(DriverError::NoSuchElement(locator.to_string()));
        }
        debug!("iframe に切り替え: {}", locator);
        self.frame = Some(frame);
        Ok(())
    }

    async fn switch_to_default_content(&mut self) -> Result<(), DriverError> {
        if self.frame.take().is_some() {
            debug!("トップレベルのドキュメントに切り替え");
        }
        Ok(())
    }

    async fn close_window(&mut self) -> Result<(), DriverError> {
        if let Some(page) = self.page.take() {
            page.close()
                .await
                .map_err(|e| DriverError::Browser(e.to_string()))?;
        }
        Ok(())
    }

    async fn quit(&mut self) -> Result<(), DriverError> {
        info!("ブラウザを終了中...");
        self.page = None;

        let result = match self.browser.take() {
            Some(mut browser) => {
                let closed = browser
                    .close()
                    .await
                    .map(|_| ())
                    .map_err(|e| DriverError::Browser(e.to_string()));
                if let Err(e) = browser.wait().await {
                    debug!("ブラウザ終了待機失敗: {}", e);
                }
                closed
            }
            None => Ok(()),
        };

        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
        remove_profile(&self.user_data_dir);

        info!("ブラウザ終了完了");
        result
    }
}

impl Drop for ChromeDriver {
    fn drop(&mut self) {
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
    }
}
