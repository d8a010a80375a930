use std::path::PathBuf;
use std::time::Duration;

/// ダウンロード対象ファイルの拡張子
pub const REPORT_SUFFIX: &str = ".csv";

const WAIT_TIMEOUT_SECS: u64 = 20;
const POLL_INTERVAL_MS: u64 = 500;
const GRACE_PERIOD_SECS: u64 = 1;

/// ポーリング待機設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(WAIT_TIMEOUT_SECS),
            poll_interval: Duration::from_millis(POLL_INTERVAL_MS),
        }
    }
}

impl WaitConfig {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub username: String,
    pub password: String,
    pub download_dir: PathBuf,
    pub suffix: String,
    pub headless: bool,
    pub wait: WaitConfig,
    /// ウィンドウを閉じてからブラウザを終了するまでの猶予
    pub grace_period: Duration,
    pub chrome_executable: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            download_dir: default_download_dir(),
            suffix: REPORT_SUFFIX.to_string(),
            headless: false,
            wait: WaitConfig::default(),
            grace_period: Duration::from_secs(GRACE_PERIOD_SECS),
            chrome_executable: chrome_executable_from_env(),
        }
    }
}

impl ReportConfig {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_wait(mut self, wait: WaitConfig) -> Self {
        self.wait = wait;
        self
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    pub fn with_chrome_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_executable = Some(path.into());
        self
    }
}

/// `~/Downloads`（ホームが取得できない場合はカレント配下）
pub fn default_download_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join("Downloads"))
        .unwrap_or_else(|| PathBuf::from("./Downloads"))
}

fn chrome_executable_from_env() -> Option<PathBuf> {
    std::env::var("CHROME_PATH")
        .or_else(|_| std::env::var("CHROMIUM_PATH"))
        .ok()
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
}
