//! Garmin Connect レポートダウンロードライブラリ
//!
//! - ブラウザでログインしてレポートをCSVでエクスポート
//! - ダウンロードディレクトリを監視して新しいCSVを特定
//! - 内容を出力してファイルを削除
//!
//! # 使用例
//!
//! ```rust,ignore
//! use garmin_report::{ReportConfig, ReportPeriod, ReportRequest, ReportService, ReportType};
//! use tower::Service;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ReportConfig::new("user@example.com", "password").with_headless(true);
//!     let mut service = ReportService::new(config);
//!
//!     let request = ReportRequest::Preset {
//!         report_type: ReportType::Steps,
//!         period: ReportPeriod::LastSevenDays,
//!     };
//!     let result = service.call(request).await.unwrap();
//!     println!("CSV downloaded: {:?}", result.path());
//! }
//! ```

pub mod chrome;
pub mod config;
pub mod downloads;
pub mod error;
pub mod presenter;
pub mod report;
pub mod service;
pub mod session;
pub mod traits;
pub mod wait;

#[cfg(test)]
mod test_support;

// 主要な型をリエクスポート
pub use chrome::ChromeDriver;
pub use config::{ReportConfig, WaitConfig};
pub use downloads::{DirectorySnapshot, DownloadWatcher};
pub use error::{DriverError, PresentError, RequestError, SessionError};
pub use presenter::present;
pub use report::{ReportPeriod, ReportRequest, ReportType};
pub use service::{ReportResult, ReportService};
pub use session::{ReportSession, SessionStage};
pub use traits::{BrowserDriver, ElementHandle, Locator};
