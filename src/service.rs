use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use tower::Service;
use tracing::info;

use crate::chrome::ChromeDriver;
use crate::config::ReportConfig;
use crate::downloads::DirectorySnapshot;
use crate::error::SessionError;
use crate::report::ReportRequest;
use crate::session::ReportSession;

/// ダウンロード結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportResult {
    pub file_name: String,
    pub download_dir: PathBuf,
}

impl ReportResult {
    pub fn path(&self) -> PathBuf {
        self.download_dir.join(&self.file_name)
    }
}

/// tower::Serviceを実装したレポートダウンロードサービス
///
/// ベースラインのスナップショットはブラウザ起動前に取得する。
#[derive(Debug, Clone)]
pub struct ReportService {
    config: ReportConfig,
}

impl ReportService {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }
}

impl Service<ReportRequest> for ReportService {
    type Response = ReportResult;
    type Error = SessionError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ReportRequest) -> Self::Future {
        let config = self.config.clone();
        info!("レポート要求: user={}, request={:?}", config.username, req);

        Box::pin(async move {
            let baseline = DirectorySnapshot::capture(&config.download_dir, &config.suffix)?;
            info!(
                "ベースライン: {:?} 内の {} ファイル {} 件",
                config.download_dir,
                config.suffix,
                baseline.len()
            );

            let driver = ChromeDriver::launch(&config)
                .await
                .map_err(|e| SessionError::Unexpected(e.to_string()))?;

            let file_name = ReportSession::new(&config)
                .run(driver, &req.url(), baseline)
                .await?;

            Ok(ReportResult {
                file_name,
                download_dir: config.download_dir,
            })
        })
    }
}
