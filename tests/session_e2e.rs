use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use garmin_report::{
    present, BrowserDriver, DirectorySnapshot, DriverError, ElementHandle, Locator,
    ReportConfig, ReportPeriod, ReportRequest, ReportSession, ReportType, SessionError,
    WaitConfig,
};

/// Export ボタンのクリックでファイルを作成するドライバ
#[derive(Clone, Default)]
struct ExportDriver {
    creates: Option<(PathBuf, String)>,
    navigated: Arc<Mutex<Vec<String>>>,
    quits: Arc<AtomicUsize>,
}

struct Element {
    is_export: bool,
    creates: Option<(PathBuf, String)>,
}

#[async_trait]
impl ElementHandle for Element {
    async fn send_keys(&self, _text: &str) -> Result<(), DriverError> {
        Ok(())
    }

    async fn click(&self) -> Result<(), DriverError> {
        if let (true, Some((path, content))) = (self.is_export, &self.creates) {
            fs::write(path, content).unwrap();
        }
        Ok(())
    }

    async fn is_interactable(&self) -> Result<bool, DriverError> {
        Ok(true)
    }
}

#[async_trait]
impl BrowserDriver for ExportDriver {
    async fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        self.navigated.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn find_element(
        &mut self,
        locator: &Locator,
    ) -> Result<Box<dyn ElementHandle>, DriverError> {
        let is_export = matches!(locator, Locator::XPath(xp) if xp.contains("Export"));
        Ok(Box::new(Element {
            is_export,
            creates: self.creates.clone(),
        }))
    }

    async fn switch_to_frame(&mut self, _locator: &Locator) -> Result<(), DriverError> {
        Ok(())
    }

    async fn switch_to_default_content(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    async fn close_window(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    async fn quit(&mut self) -> Result<(), DriverError> {
        self.quits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn config_for(dir: &std::path::Path) -> ReportConfig {
    ReportConfig::new("runner", "secret")
        .with_download_dir(dir)
        .with_wait(WaitConfig::new(
            Duration::from_millis(300),
            Duration::from_millis(10),
        ))
        .with_grace_period(Duration::from_millis(5))
}

#[tokio::test]
async fn test_export_download_present_and_cleanup() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("report_2024.csv"), "old").unwrap();
    let config = config_for(dir.path());

    let request = ReportRequest::Preset {
        report_type: ReportType::Steps,
        period: ReportPeriod::LastSevenDays,
    };
    let driver = ExportDriver {
        creates: Some((dir.path().join("report_2025.csv"), "a,b\n1,2\n".into())),
        ..Default::default()
    };

    let baseline = DirectorySnapshot::capture(dir.path(), &config.suffix).unwrap();
    let name = ReportSession::new(&config)
        .run(driver.clone(), &request.url(), baseline)
        .await
        .unwrap();
    assert_eq!(name, "report_2025.csv");
    assert_eq!(
        *driver.navigated.lock().unwrap(),
        vec!["https://connect.garmin.com/modern/report/29/wellness/last_seven_days".to_string()]
    );
    assert_eq!(driver.quits.load(Ordering::SeqCst), 1);

    let mut out = Vec::new();
    present(dir.path(), &name, &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "a,b\n1,2\n");

    let remaining = DirectorySnapshot::capture(dir.path(), ".csv").unwrap();
    let names: Vec<_> = remaining.names().collect();
    assert_eq!(names, ["report_2024.csv"]);
}

#[tokio::test]
async fn test_no_download_times_out_and_releases_browser() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("report_2024.csv"), "old").unwrap();
    let config = config_for(dir.path());
    let driver = ExportDriver::default();

    let baseline = DirectorySnapshot::capture(dir.path(), &config.suffix).unwrap();
    let err = ReportSession::new(&config)
        .run(
            driver.clone(),
            "https://connect.garmin.com/modern/report/41/wellness/last_year",
            baseline,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Timeout(_)));
    assert_eq!(err.to_string(), "Timeout exceeded.");
    assert_eq!(driver.quits.load(Ordering::SeqCst), 1);
}
