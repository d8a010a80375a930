mod cli;

use std::io;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tower::Service;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use garmin_report::{present, ReportConfig, ReportService};

#[tokio::main]
async fn main() -> ExitCode {
    // ログは標準エラーへ（標準出力はレポート用）
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let request = match cli.request() {
        Ok(request) => request,
        Err(e) => Cli::command().error(ErrorKind::ArgumentConflict, e).exit(),
    };

    let config = ReportConfig::new(&cli.username, &cli.password).with_headless(cli.headless);
    let mut service = ReportService::new(config);

    let result = match service.call(request).await {
        Ok(result) => result,
        Err(e) => {
            debug!("エラー詳細: {}", e.detail());
            println!("{}", e);
            return ExitCode::SUCCESS;
        }
    };

    if let Err(e) = present(&result.download_dir, &result.file_name, &mut io::stdout()) {
        println!("{}", e);
    }

    ExitCode::SUCCESS
}
