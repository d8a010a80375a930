use clap::Parser;

use garmin_report::{ReportPeriod, ReportRequest, ReportType, RequestError};

/// Download Garmin Connect reports.
///
/// Either `--type` and `--period`, or `--custom`, must be given.
#[derive(Parser, Debug)]
#[command(name = "garmin-report", version, about, long_about = None)]
pub struct Cli {
    /// Username
    #[arg(short, long)]
    pub username: String,

    /// Password
    #[arg(short, long)]
    pub password: String,

    /// Type of the report
    #[arg(short = 't', long = "type", value_enum)]
    pub report_type: Option<ReportType>,

    /// Time period of the report
    #[arg(short = 'd', long, value_enum)]
    pub period: Option<ReportPeriod>,

    /// Custom link
    #[arg(short, long)]
    pub custom: Option<String>,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,
}

impl Cli {
    pub fn request(&self) -> Result<ReportRequest, RequestError> {
        ReportRequest::from_parts(self.report_type, self.period, self.custom.clone())
    }
}
