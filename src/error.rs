use thiserror::Error;

/// ブラウザ操作層のエラー
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("no such element: {0}")]
    NoSuchElement(String),

    #[error("element not interactable: {0}")]
    NotInteractable(String),

    #[error("browser error: {0}")]
    Browser(String),
}

/// ポーリングのタイムアウト
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("condition not met within {0:?}")]
pub struct WaitTimeout(pub std::time::Duration);

/// 要素待機のエラー
#[derive(Error, Debug)]
pub enum ElementWaitError {
    #[error("{0} not found within {1:?}")]
    NotFound(String, std::time::Duration),

    #[error("{0} not interactable within {1:?}")]
    NotInteractable(String, std::time::Duration),

    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// レポートセッションのエラー
///
/// `Display` はそのままユーザーに表示するメッセージ。
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("The link provided seems invalid, make sure you provide the full link.")]
    InvalidInput(String),

    #[error("Element not found.")]
    ElementNotFound(String),

    #[error("Timeout exceeded.")]
    Timeout(String),

    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),

    #[error("Error: {0}")]
    Io(#[from] std::io::Error),
}

impl SessionError {
    /// 詳細（ログ用）
    pub fn detail(&self) -> String {
        match self {
            SessionError::InvalidInput(d)
            | SessionError::ElementNotFound(d)
            | SessionError::Timeout(d)
            | SessionError::Unexpected(d) => d.clone(),
            SessionError::Io(e) => e.to_string(),
        }
    }
}

/// レポート表示時のエラー
#[derive(Error, Debug)]
pub enum PresentError {
    #[error("CSV file not found.")]
    NotFound,

    #[error("Error: Permission denied to remove downloaded CSV.")]
    PermissionDenied,

    #[error("Error: {0}")]
    Io(std::io::Error),
}

impl From<std::io::Error> for PresentError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => PresentError::NotFound,
            std::io::ErrorKind::PermissionDenied => PresentError::PermissionDenied,
            _ => PresentError::Io(e),
        }
    }
}

/// レポート指定の検証エラー
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RequestError {
    #[error("Either report type and period must be provided, or custom link.")]
    InvalidCombination,
}
