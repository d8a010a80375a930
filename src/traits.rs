use std::fmt;

use async_trait::async_trait;

use crate::error::DriverError;

/// 要素の指定方法
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Id(String),
    Css(String),
    XPath(String),
}

impl Locator {
    pub fn id(id: impl Into<String>) -> Self {
        Locator::Id(id.into())
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Locator::XPath(expr.into())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Id(id) => write!(f, "id={}", id),
            Locator::Css(sel) => write!(f, "css={}", sel),
            Locator::XPath(xp) => write!(f, "xpath={}", xp),
        }
    }
}

/// ページ上の要素
#[async_trait]
pub trait ElementHandle: Send + Sync {
    /// テキスト入力（`'\n'` は Enter キー）
    async fn send_keys(&self, text: &str) -> Result<(), DriverError>;

    async fn click(&self) -> Result<(), DriverError>;

    /// 表示されていて操作可能か
    async fn is_interactable(&self) -> Result<bool, DriverError>;
}

/// ブラウザ自動化ドライバ
///
/// 要素が見つからない場合 `find_element` は `DriverError::NoSuchElement` を返す。
/// 待機は呼び出し側（[`crate::wait`]）が行う。
#[async_trait]
pub trait BrowserDriver: Send {
    /// URLへ遷移（不正なURLは `DriverError::InvalidArgument`）
    async fn navigate(&mut self, url: &str) -> Result<(), DriverError>;

    async fn find_element(
        &mut self,
        locator: &Locator,
    ) -> Result<Box<dyn ElementHandle>, DriverError>;

    /// iframe 内に操作対象を切り替える
    async fn switch_to_frame(&mut self, locator: &Locator) -> Result<(), DriverError>;

    /// トップレベルのドキュメントに戻す
    async fn switch_to_default_content(&mut self) -> Result<(), DriverError>;

    /// 現在のウィンドウを閉じる
    async fn close_window(&mut self) -> Result<(), DriverError>;

    /// ブラウザを終了してリソースを解放
    async fn quit(&mut self) -> Result<(), DriverError>;
}
