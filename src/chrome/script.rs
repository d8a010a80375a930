//! 要素操作用のJavaScript生成
//!
//! 要素は「現在のドキュメント」を起点とした式で表す。iframe に切り替えると
//! ドキュメント式がその `contentDocument` になる。

use crate::traits::Locator;

pub const TOP_DOCUMENT: &str = "document";

/// XPathResult.FIRST_ORDERED_NODE_TYPE
const FIRST_ORDERED_NODE_TYPE: u8 = 9;

fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// `doc` 内で `locator` に一致する要素（または null）を返す式
pub fn element_expr(doc: &str, locator: &Locator) -> String {
    match locator {
        Locator::Id(id) => format!("{}.getElementById({})", doc, js_string(id)),
        Locator::Css(sel) => format!("{}.querySelector({})", doc, js_string(sel)),
        Locator::XPath(xp) => format!(
            "{doc}.evaluate({}, {doc}, null, {}, null).singleNodeValue",
            js_string(xp),
            FIRST_ORDERED_NODE_TYPE,
            doc = doc
        ),
    }
}

/// iframe 要素の中身のドキュメント式
pub fn frame_document_expr(frame_expr: &str) -> String {
    format!("({}).contentDocument", frame_expr)
}

fn guarded(element: &str, body: &str) -> String {
    format!(
        "(() => {{ try {{ const el = {}; {} }} catch (e) {{ return false; }} }})()",
        element, body
    )
}

pub fn exists(element: &str) -> String {
    guarded(element, "return el != null;")
}

pub fn frame_ready(element: &str) -> String {
    guarded(
        element,
        "return el != null && el.contentDocument != null && el.contentDocument.readyState !== 'loading';",
    )
}

pub fn interactable(element: &str) -> String {
    guarded(
        element,
        "if (el == null || el.disabled) return false; \
         const style = el.ownerDocument.defaultView.getComputedStyle(el); \
         return style.visibility !== 'hidden' && style.display !== 'none' && el.getClientRects().length > 0;",
    )
}

/// フォーカスが実際に要素へ移った場合のみ true
pub fn focus(element: &str) -> String {
    guarded(
        element,
        "if (el == null) return false; el.focus(); return el.ownerDocument.activeElement === el;",
    )
}

pub fn click(element: &str) -> String {
    guarded(element, "if (el == null) return false; el.click(); return true;")
}
