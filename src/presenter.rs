//! ダウンロードしたレポートの表示と削除

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tracing::info;

use crate::error::PresentError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// ファイル内容をそのまま `out` に書き出してから削除する
///
/// 読み込みに失敗した場合は削除しない。
pub fn present<W: Write>(dir: &Path, file_name: &str, out: &mut W) -> Result<(), PresentError> {
    let path = dir.join(file_name);
    let content = read_text(&path)?;

    out.write_all(content.as_bytes())?;
    out.flush()?;

    fs::remove_file(&path)?;
    info!("ダウンロードしたレポートを削除: {:?}", path);
    Ok(())
}

/// 先頭のBOMを取り除いてUTF-8として読む
fn read_text(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);
    String::from_utf8(body.to_vec()).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
