use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use super::snapshot::{matching_names, DirectorySnapshot};

/// ベースラインに対してファイル数が増えたかを判定する
///
/// 件数の比較のみで、ファイルの同一性や書き込み完了は確認しない。
/// 監視中に別プロセスが対象ファイルを削除すると、失敗したダウンロードを
/// 成功とみなすことがある。
#[derive(Debug, Clone)]
pub struct DownloadWatcher {
    dir: PathBuf,
    suffix: String,
    baseline: DirectorySnapshot,
}

impl DownloadWatcher {
    pub fn new(
        dir: impl Into<PathBuf>,
        suffix: impl Into<String>,
        baseline: DirectorySnapshot,
    ) -> Self {
        Self {
            dir: dir.into(),
            suffix: suffix.into(),
            baseline,
        }
    }

    /// 対象ファイル数がベースラインより多ければ true
    pub fn has_new_file(&self) -> io::Result<bool> {
        let current = DirectorySnapshot::capture(&self.dir, &self.suffix)?;
        let grown = current.len() > self.baseline.len();
        if grown {
            debug!(
                "新しいファイルを検出: {:?} ({} -> {})",
                current.new_since(&self.baseline),
                self.baseline.len(),
                current.len()
            );
        }
        Ok(grown)
    }
}

/// 更新日時が最も新しい対象ファイル名
pub fn newest_matching(dir: &Path, suffix: &str) -> io::Result<Option<String>> {
    let mut files: Vec<(SystemTime, String)> = Vec::new();
    for name in matching_names(dir, suffix)? {
        let modified = fs::metadata(dir.join(&name))?.modified()?;
        files.push((modified, name));
    }

    // 更新日時の降順、同時刻は名前順
    files.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    Ok(files.into_iter().next().map(|(_, name)| name))
}
