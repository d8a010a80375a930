//! ダウンロードディレクトリの監視
//!
//! ブラウザのダウンロード完了はドライバからは観測できないため、
//! 対象拡張子のファイル数がベースラインより増えたことを完了とみなす。

mod snapshot;
mod watcher;

pub use snapshot::DirectorySnapshot;
pub use watcher::{newest_matching, DownloadWatcher};
