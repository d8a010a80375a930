use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;

/// ある時点でのディレクトリ内の対象ファイル名一覧
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectorySnapshot {
    names: BTreeSet<String>,
}

impl DirectorySnapshot {
    /// `dir` 直下で名前が `suffix` で終わるファイルを列挙
    pub fn capture(dir: &Path, suffix: &str) -> io::Result<Self> {
        Ok(Self {
            names: matching_names(dir, suffix)?.into_iter().collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// `baseline` に無いファイル名
    pub fn new_since(&self, baseline: &DirectorySnapshot) -> Vec<String> {
        self.names.difference(&baseline.names).cloned().collect()
    }
}

pub(crate) fn matching_names(dir: &Path, suffix: &str) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.path().is_file() {
            continue;
        }
        // UTF-8 でない名前は対象外
        if let Ok(name) = entry.file_name().into_string() {
            if name.ends_with(suffix) {
                names.push(name);
            }
        }
    }
    Ok(names)
}
