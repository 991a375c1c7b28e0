// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Data directory resolution.

use std::path::{Path, PathBuf};

/// Return the BizConnect data directory, creating it if needed.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = base_dir(
        std::env::var_os("XDG_DATA_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    );
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// `$XDG_DATA_HOME/bizconnect`, else `~/.local/share/bizconnect`, else a
/// directory under the system temp dir.
fn base_dir(xdg: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    let base = xdg
        .filter(|p| p.is_absolute())
        .or_else(|| home.map(|h| h.join(".local").join("share")))
        .unwrap_or_else(std::env::temp_dir);
    base.join("bizconnect")
}

/// Resolve the configured database file against the data directory. An
/// absolute path is used as-is.
pub fn database_path(data_dir: &Path, database_file: &str) -> PathBuf {
    let file = Path::new(database_file);
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        data_dir.join(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_xdg_then_home() {
        let xdg = base_dir(Some("/xdg".into()), Some("/home/ada".into()));
        assert_eq!(xdg, PathBuf::from("/xdg/bizconnect"));

        let home = base_dir(None, Some("/home/ada".into()));
        assert_eq!(home, PathBuf::from("/home/ada/.local/share/bizconnect"));

        let relative_xdg = base_dir(Some("relative".into()), Some("/home/ada".into()));
        assert_eq!(relative_xdg, PathBuf::from("/home/ada/.local/share/bizconnect"));
    }

    #[test]
    fn database_path_keeps_absolute_paths() {
        let dir = Path::new("/data/bizconnect");
        assert_eq!(
            database_path(dir, "bizconnect.db"),
            PathBuf::from("/data/bizconnect/bizconnect.db")
        );
        assert_eq!(database_path(dir, "/tmp/x.db"), PathBuf::from("/tmp/x.db"));
    }
}
