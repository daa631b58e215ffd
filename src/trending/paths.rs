use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct TrendPaths {
    pub home: PathBuf,
    pub document_file: PathBuf,
    pub archives_dir: PathBuf,
    pub state_dir: PathBuf,
    pub logs_dir: PathBuf,
}

fn env_or_default_path(var: &str, base: &Path, fallback: PathBuf) -> PathBuf {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => {
            let path = PathBuf::from(v.trim());
            if path.is_absolute() {
                path
            } else {
                base.join(path)
            }
        }
        _ => fallback,
    }
}

pub fn resolve_home() -> Result<PathBuf> {
    match env::var("TRENDLOG_HOME") {
        Ok(v) if !v.trim().is_empty() => Ok(PathBuf::from(v.trim())),
        _ => env::current_dir().context("current directory could not be resolved"),
    }
}

pub fn resolve_paths() -> Result<TrendPaths> {
    let home = resolve_home()?;
    Ok(paths_for_home(&home))
}

pub fn paths_for_home(home: &Path) -> TrendPaths {
    let document_file = env_or_default_path("TRENDLOG_DOCUMENT", home, home.join("README.md"));
    let archives_dir = env_or_default_path("TRENDLOG_ARCHIVES_DIR", home, home.join("archives"));
    let state_dir = env_or_default_path("TRENDLOG_STATE_DIR", home, home.join(".trendlog"));
    let logs_dir = env_or_default_path("TRENDLOG_LOGS_DIR", home, state_dir.join("logs"));

    TrendPaths {
        home: home.to_path_buf(),
        document_file,
        archives_dir,
        state_dir,
        logs_dir,
    }
}

impl TrendPaths {
    pub fn lock_file(&self) -> PathBuf {
        self.state_dir.join("run.lock")
    }

    pub fn audit_log(&self) -> PathBuf {
        self.logs_dir.join("audit.log")
    }

    pub fn archive_file(&self, file_name: &str) -> PathBuf {
        self.archives_dir.join(file_name)
    }

    /// Link target for an archive as seen from the document's directory.
    /// Relative with forward slashes when the archive lives below it,
    /// otherwise the absolute path.
    pub fn archive_link(&self, file_name: &str) -> String {
        let doc_dir = self
            .document_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let archive = self.archive_file(file_name);
        match archive.strip_prefix(&doc_dir) {
            Ok(rel) => rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/"),
            Err(_) => archive.display().to_string(),
        }
    }
}
