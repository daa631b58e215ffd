use std::env;
use std::path::PathBuf;

/// `.env` locations in lookup order: the working directory, then
/// `$TRENDLOG_HOME`, or the user config directory when no home is set.
fn dotenv_candidates(
    cwd: Option<PathBuf>,
    trendlog_home: Option<PathBuf>,
    config_dir: Option<PathBuf>,
) -> Vec<PathBuf> {
    let fallback = match trendlog_home {
        Some(home) => Some(home),
        None => config_dir.map(|dir| dir.join("trendlog")),
    };
    cwd.into_iter()
        .chain(fallback)
        .map(|dir| dir.join(".env"))
        .collect()
}

fn first_existing(candidates: Vec<PathBuf>) -> Option<PathBuf> {
    candidates.into_iter().find(|path| path.is_file())
}

/// Loads the first `.env` found. Variables already set in the process win.
pub fn load_dotenv() {
    let candidates = dotenv_candidates(
        env::current_dir().ok(),
        env::var_os("TRENDLOG_HOME").map(PathBuf::from),
        dirs::config_dir(),
    );
    if let Some(path) = first_existing(candidates) {
        let _ = dotenvy::from_path(&path);
    }
}
