// src/infra/paths.rs — Path management
//
// All paths respect the HABITGRAM_HOME environment variable for isolation.
// When HABITGRAM_HOME is set, config and data live under that directory.
// When unset, config uses ~/.habitgram/ and data uses the platform data dir.

use directories::ProjectDirs;
use std::path::PathBuf;
use std::sync::OnceLock;

static PROJECT_DIRS: OnceLock<ProjectDirs> = OnceLock::new();

fn project_dirs() -> &'static ProjectDirs {
    PROJECT_DIRS.get_or_init(|| {
        ProjectDirs::from("", "", "habitgram").expect("Could not determine home directory")
    })
}

fn habitgram_home() -> Option<PathBuf> {
    std::env::var_os("HABITGRAM_HOME").map(PathBuf::from)
}

/// Configuration directory: $HABITGRAM_HOME/ or ~/.habitgram/
pub fn config_dir() -> PathBuf {
    if let Some(home) = habitgram_home() {
        return home;
    }
    dirs_home().join(".habitgram")
}

/// Data directory: $HABITGRAM_HOME/data/ or the platform-local data dir.
pub fn data_dir() -> PathBuf {
    if let Some(home) = habitgram_home() {
        return home.join("data");
    }
    project_dirs().data_local_dir().to_path_buf()
}

fn dirs_home() -> PathBuf {
    directories::BaseDirs::new()
        .expect("Could not determine home directory")
        .home_dir()
        .to_path_buf()
}

/// Database path
pub fn db_path() -> PathBuf {
    data_dir().join("habitgram.db")
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}
