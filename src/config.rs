use std::ffi::OsString;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Labwise";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Directory holding override JSON configs (reference ranges, rule tables).
pub const CONFIG_DIR_ENV: &str = "LABWISE_CONFIG_DIR";
/// Full path of the SQLite record store.
pub const DB_PATH_ENV: &str = "LABWISE_DB_PATH";
pub const DB_FILE_NAME: &str = "labwise.db";

/// Get the application data directory
/// ~/Labwise/ on all platforms; the working directory when there is no home.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Record store location, honouring `LABWISE_DB_PATH`.
pub fn database_path() -> PathBuf {
    database_path_from(std::env::var_os(DB_PATH_ENV))
}

fn database_path_from(override_path: Option<OsString>) -> PathBuf {
    non_empty(override_path)
        .map(PathBuf::from)
        .unwrap_or_else(|| app_data_dir().join(DB_FILE_NAME))
}

/// Override config directory from `LABWISE_CONFIG_DIR`; `None` means bundled configs.
pub fn config_dir() -> Option<PathBuf> {
    non_empty(std::env::var_os(CONFIG_DIR_ENV)).map(PathBuf::from)
}

fn non_empty(value: Option<OsString>) -> Option<OsString> {
    value.filter(|v| !v.is_empty())
}

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "labwise_lib=info,labwise=info,warn"
}
