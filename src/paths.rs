use std::path::PathBuf;
use std::sync::OnceLock;

static EXE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Returns the directory containing the executable.
pub fn get_exe_dir() -> &'static PathBuf {
    EXE_DIR.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

/// Returns the logs directory: `<exe_dir>/logs/`
pub fn get_logs_dir() -> PathBuf {
    get_exe_dir().join("logs")
}

/// Returns the reports directory: `<exe_dir>/reports/`
///
/// Charts, statistics JSON and selection previews are written here.
pub fn get_reports_dir() -> PathBuf {
    get_exe_dir().join("reports")
}

/// Returns the path of the application config: `<exe_dir>/config.json`
pub fn get_config_path() -> PathBuf {
    get_exe_dir().join("config.json")
}

/// Returns the path of the chart styling config: `<exe_dir>/chart_config.json`
pub fn get_chart_config_path() -> PathBuf {
    get_exe_dir().join("chart_config.json")
}

/// Directory the "open photo" dialog starts in.
pub fn get_default_photo_dir() -> PathBuf {
    dirs::picture_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Ensures all output directories exist. Call at startup.
pub fn ensure_directories() -> std::io::Result<()> {
    std::fs::create_dir_all(get_logs_dir())?;
    std::fs::create_dir_all(get_reports_dir())?;
    Ok(())
}
