use anyhow::Result;
use std::env;
use std::path::PathBuf;

/// Get the configuration directory.
///
/// Returns:
///
/// - The platform config directory joined with the app name
/// - An error if the platform config directory cannot be determined
pub fn get_config_dir() -> Result<PathBuf> {
    let base_dir =
        dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;

    Ok(base_dir.join("pagepaste"))
}

/// Get the settings file path.
///
/// The `PAGEPASTE_SETTING_PATH` environment variable takes precedence over
/// the default location inside the config directory.
pub fn get_setting_path() -> Result<PathBuf> {
    if let Ok(path) = env::var("PAGEPASTE_SETTING_PATH") {
        return Ok(PathBuf::from(path));
    }

    let config_dir = get_config_dir()?;
    Ok(config_dir.join("setting.json"))
}
