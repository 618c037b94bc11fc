//!
//! Platform-native path resolution for TraceReplay configuration.
//!
//! - Linux/Unix: XDG Base Directory Specification (~/.config)
//! - macOS: Standard Application Support directories (~/Library/...)
//! - Windows: Known Folder system (%APPDATA%)
//!
//! Authors:
//!   Jaro <yarenty@gmail.com>
//!
//! Copyright (c) 2026 SkyCorp

/* --- uses ------------------------------------------------------------------------------------ */

use crate::error::{ReplayError, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/* --- constants ------------------------------------------------------------------------------- */

/// Application name for directory resolution
const APP_NAME: &str = "tracereplay";
/// Organization qualifier for directory resolution
const ORGANIZATION: &str = "com";
/// Organization name for directory resolution
const ORG_NAME: &str = "SkyCorp";

/* --- public functions ------------------------------------------------------------------------ */

/// Get the user configuration directory for TraceReplay
///
/// Returns the platform-appropriate configuration directory:
/// - Linux: ~/.config/tracereplay/
/// - macOS: ~/Library/Application Support/tracereplay/
/// - Windows: %APPDATA%/tracereplay/
///
/// Does not create the directory; a missing user config is not an error.
pub fn user_config_dir() -> Result<PathBuf> {
    let project_dirs = get_project_dirs()?;
    Ok(project_dirs.config_dir().to_path_buf())
}

/// Get the system configuration directory for TraceReplay
///
/// - Linux: /etc/tracereplay/
/// - macOS: /Library/Preferences/tracereplay/
/// - Windows: %PROGRAMDATA%/tracereplay/
pub fn system_config_dir() -> Result<PathBuf> {
    #[cfg(all(unix, not(target_os = "macos")))]
    {
        Ok(PathBuf::from("/etc").join(APP_NAME))
    }

    #[cfg(target_os = "macos")]
    {
        Ok(PathBuf::from("/Library/Preferences").join(APP_NAME))
    }

    #[cfg(windows)]
    {
        std::env::var("PROGRAMDATA").map(|path| PathBuf::from(path).join(APP_NAME)).map_err(|_| {
            ReplayError::Config("PROGRAMDATA environment variable not found".to_string())
        })
    }
}

/// Path to the user configuration file (`<user config dir>/config.toml`)
pub fn user_config_file() -> Result<PathBuf> {
    Ok(user_config_dir()?.join("config.toml"))
}

/// Path to the system configuration file (`<system config dir>/config.toml`)
pub fn system_config_file() -> Result<PathBuf> {
    Ok(system_config_dir()?.join("config.toml"))
}

/// Expand tilde (~) and environment variables in file paths
///
/// # Examples
/// ```rust
/// use tracereplay::config::paths::expand_path;
///
/// let expanded = expand_path("~/.config/tracereplay/config.toml").unwrap();
/// assert!(!expanded.to_string_lossy().starts_with('~'));
/// ```
pub fn expand_path<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let path_str = path.as_ref().to_string_lossy();

    if let Some(rest) = path_str.strip_prefix("~/") {
        return match directories::UserDirs::new() {
            Some(dirs) => Ok(dirs.home_dir().join(rest)),
            None => Err(ReplayError::Config(
                "Unable to determine user home directory for tilde expansion".to_string(),
            )),
        };
    }

    if path_str.contains('$') {
        let expanded = shellexpand::full(&path_str).map_err(|e| {
            ReplayError::Config(format!(
                "Failed to expand environment variables in path '{}': {}",
                path_str, e
            ))
        })?;
        return Ok(PathBuf::from(expanded.as_ref()));
    }

    Ok(path.as_ref().to_path_buf())
}

/// Check that a configuration file exists, is a regular file, and is readable
pub fn validate_config_file<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ReplayError::Config(format!(
            "Configuration file '{}' does not exist",
            path.display()
        )));
    }

    if !path.is_file() {
        return Err(ReplayError::Config(format!(
            "Configuration path '{}' exists but is not a regular file",
            path.display()
        )));
    }

    std::fs::File::open(path).map_err(|e| {
        ReplayError::Config(format!(
            "Configuration file '{}' exists but cannot be read: {}\n\
             You can fix this with: chmod 644 '{}'",
            path.display(),
            e,
            path.display()
        ))
    })?;

    Ok(())
}

/// All configuration file paths in precedence order (highest first)
pub fn config_file_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(user_config) = user_config_file() {
        paths.push(user_config);
    }

    if let Ok(system_config) = system_config_file() {
        paths.push(system_config);
    }

    paths
}

/* --- private functions ----------------------------------------------------------------------- */

/// Get ProjectDirs instance for TraceReplay
fn get_project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from(ORGANIZATION, ORG_NAME, APP_NAME).ok_or_else(|| {
        ReplayError::Config(
            "Unable to determine user directories. \
             Please ensure your user account has a valid home directory."
                .to_string(),
        )
    })
}

/* --- tests ----------------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_user_config_file_path() {
        let config_file = user_config_file().expect("Should get config file path");
        assert_eq!(config_file.file_name().unwrap(), "config.toml");
    }

    #[test]
    fn test_tilde_expansion() {
        let expanded = expand_path("~/test/path").expect("Should expand tilde");
        assert!(!expanded.to_string_lossy().contains('~'), "Tilde should be expanded");

        let absolute = expand_path("/absolute/path").expect("Should handle absolute path");
        assert_eq!(absolute, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_env_var_expansion() {
        temp_env::with_var("TRACEREPLAY_TEST_DIR", Some("/tmp/replay"), || {
            let expanded = expand_path("$TRACEREPLAY_TEST_DIR/config.toml").unwrap();
            assert_eq!(expanded, PathBuf::from("/tmp/replay/config.toml"));
        });
    }

    #[test]
    fn test_validate_config_file() {
        let result = validate_config_file("/non/existent/file.toml");
        assert!(result.is_err());

        let temp_dir = TempDir::new().unwrap();
        let temp_file = temp_dir.path().join("test.toml");
        fs::write(&temp_file, "test content").unwrap();

        assert!(validate_config_file(&temp_file).is_ok());
        assert!(validate_config_file(temp_dir.path()).is_err());
    }

    #[test]
    fn test_config_file_paths_order() {
        let paths = config_file_paths();
        assert!(!paths.is_empty(), "Should return at least one config path");

        #[cfg(all(unix, not(target_os = "macos")))]
        if paths.len() > 1 {
            assert!(paths[1].starts_with("/etc"));
        }
    }
}
