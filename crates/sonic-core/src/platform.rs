use std::path::PathBuf;

const APP_DIR: &str = "sksonic";

pub fn data_dir() -> PathBuf {
    // On macOS and Linux, use ~/.local/share/sksonic/ (XDG standard)
    // instead of macOS Application Support for consistency
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".local")
            .join("share")
            .join(APP_DIR)
    }
    #[cfg(not(unix))]
    {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }
}

pub fn config_dir() -> PathBuf {
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join(APP_DIR)
    }
    #[cfg(not(unix))]
    {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }
}

pub fn log_path() -> PathBuf {
    data_dir().join("sksonic.log")
}

/// Look up the pids of running processes named `executable` via `pidof`.
/// Newest first, as `pidof` reports them.
#[cfg(unix)]
pub fn find_pids(executable: &str) -> Vec<i32> {
    let output = match std::process::Command::new("pidof").arg(executable).output() {
        Ok(o) => o,
        Err(e) => {
            tracing::warn!("pidof {} failed: {}", executable, e);
            return Vec::new();
        }
    };
    if !output.status.success() {
        return Vec::new();
    }
    parse_pidof(&String::from_utf8_lossy(&output.stdout))
}

pub fn parse_pidof(output: &str) -> Vec<i32> {
    output
        .split_whitespace()
        .filter_map(|s| s.parse::<i32>().ok())
        .filter(|&pid| pid > 0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_are_app_scoped() {
        assert!(config_dir().ends_with("sksonic"));
        assert!(log_path().ends_with("sksonic/sksonic.log"));
    }

    #[test]
    fn test_parse_pidof() {
        assert_eq!(parse_pidof("4242 17\n"), vec![4242, 17]);
        assert!(parse_pidof("").is_empty());
        assert_eq!(parse_pidof("x 0 12"), vec![12]);
    }
}
