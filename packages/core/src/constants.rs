use std::env;
use std::path::PathBuf;

/// Get the path to the Opsdesk directory (~/.opsdesk)
pub fn opsdesk_dir() -> PathBuf {
    // First try HOME environment variable (useful for tests)
    if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".opsdesk")
    } else {
        // Fall back to dirs crate for normal usage
        dirs::home_dir()
            .expect("Unable to get home directory")
            .join(".opsdesk")
    }
}

/// Get the path to the SQLite database file (~/.opsdesk/opsdesk.db)
pub fn database_file() -> PathBuf {
    opsdesk_dir().join("opsdesk.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opsdesk_dir_uses_home() {
        let dir = opsdesk_dir();
        assert!(dir.ends_with(".opsdesk"));
    }

    #[test]
    fn test_database_file_under_opsdesk_dir() {
        let file = database_file();
        assert_eq!(file.file_name().unwrap(), "opsdesk.db");
        assert!(file.parent().unwrap().ends_with(".opsdesk"));
    }
}
