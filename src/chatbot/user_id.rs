//! Persisted companion user id
//!
//! The companion backend keys conversations by an opaque user id that is
//! generated once per device and kept in a small file.

use chrono::Utc;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Default location of the user id file
pub fn default_user_id_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|p| p.join("aegis").join("user_id"))
        .unwrap_or_else(|| PathBuf::from("./aegis_user_id"))
}

/// Fresh id of the form `user_{unix_millis}_{random}`
pub fn generate_user_id() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("user_{}_{}", Utc::now().timestamp_millis(), &random[..7])
}

/// Read the stored id, generating and storing one when missing or blank
pub fn load_or_create_user_id(path: &Path) -> std::io::Result<String> {
    match std::fs::read_to_string(path) {
        Ok(content) if !content.trim().is_empty() => return Ok(content.trim().to_string()),
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    let user_id = generate_user_id();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &user_id)?;

    tracing::info!(user_id = %user_id, path = ?path, "Generated companion user id");
    Ok(user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_generated_format() {
        let id = generate_user_id();
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "user");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 7);
    }

    #[test]
    fn test_created_once_then_reused() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("user_id");

        let first = load_or_create_user_id(&path).unwrap();
        let second = load_or_create_user_id(&path).unwrap();
        assert_eq!(first, second);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
    }

    #[test]
    fn test_blank_file_regenerated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("user_id");
        std::fs::write(&path, "  \n").unwrap();

        let id = load_or_create_user_id(&path).unwrap();
        assert!(id.starts_with("user_"));
    }
}
