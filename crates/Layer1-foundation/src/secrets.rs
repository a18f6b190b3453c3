//! Secret Loader - 환경변수 / Docker secrets 마운트에서 비밀값 로드
//!
//! Lookup order: non-empty environment variable, then a non-empty
//! `<secrets_dir>/<NAME>`. Nothing is cached.

use std::path::PathBuf;
use tracing::debug;

/// Secrets passed through to the Open WebUI container when present
pub const SECRET_ENV_VARS: &[&str] = &[
    "OPENAI_API_KEY",
    "ANTHROPIC_API_KEY",
    "HUGGINGFACE_TOKEN",
    "WEBUI_SECRET_KEY",
];

/// Conventional Docker/Podman secrets mount
pub const DEFAULT_SECRETS_DIR: &str = "/run/secrets";

#[derive(Debug, Clone)]
pub struct SecretLoader {
    secrets_dir: PathBuf,
    names: Vec<String>,
}

impl Default for SecretLoader {
    fn default() -> Self {
        Self::new(DEFAULT_SECRETS_DIR)
    }
}

impl SecretLoader {
    pub fn new(secrets_dir: impl Into<PathBuf>) -> Self {
        Self {
            secrets_dir: secrets_dir.into(),
            names: SECRET_ENV_VARS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replace the list of secret names `load_all` looks up
    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Load a single secret by name
    pub fn load(&self, name: &str) -> Option<String> {
        if let Ok(value) = std::env::var(name) {
            if !value.is_empty() {
                return Some(value);
            }
        }

        let path = self.secrets_dir.join(name);
        if !path.is_file() {
            return None;
        }
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let value = content.trim();
                if value.is_empty() {
                    debug!("Ignoring empty secret file {}", path.display());
                    return None;
                }
                Some(value.to_string())
            }
            Err(e) => {
                debug!("Ignoring unreadable secret file {}: {}", path.display(), e);
                None
            }
        }
    }

    /// All configured secrets that are present, in list order
    pub fn load_all(&self) -> Vec<(String, String)> {
        self.names
            .iter()
            .filter_map(|name| self.load(name).map(|value| (name.clone(), value)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const NAME: &str = "WEBUI_INSTALLER_TEST_SECRET";

    #[test]
    #[serial]
    fn test_env_takes_precedence_over_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(NAME), "from-file\n").unwrap();
        std::env::set_var(NAME, "from-env");

        let loader = SecretLoader::new(dir.path());
        assert_eq!(loader.load(NAME), Some("from-env".to_string()));

        std::env::remove_var(NAME);
        assert_eq!(loader.load(NAME), Some("from-file".to_string()));
    }

    #[test]
    #[serial]
    fn test_empty_env_falls_back_to_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(NAME), "  padded  ").unwrap();
        std::env::set_var(NAME, "");

        let loader = SecretLoader::new(dir.path());
        assert_eq!(loader.load(NAME), Some("padded".to_string()));

        std::env::remove_var(NAME);
    }

    #[test]
    #[serial]
    fn test_missing_secret_is_none() {
        let dir = tempfile::tempdir().unwrap();
        std::env::remove_var(NAME);

        let loader = SecretLoader::new(dir.path()).with_names([NAME]);
        assert_eq!(loader.load(NAME), None);
        assert!(loader.load_all().is_empty());
    }

    #[test]
    #[serial]
    fn test_load_all_returns_present_subset() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("SECOND_TEST_SECRET"), "two").unwrap();
        std::env::remove_var("FIRST_TEST_SECRET");
        std::env::remove_var("SECOND_TEST_SECRET");

        let loader =
            SecretLoader::new(dir.path()).with_names(["FIRST_TEST_SECRET", "SECOND_TEST_SECRET"]);
        assert_eq!(
            loader.load_all(),
            vec![("SECOND_TEST_SECRET".to_string(), "two".to_string())]
        );
    }

    #[test]
    #[serial]
    fn test_blank_secret_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        std::env::remove_var(NAME);
        let loader = SecretLoader::new(dir.path()).with_names([NAME]);

        for content in ["", " \n\t"] {
            std::fs::write(dir.path().join(NAME), content).unwrap();
            assert_eq!(loader.load(NAME), None);
            assert!(loader.load_all().is_empty());
        }
    }

    #[test]
    fn test_default_names() {
        let loader = SecretLoader::default();
        assert_eq!(loader.names().len(), SECRET_ENV_VARS.len());
        assert!(loader.names().iter().any(|n| n == "WEBUI_SECRET_KEY"));
    }
}
