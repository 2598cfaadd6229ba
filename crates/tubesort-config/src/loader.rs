//! Configuration loader.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::schema::Config;

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a file, falling back to defaults when the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::NotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let mut config: Config = toml::from_str(&expanded)?;
        Self::expand_paths(&mut config);
        Ok(config)
    }

    /// Default configuration file location (`~/.tubesort/config.toml`).
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".tubesort")
            .join("config.toml")
    }

    /// Expand environment variables in the format `${VAR}`.
    ///
    /// Comments, whole-line or trailing, are left untouched.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern");
        let mut lines = Vec::new();

        for line in content.lines() {
            let (code, comment) = split_comment(line);
            let mut expanded = code.to_string();
            for cap in re.captures_iter(code) {
                let var_name = &cap[1];
                let var_value = std::env::var(var_name)
                    .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
                expanded = expanded.replace(&cap[0], &var_value);
            }
            expanded.push_str(comment);
            lines.push(expanded);
        }

        Ok(lines.join("\n"))
    }

    fn expand_paths(config: &mut Config) {
        if let Some(path) = config.page.snapshot_path.take() {
            config.page.snapshot_path = Some(PathBuf::from(Self::expand_path(&path.to_string_lossy())));
        }
        let directory = Self::expand_path(&config.logging.directory.to_string_lossy());
        config.logging.directory = PathBuf::from(directory);
    }

    /// Expand shell-style paths (e.g., `~/.tubesort`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

/// Split a TOML line at the first `#` outside a string.
fn split_comment(line: &str) -> (&str, &str) {
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in line.char_indices() {
        match quote {
            Some('"') if escaped => escaped = false,
            Some('"') if c == '\\' => escaped = true,
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '#' => return line.split_at(i),
            None => {}
        }
    }
    (line, "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_empty_config() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config.sorter.max_sort_attempts, 5);
        assert_eq!(config.remote.page_size, 50);
    }

    #[test]
    fn test_load_full_config() {
        let content = r#"
            [sorter]
            auto_sort_delay_ms = 1000
            retry_sort_interval_ms = 2000
            max_sort_attempts = 3
            newest_first = true

            [page]
            collection_url_marker = "/list"
            snapshot_path = "/tmp/page.json"

            [remote]
            base_url = "http://localhost:9000"
            playlist_id = "PL123"
            access_token = "token"
            fetch_all_pages = true

            [logging]
            level = "debug"
            file = true
            directory = "/var/log/tubesort"
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.sorter.auto_sort_delay_ms, 1000);
        assert_eq!(config.sorter.max_sort_attempts, 3);
        assert!(config.sorter.newest_first);
        assert_eq!(config.page.collection_url_marker, "/list");
        assert_eq!(config.page.snapshot_path, Some(PathBuf::from("/tmp/page.json")));
        assert_eq!(config.remote.playlist_id.as_deref(), Some("PL123"));
        assert!(config.remote.fetch_all_pages);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.directory, PathBuf::from("/var/log/tubesort"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[sorter]").unwrap();
        writeln!(file, "max_sort_attempts = 9").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.sorter.max_sort_attempts, 9);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load(Path::new("/nonexistent/path/tubesort.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_or_default_nonexistent_file() {
        let config = ConfigLoader::load_or_default(Path::new("/nonexistent/path/tubesort.toml")).unwrap();
        assert_eq!(config.sorter.max_sort_attempts, 5);
    }

    #[test]
    fn test_load_invalid_toml() {
        let result = ConfigLoader::load_str("invalid = [unclosed");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: This test runs in isolation and sets a unique test-only env var
        unsafe {
            std::env::set_var("TUBESORT_TEST_PLAYLIST", "PL-from-env");
        }
        let config = ConfigLoader::load_str(
            "[remote]\nplaylist_id = \"${TUBESORT_TEST_PLAYLIST}\"",
        )
        .unwrap();
        assert_eq!(config.remote.playlist_id.as_deref(), Some("PL-from-env"));
        unsafe {
            std::env::remove_var("TUBESORT_TEST_PLAYLIST");
        }
    }

    #[test]
    fn test_expand_env_vars_not_set() {
        let content = "value = \"${NONEXISTENT_TUBESORT_VAR_12345}\"";
        let result = ConfigLoader::expand_env_vars(content);
        assert!(matches!(result, Err(ConfigError::EnvVarNotSet(_))));
    }

    #[test]
    fn test_expand_env_vars_skips_comments() {
        let content = "# access_token = \"${NONEXISTENT_TUBESORT_VAR_67890}\"\nvalue = 1";
        let expanded = ConfigLoader::expand_env_vars(content).unwrap();
        assert_eq!(expanded, content);
    }

    #[test]
    fn test_expand_env_vars_skips_trailing_comments() {
        let content = "playlist_id = \"PL1\" # or ${NONEXISTENT_TUBESORT_VAR_24680}";
        let expanded = ConfigLoader::expand_env_vars(content).unwrap();
        assert_eq!(expanded, content);

        let config = ConfigLoader::load_str(&format!("[remote]\n{content}")).unwrap();
        assert_eq!(config.remote.playlist_id.as_deref(), Some("PL1"));
    }

    #[test]
    fn test_split_comment_ignores_hash_in_strings() {
        assert_eq!(split_comment(r#"a = "x#y" # note"#), (r#"a = "x#y" "#, "# note"));
        assert_eq!(split_comment(r#"a = 'x#y'"#), (r#"a = 'x#y'"#, ""));
        assert_eq!(split_comment(r##"a = "q\"#" # c"##), (r##"a = "q\"#" "##, "# c"));
        assert_eq!(split_comment("# whole line"), ("", "# whole line"));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = ConfigLoader::expand_path("~/test");
        assert!(!expanded.starts_with('~'));
        assert!(expanded.ends_with("/test"));
    }

    #[test]
    fn test_snapshot_path_tilde_expanded() {
        let config = ConfigLoader::load_str("[page]\nsnapshot_path = \"~/page.json\"").unwrap();
        let path = config.page.snapshot_path.unwrap();
        assert!(!path.to_string_lossy().starts_with('~'));
    }

    #[test]
    fn test_default_path() {
        let path = ConfigLoader::default_path();
        assert!(path.ends_with(".tubesort/config.toml"));
    }
}
