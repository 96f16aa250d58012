use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use sqlsnap::{DangerousDmlPolicy, Dialect, GeneratorConfig, Strictness};

#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub config_path: PathBuf,
    pub file: ConfigFile,
}

impl ProjectConfig {
    pub fn load(config_path: PathBuf) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(&config_path).map_err(|e| {
            anyhow::anyhow!(
                "failed to read config file {}: {e}",
                config_path.display()
            )
        })?;

        let file = ConfigFile::parse(&raw).map_err(|e| {
            anyhow::anyhow!(
                "failed to load config file {}: {e:#}",
                config_path.display()
            )
        })?;

        Ok(Self { config_path, file })
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_optional(path: &Path) -> anyhow::Result<Option<Self>> {
        if path.exists() {
            Self::load(path.to_path_buf()).map(Some)
        } else {
            Ok(None)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub version: String,

    pub database: Option<DatabaseConfig>,

    #[serde(default)]
    pub generator: GeneratorSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorSection {
    pub dialect: Option<Dialect>,
    pub strictness: Option<Strictness>,
    pub delete_without_where: Option<DangerousDmlPolicy>,
    pub max_concurrency: Option<usize>,
    pub query_timeout_ms: Option<u64>,
    pub max_logged_sql_length: Option<usize>,
}

impl ConfigFile {
    fn parse(raw: &str) -> anyhow::Result<Self> {
        let mut file: ConfigFile = toml::from_str(raw)?;
        file.expand_env()?;
        file.validate()?;
        Ok(file)
    }

    fn expand_env(&mut self) -> anyhow::Result<()> {
        if let Some(db) = self.database.as_mut() {
            db.url = expand_env_vars(&db.url)?;
        }
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.version.trim() != "1" {
            anyhow::bail!("unsupported config version: {}", self.version);
        }

        if let Some(db) = &self.database {
            if db.url.trim().is_empty() {
                anyhow::bail!("database.url must not be empty");
            }
            if db.pool_size == Some(0) {
                anyhow::bail!("database.pool_size must be at least 1");
            }
        }

        if self.generator.max_concurrency == Some(0) {
            anyhow::bail!("generator.max_concurrency must be at least 1");
        }

        Ok(())
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database.as_ref().map(|db| db.url.as_str())
    }

    pub fn pool_size(&self) -> Option<usize> {
        self.database.as_ref().and_then(|db| db.pool_size)
    }
}

impl GeneratorSection {
    pub fn to_generator_config(&self) -> GeneratorConfig {
        let mut cfg = GeneratorConfig::new();
        if let Some(dialect) = self.dialect {
            cfg = cfg.dialect(dialect);
        }
        if let Some(strictness) = self.strictness {
            cfg = cfg.strictness(strictness);
        }
        if let Some(policy) = self.delete_without_where {
            cfg = cfg.delete_without_where(policy);
        }
        if let Some(n) = self.max_concurrency {
            cfg = cfg.max_concurrency(n);
        }
        if let Some(ms) = self.query_timeout_ms {
            cfg = cfg.timeout(Duration::from_millis(ms));
        }
        if let Some(len) = self.max_logged_sql_length {
            cfg = cfg.max_logged_sql_length(len);
        }
        cfg
    }
}

fn expand_env_vars(input: &str) -> anyhow::Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next();

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                anyhow::bail!("unterminated env var reference: ${{{key}");
            }
            if key.is_empty() {
                anyhow::bail!("invalid env var reference: ${{}}");
            }

            let v = dotenvy::var(&key)
                .map_err(|_| anyhow::anyhow!("missing env var for config expansion: {key}"))?;
            out.push_str(&v);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_file() {
        let file = ConfigFile::parse("version = \"1\"\n").unwrap();
        assert!(file.database_url().is_none());
        assert_eq!(file.generator.to_generator_config(), GeneratorConfig::new());
    }

    #[test]
    fn full_file() {
        let file = ConfigFile::parse(
            r#"
version = "1"

[database]
url = "postgres://localhost/app"
pool_size = 4

[generator]
dialect = "oracle"
strictness = "hardened"
delete_without_where = "error"
max_concurrency = 8
query_timeout_ms = 1500
"#,
        )
        .unwrap();

        assert_eq!(file.database_url(), Some("postgres://localhost/app"));
        assert_eq!(file.pool_size(), Some(4));

        let cfg = file.generator.to_generator_config();
        assert_eq!(cfg.dialect, Dialect::Oracle);
        assert_eq!(cfg.strictness, Strictness::Hardened);
        assert_eq!(cfg.delete_without_where, DangerousDmlPolicy::Error);
        assert_eq!(cfg.max_concurrency, 8);
        assert_eq!(cfg.query_timeout, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn rejects_bad_files() {
        for raw in [
            "version = \"2\"",
            "version = \"1\"\n[database]\nurl = \" \"",
            "version = \"1\"\n[generator]\nmax_concurrency = 0",
            "version = \"1\"\n[generator]\ndialect = \"mysql\"",
            "version = \"1\"\n[generator]\nunknown_key = true",
        ] {
            assert!(ConfigFile::parse(raw).is_err(), "{raw}");
        }
    }

    #[test]
    fn expands_env_references() {
        // PATH is set in every test environment.
        let path = std::env::var("PATH").unwrap();
        assert_eq!(
            expand_env_vars("a-${PATH}-b").unwrap(),
            format!("a-{path}-b")
        );
        assert_eq!(expand_env_vars("no refs $here").unwrap(), "no refs $here");

        let err = expand_env_vars("${UNCLOSED").unwrap_err().to_string();
        assert!(err.contains("unterminated"), "{err}");
        let err = expand_env_vars("${}").unwrap_err().to_string();
        assert!(err.contains("invalid env var reference"), "{err}");
        let err = expand_env_vars("${SQLSNAP_SURELY_UNSET_VAR_42}")
            .unwrap_err()
            .to_string();
        assert!(err.contains("SQLSNAP_SURELY_UNSET_VAR_42"), "{err}");
    }
}
