use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where readings come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    Postgres(DbConfig),
    Csv { path: PathBuf },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    pub url: String,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_table() -> String {
    "scada_data".into()
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    /// Number of devices shown on the ranking page and in the console summary.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("scada_analysis_results")
}

fn default_top_n() -> usize {
    10
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            top_n: default_top_n(),
        }
    }
}

impl Config {
    /// Load YAML from disk, substitute $(VAR)/${VAR} with env vars, then parse.
    /// Afterwards, if DATABASE_URL env is set and the source is Postgres, it overrides `source.url`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let mut cfg = Self::from_yaml(&raw)?;

        if let (Ok(url), SourceConfig::Postgres(db)) =
            (std::env::var("DATABASE_URL"), &mut cfg.source)
        {
            db.url = url;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a YAML document after placeholder expansion, without validating it.
    pub fn from_yaml(raw: &str) -> Result<Self> {
        let expanded = expand_placeholders(raw, |name| std::env::var(name).ok())?;
        Ok(serde_yaml::from_str(&expanded)?)
    }

    pub fn validate(&self) -> Result<()> {
        match &self.source {
            SourceConfig::Postgres(db) => {
                if db.url.trim().is_empty() {
                    return Err(AppError::Config("source.url cannot be empty".into()));
                }
                if !is_table_identifier(&db.table) {
                    return Err(AppError::Config(format!(
                        "source.table '{}' is not a valid table name",
                        db.table
                    )));
                }
                if db.max_connections == 0 {
                    return Err(AppError::Config(
                        "source.max_connections must be at least 1".into(),
                    ));
                }
            }
            SourceConfig::Csv { path } => {
                if path.as_os_str().is_empty() {
                    return Err(AppError::Config("source.path cannot be empty".into()));
                }
            }
        }

        if self.output.dir.as_os_str().is_empty() {
            return Err(AppError::Config("output.dir cannot be empty".into()));
        }
        if self.output.top_n == 0 {
            return Err(AppError::Config("output.top_n must be at least 1".into()));
        }

        Ok(())
    }
}

/// Accepts `table` or `schema.table`, each part a plain SQL identifier.
/// The name is spliced into the query text, so nothing else gets through.
fn is_table_identifier(name: &str) -> bool {
    let parts: Vec<&str> = name.split('.').collect();
    parts.len() <= 2
        && parts.iter().all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

/// Substitute `$(NAME)` and `${NAME}` with `lookup(NAME)`. `$$` is a literal `$`;
/// a `$` followed by anything else is kept.
fn expand_placeholders<F>(input: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let close = match after.as_bytes().first() {
            Some(b'(') => ')',
            Some(b'{') => '}',
            Some(b'$') => {
                out.push('$');
                rest = &after[1..];
                continue;
            }
            _ => {
                out.push('$');
                rest = after;
                continue;
            }
        };

        let body = &after[1..];
        let end = body.find(close).ok_or_else(|| {
            AppError::Config(format!("placeholder '${}' is missing its closing '{}'", &after[..1], close))
        })?;
        let name = &body[..end];
        let value = lookup(name)
            .ok_or_else(|| AppError::Config(format!("missing environment variable: {}", name)))?;
        out.push_str(&value);
        rest = &body[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}
