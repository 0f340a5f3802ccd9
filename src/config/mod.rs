use std::{
    collections::HashMap,
    env,
    fs,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use directories::BaseDirs;

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    /// Defaults, then the rc file, then `.env`, then the process environment.
    pub fn load() -> Self {
        // `.env` only fills variables the environment does not already define.
        let _ = dotenvy::dotenv();
        Self::load_from(&default_config_path())
    }

    pub fn load_from(config_path: &Path) -> Self {
        let mut map = default_map();

        if config_path.exists() {
            if let Ok(file) = fs::File::open(config_path) {
                let reader = BufReader::new(file);
                for line in reader.lines().map_while(Result::ok) {
                    if let Some((k, v)) = parse_line(&line) {
                        map.insert(k, v);
                    }
                }
            }
        }

        // Overlay environment variables (take precedence)
        for (k, v) in env::vars() {
            if is_config_key(&k) {
                map.insert(k, v);
            }
        }

        Self { inner: map, config_path: config_path.to_path_buf() }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).cloned()
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.inner.insert(key.to_string(), value.into());
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|v| v.trim().parse::<usize>().ok())
    }

    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from)
    }

    pub fn model(&self) -> String {
        self.get("DEFAULT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    pub fn output_path(&self) -> PathBuf {
        self.get_path("OUTPUT_FILE").unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE))
    }

    /// Documents in flight at once; never below one.
    pub fn max_concurrency(&self) -> usize {
        self.get_usize("MAX_CONCURRENCY").unwrap_or(1).max(1)
    }

    /// Seconds; `None` when unset or zero.
    pub fn request_timeout(&self) -> Option<u64> {
        self.get("REQUEST_TIMEOUT")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
    }

    pub fn log_path(&self) -> PathBuf {
        self.get_path("LOG_FILE")
            .unwrap_or_else(|| env::temp_dir().join("invoice_extract").join("invoice-extract.log"))
    }
}

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_OUTPUT_FILE: &str = "results.xlsx";

fn parse_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (k, v) = line.split_once('=')?;
    Some((k.trim().to_string(), v.trim().to_string()))
}

fn is_config_key(k: &str) -> bool {
    const KEYS: &[&str] = &[
        "OPENAI_API_KEY",
        "API_BASE_URL",
        "REQUEST_TIMEOUT",
        "DEFAULT_MODEL",
        "MAX_CONCURRENCY",
        "OUTPUT_FILE",
        "LOG_FILE",
    ];

    KEYS.contains(&k) || k.starts_with("INVOICE_EXTRACT_")
}

fn default_config_path() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("invoice_extract").join(".invoicerc")
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();

    m.insert("API_BASE_URL".into(), "default".into());
    m.insert("DEFAULT_MODEL".into(), DEFAULT_MODEL.into());
    m.insert("OUTPUT_FILE".into(), DEFAULT_OUTPUT_FILE.into());
    m.insert("MAX_CONCURRENCY".into(), "1".into());
    m.insert("REQUEST_TIMEOUT".into(), "0".into());

    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_line_skips_comments_and_blanks() {
        assert_eq!(parse_line("# comment"), None);
        assert_eq!(parse_line("   "), None);
        assert_eq!(parse_line("no equals sign"), None);
        assert_eq!(
            parse_line(" DEFAULT_MODEL = gpt-4o "),
            Some(("DEFAULT_MODEL".to_string(), "gpt-4o".to_string()))
        );
    }

    #[test]
    fn test_rc_file_overrides_defaults() {
        let mut rc = tempfile::NamedTempFile::new().unwrap();
        writeln!(rc, "# local settings").unwrap();
        writeln!(rc, "INVOICE_EXTRACT_TEST_ONLY=from-rc").unwrap();

        let cfg = Config::load_from(rc.path());
        assert_eq!(cfg.get("INVOICE_EXTRACT_TEST_ONLY").as_deref(), Some("from-rc"));
        assert_eq!(cfg.config_path, rc.path());
    }

    #[test]
    fn test_typed_accessors() {
        let mut cfg = Config::load_from(Path::new("/nonexistent/.invoicerc"));
        cfg.set("MAX_CONCURRENCY", "0");
        assert_eq!(cfg.max_concurrency(), 1);
        cfg.set("MAX_CONCURRENCY", "4");
        assert_eq!(cfg.max_concurrency(), 4);

        cfg.set("REQUEST_TIMEOUT", "0");
        assert_eq!(cfg.request_timeout(), None);
        cfg.set("REQUEST_TIMEOUT", "30");
        assert_eq!(cfg.request_timeout(), Some(30));

        cfg.set("OUTPUT_FILE", "out.xlsx");
        assert_eq!(cfg.output_path(), PathBuf::from("out.xlsx"));
    }
}
