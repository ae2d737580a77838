use std::path::PathBuf;
use std::time::Duration;

/// Browser launch and navigation settings.
///
/// Built once and handed to every session launch; sessions never mutate it.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Navigation timeout applied to every page load
    pub page_load_timeout: Duration,
    /// Timeout for a single element action (click, fill)
    pub action_timeout: Duration,
    /// Wait after the first navigation so client-side rendering can settle
    pub settle_delay: Duration,
    /// Wait after a click, back navigation or viewport change
    pub step_delay: Duration,
    /// Explicit browser executable; discovered from common locations when unset
    pub executable: Option<PathBuf>,
    pub args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1920,
            viewport_height: 1080,
            page_load_timeout: Duration::from_secs(30),
            action_timeout: Duration::from_secs(5),
            settle_delay: Duration::from_secs(2),
            step_delay: Duration::from_secs(1),
            executable: None,
            args: [
                "--no-sandbox",
                "--disable-setuid-sandbox",
                "--disable-dev-shm-usage",
                "--disable-gpu",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub browser: BrowserConfig,

    /// Maximum number of test cases executed per batch
    pub execution_limit: usize,

    /// Root directory for per-session artifacts
    pub output_dir: PathBuf,

    /// Provider tried first when none is requested
    pub default_provider: String,

    pub anthropic_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser: BrowserConfig::default(),
            execution_limit: 10,
            output_dir: PathBuf::from("./downloads"),
            default_provider: "claude".to_string(),
            anthropic_api_key: None,
            gemini_api_key: None,
        }
    }
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup, falling back to
    /// defaults for missing or unparsable values
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let millis = |key: &str, fallback: Duration| {
            value(key)
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(fallback)
        };

        let browser = BrowserConfig {
            headless: value("SCOUT_HEADLESS")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.browser.headless),
            page_load_timeout: millis(
                "SCOUT_PAGE_LOAD_TIMEOUT_MS",
                defaults.browser.page_load_timeout,
            ),
            action_timeout: millis("SCOUT_ACTION_TIMEOUT_MS", defaults.browser.action_timeout),
            settle_delay: millis("SCOUT_SETTLE_MS", defaults.browser.settle_delay),
            step_delay: millis("SCOUT_STEP_DELAY_MS", defaults.browser.step_delay),
            executable: value("SCOUT_BROWSER_PATH").map(PathBuf::from),
            ..defaults.browser
        };

        Self {
            browser,
            execution_limit: value("SCOUT_EXECUTION_LIMIT")
                .and_then(|v| v.parse().ok())
                .filter(|limit| *limit > 0)
                .unwrap_or(defaults.execution_limit),
            output_dir: value("SCOUT_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            default_provider: value("DEFAULT_AI_PROVIDER")
                .map(|v| v.to_lowercase())
                .unwrap_or(defaults.default_provider),
            anthropic_api_key: value("ANTHROPIC_API_KEY"),
            gemini_api_key: value("GEMINI_API_KEY"),
        }
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = config_from(&[]);
        assert!(config.browser.headless);
        assert_eq!(config.browser.page_load_timeout, Duration::from_secs(30));
        assert_eq!(config.execution_limit, 10);
        assert_eq!(config.default_provider, "claude");
        assert!(config.anthropic_api_key.is_none());
    }

    #[test]
    fn test_overrides_from_environment() {
        let config = config_from(&[
            ("SCOUT_HEADLESS", "false"),
            ("SCOUT_SETTLE_MS", "250"),
            ("SCOUT_EXECUTION_LIMIT", "3"),
            ("DEFAULT_AI_PROVIDER", "Gemini"),
            ("GEMINI_API_KEY", "key-123"),
        ]);
        assert!(!config.browser.headless);
        assert_eq!(config.browser.settle_delay, Duration::from_millis(250));
        assert_eq!(config.execution_limit, 3);
        assert_eq!(config.default_provider, "gemini");
        assert_eq!(config.gemini_api_key.as_deref(), Some("key-123"));
    }

    #[test]
    fn test_unparsable_values_keep_defaults() {
        let config = config_from(&[
            ("SCOUT_PAGE_LOAD_TIMEOUT_MS", "soon"),
            ("SCOUT_EXECUTION_LIMIT", "0"),
            ("ANTHROPIC_API_KEY", "   "),
        ]);
        assert_eq!(config.browser.page_load_timeout, Duration::from_secs(30));
        assert_eq!(config.execution_limit, 10);
        assert!(config.anthropic_api_key.is_none());
    }
}
