//! Loader for workspace configuration with YAML + environment overlays.
//!
//! The suggestion-service token is deliberately an `Option<String>`: its
//! absence is a supported state that disables address autocompletion while
//! leaving the rest of the page running. Presence is checked once at wiring
//! time, not here.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct KassaConfig {
    pub version: Option<String>,
    pub suggestions: SuggestionsConfig,
    #[serde(default)]
    pub page: PageConfig,
}

/// Settings for the external address-suggestion service.
#[derive(Debug, Deserialize)]
pub struct SuggestionsConfig {
    /// Access token for the suggestion API. `None` disables the binder.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_suggest_endpoint")]
    pub endpoint: String,
    /// Maximum suggestions requested per query.
    #[serde(default = "default_suggest_count")]
    pub count: u8,
    /// Minimum typed characters before a query fires.
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,
}

/// Layout metrics for the headless page; the difference between the two
/// widths is the scrollbar width used for modal padding compensation.
#[derive(Debug, Deserialize)]
pub struct PageConfig {
    #[serde(default = "default_inner_width")]
    pub inner_width: f64,
    #[serde(default = "default_body_width")]
    pub body_width: f64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            inner_width: default_inner_width(),
            body_width: default_body_width(),
        }
    }
}

fn default_suggest_endpoint() -> String {
    "https://suggestions.dadata.ru/suggestions/api/4_1/rs/".into()
}
fn default_suggest_count() -> u8 {
    5
}
fn default_min_chars() -> usize {
    3
}
fn default_inner_width() -> f64 {
    1280.0
}
fn default_body_width() -> f64 {
    1263.0
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct KassaConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for KassaConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl KassaConfigLoader {
    /// Start with sensible defaults: YAML file + `KASSA_` env overrides.
    ///
    /// ```
    /// use kassa_config::KassaConfigLoader;
    ///
    /// let config = KassaConfigLoader::new()
    ///     .with_yaml_str("version: '1'\nsuggestions: {}")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert!(config.suggestions.token.is_none());
    /// assert_eq!(config.suggestions.min_chars, 3);
    /// ```
    pub fn new() -> Self {
        let builder =
            Config::builder().add_source(Environment::with_prefix("KASSA").separator("__"));
        Self { builder }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use kassa_config::KassaConfigLoader;
    ///
    /// let cfg = KassaConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// suggestions:
    ///   token: "example"
    ///   count: 10
    /// page:
    ///   inner_width: 1920
    ///   body_width: 1903
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.suggestions.token.as_deref(), Some("example"));
    /// assert_eq!(cfg.suggestions.count, 10);
    /// assert_eq!(cfg.page.inner_width, 1920.0);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// The loader combines YAML snippets with `KASSA_`-prefixed environment
    /// variables and expands `${VAR}` placeholders before materialising
    /// strongly typed structs.
    ///
    /// ```
    /// use kassa_config::KassaConfigLoader;
    ///
    /// unsafe { std::env::set_var("SUGGEST_TOKEN", "injected-from-env"); }
    ///
    /// let config = KassaConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// version: "1"
    /// suggestions:
    ///   token: "${SUGGEST_TOKEN}"
    /// "#,
    ///     )
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.suggestions.token.as_deref(), Some("injected-from-env"));
    /// assert!(config.suggestions.endpoint.contains("dadata"));
    ///
    /// unsafe { std::env::remove_var("SUGGEST_TOKEN"); }
    /// ```
    pub fn load(self) -> Result<KassaConfig, ConfigError> {
        let cfg = self.builder.build()?;

        // Convert to serde_json::Value first
        let mut v: Value = cfg.try_deserialize()?;
        // Recursively expand environment variables
        expand_env_in_value(&mut v);

        let typed: KassaConfig =
            serde_json::from_value(v).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FOO", Some("bar"), || {
            let mut v = json!("prefix-${FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars([("CITY", Some("Samara")), ("ZIP", Some("443001"))], || {
            let mut v = json!([
                "hello-$CITY",
                { "loc": "${CITY}-${ZIP}" },
                42,
                true,
                null
            ]);
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!(["hello-Samara", { "loc": "Samara-443001" }, 42, true, null])
            );
        });
    }

    #[test]
    fn expands_recursively_across_env_values() {
        temp_env::with_vars(
            [
                // BAR references BAZ; FOO references BAR — two hops.
                ("BAZ", Some("qux")),
                ("BAR", Some("mid-${BAZ}")),
                ("FOO", Some("start-${BAR}-end")),
            ],
            || {
                let mut v = json!("X=${FOO}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("X=start-mid-qux-end"));
            },
        );
    }

    #[test]
    fn stops_on_cycles_and_leaves_value_reasonable() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            // Terminates via the depth cap; exact remainder is unimportant.
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${DOES_NOT_EXIST}"));
    }

    #[test]
    fn missing_token_is_not_an_error() {
        let cfg = KassaConfigLoader::new()
            .with_yaml_str("suggestions: {}")
            .load()
            .expect("config without token still loads");
        assert!(cfg.suggestions.token.is_none());
        assert_eq!(cfg.suggestions.count, 5);
    }
}
