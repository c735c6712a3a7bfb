use std::collections::{HashMap, HashSet};
use std::env;
use std::fs;
use std::path::PathBuf;
use anyhow::{Context, Result};
use toml::Value;
use log::{debug, info};

use crate::mining::{default_bug_labels, Language, DEFAULT_FIX_REGEX};

/// Configuration storage - section_name -> key -> value
pub type Configuration = HashMap<String, HashMap<String, String>>;

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV_VAR: &str = "FAILPRONE_CONFIG";

/// Settings of the `[mining]` section
#[derive(Debug, Clone, PartialEq)]
pub struct MiningConfig {
    /// Branch to mine; the repository's current branch when unset
    pub branch: Option<String>,
    pub language: Language,
    pub labels: HashSet<String>,
    pub regex: String,
    pub max_threads: usize,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            branch: None,
            language: Language::Ansible,
            labels: default_bug_labels(),
            regex: DEFAULT_FIX_REGEX.to_string(),
            max_threads: num_cpus::get(),
        }
    }
}

impl MiningConfig {
    pub fn validate(&self) -> Result<()> {
        regex::Regex::new(&self.regex)
            .with_context(|| format!("Invalid fixing-commit regex: {}", self.regex))?;

        if self.labels.is_empty() {
            anyhow::bail!("At least one bug label is required");
        }

        if self.max_threads == 0 {
            anyhow::bail!("max-threads must be greater than 0");
        }

        Ok(())
    }
}

/// Configuration manager
pub struct ConfigManager {
    config: Configuration,
    config_file_path: Option<PathBuf>,
    selected_section: Option<String>,
}

impl ConfigManager {
    /// Create a new ConfigManager from a Configuration (primarily for testing)
    pub fn from_config(config: Configuration) -> Self {
        Self {
            config,
            config_file_path: None,
            selected_section: None,
        }
    }

    /// Load configuration using discovery hierarchy
    pub fn load() -> Result<Self> {
        debug!("Starting configuration discovery");

        for path in discover_config_files() {
            debug!("Attempting to load config from: {}", path.display());
            if path.exists() {
                return Self::load_from_file(path);
            }
        }

        info!("No configuration file found, using defaults");
        Ok(Self::from_config(Configuration::new()))
    }

    /// Load configuration from explicit file path
    pub fn load_from_file(path: PathBuf) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = parse_toml_config(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        info!("Loaded configuration from: {}", path.display());
        Ok(Self {
            config,
            config_file_path: Some(path),
            selected_section: None,
        })
    }

    pub fn config_file_path(&self) -> Option<&PathBuf> {
        self.config_file_path.as_ref()
    }

    /// Get value from configuration with section fallback
    pub fn get_value(&self, section: &str, key: &str) -> Option<&String> {
        // Priority: selected_section -> specified section -> base
        if let Some(selected) = &self.selected_section {
            if let Some(value) = self.config.get(selected).and_then(|s| s.get(key)) {
                return Some(value);
            }
        }

        if let Some(value) = self.config.get(section).and_then(|s| s.get(key)) {
            return Some(value);
        }

        self.config.get("base").and_then(|s| s.get(key))
    }

    /// Select configuration section for --config-name
    pub fn select_section(&mut self, section: String) {
        debug!("Selecting configuration section: {}", section);
        self.selected_section = Some(section);
    }

    /// Get boolean value with type conversion
    pub fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>> {
        match self.get_value(section, key) {
            Some(value) => match value.to_lowercase().as_str() {
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                _ => Err(anyhow::anyhow!("Invalid boolean value for {}.{}: {}", section, key, value)),
            },
            None => Ok(None),
        }
    }

    /// Get log level value with type conversion
    pub fn get_log_level(&self, section: &str, key: &str) -> Result<Option<log::LevelFilter>> {
        match self.get_value(section, key) {
            Some(value) => Ok(Some(crate::logging::parse_log_level(value)?)),
            None => Ok(None),
        }
    }

    /// Get path value with type conversion
    pub fn get_path(&self, section: &str, key: &str) -> Option<PathBuf> {
        self.get_value(section, key).map(PathBuf::from)
    }

    /// Get a list from a TOML array of strings or a comma-separated string
    pub fn get_list(&self, section: &str, key: &str) -> Result<Option<Vec<String>>> {
        let Some(value) = self.get_value(section, key) else {
            return Ok(None);
        };

        if value.trim_start().starts_with('[') {
            let parsed: Value = format!("list = {}", value)
                .parse::<toml::Table>()
                .map(Value::Table)
                .with_context(|| format!("Invalid list for {}.{}: {}", section, key, value))?;
            let items = parsed
                .get("list")
                .and_then(Value::as_array)
                .map(|items| items.iter().map(toml_value_to_string).collect())
                .unwrap_or_default();
            return Ok(Some(items));
        }

        Ok(Some(
            value
                .split(',')
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
        ))
    }

    /// Get mining configuration from the `[mining]` section
    pub fn get_mining_config(&self) -> Result<MiningConfig> {
        let mut config = MiningConfig::default();

        if let Some(branch) = self.get_value("mining", "branch") {
            config.branch = Some(branch.clone());
        }

        if let Some(language) = self.get_value("mining", "language") {
            config.language = language
                .parse::<Language>()
                .map_err(|e: String| anyhow::anyhow!(e))
                .context("Invalid language value in config")?;
        }

        if let Some(labels) = self.get_list("mining", "labels")? {
            config.labels = labels.into_iter().collect();
        }

        if let Some(regex) = self.get_value("mining", "regex") {
            config.regex = regex.clone();
        }

        if let Some(max_threads_str) = self.get_value("mining", "max-threads") {
            config.max_threads = max_threads_str
                .parse::<usize>()
                .with_context(|| format!("Invalid max-threads value in config: {}", max_threads_str))?;
        }

        config
            .validate()
            .with_context(|| "Mining configuration validation failed")?;

        Ok(config)
    }
}

/// Discover configuration files in order of precedence
fn discover_config_files() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        paths.push(PathBuf::from(env_path));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("failprone").join("config.toml"));
    }

    if let Some(home_dir) = dirs::home_dir() {
        paths.push(home_dir.join(".failprone.toml"));
    }

    paths.push(PathBuf::from("./.failprone.toml"));

    debug!("Config discovery paths: {:?}", paths);
    paths
}

/// Parse TOML content to string-based configuration
fn parse_toml_config(content: &str) -> Result<Configuration> {
    let table: toml::Table = content.parse().context("Failed to parse TOML content")?;

    let mut config = Configuration::new();
    flatten_toml_table(&table, String::new(), &mut config);

    debug!("Parsed configuration: {:?}", config);
    Ok(config)
}

/// Recursively flatten TOML tables into section.subsection format
fn flatten_toml_table(table: &toml::Table, prefix: String, config: &mut Configuration) {
    for (key, value) in table {
        let section_name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            Value::Table(subtable) if subtable.values().all(|v| !v.is_table()) => {
                config.entry(section_name).or_default().extend(
                    subtable
                        .iter()
                        .map(|(subkey, subvalue)| (subkey.clone(), toml_value_to_string(subvalue))),
                );
            }
            Value::Table(subtable) => flatten_toml_table(subtable, section_name, config),
            _ => {
                // Top-level keys live in the base section
                config
                    .entry("base".to_string())
                    .or_default()
                    .insert(section_name, toml_value_to_string(value));
            }
        }
    }
}

/// Convert TOML Value to string representation
fn toml_value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Datetime(d) => d.to_string(),
        Value::Array(_) | Value::Table(_) => value.to_string(),
    }
}
