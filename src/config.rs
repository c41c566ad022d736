use crate::bracket::GenerateOptions;
use crate::error::ConfigError;
use crate::resolver::LabelBiasedRandom;
use crate::types::{EntrantId, DEFAULT_ENTRANTS};
use serde::{Deserialize, Serialize};
use std::{
    env,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

const DEFAULT_LABELS: [&str; DEFAULT_ENTRANTS] = [
  "Shadowblade", "Lightspeed", "Quantum", "Phoenix",
  "Vortex", "Nebula", "Ironclad", "Tempest",
  "Falconer", "Cinder", "Mirage", "Onyx",
  "Riptide", "Sable", "Zephyr", "Warden",
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrantConfig {
  pub id: EntrantId,
  pub label: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulationConfig {
  pub entrants: Vec<EntrantConfig>,
  pub seed: u64,
  pub shuffle: bool,
  pub grand_finals_reset: bool,
  pub step_delay_ms: u64,
  pub label_bias: f64,
}

impl Default for SimulationConfig {
  fn default() -> Self {
    SimulationConfig {
      entrants: DEFAULT_LABELS
        .iter()
        .enumerate()
        .map(|(i, label)| EntrantConfig { id: i as EntrantId + 1, label: label.to_string() })
        .collect(),
      seed: 0,
      shuffle: true,
      grand_finals_reset: false,
      step_delay_ms: 250,
      label_bias: LabelBiasedRandom::DEFAULT_BIAS,
    }
  }
}

impl SimulationConfig {
  pub fn generate_options(&self) -> GenerateOptions {
    GenerateOptions {
      shuffle_seed: self.shuffle.then_some(self.seed),
      grand_finals_reset: self.grand_finals_reset,
    }
  }

  pub fn step_delay(&self) -> Duration {
    Duration::from_millis(self.step_delay_ms)
  }

  pub fn resolver(&self) -> LabelBiasedRandom {
    LabelBiasedRandom::with_bias(self.seed, self.label_bias)
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.entrants.is_empty() {
      return Err(ConfigError::Invalid("entrants list is empty".to_string()));
    }
    if !self.label_bias.is_finite() {
      return Err(ConfigError::Invalid(format!("labelBias must be a number, got {}", self.label_bias)));
    }
    Ok(())
  }
}

pub fn repo_root() -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn resolve_repo_path(raw: &str) -> PathBuf {
  let path = PathBuf::from(raw);
  if path.is_absolute() {
    path
  } else {
    repo_root().join(path)
  }
}

pub fn config_path() -> PathBuf {
  config_path_with(env_lookup)
}

fn config_path_with(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
  match non_empty(lookup("DUEL_BRACKET_CONFIG")) {
    Some(raw) => resolve_repo_path(&raw),
    None => repo_root().join("bracket.json"),
  }
}

fn env_lookup(key: &str) -> Option<String> {
  env::var(key).ok()
}

fn non_empty(value: Option<String>) -> Option<String> {
  value
    .map(|value| value.trim().to_string())
    .filter(|value| !value.is_empty())
}

fn is_truthy(raw: &str) -> bool {
  let value = raw.trim().to_ascii_lowercase();
  matches!(value.as_str(), "1" | "true" | "yes" | "on")
}

pub fn apply_env_defaults(config: SimulationConfig) -> Result<SimulationConfig, ConfigError> {
  apply_overrides(config, env_lookup)
}

/// Overrides from `lookup`; a present `DUEL_BRACKET_RESET` wins over the file either way.
fn apply_overrides(
  mut config: SimulationConfig,
  lookup: impl Fn(&str) -> Option<String>,
) -> Result<SimulationConfig, ConfigError> {
  if let Some(value) = non_empty(lookup("DUEL_BRACKET_SEED")) {
    config.seed = value
      .parse()
      .map_err(|_| ConfigError::Invalid(format!("DUEL_BRACKET_SEED is not a number: {value}")))?;
  }
  if let Some(value) = non_empty(lookup("DUEL_BRACKET_STEP_DELAY_MS")) {
    config.step_delay_ms = value
      .parse()
      .map_err(|_| ConfigError::Invalid(format!("DUEL_BRACKET_STEP_DELAY_MS is not a number: {value}")))?;
  }
  if let Some(value) = lookup("DUEL_BRACKET_RESET") {
    config.grand_finals_reset = is_truthy(&value);
  }
  Ok(config)
}

pub fn load_config() -> Result<SimulationConfig, ConfigError> {
  load_config_with(env_lookup)
}

fn load_config_with(lookup: impl Fn(&str) -> Option<String>) -> Result<SimulationConfig, ConfigError> {
  let path = config_path_with(&lookup);
  let config = if path.is_file() {
    load_config_from(&path)?
  } else {
    SimulationConfig::default()
  };
  let config = apply_overrides(config, &lookup)?;
  config.validate()?;
  Ok(config)
}

pub fn load_config_from(path: &Path) -> Result<SimulationConfig, ConfigError> {
  let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  serde_json::from_str::<SimulationConfig>(&data).map_err(|source| ConfigError::Parse {
    path: path.to_path_buf(),
    source,
  })
}

pub fn load_env_file() {
  let env_path = repo_root().join(".env");
  if !env_path.is_file() {
    return;
  }
  let contents = match fs::read_to_string(&env_path) {
    Ok(data) => data,
    Err(_) => return,
  };
  for line in contents.lines() {
    if let Some((key, value)) = parse_env_line(line) {
      if env::var_os(&key).is_none() {
        env::set_var(key, value);
      }
    }
  }
}

pub fn parse_env_line(line: &str) -> Option<(String, String)> {
  let trimmed = line.trim();
  if trimmed.is_empty() || trimmed.starts_with('#') {
    return None;
  }
  let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
  let (key, raw_value) = trimmed.split_once('=')?;
  let key = key.trim();
  if key.is_empty() {
    return None;
  }
  let mut value = raw_value.trim();
  if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
    value = &value[1..value.len() - 1];
  } else if value.starts_with('\'') && value.ends_with('\'') && value.len() >= 2 {
    value = &value[1..value.len() - 1];
  } else if let Some(idx) = value.find('#') {
    value = value[..idx].trim_end();
  }
  Some((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_env_line() {
    assert_eq!(parse_env_line("# comment"), None);
    assert_eq!(parse_env_line("   "), None);
    assert_eq!(parse_env_line("=value"), None);
    assert_eq!(
      parse_env_line("export DUEL_BRACKET_SEED=42"),
      Some(("DUEL_BRACKET_SEED".to_string(), "42".to_string()))
    );
    assert_eq!(
      parse_env_line("DUEL_BRACKET_RESET = \"yes\""),
      Some(("DUEL_BRACKET_RESET".to_string(), "yes".to_string()))
    );
    assert_eq!(
      parse_env_line("DUEL_BRACKET_STEP_DELAY_MS=0 # fast"),
      Some(("DUEL_BRACKET_STEP_DELAY_MS".to_string(), "0".to_string()))
    );
  }

  #[test]
  fn test_truthy_values() {
    for raw in ["1", "true", " YES ", "on"] {
      assert!(is_truthy(raw), "{raw}");
    }
    for raw in ["0", "false", "", "nope"] {
      assert!(!is_truthy(raw), "{raw}");
    }
  }

  #[test]
  fn test_default_config() {
    let config = SimulationConfig::default();
    assert_eq!(config.entrants.len(), DEFAULT_ENTRANTS);
    assert_eq!(config.entrants[0], EntrantConfig { id: 1, label: "Shadowblade".to_string() });
    assert_eq!(config.generate_options().shuffle_seed, Some(0));
    assert!(!config.generate_options().grand_finals_reset);
    assert!(config.validate().is_ok());
  }

  #[test]
  fn test_parse_partial_config() {
    let raw = r#"{
      "entrants": [
        {"id": 7, "label": "Onyx"},
        {"id": 8, "label": "Sable"},
        {"id": 9, "label": "Zephyr"},
        {"id": 10, "label": "Warden"}
      ],
      "grandFinalsReset": true,
      "stepDelayMs": 0,
      "shuffle": false
    }"#;
    let config: SimulationConfig = serde_json::from_str(raw).unwrap();
    assert_eq!(config.entrants.len(), 4);
    assert!(config.grand_finals_reset);
    assert_eq!(config.step_delay(), Duration::ZERO);
    assert_eq!(config.generate_options().shuffle_seed, None);
    assert_eq!(config.label_bias, LabelBiasedRandom::DEFAULT_BIAS);
  }

  #[test]
  fn test_load_config_from_missing_file() {
    let path = repo_root().join("does-not-exist.json");
    assert!(matches!(load_config_from(&path), Err(ConfigError::Read { .. })));
  }

  fn vars(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
    move |key| pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| v.to_string())
  }

  fn scratch_file(name: &str, contents: &str) -> PathBuf {
    let dir = env::temp_dir().join(format!("duel-bracket-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
  }

  #[test]
  fn test_env_overrides() {
    let config = apply_overrides(
      SimulationConfig::default(),
      vars(&[
        ("DUEL_BRACKET_SEED", " 42 "),
        ("DUEL_BRACKET_STEP_DELAY_MS", "0"),
        ("DUEL_BRACKET_RESET", "on"),
      ]),
    )
    .unwrap();
    assert_eq!(config.seed, 42);
    assert_eq!(config.step_delay(), Duration::ZERO);
    assert!(config.grand_finals_reset);

    let untouched = apply_overrides(SimulationConfig::default(), vars(&[("DUEL_BRACKET_SEED", "  ")])).unwrap();
    assert_eq!(untouched, SimulationConfig::default());
  }

  #[test]
  fn test_falsy_reset_overrides_file() {
    let file = SimulationConfig { grand_finals_reset: true, ..SimulationConfig::default() };
    let config = apply_overrides(file.clone(), vars(&[("DUEL_BRACKET_RESET", "0")])).unwrap();
    assert!(!config.grand_finals_reset);
    let config = apply_overrides(file, vars(&[])).unwrap();
    assert!(config.grand_finals_reset);
  }

  #[test]
  fn test_non_numeric_overrides_are_invalid() {
    let err = apply_overrides(SimulationConfig::default(), vars(&[("DUEL_BRACKET_SEED", "abc")])).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("DUEL_BRACKET_SEED")));
    let err = apply_overrides(
      SimulationConfig::default(),
      vars(&[("DUEL_BRACKET_STEP_DELAY_MS", "-5")]),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("DUEL_BRACKET_STEP_DELAY_MS")));
  }

  #[test]
  fn test_load_config_from_malformed_file() {
    let path = scratch_file("malformed.json", "{ \"entrants\": [");
    assert!(matches!(load_config_from(&path), Err(ConfigError::Parse { .. })));
  }

  #[test]
  fn test_load_config_reads_configured_path() {
    let path = scratch_file(
      "four.json",
      r#"{"entrants": [{"id": 1, "label": "A"}, {"id": 2, "label": "B"}, {"id": 3, "label": "C"}, {"id": 4, "label": "D"}], "seed": 9}"#,
    );
    let raw = path.to_string_lossy().to_string();
    let lookup = move |key: &str| match key {
      "DUEL_BRACKET_CONFIG" => Some(raw.clone()),
      "DUEL_BRACKET_SEED" => Some("11".to_string()),
      _ => None,
    };
    assert_eq!(config_path_with(&lookup), path);
    let config = load_config_with(&lookup).unwrap();
    assert_eq!(config.entrants.len(), 4);
    assert_eq!(config.seed, 11);

    let missing = load_config_with(vars(&[("DUEL_BRACKET_CONFIG", "no-such-bracket.json")])).unwrap();
    assert_eq!(missing, SimulationConfig::default());
  }

  #[test]
  fn test_load_config_surfaces_parse_errors() {
    let path = scratch_file("broken.json", "not json");
    let raw = path.to_string_lossy().to_string();
    let err = load_config_with(move |key: &str| (key == "DUEL_BRACKET_CONFIG").then(|| raw.clone())).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
  }

  #[test]
  fn test_empty_roster_is_invalid() {
    let config = SimulationConfig { entrants: Vec::new(), ..SimulationConfig::default() };
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
  }
}
