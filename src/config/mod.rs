use crate::console::VerbosityLevel;
use crate::routing::Department;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::Path, path::PathBuf, time::Duration};

pub mod error;

pub use error::{ConfigError, ConfigResult};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct DispatcherSettings {
    pub cache_ttl_ms: u64,
    pub timeout_ms: u64,
    pub failure_threshold: usize,
    pub failure_window_ms: u64,
    pub cache_capacity: usize,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            cache_ttl_ms: 5 * 60 * 1000,
            timeout_ms: 10_000,
            failure_threshold: 3,
            failure_window_ms: 60_000,
            cache_capacity: 512,
        }
    }
}

impl DispatcherSettings {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn failure_window(&self) -> Duration {
        Duration::from_millis(self.failure_window_ms)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct RoutingThresholds {
    pub simple: f32,
    pub moderate: f32,
    pub complex: f32,
    pub enterprise: f32,
}

impl Default for RoutingThresholds {
    fn default() -> Self {
        Self {
            simple: 0.3,
            moderate: 0.6,
            complex: 0.8,
            enterprise: 0.9,
        }
    }
}

/// Weighted signal tables for the complexity score.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct KeywordWeights {
    pub keywords: BTreeMap<String, f32>,
    pub scope: BTreeMap<String, f32>,
    pub technology: BTreeMap<String, f32>,
}

impl Default for KeywordWeights {
    fn default() -> Self {
        Self {
            keywords: weight_table(&[
                ("implement", 0.7),
                ("create", 0.6),
                ("build", 0.6),
                ("develop", 0.6),
                ("design", 0.5),
                ("refactor", 0.5),
                ("optimize", 0.6),
                ("migrate", 0.7),
                ("integrate", 0.6),
                ("analyze", 0.4),
                ("fix", 0.2),
                ("update", 0.3),
                ("enterprise", 0.9),
                ("architecture", 0.8),
                ("platform", 0.8),
                ("system", 0.7),
                ("ecosystem", 0.9),
                ("transformation", 0.9),
                ("scalable", 0.7),
                ("distributed", 0.8),
            ]),
            scope: weight_table(&[
                ("single", 0.2),
                ("multiple", 0.5),
                ("complete", 0.9),
                ("entire", 0.9),
                ("full", 0.8),
                ("comprehensive", 0.9),
            ]),
            technology: weight_table(&[
                ("api", 0.5),
                ("database", 0.6),
                ("microservices", 0.9),
                ("cloud", 0.7),
                ("ai", 0.8),
                ("machine-learning", 0.9),
                ("blockchain", 0.9),
            ]),
        }
    }
}

fn weight_table(entries: &[(&str, f32)]) -> BTreeMap<String, f32> {
    entries
        .iter()
        .map(|(word, weight)| (word.to_string(), *weight))
        .collect()
}

fn word_list(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct DepartmentKeywords {
    pub strategic: Vec<String>,
    pub experience: Vec<String>,
    pub technical: Vec<String>,
}

impl Default for DepartmentKeywords {
    fn default() -> Self {
        Self {
            strategic: word_list(&[
                "business",
                "strategy",
                "market",
                "requirements",
                "prd",
                "roadmap",
                "stakeholder",
                "competitor",
                "revenue",
                "pricing",
                "user-story",
            ]),
            experience: word_list(&[
                "design",
                "ui",
                "ux",
                "frontend",
                "interface",
                "component",
                "figma",
                "accessibility",
                "responsive",
                "wireframe",
                "prototype",
                "visual",
            ]),
            technical: word_list(&[
                "backend",
                "api",
                "database",
                "security",
                "infrastructure",
                "deployment",
                "performance",
                "architecture",
                "server",
                "auth",
                "integration",
            ]),
        }
    }
}

impl DepartmentKeywords {
    pub fn for_department(&self, department: Department) -> &[String] {
        match department {
            Department::Strategic => &self.strategic,
            Department::Experience => &self.experience,
            Department::Technical => &self.technical,
        }
    }
}

/// Specialist roles that can assist a primary department.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SpecialistRoster {
    pub strategic: Vec<String>,
    pub experience: Vec<String>,
    pub technical: Vec<String>,
}

impl Default for SpecialistRoster {
    fn default() -> Self {
        Self {
            strategic: word_list(&[
                "market-research",
                "product-strategy",
                "business-analysis",
                "competitive-analysis",
            ]),
            experience: word_list(&[
                "ux-research",
                "ui-design",
                "accessibility",
                "frontend-architecture",
            ]),
            technical: word_list(&[
                "backend-engineering",
                "database-design",
                "security-audit",
                "devops",
            ]),
        }
    }
}

impl SpecialistRoster {
    pub fn for_department(&self, department: Department) -> &[String] {
        match department {
            Department::Strategic => &self.strategic,
            Department::Experience => &self.experience,
            Department::Technical => &self.technical,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct RoutingSettings {
    pub thresholds: RoutingThresholds,
    pub weights: KeywordWeights,
    pub departments: DepartmentKeywords,
    pub executive_keywords: Vec<String>,
    pub coordination_terms: Vec<String>,
    pub specialists: SpecialistRoster,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            thresholds: RoutingThresholds::default(),
            weights: KeywordWeights::default(),
            departments: DepartmentKeywords::default(),
            executive_keywords: word_list(&[
                "enterprise",
                "organization",
                "platform",
                "ecosystem",
                "transformation",
                "initiative",
                "company-wide",
                "strategic-planning",
                "resource-allocation",
            ]),
            coordination_terms: word_list(&["platform", "system", "complete"]),
            specialists: SpecialistRoster::default(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct HookSettings {
    pub pre_execution: Vec<String>,
    pub coordinated: Vec<String>,
    pub post_execution: Vec<String>,
    pub memory_limit_mb: u64,
    pub blocked_commands: Vec<String>,
    pub blocked_paths: Vec<String>,
    pub elevated_permissions: Vec<String>,
    pub notification_player: Option<String>,
    pub sounds_dir: Option<PathBuf>,
}

impl Default for HookSettings {
    fn default() -> Self {
        Self {
            pre_execution: word_list(&["security", "resource"]),
            coordinated: word_list(&["policy"]),
            post_execution: word_list(&["quality", "completion"]),
            memory_limit_mb: 1024,
            blocked_commands: word_list(&[
                "rm -rf*",
                "rm -fr*",
                "sudo *",
                "doas *",
                "dd if=*",
                "dd of=*",
                "mkfs*",
                "fdisk*",
                "chmod 777*",
                "chmod -r 777*",
                "*> /dev/sd*",
                "*of=/dev/*",
                "shutdown*",
                "reboot*",
                "halt*",
                "poweroff*",
                ":(){*",
                "*curl*|*sh*",
                "*wget*|*sh*",
                "*eval*$(*",
            ]),
            blocked_paths: word_list(&[
                "/etc",
                "/usr",
                "/bin",
                "/sbin",
                "/boot",
                "/sys",
                "/proc",
                "/System",
                "~/.ssh",
                "~/.aws",
                "~/.gnupg",
            ]),
            elevated_permissions: word_list(&[
                "sudo",
                "root",
                "admin",
                "superuser",
                "system:write",
            ]),
            notification_player: None,
            sounds_dir: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub verbosity: Option<String>,
    pub dispatcher: DispatcherSettings,
    pub routing: RoutingSettings,
    pub hooks: HookSettings,
}

impl AppConfig {
    /// Load from the default location, falling back to defaults when no file exists.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if !config_path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))
    }

    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path).map_err(ConfigError::io(path))?;
        let config: AppConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::io(parent))?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(ConfigError::io(path))?;
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
            .context("Failed to write config file")
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let t = &self.routing.thresholds;
        let ordered = [
            ("simple", t.simple),
            ("moderate", t.moderate),
            ("complex", t.complex),
            ("enterprise", t.enterprise),
        ];
        if let Some(&(name, value)) = ordered
            .iter()
            .find(|(_, value)| !(0.0..=1.0).contains(value))
        {
            return Err(ConfigError::ThresholdOutOfRange { name, value });
        }
        if ordered.windows(2).any(|pair| pair[0].1 > pair[1].1) {
            return Err(ConfigError::ThresholdsUnordered);
        }

        let weights = &self.routing.weights;
        let tables = [
            ("keywords", &weights.keywords),
            ("scope", &weights.scope),
            ("technology", &weights.technology),
        ];
        for (table, entries) in tables {
            if let Some(word) = entries
                .iter()
                .find(|(_, weight)| !weight.is_finite())
                .map(|(word, _)| word.clone())
            {
                return Err(ConfigError::NonFiniteWeight { table, word });
            }
        }

        if self.dispatcher.failure_threshold == 0 {
            return Err(ConfigError::ZeroSetting {
                field: "dispatcher.failure_threshold",
            });
        }
        if self.dispatcher.timeout_ms == 0 {
            return Err(ConfigError::ZeroSetting {
                field: "dispatcher.timeout_ms",
            });
        }

        Ok(())
    }

    /// Get the configured verbosity level, falling back to Normal if not set
    pub fn get_verbosity(&self) -> VerbosityLevel {
        self.verbosity
            .as_ref()
            .and_then(|v| v.parse().ok())
            .unwrap_or(VerbosityLevel::Normal)
    }

    pub fn config_path() -> ConfigResult<PathBuf> {
        let mut path = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
        path.push(".config");
        path.push("bumba");
        path.push("config.toml");
        Ok(path)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
