use crate::{ConfigError, display_path, load_cut_config, parse_toml, read_text};
use cutgraph_kernel::{CutConfig, CutFactory, LogPriority, Manager};
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

const MANAGER_TABLE: &str = "manager";

static VAR_PATTERN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}"));

/// Manager options read from a setup file.
///
/// ```toml
/// [manager]
/// logging.priority = "notice"
/// factory.no_preload = false
/// cuts.configuration_files = ["${CUTS_DIR}/energy.toml", "topology.toml"]
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManagerSetup {
    pub logging: LogPriority,
    /// Start from an empty factory instead of the built-in kinds.
    pub no_preload: bool,
    /// Cut files, already expanded and resolved, in load order.
    pub configuration_files: Vec<PathBuf>,
}

impl ManagerSetup {
    /// Read a setup file. Relative cut file paths resolve against the
    /// setup file's directory; `${VAR}` expands from the environment.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = read_text(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Self::parse_with(&text, &display_path(path), base, |name| {
            std::env::var(name).ok()
        })
    }

    /// Parse setup text, expanding variables through `lookup`.
    pub fn parse_with(
        text: &str,
        origin: &str,
        base: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let root = parse_toml(text, origin)?;
        let manager = root
            .get(MANAGER_TABLE)
            .and_then(toml::Value::as_table)
            .ok_or_else(|| ConfigError::Contract(format!("{origin}: missing [manager] table")))?;

        let mut setup = Self::default();
        if let Some(label) = lookup_str(manager, &["logging", "priority"], origin)? {
            setup.logging = LogPriority::from_label(label).ok_or_else(|| {
                ConfigError::Contract(format!("{origin}: unknown logging priority '{label}'"))
            })?;
        }
        if let Some(value) = lookup_path(manager, &["factory", "no_preload"]) {
            setup.no_preload = value.as_bool().ok_or_else(|| {
                ConfigError::Contract(format!("{origin}: factory.no_preload must be a boolean"))
            })?;
        }
        if let Some(value) = lookup_path(manager, &["cuts", "configuration_files"]) {
            let files = value.as_array().ok_or_else(|| {
                ConfigError::Contract(format!(
                    "{origin}: cuts.configuration_files must be an array of strings"
                ))
            })?;
            for file in files {
                let raw = file.as_str().ok_or_else(|| {
                    ConfigError::Contract(format!(
                        "{origin}: cuts.configuration_files must be an array of strings"
                    ))
                })?;
                let expanded = expand_vars_with(raw, &lookup)?;
                setup.configuration_files.push(resolve_path(base, &expanded));
            }
        }
        Ok(setup)
    }

    /// Built-in kinds unless `no_preload` is set.
    pub fn factory(&self) -> CutFactory {
        if self.no_preload {
            CutFactory::new()
        } else {
            CutFactory::with_builtins()
        }
    }

    /// Concatenate every configured cut file, in listed order.
    pub fn load_cut_config(&self) -> Result<CutConfig, ConfigError> {
        let mut config = CutConfig::new();
        for path in &self.configuration_files {
            config.extend(load_cut_config(path)?);
        }
        Ok(config)
    }

    /// Build and initialize a manager from `factory` and the configured
    /// cut files.
    pub fn build_with(&self, factory: CutFactory) -> Result<Manager, ConfigError> {
        let config = self.load_cut_config()?;
        let mut manager = Manager::new(factory).with_logging(self.logging);
        manager.initialize(&config)?;
        Ok(manager)
    }

    /// Build and initialize a manager from [`ManagerSetup::factory`].
    pub fn build(&self) -> Result<Manager, ConfigError> {
        self.build_with(self.factory())
    }
}

fn lookup_path<'a>(table: &'a toml::Table, path: &[&str]) -> Option<&'a toml::Value> {
    let (last, parents) = path.split_last()?;
    let mut current = table;
    for key in parents {
        current = current.get(*key)?.as_table()?;
    }
    current.get(*last)
}

fn lookup_str<'a>(
    table: &'a toml::Table,
    path: &[&str],
    origin: &str,
) -> Result<Option<&'a str>, ConfigError> {
    match lookup_path(table, path) {
        None => Ok(None),
        Some(value) => value.as_str().map(Some).ok_or_else(|| {
            ConfigError::Contract(format!("{origin}: {} must be a string", path.join(".")))
        }),
    }
}

fn resolve_path(base: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Expand `${VAR}` from the process environment.
pub fn expand_vars(text: &str) -> Result<String, ConfigError> {
    expand_vars_with(text, |name| std::env::var(name).ok())
}

/// Expand `${VAR}` through `lookup`. An unknown variable is an error.
pub fn expand_vars_with(
    text: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    let pattern = VAR_PATTERN.as_ref().map_err(|source| {
        ConfigError::Contract(format!("invalid variable pattern: {source}"))
    })?;
    let mut missing = None;
    let expanded = pattern.replace_all(text, |caps: &Captures<'_>| {
        let name = &caps[1];
        lookup(name).unwrap_or_else(|| {
            missing.get_or_insert_with(|| name.to_string());
            String::new()
        })
    });
    match missing {
        Some(name) => Err(ConfigError::UnsetVariable {
            name,
            text: text.to_string(),
        }),
        None => Ok(expanded.into_owned()),
    }
}
