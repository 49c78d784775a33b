//! Per-crate debug flags
//!
//! Crate names come from repeated `--debug <crate>` flags (`all` enables every
//! known crate) and the `FLYWIRE_DEBUG` environment variable.

use std::collections::HashMap;
use std::env;

use crate::KNOWN_CRATES;

/// Crates with debug logging enabled
///
/// # Example
/// ```rust
/// use flywire_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_crate_names(["flywire-connectome"]);
/// assert!(flags.is_enabled("flywire-connectome"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CrateDebugFlags {
    pub enabled_crates: HashMap<String, bool>,
}

impl CrateDebugFlags {
    /// Build from plain crate names; `"all"` enables every known crate
    pub fn from_crate_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut flags = CrateDebugFlags::default();
        for name in names {
            match name.as_ref().trim() {
                "" => {}
                "all" => flags.enable_all(),
                crate_name => flags.enable(crate_name),
            }
        }
        flags
    }

    /// Merge crate names from the `FLYWIRE_DEBUG` environment variable
    ///
    /// Format: comma-separated crate names, or `all`.
    pub fn with_env(mut self) -> Self {
        if let Ok(env_var) = env::var("FLYWIRE_DEBUG") {
            let from_env = Self::from_crate_names(env_var.split(','));
            self.enabled_crates.extend(from_env.enabled_crates);
        }
        self
    }

    pub fn enable(&mut self, crate_name: &str) {
        self.enabled_crates.insert(crate_name.to_string(), true);
    }

    pub fn enable_all(&mut self) {
        for crate_name in KNOWN_CRATES {
            self.enable(crate_name);
        }
    }

    /// Check if debug is enabled for a specific crate
    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.contains_key(crate_name)
    }

    /// Create a tracing filter string from debug flags
    ///
    /// Tracing targets are module paths, so `flywire-connectome` becomes
    /// `flywire_connectome=debug`. `default_level` applies to everything else.
    pub fn to_filter_string(&self, default_level: &str) -> String {
        let mut crate_names: Vec<&String> = self.enabled_crates.keys().collect();
        crate_names.sort();

        let mut filters: Vec<String> = crate_names
            .into_iter()
            .map(|name| format!("{}=debug", name.replace('-', "_")))
            .collect();
        filters.push(default_level.to_lowercase());
        filters.join(",")
    }
}

/// Generate help text for debug flags
pub fn debug_flags_help() -> String {
    format!(
        r#"Debug Flags:
  --debug <crate-name>           Enable debug logging for a crate (repeatable)
  --debug-all                    Enable debug logging for all crates

Available crates:
  {}

Environment Variable:
  FLYWIRE_DEBUG={{crate-name}}[,{{crate-name}}]  Enable debug for crates (comma-separated)
  FLYWIRE_DEBUG=all                               Enable debug for all crates
"#,
        KNOWN_CRATES.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_crate_flag() {
        let flags = CrateDebugFlags::from_crate_names(["flywire-connectome"]);
        assert!(flags.is_enabled("flywire-connectome"));
        assert!(!flags.is_enabled("flywire-config"));
    }

    #[test]
    fn test_debug_all() {
        let mut flags = CrateDebugFlags::default();
        flags.enable_all();
        for crate_name in KNOWN_CRATES {
            assert!(flags.is_enabled(crate_name), "{} should be enabled", crate_name);
        }
    }

    #[test]
    fn test_from_crate_names() {
        let flags = CrateDebugFlags::from_crate_names(["flywire-config", " ", "flywire"]);
        assert!(flags.is_enabled("flywire-config"));
        assert!(flags.is_enabled("flywire"));
        assert_eq!(flags.enabled_crates.len(), 2);

        let all = CrateDebugFlags::from_crate_names(["all"]);
        assert_eq!(all.enabled_crates.len(), KNOWN_CRATES.len());
    }

    #[test]
    fn test_filter_string() {
        let flags = CrateDebugFlags::from_crate_names(["flywire-connectome", "flywire-config"]);
        assert_eq!(
            flags.to_filter_string("WARN"),
            "flywire_config=debug,flywire_connectome=debug,warn"
        );
        assert_eq!(CrateDebugFlags::default().to_filter_string("info"), "info");
    }
}
