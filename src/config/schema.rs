//! Configuration schema.
//!
//! Maps the optional YAML configuration file onto typed settings.

use serde::{Deserialize, Serialize};

use crate::filter::SystemPrefixSet;

/// Root of the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckConfig {
    /// Extra reference name prefixes treated as platform modules.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub system_prefixes: Vec<String>,

    /// Use only `system_prefixes`, dropping the built-in set.
    #[serde(skip_serializing_if = "is_false")]
    pub replace_system_prefixes: bool,

    /// File extensions to catalog, without the leading dot.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            system_prefixes: Vec::new(),
            replace_system_prefixes: false,
            extensions: default_extensions(),
        }
    }
}

impl CheckConfig {
    /// The effective set of exempt reference prefixes.
    pub fn system_prefix_set(&self) -> SystemPrefixSet {
        if self.replace_system_prefixes {
            return SystemPrefixSet::new(self.system_prefixes.iter().cloned());
        }
        let mut set = SystemPrefixSet::builtin();
        set.extend(self.system_prefixes.iter().cloned());
        set
    }
}

fn default_extensions() -> Vec<String> {
    vec!["dll".to_string()]
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: CheckConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, CheckConfig::default());
        assert_eq!(config.extensions, ["dll"]);
    }

    #[test]
    fn prefixes_extend_builtin_set() {
        let config: CheckConfig = serde_yaml::from_str("system_prefixes: [Newtonsoft]").unwrap();
        let set = config.system_prefix_set();
        assert!(set.is_system("Newtonsoft.Json"));
        assert!(set.is_system("System.Core"));
    }

    #[test]
    fn replace_drops_builtin_set() {
        let yaml = "system_prefixes: [Vendor]\nreplace_system_prefixes: true\n";
        let config: CheckConfig = serde_yaml::from_str(yaml).unwrap();
        let set = config.system_prefix_set();
        assert!(set.is_system("Vendor.Sdk"));
        assert!(!set.is_system("System.Core"));
    }

    #[test]
    fn extensions_can_be_overridden() {
        let config: CheckConfig = serde_yaml::from_str("extensions: [dll, exe]").unwrap();
        assert_eq!(config.extensions, ["dll", "exe"]);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<CheckConfig, _> = serde_yaml::from_str("prefixes: [Foo]");
        assert!(result.is_err());
    }
}
