//! Platform-owned module names exempt from reference checking.

/// Built-in prefixes of runtime and framework modules.
pub const BUILTIN_SYSTEM_PREFIXES: &[&str] = &[
    "Microsoft",
    "System",
    "mscorlib",
    "PresentationFramework",
    "WindowsBase",
    "PresentationCore",
];

/// Name prefixes whose modules are owned by the platform.
///
/// # Example
///
/// ```
/// use libcheck::filter::SystemPrefixSet;
///
/// let prefixes = SystemPrefixSet::builtin();
/// assert!(prefixes.is_system("System.Core"));
/// assert!(prefixes.is_system("MSCORLIB"));
/// assert!(!prefixes.is_system("Newtonsoft.Json"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemPrefixSet {
    prefixes: Vec<String>,
}

impl SystemPrefixSet {
    /// The built-in prefix set.
    pub fn builtin() -> Self {
        Self::new(BUILTIN_SYSTEM_PREFIXES.iter().copied())
    }

    /// A set of exactly the given prefixes.
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Add more prefixes.
    pub fn extend<I, S>(&mut self, prefixes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefixes.extend(prefixes.into_iter().map(Into::into));
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Whether `name` starts with any prefix, ignoring case.
    pub fn is_system(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.prefixes
            .iter()
            .any(|p| name.starts_with(&p.to_lowercase()))
    }
}

impl Default for SystemPrefixSet {
    fn default() -> Self {
        Self::builtin()
    }
}
