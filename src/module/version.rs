//! Four-part module versions.

use std::fmt;
use std::str::FromStr;

/// A `major.minor.build.revision` version as stored in module metadata.
///
/// Ordering is numeric and field by field, so `1.10.0.0 > 1.9.0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ModuleVersion {
    pub major: u16,
    pub minor: u16,
    pub build: u16,
    pub revision: u16,
}

impl ModuleVersion {
    /// Create a version from its four fields.
    pub const fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }

    fn fields(&self) -> [u16; 4] {
        [self.major, self.minor, self.build, self.revision]
    }

    /// Render the part of `self` (the required version) that differs from
    /// `available`.
    ///
    /// Fields before the first difference are masked with `x`; a difference
    /// in the major field yields the full version.
    ///
    /// # Example
    ///
    /// ```
    /// use libcheck::module::ModuleVersion;
    ///
    /// let required = ModuleVersion::new(2, 5, 1, 0);
    /// assert_eq!(required.significant_difference(&ModuleVersion::new(2, 3, 9, 9)), "x.5.1.0");
    /// assert_eq!(required.significant_difference(&ModuleVersion::new(1, 5, 1, 0)), "2.5.1.0");
    /// ```
    pub fn significant_difference(&self, available: &ModuleVersion) -> String {
        let required = self.fields();
        let available = available.fields();
        // Equal versions report the revision field.
        let first = (0..3)
            .find(|&i| required[i] != available[i])
            .unwrap_or(3);

        required
            .iter()
            .enumerate()
            .map(|(i, field)| {
                if i < first {
                    "x".to_string()
                } else {
                    field.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for ModuleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

impl FromStr for ModuleVersion {
    type Err = String;

    /// Parse `major[.minor[.build[.revision]]]`; omitted fields are zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.is_empty() || parts.len() > 4 {
            return Err(format!("invalid version: {}", s));
        }

        let mut fields = [0u16; 4];
        for (slot, part) in fields.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| format!("invalid version: {}", s))?;
        }

        Ok(Self::new(fields[0], fields[1], fields[2], fields[3]))
    }
}
