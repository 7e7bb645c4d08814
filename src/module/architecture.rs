//! Architecture descriptors: what processor a module was built for.

use std::fmt;

use goblin::pe::header::{
    COFF_MACHINE_ARM64, COFF_MACHINE_ARMNT, COFF_MACHINE_IA64, COFF_MACHINE_X86,
    COFF_MACHINE_X86_64,
};

/// The COFF machine field of a module image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MachineKind {
    I386,
    Amd64,
    Ia64,
    Arm,
    Arm64,
    /// Any machine code libcheck does not name.
    Unknown(u16),
}

impl MachineKind {
    /// Map a raw COFF machine code.
    pub fn from_code(code: u16) -> Self {
        match code {
            COFF_MACHINE_X86 => Self::I386,
            COFF_MACHINE_X86_64 => Self::Amd64,
            COFF_MACHINE_IA64 => Self::Ia64,
            COFF_MACHINE_ARMNT => Self::Arm,
            COFF_MACHINE_ARM64 => Self::Arm64,
            other => Self::Unknown(other),
        }
    }

    /// The raw COFF machine code.
    pub fn code(&self) -> u16 {
        match self {
            Self::I386 => COFF_MACHINE_X86,
            Self::Amd64 => COFF_MACHINE_X86_64,
            Self::Ia64 => COFF_MACHINE_IA64,
            Self::Arm => COFF_MACHINE_ARMNT,
            Self::Arm64 => COFF_MACHINE_ARM64,
            Self::Unknown(code) => *code,
        }
    }
}

impl fmt::Display for MachineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I386 => write!(f, "I386"),
            Self::Amd64 => write!(f, "AMD64"),
            Self::Ia64 => write!(f, "IA64"),
            Self::Arm => write!(f, "ARM"),
            Self::Arm64 => write!(f, "ARM64"),
            Self::Unknown(code) => write!(f, "Unknown(0x{:04x})", code),
        }
    }
}

/// How portable a module's code is, as a set of flags.
///
/// A module is architecture-neutral only when its kind is exactly
/// [`PortabilityKind::IL_ONLY`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PortabilityKind {
    pub il_only: bool,
    pub required_32bit: bool,
    pub pe32_plus: bool,
    pub unmanaged_32bit: bool,
    pub preferred_32bit: bool,
}

impl PortabilityKind {
    /// Pure intermediate-language code with no processor requirement.
    pub const IL_ONLY: Self = Self {
        il_only: true,
        required_32bit: false,
        pe32_plus: false,
        unmanaged_32bit: false,
        preferred_32bit: false,
    };

    /// Derive the kind from the optional header format and the CLI header flags.
    pub fn from_image(pe32_plus: bool, flags: u32) -> Self {
        let il_only = flags & cli_flags::IL_ONLY != 0;
        let required_32bit = flags & cli_flags::REQUIRED_32BIT != 0;
        Self {
            il_only,
            required_32bit,
            pe32_plus,
            unmanaged_32bit: !il_only && !pe32_plus,
            preferred_32bit: required_32bit && flags & cli_flags::PREFERRED_32BIT != 0,
        }
    }

    /// Whether the module runs on any processor.
    pub fn is_portable(&self) -> bool {
        *self == Self::IL_ONLY
    }
}

impl fmt::Display for PortabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [
            (self.il_only, "ILOnly"),
            (self.required_32bit, "Required32Bit"),
            (self.pe32_plus, "PE32Plus"),
            (self.unmanaged_32bit, "Unmanaged32Bit"),
            (self.preferred_32bit, "Preferred32Bit"),
        ]
        .iter()
        .filter(|(set, _)| *set)
        .map(|(_, name)| *name)
        .collect();

        if names.is_empty() {
            write!(f, "NotAPortableExecutableImage")
        } else {
            write!(f, "{}", names.join(", "))
        }
    }
}

/// Runtime flags from the CLI header.
pub mod cli_flags {
    pub use goblin::pe::clr::{
        COMIMAGE_FLAGS_32BITPREFERRED as PREFERRED_32BIT,
        COMIMAGE_FLAGS_32BITREQUIRED as REQUIRED_32BIT, COMIMAGE_FLAGS_ILONLY as IL_ONLY,
    };
}

/// Portability and machine of one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArchitectureDescriptor {
    pub portability: PortabilityKind,
    pub machine: MachineKind,
}

impl ArchitectureDescriptor {
    /// The descriptor of an AnyCPU module.
    pub fn portable() -> Self {
        Self {
            portability: PortabilityKind::IL_ONLY,
            machine: MachineKind::I386,
        }
    }
}

impl fmt::Display for ArchitectureDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.portability, self.machine)
    }
}
