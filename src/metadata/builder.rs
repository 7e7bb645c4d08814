//! Writer for minimal managed images.
//!
//! [`ImageBuilder`] lays out a single-section PE file carrying a CLI header,
//! a metadata root, a `#~` table stream with `Assembly` and `AssemblyRef`
//! rows, and a `#Strings` heap. Nothing else a runtime would need is
//! present; the images exist so the reader and the catalog can be exercised
//! on real bytes.
//!
//! # Example
//!
//! ```
//! use libcheck::metadata::ImageBuilder;
//! use libcheck::module::{MachineKind, ModuleVersion};
//!
//! let image = ImageBuilder::new("Lib.Native", ModuleVersion::new(1, 0, 0, 0))
//!     .machine(MachineKind::Amd64)
//!     .pe32_plus(true)
//!     .build();
//! assert_eq!(&image[..2], b"MZ");
//! ```

use std::path::Path;

use crate::module::{cli_flags, MachineKind, ModuleVersion};

const PE_OFFSET: usize = 0x80;
const FILE_ALIGNMENT: usize = 0x200;
const SECTION_ALIGNMENT: u32 = 0x2000;
const SECTION_RVA: u32 = 0x2000;
const CLI_HEADER_SIZE: usize = 72;
const RUNTIME_VERSION: &[u8] = b"v4.0.30319\0\0";

/// Builds a minimal managed module image.
#[derive(Debug, Clone)]
pub struct ImageBuilder {
    name: String,
    version: ModuleVersion,
    references: Vec<(String, ModuleVersion)>,
    machine: MachineKind,
    pe32_plus: bool,
    cli_flags: u32,
    managed: bool,
    manifest: bool,
}

impl ImageBuilder {
    /// An AnyCPU assembly with no references.
    pub fn new(name: impl Into<String>, version: ModuleVersion) -> Self {
        Self {
            name: name.into(),
            version,
            references: Vec::new(),
            machine: MachineKind::I386,
            pe32_plus: false,
            cli_flags: cli_flags::IL_ONLY,
            managed: true,
            manifest: true,
        }
    }

    /// Add an assembly reference.
    pub fn reference(mut self, name: impl Into<String>, version: ModuleVersion) -> Self {
        self.references.push((name.into(), version));
        self
    }

    pub fn machine(mut self, machine: MachineKind) -> Self {
        self.machine = machine;
        self
    }

    /// Use the PE32+ optional header.
    pub fn pe32_plus(mut self, pe32_plus: bool) -> Self {
        self.pe32_plus = pe32_plus;
        self
    }

    /// Replace the CLI header runtime flags.
    pub fn cli_flags(mut self, flags: u32) -> Self {
        self.cli_flags = flags;
        self
    }

    /// Omit the CLI header, producing a native image.
    pub fn native(mut self) -> Self {
        self.managed = false;
        self
    }

    /// Omit the `Assembly` row, like a netmodule.
    pub fn without_manifest(mut self) -> Self {
        self.manifest = false;
        self
    }

    /// Write the image to `path`.
    pub fn write_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        std::fs::write(path, self.build())
    }

    /// Produce the image bytes.
    pub fn build(&self) -> Vec<u8> {
        let section = if self.managed {
            self.section()
        } else {
            vec![0xc3] // ret
        };
        let optional_size: usize = if self.pe32_plus { 240 } else { 224 };
        let optional_start = PE_OFFSET + 24;

        let mut image = vec![0u8; FILE_ALIGNMENT];
        write_at(&mut image, 0, b"MZ");
        write_at(&mut image, 0x3c, &(PE_OFFSET as u32).to_le_bytes());
        write_at(&mut image, PE_OFFSET, b"PE\0\0");

        let mut coff = Vec::new();
        put_u16(&mut coff, self.machine.code());
        put_u16(&mut coff, 1);
        put_u32(&mut coff, 0);
        put_u32(&mut coff, 0);
        put_u32(&mut coff, 0);
        put_u16(&mut coff, optional_size as u16);
        put_u16(&mut coff, 0x2102);
        write_at(&mut image, PE_OFFSET + 4, &coff);

        let magic: u16 = if self.pe32_plus { 0x020b } else { 0x010b };
        write_at(&mut image, optional_start, &magic.to_le_bytes());
        // SectionAlignment, FileAlignment, SizeOfImage and SizeOfHeaders sit
        // at the same offsets in both optional header formats.
        let image_size =
            SECTION_RVA + (section.len() as u32).div_ceil(SECTION_ALIGNMENT) * SECTION_ALIGNMENT;
        write_at(&mut image, optional_start + 32, &SECTION_ALIGNMENT.to_le_bytes());
        write_at(&mut image, optional_start + 36, &(FILE_ALIGNMENT as u32).to_le_bytes());
        write_at(&mut image, optional_start + 56, &image_size.to_le_bytes());
        write_at(&mut image, optional_start + 60, &(FILE_ALIGNMENT as u32).to_le_bytes());
        let directories = optional_start + if self.pe32_plus { 112 } else { 96 };
        write_at(&mut image, directories - 4, &16u32.to_le_bytes());
        if self.managed {
            let mut entry = Vec::new();
            put_u32(&mut entry, SECTION_RVA);
            put_u32(&mut entry, CLI_HEADER_SIZE as u32);
            write_at(&mut image, directories + 14 * 8, &entry);
        }

        let raw_size = section.len().div_ceil(FILE_ALIGNMENT) * FILE_ALIGNMENT;
        let mut header = Vec::new();
        header.extend_from_slice(b".text\0\0\0");
        put_u32(&mut header, section.len() as u32);
        put_u32(&mut header, SECTION_RVA);
        put_u32(&mut header, raw_size as u32);
        put_u32(&mut header, FILE_ALIGNMENT as u32);
        header.extend_from_slice(&[0u8; 12]);
        put_u32(&mut header, 0x6000_0020);
        write_at(&mut image, optional_start + optional_size, &header);

        image.extend_from_slice(&section);
        image.resize(FILE_ALIGNMENT + raw_size, 0);
        image
    }

    /// CLI header followed by the metadata root.
    fn section(&self) -> Vec<u8> {
        let metadata = self.metadata();

        let mut out = Vec::new();
        put_u32(&mut out, CLI_HEADER_SIZE as u32);
        put_u16(&mut out, 2);
        put_u16(&mut out, 5);
        put_u32(&mut out, SECTION_RVA + CLI_HEADER_SIZE as u32);
        put_u32(&mut out, metadata.len() as u32);
        put_u32(&mut out, self.cli_flags);
        out.resize(CLI_HEADER_SIZE, 0);
        out.extend_from_slice(&metadata);
        out
    }

    fn metadata(&self) -> Vec<u8> {
        let mut strings = vec![0u8];
        let mut intern = |s: &str| {
            let index = strings.len() as u32;
            strings.extend_from_slice(s.as_bytes());
            strings.push(0);
            index
        };
        let name_index = intern(&self.name);
        let reference_indexes: Vec<u32> =
            self.references.iter().map(|(name, _)| intern(name)).collect();
        pad4(&mut strings);

        let wide_strings = strings.len() >= 1 << 16;
        let put_str = |out: &mut Vec<u8>, index: u32| {
            if wide_strings {
                put_u32(out, index);
            } else {
                put_u16(out, index as u16);
            }
        };

        let mut tables = Vec::new();
        put_u32(&mut tables, 0);
        tables.push(2);
        tables.push(0);
        tables.push(if wide_strings { 0x01 } else { 0x00 });
        tables.push(1);
        let mut valid: u64 = 0;
        if self.manifest {
            valid |= 1 << super::tables::ASSEMBLY;
        }
        if !self.references.is_empty() {
            valid |= 1 << super::tables::ASSEMBLY_REF;
        }
        put_u64(&mut tables, valid);
        put_u64(&mut tables, 0);
        if self.manifest {
            put_u32(&mut tables, 1);
        }
        if !self.references.is_empty() {
            put_u32(&mut tables, self.references.len() as u32);
        }

        if self.manifest {
            put_u32(&mut tables, 0x8004);
            put_version(&mut tables, self.version);
            put_u32(&mut tables, 0);
            put_u16(&mut tables, 0);
            put_str(&mut tables, name_index);
            put_str(&mut tables, 0);
        }
        for ((_, version), &name) in self.references.iter().zip(&reference_indexes) {
            put_version(&mut tables, *version);
            put_u32(&mut tables, 0);
            put_u16(&mut tables, 0);
            put_str(&mut tables, name);
            put_str(&mut tables, 0);
            put_u16(&mut tables, 0);
        }
        pad4(&mut tables);

        let headers_size = 16 + RUNTIME_VERSION.len() + 4 + (8 + 4) + (8 + 12);
        let tables_offset = headers_size;
        let strings_offset = tables_offset + tables.len();

        let mut root = Vec::new();
        put_u32(&mut root, 0x424a_5342);
        put_u16(&mut root, 1);
        put_u16(&mut root, 1);
        put_u32(&mut root, 0);
        put_u32(&mut root, RUNTIME_VERSION.len() as u32);
        root.extend_from_slice(RUNTIME_VERSION);
        put_u16(&mut root, 0);
        put_u16(&mut root, 2);
        put_u32(&mut root, tables_offset as u32);
        put_u32(&mut root, tables.len() as u32);
        root.extend_from_slice(b"#~\0\0");
        put_u32(&mut root, strings_offset as u32);
        put_u32(&mut root, strings.len() as u32);
        root.extend_from_slice(b"#Strings\0\0\0\0");
        debug_assert_eq!(root.len(), headers_size);

        root.extend_from_slice(&tables);
        root.extend_from_slice(&strings);
        root
    }
}

fn write_at(image: &mut [u8], offset: usize, bytes: &[u8]) {
    image[offset..offset + bytes.len()].copy_from_slice(bytes);
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_u64(out: &mut Vec<u8>, value: u64) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_version(out: &mut Vec<u8>, version: ModuleVersion) {
    for field in [version.major, version.minor, version.build, version.revision] {
        put_u16(out, field);
    }
}

fn pad4(out: &mut Vec<u8>) {
    while out.len() % 4 != 0 {
        out.push(0);
    }
}
