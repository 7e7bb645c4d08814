//! Metadata-only reading of managed module images.
//!
//! This module provides:
//! - [`ModuleExtractor`] trait, the seam between the catalog and the
//!   binary format
//! - [`ManagedModuleReader`], the built-in reader for PE/CLI assemblies
//! - [`ImageBuilder`] for writing minimal managed images in tests
//!
//! Reading never executes module code. The file is loaded into memory in a
//! single call and the handle is dropped before parsing starts. PE headers,
//! the CLI header and the metadata stream directory are parsed by `goblin`;
//! the `#~` table rows are decoded here.
//!
//! # Example
//!
//! ```
//! use libcheck::metadata::{ImageBuilder, ManagedModuleReader};
//! use libcheck::module::ModuleVersion;
//!
//! let image = ImageBuilder::new("Lib.B", ModuleVersion::new(2, 0, 0, 0))
//!     .reference("Lib.A", ModuleVersion::new(1, 1, 0, 0))
//!     .build();
//!
//! let record = ManagedModuleReader::new().read_image(&image, "Lib.B.dll").unwrap();
//! assert_eq!(record.name(), "Lib.B");
//! assert_eq!(record.references()[0].name, "Lib.A");
//! ```

mod builder;
mod tables;

use std::path::Path;

use goblin::pe::header::DosHeader;
use goblin::pe::options::ParseOptions;
use goblin::pe::{utils, PE};
use thiserror::Error;

pub use builder::ImageBuilder;

use crate::module::{
    ArchitectureDescriptor, MachineKind, ModuleIdentity, ModuleRecord, PortabilityKind,
};
use tables::{MetadataStreams, TableStream};

const CLI_HEADER_MIN_SIZE: u32 = 72;

/// Why a file could not be read as a module.
///
/// These are expected outcomes while scanning a library tree; callers skip
/// the file and carry on.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// No DOS/PE signature.
    #[error("not a portable executable image")]
    NotPortableExecutable,

    /// A PE image without a CLI header.
    #[error("image has no CLI header (native code)")]
    NotManaged,

    /// A managed image without an assembly manifest (a netmodule).
    #[error("image has no assembly manifest")]
    NoAssemblyManifest,

    /// A structure ran past the end of the file.
    #[error("image is truncated in {what}")]
    Truncated { what: &'static str },

    /// Structurally invalid metadata.
    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),

    /// The file could not be read.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl From<goblin::error::Error> for ExtractError {
    fn from(err: goblin::error::Error) -> Self {
        match err {
            goblin::error::Error::Scroll(_) | goblin::error::Error::BufferTooShort(..) => {
                ExtractError::Truncated { what: "image headers" }
            }
            other => ExtractError::InvalidMetadata(other.to_string()),
        }
    }
}

/// Reads a [`ModuleRecord`] from a file without executing it.
pub trait ModuleExtractor {
    /// Extract the module's identity, references and architecture.
    fn extract(&self, path: &Path) -> Result<ModuleRecord, ExtractError>;
}

/// Reader for PE/CLI assemblies.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManagedModuleReader;

impl ManagedModuleReader {
    pub fn new() -> Self {
        Self
    }

    /// Parse an in-memory image; `path` is recorded as its origin.
    pub fn read_image(
        &self,
        data: &[u8],
        path: impl AsRef<Path>,
    ) -> Result<ModuleRecord, ExtractError> {
        DosHeader::parse(data).map_err(|_| ExtractError::NotPortableExecutable)?;
        let pe = PE::parse(data)?;

        let clr = pe.clr_data.as_ref().ok_or(ExtractError::NotManaged)?;
        if !clr.is_valid() {
            return Err(ExtractError::InvalidMetadata(
                "missing metadata signature".to_string(),
            ));
        }
        let cor20 = &clr.cor20_header;
        if cor20.cb < CLI_HEADER_MIN_SIZE {
            return Err(ExtractError::InvalidMetadata(format!(
                "CLI header is {} bytes",
                cor20.cb
            )));
        }

        let file_alignment = pe
            .header
            .optional_header
            .as_ref()
            .map(|header| header.windows_fields.file_alignment)
            .unwrap_or_default();
        let root = utils::find_offset(
            cor20.metadata.virtual_address as usize,
            &pe.sections,
            file_alignment,
            &ParseOptions::default(),
        )
        .and_then(|offset| data.get(offset..))
        .ok_or(ExtractError::Truncated { what: "metadata root" })?;

        let streams =
            MetadataStreams::parse(root, clr.offset_of_metadata, clr.storage_header.streams)?;
        let tables = TableStream::parse(streams.tables)?;

        let assembly = tables.assembly(&streams)?;
        let references = tables
            .assembly_refs(&streams)?
            .into_iter()
            .map(|row| ModuleIdentity::new(row.name, row.version))
            .collect();

        let architecture = ArchitectureDescriptor {
            portability: PortabilityKind::from_image(pe.is_64, cor20.flags),
            machine: MachineKind::from_code(pe.header.coff_header.machine),
        };

        Ok(ModuleRecord::new(
            ModuleIdentity::new(assembly.name, assembly.version),
            references,
            architecture,
            path.as_ref(),
        ))
    }
}

impl ModuleExtractor for ManagedModuleReader {
    fn extract(&self, path: &Path) -> Result<ModuleRecord, ExtractError> {
        let data = std::fs::read(path)?;
        self.read_image(&data, path)
    }
}
