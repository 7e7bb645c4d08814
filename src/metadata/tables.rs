//! CLI metadata streams and the `#~` table stream.
//!
//! Only the `Assembly` and `AssemblyRef` tables are decoded, but locating
//! them requires the row size of every table that precedes them, which in
//! turn depends on heap index widths and on the row counts of the tables
//! each coded index can point into.

use goblin::pe::clr::StorageStream;
use scroll::{Pread, LE};

use super::ExtractError;
use crate::module::ModuleVersion;

pub const ASSEMBLY: usize = 0x20;
pub const ASSEMBLY_REF: usize = 0x23;
const TABLE_COUNT: usize = 64;

fn truncated(what: &'static str) -> impl Fn(scroll::Error) -> ExtractError {
    move |_| ExtractError::Truncated { what }
}

/// The heaps and table stream named by the metadata root.
#[derive(Debug, Clone, Copy)]
pub struct MetadataStreams<'a> {
    pub tables: &'a [u8],
    pub strings: &'a [u8],
}

impl<'a> MetadataStreams<'a> {
    /// Walk `count` stream headers starting at `offset` within `root`, the
    /// bytes of the metadata root. Stream offsets are relative to `root`.
    pub fn parse(root: &'a [u8], mut offset: usize, count: u16) -> Result<Self, ExtractError> {
        let mut tables = None;
        let mut strings = None;
        for _ in 0..count {
            let header = StorageStream::parse(root, &mut offset)
                .map_err(|_| ExtractError::Truncated { what: "stream header" })?;
            let start = header.offset as usize;
            let stream = root
                .get(start..start.saturating_add(header.size as usize))
                .ok_or(ExtractError::Truncated { what: "stream" })?;
            match header.name {
                "#~" | "#-" => tables = Some(stream),
                "#Strings" => strings = Some(stream),
                _ => {}
            }
        }

        Ok(Self {
            tables: tables.ok_or_else(|| {
                ExtractError::InvalidMetadata("no table stream".to_string())
            })?,
            strings: strings.ok_or_else(|| {
                ExtractError::InvalidMetadata("no #Strings heap".to_string())
            })?,
        })
    }

    /// Look up a NUL-terminated string in the `#Strings` heap.
    pub fn string(&self, index: u32) -> Result<&'a str, ExtractError> {
        self.strings
            .pread::<&str>(index as usize)
            .map_err(|e| ExtractError::InvalidMetadata(format!("string {}: {}", index, e)))
    }
}

/// Coded index families.
#[derive(Debug, Clone, Copy)]
enum Coded {
    TypeDefOrRef,
    HasConstant,
    HasCustomAttribute,
    HasFieldMarshal,
    HasDeclSecurity,
    MemberRefParent,
    HasSemantics,
    MethodDefOrRef,
    MemberForwarded,
    CustomAttributeType,
    ResolutionScope,
}

impl Coded {
    /// Tag bits and the tables a tag can select.
    fn targets(self) -> (u32, &'static [usize]) {
        match self {
            Coded::TypeDefOrRef => (2, &[0x02, 0x01, 0x1b]),
            Coded::HasConstant => (2, &[0x04, 0x08, 0x17]),
            Coded::HasCustomAttribute => (
                5,
                &[
                    0x06, 0x04, 0x01, 0x02, 0x08, 0x09, 0x0a, 0x00, 0x0e, 0x17, 0x14, 0x11, 0x1a,
                    0x1b, 0x20, 0x23, 0x26, 0x27, 0x28, 0x2a, 0x2c, 0x2b,
                ],
            ),
            Coded::HasFieldMarshal => (1, &[0x04, 0x08]),
            Coded::HasDeclSecurity => (2, &[0x02, 0x06, 0x20]),
            Coded::MemberRefParent => (3, &[0x02, 0x01, 0x1a, 0x06, 0x1b]),
            Coded::HasSemantics => (1, &[0x14, 0x17]),
            Coded::MethodDefOrRef => (1, &[0x06, 0x0a]),
            Coded::MemberForwarded => (1, &[0x04, 0x06]),
            Coded::CustomAttributeType => (3, &[0x06, 0x0a]),
            Coded::ResolutionScope => (2, &[0x00, 0x1a, 0x23, 0x01]),
        }
    }
}

/// One column of a metadata table.
#[derive(Debug, Clone, Copy)]
enum Col {
    Fixed(usize),
    Str,
    Guid,
    Blob,
    Table(usize),
    Coded(Coded),
}

use Col::{Blob, Fixed, Guid, Str, Table};

/// Column layouts of tables 0x00 through 0x23.
fn schema(table: usize) -> &'static [Col] {
    use Coded::*;
    match table {
        0x00 => &[Fixed(2), Str, Guid, Guid, Guid],
        0x01 => &[Col::Coded(ResolutionScope), Str, Str],
        0x02 => &[Fixed(4), Str, Str, Col::Coded(TypeDefOrRef), Table(0x04), Table(0x06)],
        0x03 => &[Table(0x04)],
        0x04 => &[Fixed(2), Str, Blob],
        0x05 => &[Table(0x06)],
        0x06 => &[Fixed(4), Fixed(2), Fixed(2), Str, Blob, Table(0x08)],
        0x07 => &[Table(0x08)],
        0x08 => &[Fixed(2), Fixed(2), Str],
        0x09 => &[Table(0x02), Col::Coded(TypeDefOrRef)],
        0x0a => &[Col::Coded(MemberRefParent), Str, Blob],
        0x0b => &[Fixed(2), Col::Coded(HasConstant), Blob],
        0x0c => &[Col::Coded(HasCustomAttribute), Col::Coded(CustomAttributeType), Blob],
        0x0d => &[Col::Coded(HasFieldMarshal), Blob],
        0x0e => &[Fixed(2), Col::Coded(HasDeclSecurity), Blob],
        0x0f => &[Fixed(2), Fixed(4), Table(0x02)],
        0x10 => &[Fixed(4), Table(0x04)],
        0x11 => &[Blob],
        0x12 => &[Table(0x02), Table(0x14)],
        0x13 => &[Table(0x14)],
        0x14 => &[Fixed(2), Str, Col::Coded(TypeDefOrRef)],
        0x15 => &[Table(0x02), Table(0x17)],
        0x16 => &[Table(0x17)],
        0x17 => &[Fixed(2), Str, Blob],
        0x18 => &[Fixed(2), Table(0x06), Col::Coded(HasSemantics)],
        0x19 => &[Table(0x02), Col::Coded(MethodDefOrRef), Col::Coded(MethodDefOrRef)],
        0x1a => &[Str],
        0x1b => &[Blob],
        0x1c => &[Fixed(2), Col::Coded(MemberForwarded), Str, Table(0x1a)],
        0x1d => &[Fixed(4), Table(0x04)],
        0x1e => &[Fixed(4), Fixed(4)],
        0x1f => &[Fixed(4)],
        0x20 => &[Fixed(4), Fixed(8), Fixed(4), Blob, Str, Str],
        0x21 => &[Fixed(4)],
        0x22 => &[Fixed(4), Fixed(4), Fixed(4)],
        0x23 => &[Fixed(8), Fixed(4), Blob, Str, Str, Blob],
        _ => &[],
    }
}

/// An assembly identity row: name and version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyRow {
    pub name: String,
    pub version: ModuleVersion,
}

/// The decoded header of the table stream.
#[derive(Debug)]
pub struct TableStream<'a> {
    data: &'a [u8],
    rows: [u32; TABLE_COUNT],
    wide_strings: bool,
    wide_guids: bool,
    wide_blobs: bool,
    tables_start: usize,
}

impl<'a> TableStream<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self, ExtractError> {
        let header = truncated("table stream header");
        let heap_sizes: u8 = data.pread_with(6, LE).map_err(&header)?;
        let valid: u64 = data.pread_with(8, LE).map_err(&header)?;

        let mut offset = 24;
        let mut rows = [0u32; TABLE_COUNT];
        for (table, count) in rows.iter_mut().enumerate() {
            if valid & (1u64 << table) != 0 {
                *count = data
                    .gread_with(&mut offset, LE)
                    .map_err(truncated("table row counts"))?;
            }
        }
        // Some producers append an extra dword after the row counts.
        if heap_sizes & 0x40 != 0 {
            offset += 4;
        }

        Ok(Self {
            data,
            rows,
            wide_strings: heap_sizes & 0x01 != 0,
            wide_guids: heap_sizes & 0x02 != 0,
            wide_blobs: heap_sizes & 0x04 != 0,
            tables_start: offset,
        })
    }

    fn column_size(&self, col: Col) -> usize {
        let width = |wide: bool| if wide { 4 } else { 2 };
        match col {
            Col::Fixed(n) => n,
            Col::Str => width(self.wide_strings),
            Col::Guid => width(self.wide_guids),
            Col::Blob => width(self.wide_blobs),
            Col::Table(t) => width(self.rows[t] >= 1 << 16),
            Col::Coded(coded) => {
                let (bits, targets) = coded.targets();
                let max = targets.iter().map(|&t| self.rows[t]).max().unwrap_or(0);
                width(max >= 1 << (16 - bits))
            }
        }
    }

    fn row_size(&self, table: usize) -> usize {
        schema(table).iter().map(|&c| self.column_size(c)).sum()
    }

    fn table_offset(&self, table: usize) -> usize {
        (0..table).fold(self.tables_start, |offset, t| {
            offset.saturating_add((self.rows[t] as usize).saturating_mul(self.row_size(t)))
        })
    }

    fn read_version(
        &self,
        offset: &mut usize,
        what: &'static str,
    ) -> Result<ModuleVersion, ExtractError> {
        let mut fields = [0u16; 4];
        for field in &mut fields {
            *field = self.data.gread_with(offset, LE).map_err(truncated(what))?;
        }
        let [major, minor, build, revision] = fields;
        Ok(ModuleVersion::new(major, minor, build, revision))
    }

    fn read_string_index(
        &self,
        offset: &mut usize,
        what: &'static str,
    ) -> Result<u32, ExtractError> {
        if self.wide_strings {
            self.data.gread_with::<u32>(offset, LE).map_err(truncated(what))
        } else {
            self.data
                .gread_with::<u16>(offset, LE)
                .map(u32::from)
                .map_err(truncated(what))
        }
    }

    /// The module's own identity from the `Assembly` table.
    pub fn assembly(&self, streams: &MetadataStreams<'_>) -> Result<AssemblyRow, ExtractError> {
        if self.rows[ASSEMBLY] == 0 {
            return Err(ExtractError::NoAssemblyManifest);
        }
        // HashAlgId, then the version.
        let mut offset = self.table_offset(ASSEMBLY).saturating_add(4);
        let version = self.read_version(&mut offset, "Assembly table")?;
        // Flags and PublicKey.
        offset = offset.saturating_add(4 + self.column_size(Blob));
        let name = self.read_string_index(&mut offset, "Assembly table")?;

        Ok(AssemblyRow {
            name: streams.string(name)?.to_string(),
            version,
        })
    }

    /// Every row of the `AssemblyRef` table, in table order.
    pub fn assembly_refs(
        &self,
        streams: &MetadataStreams<'_>,
    ) -> Result<Vec<AssemblyRow>, ExtractError> {
        let count = self.rows[ASSEMBLY_REF] as usize;
        let row_size = self.row_size(ASSEMBLY_REF);
        let start = self.table_offset(ASSEMBLY_REF);

        (0..count)
            .map(|i| {
                let mut offset = start.saturating_add(i * row_size);
                let version = self.read_version(&mut offset, "AssemblyRef table")?;
                // Flags and PublicKeyOrToken.
                offset = offset.saturating_add(4 + self.column_size(Blob));
                let name = self.read_string_index(&mut offset, "AssemblyRef table")?;
                Ok(AssemblyRow {
                    name: streams.string(name)?.to_string(),
                    version,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assembly_ref_row_is_twenty_bytes_with_narrow_heaps() {
        let data = vec![0u8; 24];
        let stream = TableStream::parse(&data).unwrap();
        assert_eq!(stream.row_size(ASSEMBLY_REF), 8 + 4 + 2 + 2 + 2 + 2);
        assert_eq!(stream.row_size(ASSEMBLY), 4 + 8 + 4 + 2 + 2 + 2);
    }

    #[test]
    fn wide_heaps_widen_columns() {
        let mut data = vec![0u8; 24];
        data[6] = 0x01 | 0x04;
        let stream = TableStream::parse(&data).unwrap();
        assert_eq!(stream.row_size(ASSEMBLY_REF), 8 + 4 + 4 + 4 + 4 + 4);
    }

    #[test]
    fn coded_index_widens_past_tag_limit() {
        // TypeRef (0x01) uses ResolutionScope: 2 tag bits, so 2^14 rows widen it.
        let mut data = vec![0u8; 24 + 8];
        let valid: u64 = (1 << 0x00) | (1 << 0x01);
        data[8..16].copy_from_slice(&valid.to_le_bytes());
        data[24..28].copy_from_slice(&1u32.to_le_bytes());
        data[28..32].copy_from_slice(&(1u32 << 14).to_le_bytes());
        let stream = TableStream::parse(&data).unwrap();
        assert_eq!(stream.rows[0x01], 1 << 14);
        assert_eq!(stream.row_size(0x01), 4 + 2 + 2);
    }

    #[test]
    fn offsets_skip_preceding_tables() {
        let mut data = vec![0u8; 24 + 8];
        let valid: u64 = (1 << 0x1a) | (1 << 0x20);
        data[8..16].copy_from_slice(&valid.to_le_bytes());
        data[24..28].copy_from_slice(&3u32.to_le_bytes());
        data[28..32].copy_from_slice(&1u32.to_le_bytes());
        let stream = TableStream::parse(&data).unwrap();
        // Three ModuleRef rows of one narrow string column each.
        assert_eq!(stream.table_offset(ASSEMBLY), 32 + 3 * 2);
    }

    #[test]
    fn short_table_stream_is_truncated() {
        let err = TableStream::parse(&[0u8; 10]).unwrap_err();
        assert!(matches!(err, ExtractError::Truncated { what: "table stream header" }));
    }

    #[test]
    fn huge_row_counts_do_not_overflow_offsets() {
        let mut data = vec![0u8; 24 + 4 * 0x20];
        let valid: u64 = (1u64 << 0x20) - 1;
        data[8..16].copy_from_slice(&valid.to_le_bytes());
        for table in 0..0x20 {
            let at = 24 + 4 * table;
            data[at..at + 4].copy_from_slice(&u32::MAX.to_le_bytes());
        }
        let stream = TableStream::parse(&data).unwrap();
        assert!(stream.table_offset(ASSEMBLY_REF) > data.len());
    }

    #[test]
    fn missing_assembly_row_is_reported() {
        let data = vec![0u8; 24];
        let stream = TableStream::parse(&data).unwrap();
        let streams = MetadataStreams {
            tables: &data,
            strings: b"\0",
        };
        assert!(matches!(
            stream.assembly(&streams).unwrap_err(),
            ExtractError::NoAssemblyManifest
        ));
    }

    #[test]
    fn strings_heap_lookup() {
        let streams = MetadataStreams {
            tables: &[],
            strings: b"\0Lib.A\0Lib.B\0",
        };
        assert_eq!(streams.string(1).unwrap(), "Lib.A");
        assert_eq!(streams.string(7).unwrap(), "Lib.B");
        assert_eq!(streams.string(0).unwrap(), "");
        assert!(streams.string(100).is_err());
    }

    #[test]
    fn stream_headers_are_located() {
        // Two headers: "#~" at 0x20 (4 bytes) and "#Strings" at 0x24 (4 bytes).
        let mut root = Vec::new();
        root.extend_from_slice(&0x20u32.to_le_bytes());
        root.extend_from_slice(&4u32.to_le_bytes());
        root.extend_from_slice(b"#~\0\0");
        root.extend_from_slice(&0x24u32.to_le_bytes());
        root.extend_from_slice(&4u32.to_le_bytes());
        root.extend_from_slice(b"#Strings\0\0\0\0");
        root.resize(0x20, 0);
        root.extend_from_slice(&[1, 2, 3, 4]);
        root.extend_from_slice(b"\0ab\0");

        let streams = MetadataStreams::parse(&root, 0, 2).unwrap();
        assert_eq!(streams.tables, &[1, 2, 3, 4]);
        assert_eq!(streams.string(1).unwrap(), "ab");
    }

    #[test]
    fn stream_past_end_is_truncated() {
        let mut root = Vec::new();
        root.extend_from_slice(&0x10u32.to_le_bytes());
        root.extend_from_slice(&0x1000u32.to_le_bytes());
        root.extend_from_slice(b"#~\0\0");
        let err = MetadataStreams::parse(&root, 0, 1).unwrap_err();
        assert!(matches!(err, ExtractError::Truncated { what: "stream" }));
    }
}
