//! The seam to the binary table codec.

use crate::table::Table;

/// Parses tables from bytes and serializes them back.
///
/// Implementations must be deterministic: saving an unmodified table parsed
/// from bytes the codec produced yields the same bytes.
pub trait TableCodec {
    /// Error produced by the codec. Cue bank assembly propagates it unchanged.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Parse a table from its serialized form.
    fn parse(&self, bytes: &[u8]) -> Result<Table, Self::Error>;

    /// Serialize a table.
    fn save(&self, table: &Table) -> Result<Vec<u8>, Self::Error>;
}

impl<C: TableCodec + ?Sized> TableCodec for &C {
    type Error = C::Error;

    fn parse(&self, bytes: &[u8]) -> Result<Table, Self::Error> {
        (**self).parse(bytes)
    }

    fn save(&self, table: &Table) -> Result<Vec<u8>, Self::Error> {
        (**self).save(table)
    }
}
