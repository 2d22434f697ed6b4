//! Read-group header record (`@RG`): `{ id }` plus any other tag, derived
//! from and kept in sync with an underlying [`Header`].

use crate::error::Result;
use crate::header::record::Header;

/// One `@RG` line.
#[derive(Debug, Clone)]
pub struct ReadGroup {
    header: Header,
    id: String,
}

impl ReadGroup {
    pub(crate) fn from_header(header: Header) -> Result<Self> {
        let id = header.field::<String>("ID")?;
        Ok(ReadGroup { header, id })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Access a non-identity tag (anything other than `ID`).
    pub fn extra(&self, tag: &str) -> Option<&str> {
        let idx = self.header.find(tag)?;
        self.header.fields().nth(idx).map(|(_, v)| v)
    }

    pub fn set_extra(&mut self, tag: &str, value: impl Into<String>) -> Result<()> {
        self.header.set_field(tag, value.into())
    }
}
