//! Reference-sequence header record (`@SQ`): `{ name, length, index }` plus
//! any other tag, derived from and kept in sync with an underlying
//! [`Header`].

use crate::error::Result;
use crate::header::record::Header;

/// One `@SQ` line, plus its dense `index` within the owning collection.
#[derive(Debug, Clone)]
pub struct RefSequence {
    header: Header,
    name: String,
    length: i32,
    index: i32,
}

impl RefSequence {
    pub(crate) fn from_header(header: Header, index: i32) -> Result<Self> {
        let name = header.field::<String>("SN")?;
        let length = header.field::<i32>("LN")?;
        Ok(RefSequence {
            header,
            name,
            length,
            index,
        })
    }

    /// The shared read-only `"*"` / index `-1` sentinel for "unmapped".
    pub fn unmapped() -> Self {
        let mut header = Header::new("SQ").unwrap();
        header.push_back("SN", "*").unwrap();
        header.push_back("LN", "0").unwrap();
        RefSequence {
            header,
            name: "*".to_string(),
            length: 0,
            index: -1,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn length(&self) -> i32 {
        self.length
    }

    pub fn index(&self) -> i32 {
        self.index
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Access a non-identity tag (anything other than `SN`/`LN`).
    pub fn extra(&self, tag: &str) -> Option<&str> {
        let idx = self.header.find(tag)?;
        self.header.fields().nth(idx).map(|(_, v)| v)
    }

    pub fn set_extra(&mut self, tag: &str, value: impl Into<String>) -> Result<()> {
        self.header.set_field(tag, value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_name_and_length() {
        let h = Header::parse("SQ", &["SN:chr1", "LN:100", "M5:abcd"]).unwrap();
        let r = RefSequence::from_header(h, 0).unwrap();
        assert_eq!(r.name(), "chr1");
        assert_eq!(r.length(), 100);
        assert_eq!(r.extra("M5"), Some("abcd"));
    }

    #[test]
    fn unmapped_sentinel() {
        let u = RefSequence::unmapped();
        assert_eq!(u.name(), "*");
        assert_eq!(u.index(), -1);
    }
}
