//! One `@XY` header line: an ordered sequence of `{ tag, value }` pairs plus
//! a two-character type code, backed by a canonical tab-delimited text
//! representation that every mutation rebuilds through a single
//! `replace_string` choke point (spec.md §4.5).

use crate::error::{Result, SamError};

/// A value type a header field can be parsed into / formatted from.
///
/// Implemented for the handful of concrete types header fields actually
/// hold: plain text, and the two numeric interpretations spec.md §3 calls
/// out (`integer`, `coord`).
pub trait FieldValue: Sized {
    fn parse_field(s: &str) -> Result<Self>;
    fn format_field(&self) -> String;
}

impl FieldValue for String {
    fn parse_field(s: &str) -> Result<Self> {
        Ok(s.to_string())
    }
    fn format_field(&self) -> String {
        self.clone()
    }
}

impl FieldValue for i32 {
    fn parse_field(s: &str) -> Result<Self> {
        s.parse()
            .map_err(|_| SamError::bad_format(format!("not an integer: \"{}\"", s)))
    }
    fn format_field(&self) -> String {
        self.to_string()
    }
}

impl FieldValue for i64 {
    fn parse_field(s: &str) -> Result<Self> {
        s.parse()
            .map_err(|_| SamError::bad_format(format!("not an integer: \"{}\"", s)))
    }
    fn format_field(&self) -> String {
        self.to_string()
    }
}

/// One `tag: value` pair within a header line, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub tag: [u8; 2],
    pub value: String,
}

/// A single `@XY\tTAG:value\t...` header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    type_code: [u8; 2],
    fields: Vec<Field>,
}

fn tag_bytes(tag: &str) -> Result<[u8; 2]> {
    let bytes = tag.as_bytes();
    if bytes.len() != 2 {
        return Err(SamError::bad_format(format!(
            "header tag must be exactly two characters: \"{}\"",
            tag
        )));
    }
    Ok([bytes[0], bytes[1]])
}

impl Header {
    /// Parse one header line's text (without the leading `@`, as produced by
    /// splitting on `'\t'`) into a typed `Header`.
    pub fn parse(type_code: &str, fields_text: &[&str]) -> Result<Self> {
        let type_bytes = tag_bytes(type_code)?;
        let mut fields = Vec::with_capacity(fields_text.len());
        for f in fields_text {
            let (tag, value) = f.split_once(':').ok_or_else(|| {
                SamError::bad_format(format!("malformed header field: \"{}\"", f))
            })?;
            fields.push(Field {
                tag: tag_bytes(tag)?,
                value: value.to_string(),
            });
        }
        Ok(Header {
            type_code: type_bytes,
            fields,
        })
    }

    /// Construct an empty header of the given type, e.g. for programmatic
    /// construction of a new `@SQ`/`@RG` line.
    pub fn new(type_code: &str) -> Result<Self> {
        Ok(Header {
            type_code: tag_bytes(type_code)?,
            fields: Vec::new(),
        })
    }

    pub fn type_code(&self) -> String {
        String::from_utf8_lossy(&self.type_code).into_owned()
    }

    pub fn type_equals(&self, type_code: &str) -> bool {
        tag_bytes(type_code)
            .map(|t| t == self.type_code)
            .unwrap_or(false)
    }

    /// The canonical tab-delimited text of this line, without a leading `@`
    /// or trailing newline.
    pub fn text(&self) -> String {
        let mut out = format!("@{}", self.type_code());
        for f in &self.fields {
            out.push('\t');
            out.push_str(&String::from_utf8_lossy(&f.tag));
            out.push(':');
            out.push_str(&f.value);
        }
        out
    }

    /// Index of the first field with the given tag, if any.
    pub fn find(&self, tag: &str) -> Option<usize> {
        let tag = tag_bytes(tag).ok()?;
        self.fields.iter().position(|f| f.tag == tag)
    }

    /// Typed getter. Fails if the tag is absent or fails to parse as `T`.
    pub fn field<T: FieldValue>(&self, tag: &str) -> Result<T> {
        let idx = self
            .find(tag)
            .ok_or_else(|| SamError::bad_format(format!("missing header tag \"{}\"", tag)))?;
        T::parse_field(&self.fields[idx].value)
    }

    /// Typed getter with a default for when the tag is absent (parse
    /// failures on a present tag still raise an error).
    pub fn field_or<T: FieldValue>(&self, tag: &str, default: T) -> Result<T> {
        match self.find(tag) {
            Some(idx) => T::parse_field(&self.fields[idx].value),
            None => Ok(default),
        }
    }

    pub fn set_field<T: FieldValue>(&mut self, tag: &str, value: T) -> Result<()> {
        let formatted = value.format_field();
        match self.find(tag) {
            Some(idx) => self.fields[idx].value = formatted,
            None => self.push_back(tag, formatted)?,
        }
        Ok(())
    }

    pub fn push_back(&mut self, tag: &str, value: impl Into<String>) -> Result<()> {
        self.fields.push(Field {
            tag: tag_bytes(tag)?,
            value: value.into(),
        });
        Ok(())
    }

    pub fn insert(&mut self, pos: usize, tag: &str, value: impl Into<String>) -> Result<()> {
        self.fields.insert(
            pos,
            Field {
                tag: tag_bytes(tag)?,
                value: value.into(),
            },
        );
        Ok(())
    }

    pub fn erase(&mut self, pos: usize) {
        if pos < self.fields.len() {
            self.fields.remove(pos);
        }
    }

    pub fn replace(&mut self, pos: usize, tag: &str, value: impl Into<String>) -> Result<()> {
        if pos >= self.fields.len() {
            return Err(SamError::logic("header field index out of range"));
        }
        self.fields[pos] = Field {
            tag: tag_bytes(tag)?,
            value: value.into(),
        };
        Ok(())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|f| {
            // tag_bytes is always valid UTF-8 ASCII by construction.
            let tag: &str = std::str::from_utf8(&f.tag).unwrap_or("??");
            (tag, f.value.as_str())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_find() {
        let h = Header::parse("SQ", &["SN:chr1", "LN:248956422"]).unwrap();
        assert!(h.type_equals("SQ"));
        assert_eq!(h.field::<String>("SN").unwrap(), "chr1");
        assert_eq!(h.field::<i32>("LN").unwrap(), 248_956_422);
    }

    #[test]
    fn duplicate_tags_find_first() {
        let h = Header::parse("CO", &["XX:a", "XX:b"]).unwrap();
        assert_eq!(h.field::<String>("XX").unwrap(), "a");
    }

    #[test]
    fn set_field_find_or_append() {
        let mut h = Header::parse("RG", &["ID:grp1"]).unwrap();
        h.set_field("SM", "sample1").unwrap();
        assert_eq!(h.text(), "@RG\tID:grp1\tSM:sample1");
        h.set_field("ID", "grp2").unwrap();
        assert_eq!(h.text(), "@RG\tID:grp2\tSM:sample1");
    }

    #[test]
    fn bad_int_is_bad_format() {
        let h = Header::parse("SQ", &["LN:notanumber"]).unwrap();
        assert!(h.field::<i32>("LN").unwrap_err().is_bad_format());
    }
}
