//! Parsing and formatting of `"NAME:START-END"`-style region strings
//! (spec.md §8 scenario 3), grounded on `interval::assign`/
//! `seqinterval::assign`. These are one-based, closed-looking strings
//! that parse down to the same zero-based half-open `[zstart, zlimit)`
//! representation [`super::Interval`] uses internally.

use crate::error::{Result, SamError};

use super::node::Interval;

/// A [`Interval`] qualified by the name of the sequence it lies within,
/// parsed from or formatted as a `"NAME:START-END"` region string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeqRegion {
    pub name: String,
    pub interval: Interval,
}

impl SeqRegion {
    pub fn zstart(&self) -> i32 {
        self.interval.zstart
    }

    pub fn zlimit(&self) -> i32 {
        self.interval.zlimit
    }

    /// 1-based start coordinate.
    pub fn start(&self) -> i64 {
        self.interval.zstart as i64 + 1
    }

    /// 1-based-inclusive end coordinate, numerically equal to `zlimit`.
    pub fn end(&self) -> i64 {
        self.interval.zlimit as i64
    }

    /// Parse a bare `"[START][-END]"` or `"[START]+[LENGTH]"` interval,
    /// with no sequence name, into zero-based half-open coordinates. A
    /// missing `START` defaults to `1`; a missing `END` defaults to
    /// `i32::MAX`; a missing `LENGTH` defaults to `0`; a bare string with
    /// neither a `-` nor a `+` suffix is a single base.
    pub fn parse_interval(text: &str) -> Result<Interval> {
        let bytes = text.as_bytes();
        let mut pos = 0;
        let start_val = parse_numeral(bytes, &mut pos, 1);
        let zstart = start_val - 1;

        let zlimit = match bytes.get(pos) {
            Some(b'-') => {
                pos += 1;
                parse_numeral(bytes, &mut pos, i32::MAX)
            }
            Some(b'+') => {
                pos += 1;
                zstart + parse_numeral(bytes, &mut pos, 0)
            }
            None => zstart + 1,
            _ => zstart, // forces the trailing-garbage check below to fire
        };

        if pos != bytes.len() {
            return Err(SamError::bad_format(format!(
                "invalid interval value \"{}\"",
                text
            )));
        }
        Ok(Interval::new(zstart, zlimit))
    }

    /// Parse a `"NAME:START-END"` region string. The sequence name is
    /// everything up to the last `:`; a string with no `:` names no
    /// sequence (`name == ""`) and spans the whole bare interval, i.e.
    /// `"-"` meaning `[1, i32::MAX)`.
    pub fn parse(text: &str) -> Result<SeqRegion> {
        match text.rfind(':') {
            Some(colon) => {
                let name = text[..colon].to_string();
                let interval = Self::parse_interval(&text[colon + 1..])?;
                Ok(SeqRegion { name, interval })
            }
            None => {
                let interval = Self::parse_interval("-")?;
                let _ = text; // a bare name with no ':' has no interval of its own
                Ok(SeqRegion {
                    name: String::new(),
                    interval,
                })
            }
        }
    }
}

/// Parses a run of digits (commas are skipped as thousands separators),
/// advancing `*pos` past what it consumed. Returns `default_value` and
/// leaves `*pos` unchanged if no digits were found.
fn parse_numeral(bytes: &[u8], pos: &mut usize, default_value: i32) -> i32 {
    let start = *pos;
    let mut value: i32 = 0;
    let mut i = *pos;
    while i < bytes.len() {
        match bytes[i] {
            b'0'..=b'9' => {
                value = value.saturating_mul(10).saturating_add((bytes[i] - b'0') as i32);
                i += 1;
            }
            b',' => i += 1,
            _ => break,
        }
    }
    if i > start {
        *pos = i;
        value
    } else {
        default_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_start_plus_length() {
        let r = SeqRegion::parse_interval("1,100+150").unwrap();
        assert_eq!(r.zstart + 1, 1100);
        assert_eq!(r.zlimit, 1249);
    }

    #[test]
    fn bare_dash_spans_everything() {
        let r = SeqRegion::parse_interval("-").unwrap();
        assert_eq!(r.zstart + 1, 1);
        assert_eq!(r.zlimit, i32::MAX);
    }

    #[test]
    fn leading_colon_is_an_unnamed_region() {
        let r = SeqRegion::parse(":50-80").unwrap();
        assert_eq!(r.name, "");
        assert_eq!(r.start(), 50);
        assert_eq!(r.end(), 80);
    }

    #[test]
    fn named_region_splits_on_last_colon() {
        let r = SeqRegion::parse("chr1:1000-2000").unwrap();
        assert_eq!(r.name, "chr1");
        assert_eq!(r.start(), 1000);
        assert_eq!(r.end(), 2000);
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        assert!(SeqRegion::parse_interval("100x").is_err());
    }
}
