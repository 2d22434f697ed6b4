//! Auxiliary ("tag") fields: the variable trailing region of an alignment
//! block (spec.md §4.7). Each field is `tag(2) + type(1) + payload` on the
//! wire; this module decodes/encodes single fields and iterates a packed
//! byte region, but leaves in-place mutation (growing or shrinking the
//! owning block) to [`crate::record::Alignment`], which uses `Vec::splice`
//! on the block's aux region — a direct simplification of the buffer
//! grow/memmove dance the C++ original's `replace_gap` performs, since a
//! `Vec<u8>` can already relocate and shift its own tail.

use crate::bytes::{read_i32_le, read_u16_le, write_i32_le, write_u16_le};
use crate::error::{Result, SamError};

/// A decoded scalar or array aux value. Integer subtypes (`c/C/s/S/i/I`)
/// are collapsed to `Int` on decode since SAM text never distinguishes
/// them (htslib always prints integer aux fields as type `i`); the BAM
/// encoder picks the smallest subtype that losslessly represents the
/// value, so a decode-then-encode cycle is not guaranteed to reproduce
/// the original subtype byte, only the value.
#[derive(Debug, Clone, PartialEq)]
pub enum AuxValue {
    Char(u8),
    Int(i64),
    Float(f32),
    String(String),
    Hex(String),
    Array(AuxArray),
}

/// A `B`-type aux array, keyed by its element subtype.
#[derive(Debug, Clone, PartialEq)]
pub enum AuxArray {
    Int8(Vec<i8>),
    UInt8(Vec<u8>),
    Int16(Vec<i16>),
    UInt16(Vec<u16>),
    Int32(Vec<i32>),
    UInt32(Vec<u32>),
    Float(Vec<f32>),
}

impl AuxArray {
    fn subtype_char(&self) -> char {
        match self {
            AuxArray::Int8(_) => 'c',
            AuxArray::UInt8(_) => 'C',
            AuxArray::Int16(_) => 's',
            AuxArray::UInt16(_) => 'S',
            AuxArray::Int32(_) => 'i',
            AuxArray::UInt32(_) => 'I',
            AuxArray::Float(_) => 'f',
        }
    }

    fn len(&self) -> usize {
        match self {
            AuxArray::Int8(v) => v.len(),
            AuxArray::UInt8(v) => v.len(),
            AuxArray::Int16(v) => v.len(),
            AuxArray::UInt16(v) => v.len(),
            AuxArray::Int32(v) => v.len(),
            AuxArray::UInt32(v) => v.len(),
            AuxArray::Float(v) => v.len(),
        }
    }
}

/// One decoded field: its two-byte tag plus value.
#[derive(Debug, Clone, PartialEq)]
pub struct AuxField {
    pub tag: [u8; 2],
    pub value: AuxValue,
}

fn elem_size(subtype: u8) -> usize {
    match subtype {
        b'c' | b'C' => 1,
        b's' | b'S' => 2,
        b'i' | b'I' | b'f' => 4,
        _ => 0,
    }
}

/// Size in bytes of one encoded field, given its tag+type+payload start.
/// Returns `None` if the buffer is truncated.
fn field_len(b: &[u8]) -> Option<usize> {
    if b.len() < 3 {
        return None;
    }
    let type_char = b[2];
    Some(match type_char {
        b'A' | b'c' | b'C' => 4,
        b's' | b'S' => 5,
        b'i' | b'I' | b'f' => 7,
        b'Z' | b'H' => {
            let nul = b[3..].iter().position(|&c| c == 0)?;
            3 + nul + 1
        }
        b'B' => {
            if b.len() < 8 {
                return None;
            }
            let subtype = b[3];
            let count = read_i32_le(b, 4) as usize;
            8 + count * elem_size(subtype)
        }
        _ => return None,
    })
}

/// Decode a single field starting at `b[0]`, returning the field and its
/// total encoded length.
pub(crate) fn decode_field(b: &[u8]) -> Result<(AuxField, usize)> {
    let len = field_len(b).ok_or_else(|| SamError::bad_format("truncated aux field"))?;
    let tag = [b[0], b[1]];
    let type_char = b[2];
    let payload = &b[3..len];
    let value = match type_char {
        b'A' => AuxValue::Char(payload[0]),
        b'c' => AuxValue::Int(payload[0] as i8 as i64),
        b'C' => AuxValue::Int(payload[0] as i64),
        b's' => AuxValue::Int(read_i16_signed(payload, 0) as i64),
        b'S' => AuxValue::Int(read_u16_le(payload, 0) as i64),
        b'i' => AuxValue::Int(read_i32_le(payload, 0) as i64),
        b'I' => AuxValue::Int(crate::bytes::read_u32_le(payload, 0) as i64),
        b'f' => AuxValue::Float(f32::from_le_bytes([
            payload[0], payload[1], payload[2], payload[3],
        ])),
        b'Z' => AuxValue::String(
            String::from_utf8_lossy(&payload[..payload.len() - 1]).into_owned(),
        ),
        b'H' => AuxValue::Hex(String::from_utf8_lossy(&payload[..payload.len() - 1]).into_owned()),
        b'B' => {
            let subtype = payload[0];
            let count = read_i32_le(payload, 1) as usize;
            let elems = &payload[5..];
            AuxValue::Array(decode_array(subtype, count, elems)?)
        }
        other => {
            return Err(SamError::bad_format(format!(
                "unknown aux field type '{}'",
                other as char
            )))
        }
    };
    Ok((AuxField { tag, value }, len))
}

fn read_i16_signed(b: &[u8], offset: usize) -> i16 {
    i16::from_le_bytes([b[offset], b[offset + 1]])
}

fn decode_array(subtype: u8, count: usize, elems: &[u8]) -> Result<AuxArray> {
    Ok(match subtype {
        b'c' => AuxArray::Int8((0..count).map(|i| elems[i] as i8).collect()),
        b'C' => AuxArray::UInt8(elems[..count].to_vec()),
        b's' => AuxArray::Int16((0..count).map(|i| read_i16_signed(elems, i * 2)).collect()),
        b'S' => AuxArray::UInt16((0..count).map(|i| read_u16_le(elems, i * 2)).collect()),
        b'i' => AuxArray::Int32((0..count).map(|i| read_i32_le(elems, i * 4)).collect()),
        b'I' => AuxArray::UInt32(
            (0..count)
                .map(|i| crate::bytes::read_u32_le(elems, i * 4))
                .collect(),
        ),
        b'f' => AuxArray::Float(
            (0..count)
                .map(|i| {
                    f32::from_le_bytes([
                        elems[i * 4],
                        elems[i * 4 + 1],
                        elems[i * 4 + 2],
                        elems[i * 4 + 3],
                    ])
                })
                .collect(),
        ),
        other => {
            return Err(SamError::bad_format(format!(
                "unknown aux array subtype '{}'",
                other as char
            )))
        }
    })
}

/// Encode a field to its wire bytes (tag + type + payload), choosing the
/// smallest integer subtype that losslessly holds the value.
pub(crate) fn encode_field(field: &AuxField) -> Vec<u8> {
    let mut out = Vec::with_capacity(8);
    out.extend_from_slice(&field.tag);
    match &field.value {
        AuxValue::Char(c) => {
            out.push(b'A');
            out.push(*c);
        }
        AuxValue::Int(v) => encode_int(&mut out, *v),
        AuxValue::Float(f) => {
            out.push(b'f');
            out.extend_from_slice(&f.to_le_bytes());
        }
        AuxValue::String(s) => {
            out.push(b'Z');
            out.extend_from_slice(s.as_bytes());
            out.push(0);
        }
        AuxValue::Hex(s) => {
            out.push(b'H');
            out.extend_from_slice(s.as_bytes());
            out.push(0);
        }
        AuxValue::Array(arr) => {
            out.push(b'B');
            out.push(arr.subtype_char() as u8);
            write_i32_le_into(&mut out, arr.len() as i32);
            encode_array_elems(&mut out, arr);
        }
    }
    out
}

fn encode_int(out: &mut Vec<u8>, v: i64) {
    if (0..=u8::MAX as i64).contains(&v) {
        out.push(b'C');
        out.push(v as u8);
    } else if (i8::MIN as i64..0).contains(&v) {
        out.push(b'c');
        out.push(v as i8 as u8);
    } else if (0..=u16::MAX as i64).contains(&v) {
        out.push(b'S');
        out.extend_from_slice(&(v as u16).to_le_bytes());
    } else if (i16::MIN as i64..0).contains(&v) {
        out.push(b's');
        out.extend_from_slice(&(v as i16).to_le_bytes());
    } else if (0..=u32::MAX as i64).contains(&v) {
        out.push(b'I');
        out.extend_from_slice(&(v as u32).to_le_bytes());
    } else {
        out.push(b'i');
        out.extend_from_slice(&(v as i32).to_le_bytes());
    }
}

fn write_i32_le_into(out: &mut Vec<u8>, v: i32) {
    let mut buf = [0u8; 4];
    write_i32_le(&mut buf, 0, v);
    out.extend_from_slice(&buf);
}

fn write_u16_le_into(out: &mut Vec<u8>, v: u16) {
    let mut buf = [0u8; 2];
    write_u16_le(&mut buf, 0, v);
    out.extend_from_slice(&buf);
}

fn encode_array_elems(out: &mut Vec<u8>, arr: &AuxArray) {
    match arr {
        AuxArray::Int8(v) => out.extend(v.iter().map(|&x| x as u8)),
        AuxArray::UInt8(v) => out.extend_from_slice(v),
        AuxArray::Int16(v) => v.iter().for_each(|&x| out.extend_from_slice(&x.to_le_bytes())),
        AuxArray::UInt16(v) => v.iter().for_each(|&x| write_u16_le_into(out, x)),
        AuxArray::Int32(v) => v.iter().for_each(|&x| write_i32_le_into(out, x)),
        AuxArray::UInt32(v) => v.iter().for_each(|&x| out.extend_from_slice(&x.to_le_bytes())),
        AuxArray::Float(v) => v.iter().for_each(|&x| out.extend_from_slice(&x.to_le_bytes())),
    }
}

/// Parse one SAM-text aux field, `TAG:TYPE:value`.
pub fn parse_aux_text(text: &str) -> Result<AuxField> {
    let mut parts = text.splitn(3, ':');
    let tag_str = parts.next().unwrap_or("");
    let type_str = parts.next().ok_or_else(|| SamError::bad_format("malformed aux field"))?;
    let value_str = parts.next().ok_or_else(|| SamError::bad_format("malformed aux field"))?;
    if tag_str.len() != 2 {
        return Err(SamError::bad_format("aux tag must be two characters"));
    }
    let tag = [tag_str.as_bytes()[0], tag_str.as_bytes()[1]];
    let type_char = type_str
        .bytes()
        .next()
        .ok_or_else(|| SamError::bad_format("missing aux type"))?;

    let value = match type_char {
        b'A' => AuxValue::Char(
            *value_str
                .as_bytes()
                .first()
                .ok_or_else(|| SamError::bad_format("empty aux character value"))?,
        ),
        b'i' => AuxValue::Int(
            value_str
                .parse()
                .map_err(|_| SamError::bad_format(format!("malformed integer aux value \"{}\"", value_str)))?,
        ),
        b'f' => AuxValue::Float(
            value_str
                .parse()
                .map_err(|_| SamError::bad_format(format!("malformed float aux value \"{}\"", value_str)))?,
        ),
        b'Z' => AuxValue::String(value_str.to_string()),
        b'H' => AuxValue::Hex(value_str.to_string()),
        b'B' => AuxValue::Array(parse_array_text(value_str)?),
        other => {
            return Err(SamError::bad_format(format!(
                "unknown aux field type '{}'",
                other as char
            )))
        }
    };
    Ok(AuxField { tag, value })
}

fn parse_array_text(text: &str) -> Result<AuxArray> {
    let mut parts = text.split(',');
    let subtype = parts
        .next()
        .and_then(|s| s.bytes().next())
        .ok_or_else(|| SamError::bad_format("missing aux array subtype"))?;
    let rest: Vec<&str> = parts.collect();
    let bad = || SamError::bad_format(format!("malformed aux array element in \"{}\"", text));
    Ok(match subtype {
        b'c' => AuxArray::Int8(
            rest.iter().map(|s| s.parse().map_err(|_| bad())).collect::<Result<_>>()?,
        ),
        b'C' => AuxArray::UInt8(
            rest.iter().map(|s| s.parse().map_err(|_| bad())).collect::<Result<_>>()?,
        ),
        b's' => AuxArray::Int16(
            rest.iter().map(|s| s.parse().map_err(|_| bad())).collect::<Result<_>>()?,
        ),
        b'S' => AuxArray::UInt16(
            rest.iter().map(|s| s.parse().map_err(|_| bad())).collect::<Result<_>>()?,
        ),
        b'i' => AuxArray::Int32(
            rest.iter().map(|s| s.parse().map_err(|_| bad())).collect::<Result<_>>()?,
        ),
        b'I' => AuxArray::UInt32(
            rest.iter().map(|s| s.parse().map_err(|_| bad())).collect::<Result<_>>()?,
        ),
        b'f' => AuxArray::Float(
            rest.iter().map(|s| s.parse().map_err(|_| bad())).collect::<Result<_>>()?,
        ),
        other => {
            return Err(SamError::bad_format(format!(
                "unknown aux array subtype '{}'",
                other as char
            )))
        }
    })
}

/// Format one field as SAM text, `TAG:TYPE:value`. All integer subtypes
/// collapse to `i`, matching htslib's SAM writer.
pub fn format_aux_text(field: &AuxField) -> String {
    let tag = std::str::from_utf8(&field.tag).unwrap_or("??");
    match &field.value {
        AuxValue::Char(c) => format!("{}:A:{}", tag, *c as char),
        AuxValue::Int(v) => format!("{}:i:{}", tag, v),
        AuxValue::Float(f) => format!("{}:f:{}", tag, f),
        AuxValue::String(s) => format!("{}:Z:{}", tag, s),
        AuxValue::Hex(s) => format!("{}:H:{}", tag, s),
        AuxValue::Array(arr) => format!("{}:B:{}", tag, format_array_text(arr)),
    }
}

fn format_array_text(arr: &AuxArray) -> String {
    let mut s = String::new();
    s.push(arr.subtype_char());
    match arr {
        AuxArray::Int8(v) => v.iter().for_each(|x| s.push_str(&format!(",{}", x))),
        AuxArray::UInt8(v) => v.iter().for_each(|x| s.push_str(&format!(",{}", x))),
        AuxArray::Int16(v) => v.iter().for_each(|x| s.push_str(&format!(",{}", x))),
        AuxArray::UInt16(v) => v.iter().for_each(|x| s.push_str(&format!(",{}", x))),
        AuxArray::Int32(v) => v.iter().for_each(|x| s.push_str(&format!(",{}", x))),
        AuxArray::UInt32(v) => v.iter().for_each(|x| s.push_str(&format!(",{}", x))),
        AuxArray::Float(v) => v.iter().for_each(|x| s.push_str(&format!(",{}", x))),
    }
    s
}

/// Iterator over the packed aux region of a block, yielding decoded
/// fields in wire order.
pub struct AuxIter<'a> {
    rest: &'a [u8],
}

impl<'a> AuxIter<'a> {
    pub fn new(aux_bytes: &'a [u8]) -> Self {
        AuxIter { rest: aux_bytes }
    }
}

impl<'a> Iterator for AuxIter<'a> {
    type Item = Result<AuxField>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        match decode_field(self.rest) {
            Ok((field, len)) => {
                self.rest = &self.rest[len..];
                Some(Ok(field))
            }
            Err(e) => {
                self.rest = &[];
                Some(Err(e))
            }
        }
    }
}

/// Find one field's `(offset, length)` within a packed aux region by tag.
pub(crate) fn find_field<'a>(aux_bytes: &'a [u8], tag: [u8; 2]) -> Option<(usize, usize)> {
    let mut offset = 0;
    while offset < aux_bytes.len() {
        let len = field_len(&aux_bytes[offset..])?;
        if aux_bytes[offset] == tag[0] && aux_bytes[offset + 1] == tag[1] {
            return Some((offset, len));
        }
        offset += len;
    }
    None
}
