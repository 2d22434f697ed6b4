//! Sliding char buffer with sentinel-based tab/newline splitter.
//!
//! `LineBuffer` sits between a byte source (anything implementing
//! [`std::io::Read`] — a [`crate::rawio::RawFile`] wrapped in an adapter, a
//! `flate2` decoder, or a plain `&[u8]` in tests) and the SAM line parser.
//! It always reserves one byte past the logical end of its data for a
//! sentinel `'\n'`, so the inner scan loop never needs an explicit
//! end-of-buffer check on the hot path.

use std::io::Read;

use crate::error::{Result, SamError};

/// A growable byte buffer implementing spec.md §4.4's `getline`/`peek`.
pub struct LineBuffer<R: Read> {
    source: R,
    data: Vec<u8>,
    /// Start of unconsumed data.
    begin: usize,
    /// End of valid data (exclusive). `data[end]` is always the sentinel.
    end: usize,
    at_eof: bool,
}

const INITIAL_CAPACITY: usize = 4096;

impl<R: Read> LineBuffer<R> {
    pub fn new(source: R) -> Self {
        let mut data = vec![0u8; INITIAL_CAPACITY + 1];
        data[0] = b'\n';
        LineBuffer {
            source,
            data,
            begin: 0,
            end: 0,
            at_eof: false,
        }
    }

    fn avail(&self) -> usize {
        self.end - self.begin
    }

    /// Shift unconsumed data to the front, then read more from the source.
    /// Grows the buffer if it's already full. Always keeps `data[end]` set
    /// to the sentinel `'\n'`.
    fn refill(&mut self) -> Result<usize> {
        if self.begin > 0 {
            self.data.copy_within(self.begin..self.end, 0);
            self.end -= self.begin;
            self.begin = 0;
        }
        if self.end + 1 >= self.data.len() {
            let new_len = (self.data.len() * 2).max(INITIAL_CAPACITY + 1);
            self.data.resize(new_len, 0);
        }
        let n = self
            .source
            .read(&mut self.data[self.end..self.data.len() - 1])
            .map_err(|e| SamError::system("read", e.raw_os_error(), None))?;
        self.end += n;
        self.data[self.end] = b'\n';
        if n == 0 {
            self.at_eof = true;
        }
        Ok(n)
    }

    /// Return the next byte without consuming it, refilling if the buffer is
    /// empty. Returns `None` at clean EOF.
    pub fn peek(&mut self) -> Result<Option<u8>> {
        if self.avail() == 0 && !self.at_eof {
            self.refill()?;
        }
        if self.avail() == 0 {
            return Ok(None);
        }
        Ok(Some(self.data[self.begin]))
    }

    /// Scan forward for the next line, splitting it on `'\t'` into fields.
    ///
    /// `'\t'` bytes are overwritten with `NUL` in place and the position
    /// right after each is pushed to `out_fields`; the returned slice is the
    /// whole line (first field start at index 0 of the slice, NUL-separated).
    /// A trailing `'\r'` before the newline is stripped. Returns `Ok(None)`
    /// at clean EOF (no bytes read); returns the final line once even if it
    /// lacks a trailing newline, exactly as spec.md §4.4/§7 specify.
    pub fn getline(&mut self, out_fields: &mut Vec<usize>) -> Result<Option<usize>> {
        out_fields.clear();
        let mut scan = self.begin;
        loop {
            // Ensure there is at least one unscanned byte (real data or the
            // sentinel) to look at.
            if scan >= self.end {
                if self.at_eof {
                    // We've hit the sentinel at end-of-input. If any bytes
                    // were consumed into this line, treat it as the final
                    // unterminated line; otherwise it's a clean EOF.
                    if self.begin == self.end {
                        return Ok(None);
                    }
                    let line_start = self.begin;
                    self.begin = self.end;
                    return Ok(Some(line_start));
                }
                self.refill()?;
                scan = scan.max(self.begin);
                continue;
            }

            match self.data[scan] {
                b'\t' => {
                    self.data[scan] = 0;
                    out_fields.push(scan + 1);
                    scan += 1;
                }
                b'\n' => {
                    if scan < self.end {
                        // Real newline.
                        let mut line_end = scan;
                        if line_end > self.begin && self.data[line_end - 1] == b'\r' {
                            line_end -= 1;
                        }
                        self.data[line_end] = 0;
                        let line_start = self.begin;
                        self.begin = scan + 1;
                        return Ok(Some(line_start));
                    } else {
                        // Sentinel reached before real EOF known; refill.
                        self.refill()?;
                        scan = scan.max(self.begin);
                        continue;
                    }
                }
                _ => scan += 1,
            }
        }
    }

    /// Borrow the raw buffer, used by callers that received a start offset
    /// from [`getline`] and want the NUL-terminated line/field text.
    pub fn field(&self, start: usize) -> &[u8] {
        let nul = self.data[start..]
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.data.len() - start);
        &self.data[start..start + nul]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn splits_tabs_and_strips_cr() {
        let mut lb = LineBuffer::new(Cursor::new(b"a\tb\tc\r\nsecond\n".to_vec()));
        let mut fields = Vec::new();
        let start = lb.getline(&mut fields).unwrap().unwrap();
        assert_eq!(lb.field(start), b"a");
        assert_eq!(fields.len(), 2);
        assert_eq!(lb.field(fields[0]), b"b");
        assert_eq!(lb.field(fields[1]), b"c");

        let start2 = lb.getline(&mut fields).unwrap().unwrap();
        assert_eq!(lb.field(start2), b"second");

        assert!(lb.getline(&mut fields).unwrap().is_none());
    }

    #[test]
    fn unterminated_final_line() {
        let mut lb = LineBuffer::new(Cursor::new(b"no newline".to_vec()));
        let mut fields = Vec::new();
        let start = lb.getline(&mut fields).unwrap().unwrap();
        assert_eq!(lb.field(start), b"no newline");
        assert!(lb.getline(&mut fields).unwrap().is_none());
    }

    #[test]
    fn clean_eof_on_empty_input() {
        let mut lb = LineBuffer::new(Cursor::new(Vec::<u8>::new()));
        let mut fields = Vec::new();
        assert!(lb.getline(&mut fields).unwrap().is_none());
    }

    #[test]
    fn large_line_forces_growth() {
        let mut long_line = vec![b'A'; INITIAL_CAPACITY * 3];
        long_line.push(b'\n');
        let mut lb = LineBuffer::new(Cursor::new(long_line.clone()));
        let mut fields = Vec::new();
        let start = lb.getline(&mut fields).unwrap().unwrap();
        assert_eq!(lb.field(start).len(), INITIAL_CAPACITY * 3);
    }

    #[test]
    fn peek_does_not_consume() {
        let mut lb = LineBuffer::new(Cursor::new(b"xy\n".to_vec()));
        assert_eq!(lb.peek().unwrap(), Some(b'x'));
        assert_eq!(lb.peek().unwrap(), Some(b'x'));
        let mut fields = Vec::new();
        let start = lb.getline(&mut fields).unwrap().unwrap();
        assert_eq!(lb.field(start), b"xy");
    }
}
