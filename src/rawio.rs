//! Unbuffered, interrupt-safe, descriptor-backed byte source/sink with seek.
//!
//! `RawFile` is the lowest I/O primitive in this crate: a thin wrapper
//! around a POSIX file descriptor with no internal buffering (that's
//! [`crate::linebuf`]'s job) and automatic retry on `EINTR`. It either owns
//! the descriptor (opened from a path, closed on drop / explicit `close`)
//! or borrows one attached by the caller, mirroring the teacher's
//! "open a path vs. attach a caller-provided descriptor" split. Built
//! directly on `libc`'s syscall wrappers rather than a higher-level crate,
//! since this module *is* the raw layer everything else is buffered on top
//! of.

use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::RawFd;
use std::path::Path;

use crate::error::{Result, SamError};

/// Open mode, translated to POSIX flags per spec.md §4.2's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    Write,
    WriteAppend,
    ReadWrite,
    ReadWriteTrunc,
}

impl OpenMode {
    fn oflag(self) -> libc::c_int {
        match self {
            OpenMode::Read => libc::O_RDONLY,
            OpenMode::Write => libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC,
            OpenMode::WriteAppend => libc::O_WRONLY | libc::O_CREAT | libc::O_APPEND,
            OpenMode::ReadWrite => libc::O_RDWR,
            OpenMode::ReadWriteTrunc => libc::O_RDWR | libc::O_CREAT | libc::O_TRUNC,
        }
    }
}

/// `lseek`-style origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekFrom {
    Start(i64),
    Current(i64),
    End(i64),
}

impl SeekFrom {
    fn whence(self) -> libc::c_int {
        match self {
            SeekFrom::Start(_) => libc::SEEK_SET,
            SeekFrom::Current(_) => libc::SEEK_CUR,
            SeekFrom::End(_) => libc::SEEK_END,
        }
    }

    fn offset(self) -> libc::off_t {
        match self {
            SeekFrom::Start(o) | SeekFrom::Current(o) | SeekFrom::End(o) => o as libc::off_t,
        }
    }
}

fn last_errno() -> i32 {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

fn to_system_error(op: &'static str, path: Option<&str>) -> SamError {
    SamError::system(op, Some(last_errno()), path.map(|p| p.to_string()))
}

/// Retry a raw syscall wrapper (returning `-1` on error, setting `errno`)
/// across `EINTR`.
fn retry_eintr(mut op: impl FnMut() -> libc::c_long) -> libc::c_long {
    loop {
        let r = op();
        if r == -1 && last_errno() == libc::EINTR {
            continue;
        }
        return r;
    }
}

/// Unbuffered descriptor-backed byte source/sink.
pub struct RawFile {
    fd: Option<RawFd>,
    path: Option<String>,
    /// `true` when this `RawFile` does not own `fd` and must not close it.
    borrowed: bool,
}

impl RawFile {
    /// Open `path` in the given mode with the given creation permission bits.
    ///
    /// `ate` requests that the cursor be seeked to the end immediately after
    /// opening, regardless of mode (spec.md §4.2's `any|"ate"` row).
    pub fn open(path: &Path, mode: OpenMode, perm: u32, ate: bool) -> Result<Self> {
        let display = path.display().to_string();
        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|_| SamError::logic("path contains an interior NUL byte"))?;

        let fd = loop {
            // SAFETY: `c_path` is a valid NUL-terminated C string for the
            // duration of this call; `open` either returns a valid
            // descriptor or -1 with errno set.
            let r = unsafe { libc::open(c_path.as_ptr(), mode.oflag(), perm as libc::c_uint) };
            if r == -1 {
                if last_errno() == libc::EINTR {
                    continue;
                }
                return Err(to_system_error("open", Some(&display)));
            }
            break r;
        };

        let file = RawFile {
            fd: Some(fd),
            path: Some(display),
            borrowed: false,
        };
        if ate {
            file.seek(SeekFrom::End(0))?;
        }
        Ok(file)
    }

    /// Wrap an existing descriptor without taking ownership of it.
    ///
    /// `close()` on an attached `RawFile` is a no-op; dropping it never
    /// closes the underlying descriptor.
    pub fn attach(fd: RawFd) -> Self {
        RawFile {
            fd: Some(fd),
            path: None,
            borrowed: true,
        }
    }

    fn fd(&self) -> Result<RawFd> {
        self.fd
            .ok_or_else(|| SamError::logic("use of a closed raw file"))
    }

    /// Close the descriptor, propagating any error from `close(2)`.
    ///
    /// A no-op on an already-closed or borrowed `RawFile`.
    pub fn close(&mut self) -> Result<()> {
        if self.borrowed {
            self.fd = None;
            return Ok(());
        }
        if let Some(fd) = self.fd.take() {
            // SAFETY: `fd` was returned by a prior successful `open` and has
            // not been closed yet (we just took it out of `self.fd`).
            let r = retry_eintr(|| unsafe { libc::close(fd) as libc::c_long });
            if r == -1 {
                return Err(to_system_error("close", self.path.as_deref()));
            }
        }
        Ok(())
    }

    /// Read up to `buf.len()` bytes. Returns the number of bytes actually read
    /// (`0` at EOF).
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let fd = self.fd()?;
        // SAFETY: `buf` is a valid, writable region of `buf.len()` bytes.
        let n = retry_eintr(|| unsafe {
            libc::read(fd, buf.as_mut_ptr() as *mut libc::c_void, buf.len()) as libc::c_long
        });
        if n == -1 {
            return Err(to_system_error("read", self.path.as_deref()));
        }
        Ok(n as usize)
    }

    /// Write all of `buf`, retrying short writes until everything is
    /// written or an error occurs.
    pub fn write(&mut self, buf: &[u8]) -> Result<()> {
        let fd = self.fd()?;
        let mut written = 0usize;
        while written < buf.len() {
            // SAFETY: `buf[written..]` is a valid, readable region.
            let n = retry_eintr(|| unsafe {
                libc::write(
                    fd,
                    buf[written..].as_ptr() as *const libc::c_void,
                    buf.len() - written,
                ) as libc::c_long
            });
            if n == -1 {
                return Err(to_system_error("write", self.path.as_deref()));
            }
            if n == 0 {
                return Err(SamError::system("write", None, self.path.clone()));
            }
            written += n as usize;
        }
        Ok(())
    }

    /// Reposition the descriptor's cursor. Equivalent to `lseek(2)`.
    pub fn seek(&self, pos: SeekFrom) -> Result<i64> {
        let fd = self.fd()?;
        // SAFETY: plain integer-in, integer-out syscall wrapper.
        let r = unsafe { libc::lseek(fd, pos.offset(), pos.whence()) };
        if r == -1 {
            return Err(to_system_error("lseek", self.path.as_deref()));
        }
        Ok(r as i64)
    }

    /// Number of bytes available to read without blocking, computed as
    /// `fstat().st_size - current_offset`. Falls back gracefully for
    /// descriptors where `fstat` reports a zero size (pipes, sockets):
    /// callers should treat `0` from this path as "unknown", not "empty".
    pub fn avail(&self) -> Result<i64> {
        let fd = self.fd()?;
        // SAFETY: `stat_buf` is fully initialized by a successful `fstat`
        // before being read.
        let mut stat_buf: libc::stat = unsafe { std::mem::zeroed() };
        let r = unsafe { libc::fstat(fd, &mut stat_buf) };
        if r == -1 {
            return Err(to_system_error("fstat", self.path.as_deref()));
        }
        let cur = self.seek(SeekFrom::Current(0))?;
        Ok((stat_buf.st_size as i64 - cur).max(0))
    }

    /// Character-oriented overflow/underflow hooks are deliberately not
    /// provided on this unbuffered primitive — reaching them is a logic
    /// error in the calling code (spec.md §4.2).
    pub fn underflow(&self) -> Result<u8> {
        Err(SamError::logic(
            "character-oriented I/O is not supported by RawFile",
        ))
    }
}

impl Drop for RawFile {
    fn drop(&mut self) {
        if !self.borrowed {
            let _ = self.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn write_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.bin");

        let mut w = RawFile::open(&path, OpenMode::Write, 0o644, false).unwrap();
        w.write(b"hello raw io").unwrap();
        w.close().unwrap();

        let mut r = RawFile::open(&path, OpenMode::Read, 0o644, false).unwrap();
        let mut buf = [0u8; 64];
        let n = r.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"hello raw io");
    }

    #[test]
    fn seek_and_avail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw2.bin");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"0123456789")
            .unwrap();

        let r = RawFile::open(&path, OpenMode::Read, 0o644, false).unwrap();
        assert_eq!(r.avail().unwrap(), 10);
        r.seek(SeekFrom::Start(4)).unwrap();
        assert_eq!(r.avail().unwrap(), 6);
    }

    #[test]
    fn ate_seeks_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw3.bin");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"abcdef")
            .unwrap();

        let f = RawFile::open(&path, OpenMode::ReadWrite, 0o644, true).unwrap();
        assert_eq!(f.seek(SeekFrom::Current(0)).unwrap(), 6);
    }

    #[test]
    fn closed_file_is_logic_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw4.bin");
        let mut f = RawFile::open(&path, OpenMode::Write, 0o644, false).unwrap();
        f.close().unwrap();
        assert!(matches!(f.write(b"x"), Err(SamError::Logic { .. })));
    }
}
