//! Format-detecting input/output stream façade (component C10, spec.md
//! §4.10): open a path without knowing in advance whether it is SAM,
//! gzipped SAM, or BAM, or create one in a chosen format.

mod detect;
mod input;
mod io_adapt;
mod output;

pub use detect::{detect_from_extension, detect_from_peek, Format};
pub use input::InputStream;
pub use output::OutputStream;
