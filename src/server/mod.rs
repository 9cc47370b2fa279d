//! Request-scoped collaborators handed to every controller.
//!
//! The dispatch core only consumes these through traits; the concrete
//! types here are the in-process implementations used by the CLI and the
//! tests. All of them take `&self` and synchronise internally, so one
//! handle can be shared between a controller and the recovery boundary.

pub mod request;
pub mod response;
pub mod session;

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

pub use request::{parse_form, parse_query_params, Request, RequestReader};
pub use response::{Response, ResponseWriter};
pub use session::{MemorySession, SessionStore};

/// Boxed byte sink that headers and rendered pages are written to.
pub type Output = Box<dyn Write + Send>;

/// Cloneable in-memory sink. Every clone appends to the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryOutput {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MemoryOutput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8.
    #[must_use]
    pub fn contents(&self) -> String {
        let buf = self.buf.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[must_use]
    pub fn boxed(&self) -> Output {
        Box::new(self.clone())
    }
}

impl Write for MemoryOutput {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut buf = self.buf.lock().unwrap_or_else(PoisonError::into_inner);
        buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
