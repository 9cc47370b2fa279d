use std::io::Write;
use std::sync::{Mutex, PoisonError};

use http::header::{HeaderName, HeaderValue};
use http::StatusCode;

use crate::error::DispatchError;

use super::Output;

/// Write side of the current request: buffered headers, emitted once.
pub trait ResponseWriter: Send + Sync {
    /// Buffer a raw header line.
    ///
    /// `"HTTP/1.1 404 Not Found"` sets the status; `"Name: value"` adds a
    /// header, dropping earlier ones with the same name when `replace` is
    /// set. `status` forces the response code.
    fn set_header(&self, value: &str, replace: bool, status: Option<u16>)
        -> Result<(), DispatchError>;

    /// Emit the buffered status line and headers.
    fn display(&self) -> Result<(), DispatchError>;
}

struct ResponseState {
    status: StatusCode,
    headers: Vec<(HeaderName, HeaderValue)>,
    out: Output,
    sent: bool,
}

/// Response writer that emits to an [`Output`] sink.
pub struct Response {
    state: Mutex<ResponseState>,
}

impl Response {
    #[must_use]
    pub fn new(out: Output) -> Self {
        Self {
            state: Mutex::new(ResponseState {
                status: StatusCode::OK,
                headers: Vec::new(),
                out,
                sent: false,
            }),
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.lock().status
    }

    /// Buffered headers as `(name, value)` pairs.
    #[must_use]
    pub fn headers(&self) -> Vec<(String, String)> {
        self.lock()
            .headers
            .iter()
            .map(|(k, v)| (k.to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect()
    }

    /// Get a buffered header by name (case-insensitive)
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<String> {
        self.headers()
            .into_iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    #[must_use]
    pub fn is_sent(&self) -> bool {
        self.lock().sent
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ResponseState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ResponseWriter for Response {
    fn set_header(
        &self,
        value: &str,
        replace: bool,
        status: Option<u16>,
    ) -> Result<(), DispatchError> {
        let forced = status
            .map(|code| StatusCode::from_u16(code).map_err(|_| DispatchError::InvalidStatus(code)))
            .transpose()?;

        let line = value.trim();
        let mut state = self.lock();

        if let Some(status_line) = line.strip_prefix("HTTP/") {
            let code = status_line
                .split_whitespace()
                .nth(1)
                .and_then(|c| c.parse::<u16>().ok())
                .ok_or_else(|| DispatchError::InvalidHeader(value.to_string()))?;
            state.status =
                StatusCode::from_u16(code).map_err(|_| DispatchError::InvalidStatus(code))?;
        } else {
            let (name, val) = line
                .split_once(':')
                .ok_or_else(|| DispatchError::InvalidHeader(value.to_string()))?;
            let name = HeaderName::from_bytes(name.trim().as_bytes())
                .map_err(|_| DispatchError::InvalidHeader(value.to_string()))?;
            let val = HeaderValue::from_str(val.trim())
                .map_err(|_| DispatchError::InvalidHeader(value.to_string()))?;
            if replace {
                state.headers.retain(|(k, _)| *k != name);
            }
            // Location implies a redirect when no explicit status was set.
            if name == http::header::LOCATION && forced.is_none() && state.status == StatusCode::OK {
                state.status = StatusCode::FOUND;
            }
            state.headers.push((name, val));
        }

        if let Some(code) = forced {
            state.status = code;
        }
        Ok(())
    }

    fn display(&self) -> Result<(), DispatchError> {
        let mut state = self.lock();
        let ResponseState {
            status,
            headers,
            out,
            sent,
        } = &mut *state;

        if !*sent {
            writeln!(
                out,
                "HTTP/1.1 {} {}\r",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            )?;
        }
        for (name, value) in headers.drain(..) {
            write!(out, "{name}: ")?;
            out.write_all(value.as_bytes())?;
            out.write_all(b"\r\n")?;
        }
        out.flush()?;
        *sent = true;
        Ok(())
    }
}
