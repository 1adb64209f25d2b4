use std::fmt;
use std::io::{self, Cursor, Read};

/// A response whose body has not been read yet.
///
/// Dropping the response releases the body; [`TransportResponse::drain`]
/// consumes it explicitly so the underlying connection can be reused before
/// a retry.
pub struct TransportResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Box<dyn Read + Send>,
}

impl TransportResponse {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Box<dyn Read + Send>) -> Self {
        Self { status, headers, body }
    }

    /// Response with an in-memory body
    pub fn from_bytes(status: u16, headers: Vec<(String, String)>, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status, headers, Box::new(Cursor::new(body.into())))
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First value of the named header (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Every value of the named header, in received order
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Read the whole body.
    ///
    /// # Errors
    /// Propagates I/O errors from the underlying stream.
    pub fn bytes(mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.body.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Read the body as text for error reporting.
    ///
    /// Never fails: invalid UTF-8 is replaced and a read error yields a
    /// placeholder that names the error instead of the body.
    pub fn read_text(&mut self) -> String {
        let mut buf = Vec::new();
        match self.body.read_to_end(&mut buf) {
            Ok(_) => String::from_utf8_lossy(&buf).into_owned(),
            Err(err) if buf.is_empty() => format!("<unreadable response body: {err}>"),
            Err(err) => {
                format!("{} <truncated: {err}>", String::from_utf8_lossy(&buf))
            }
        }
    }

    /// Consume and discard whatever remains of the body
    pub fn drain(&mut self) {
        let _ = io::copy(&mut self.body, &mut io::sink());
    }

    /// Hand the body stream to the caller
    pub fn into_body(self) -> Box<dyn Read + Send> {
        self.body
    }
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("headers", &self.headers.len())
            .finish_non_exhaustive()
    }
}
