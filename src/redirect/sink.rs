//! Response primitives the redirector writes through.

use std::io;

pub const CONTENT_TYPE_HTML: &str = "text/html; charset=utf-8";

/// The host transport's response, as seen by the redirector.
pub trait ResponseSink {
    /// Issue a standard redirect (302 Found) to `location`.
    fn send_redirect(&mut self, location: &str) -> io::Result<()>;

    fn set_status(&mut self, status: u16);

    fn set_header(&mut self, name: &str, value: &str) -> io::Result<()>;

    fn set_content_type(&mut self, content_type: &str) -> io::Result<()> {
        self.set_header("content-type", content_type)
    }

    fn write_body(&mut self, body: String) -> io::Result<()>;
}
