//! Frame delivery callbacks

use tandem_protocol::ErrorKind;

/// Consumer of decoded frames
///
/// Called synchronously from [`Link::poll`](crate::Link::poll), on the
/// byte ingestion path. Implementations must return quickly; anything
/// slow belongs in a queue drained elsewhere.
pub trait FrameHandler {
    /// A frame passed validation
    ///
    /// `data` is the payload without the checksum byte.
    fn on_frame(&mut self, command: u8, subcommand: Option<u8>, data: &[u8]);

    /// Raw payload of the same frame, delivered right after `on_frame`
    fn on_raw(&mut self, _data: &[u8]) {}

    /// A frame or partial frame was discarded
    fn on_error(&mut self, _kind: ErrorKind) {}
}

impl<F> FrameHandler for F
where
    F: FnMut(u8, Option<u8>, &[u8]),
{
    fn on_frame(&mut self, command: u8, subcommand: Option<u8>, data: &[u8]) {
        self(command, subcommand, data)
    }
}
