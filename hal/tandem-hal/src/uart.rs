//! Serial byte transport abstractions
//!
//! The link never configures or owns the UART itself. It only needs a
//! way to drain bytes that have already arrived and a way to write
//! outbound frames.

use embedded_io::{Read, ReadReady, Write};

/// Receive side of the transport
pub trait ByteSource {
    /// Error type for receive operations
    type Error;

    /// Copy already-received bytes into `buf`
    ///
    /// Must not block: returns `Ok(0)` when nothing is pending. The count
    /// must not exceed `buf.len()`; callers clamp larger values.
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Transmit side of the transport
pub trait ByteSink {
    /// Error type for transmit operations
    type Error;

    /// Write all of `data`
    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

impl<T: ByteSource + ?Sized> ByteSource for &mut T {
    type Error = T::Error;

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        T::read_available(self, buf)
    }
}

impl<T: ByteSink + ?Sized> ByteSink for &mut T {
    type Error = T::Error;

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        T::write_all(self, data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        T::flush(self)
    }
}

/// [`ByteSource`] over any `embedded-io` reader that can report readiness
///
/// `read` is only called once `read_ready` says data is pending, so a
/// blocking driver is never entered with an empty FIFO.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IoSource<T> {
    inner: T,
}

impl<T> IoSource<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Read + ReadReady> ByteSource for IoSource<T> {
    type Error = T::Error;

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() || !self.inner.read_ready()? {
            return Ok(0);
        }
        self.inner.read(buf)
    }
}

/// [`ByteSink`] over any `embedded-io` writer
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IoSink<T> {
    inner: T,
}

impl<T> IoSink<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Write> ByteSink for IoSink<T> {
    type Error = T::Error;

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.inner.write_all(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_io::ErrorType;
    use heapless::Vec;

    struct FakeUart {
        rx: Vec<u8, 16>,
        tx: Vec<u8, 16>,
        flushed: bool,
    }

    impl FakeUart {
        fn with_rx(bytes: &[u8]) -> Self {
            let mut rx = Vec::new();
            rx.extend_from_slice(bytes).unwrap();
            Self {
                rx,
                tx: Vec::new(),
                flushed: false,
            }
        }
    }

    impl ErrorType for FakeUart {
        type Error = Infallible;
    }

    impl Read for FakeUart {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Infallible> {
            assert!(!self.rx.is_empty(), "read would block");
            let n = buf.len().min(self.rx.len());
            buf[..n].copy_from_slice(&self.rx[..n]);
            let rest: Vec<u8, 16> = Vec::from_slice(&self.rx[n..]).unwrap();
            self.rx = rest;
            Ok(n)
        }
    }

    impl ReadReady for FakeUart {
        fn read_ready(&mut self) -> Result<bool, Infallible> {
            Ok(!self.rx.is_empty())
        }
    }

    impl Write for FakeUart {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Infallible> {
            self.tx.extend_from_slice(buf).unwrap();
            Ok(buf.len())
        }

        fn flush(&mut self) -> Result<(), Infallible> {
            self.flushed = true;
            Ok(())
        }
    }

    #[test]
    fn test_source_drains_pending_bytes() {
        let mut source = IoSource::new(FakeUart::with_rx(&[1, 2, 3]));
        let mut buf = [0u8; 2];

        assert_eq!(source.read_available(&mut buf), Ok(2));
        assert_eq!(buf, [1, 2]);
        assert_eq!(source.read_available(&mut buf), Ok(1));
        assert_eq!(buf[0], 3);
    }

    #[test]
    fn test_source_does_not_block_when_empty() {
        let mut source = IoSource::new(FakeUart::with_rx(&[]));
        let mut buf = [0u8; 4];
        assert_eq!(source.read_available(&mut buf), Ok(0));
    }

    #[test]
    fn test_sink_writes_and_flushes() {
        let mut sink = IoSink::new(FakeUart::with_rx(&[]));
        sink.write_all(&[0x3A, 0x7E]).unwrap();
        ByteSink::flush(&mut sink).unwrap();

        let uart = sink.into_inner();
        assert_eq!(uart.tx.as_slice(), &[0x3A, 0x7E]);
        assert!(uart.flushed);
    }

    fn drain<S: ByteSource>(mut source: S, buf: &mut [u8]) -> Result<usize, S::Error> {
        source.read_available(buf)
    }

    #[test]
    fn test_mut_ref_forwarding() {
        let mut source = IoSource::new(FakeUart::with_rx(&[9]));
        let mut buf = [0u8; 1];
        assert_eq!(drain(&mut source, &mut buf), Ok(1));
        assert_eq!(drain(&mut source, &mut buf), Ok(0));
    }
}
