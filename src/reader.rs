use std::io::{self, Read};

use ntex_bytes::Bytes;

use crate::error::DecodeError;

/// Reads packet fields from a byte source, bounded by the remaining length
/// of the packet.
pub(crate) struct PacketReader<'a, R: ?Sized> {
    src: &'a mut R,
    remaining: u32,
}

impl<'a, R: Read + ?Sized> PacketReader<'a, R> {
    pub(crate) fn new(src: &'a mut R, remaining: u32) -> Self {
        PacketReader { src, remaining }
    }

    pub(crate) fn remaining(&self) -> u32 {
        self.remaining
    }

    pub(crate) fn has_remaining(&self) -> bool {
        self.remaining > 0
    }

    /// Charge `len` bytes against the budget, before anything is read.
    fn reserve(&mut self, len: usize) -> Result<(), DecodeError> {
        ensure!(len as u64 <= u64::from(self.remaining), DecodeError::DataExceedsPacket);
        self.remaining -= len as u32;
        Ok(())
    }

    pub(crate) fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), DecodeError> {
        self.reserve(buf.len())?;
        self.src.read_exact(buf).map_err(eof_to_data_exceeds)
    }

    /// Read `len` bytes without allocating the whole length upfront.
    pub(crate) fn take(&mut self, len: usize) -> Result<Bytes, DecodeError> {
        self.reserve(len)?;
        let mut buf = Vec::new();
        let read = (&mut *self.src).take(len as u64).read_to_end(&mut buf)?;
        ensure!(read == len, DecodeError::DataExceedsPacket);
        Ok(Bytes::from(buf))
    }

    /// Everything left within the packet.
    pub(crate) fn take_remaining(&mut self) -> Result<Bytes, DecodeError> {
        self.take(self.remaining as usize)
    }

    /// Drop unread bytes of the packet, so the source is positioned at the
    /// next packet.
    pub(crate) fn skip_remaining(&mut self) -> Result<u64, DecodeError> {
        let len = u64::from(self.remaining);
        self.remaining = 0;
        let skipped = io::copy(&mut (&mut *self.src).take(len), &mut io::sink())?;
        ensure!(skipped == len, DecodeError::DataExceedsPacket);
        Ok(skipped)
    }
}

fn eof_to_data_exceeds(err: io::Error) -> DecodeError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        DecodeError::DataExceedsPacket
    } else {
        DecodeError::Io(err)
    }
}

/// Types that can be read from a packet body.
pub(crate) trait Decode: Sized {
    fn decode<R: Read + ?Sized>(src: &mut PacketReader<'_, R>) -> Result<Self, DecodeError>;
}

impl Decode for u8 {
    fn decode<R: Read + ?Sized>(src: &mut PacketReader<'_, R>) -> Result<Self, DecodeError> {
        let mut buf = [0u8; 1];
        src.read_exact(&mut buf)?;
        Ok(buf[0])
    }
}

impl Decode for u16 {
    fn decode<R: Read + ?Sized>(src: &mut PacketReader<'_, R>) -> Result<Self, DecodeError> {
        let mut buf = [0u8; 2];
        src.read_exact(&mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }
}

/// Length prefixed byte string
impl Decode for Bytes {
    fn decode<R: Read + ?Sized>(src: &mut PacketReader<'_, R>) -> Result<Self, DecodeError> {
        let len = u16::decode(src)? as usize;
        src.take(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_primitives() {
        let mut data: &[u8] = b"\x01\x12\x34\x00\x03abc";
        let mut src = PacketReader::new(&mut data, 8);
        assert_eq!(u8::decode(&mut src), Ok(1));
        assert_eq!(u16::decode(&mut src), Ok(0x1234));
        assert_eq!(Bytes::decode(&mut src), Ok(Bytes::from_static(b"abc")));
        assert!(!src.has_remaining());
    }

    #[test]
    fn test_budget_checked_before_read() {
        let mut data: &[u8] = b"\x12\x34";
        let mut src = PacketReader::new(&mut data, 1);
        assert_eq!(u16::decode(&mut src), Err(DecodeError::DataExceedsPacket));
        // nothing was consumed from the source
        assert_eq!(data, b"\x12\x34");
    }

    #[test]
    fn test_string_longer_than_budget() {
        let mut data: &[u8] = b"\x00\x05abcde";
        let mut src = PacketReader::new(&mut data, 4);
        assert_eq!(Bytes::decode(&mut src), Err(DecodeError::DataExceedsPacket));
    }

    #[test]
    fn test_source_shorter_than_budget() {
        let mut data: &[u8] = b"\x00";
        let mut src = PacketReader::new(&mut data, 2);
        assert_eq!(u16::decode(&mut src), Err(DecodeError::DataExceedsPacket));

        let mut data: &[u8] = b"abc";
        let mut src = PacketReader::new(&mut data, 10);
        assert_eq!(src.take_remaining(), Err(DecodeError::DataExceedsPacket));
    }

    #[test]
    fn test_skip_remaining() {
        let mut data: &[u8] = b"\x01\x02\x03\x04";
        {
            let mut src = PacketReader::new(&mut data, 3);
            assert_eq!(u8::decode(&mut src), Ok(1));
            assert_eq!(src.skip_remaining(), Ok(2));
            assert_eq!(src.remaining(), 0);
        }
        assert_eq!(data, b"\x04");
    }

    #[test]
    fn test_io_error_passes_through() {
        struct Broken;

        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            }
        }

        let mut src = Broken;
        let mut src = PacketReader::new(&mut src, 2);
        assert_eq!(
            u16::decode(&mut src),
            Err(DecodeError::Io(io::ErrorKind::ConnectionReset.into()))
        );
    }
}
