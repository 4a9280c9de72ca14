use std::io::{Cursor, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

/// Error type for the binary name encoding
#[derive(Debug, thiserror::Error)]
pub enum NameCodecError {
    #[error("name of {0} bytes does not fit a 32-bit length prefix")]
    TooLong(usize),
    #[error("name is truncated: expected {expected} bytes, found {found}")]
    Truncated { expected: u32, found: usize },
    #[error("name terminator is {0:#04x}, expected NUL")]
    BadTerminator(u8),
    #[error("name is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Write `name` as a u32 LE byte length, the UTF-8 bytes, then a NUL
pub fn write_name<W: Write>(writer: &mut W, name: &str) -> Result<(), NameCodecError> {
    let bytes = name.as_bytes();
    let len = u32::try_from(bytes.len()).map_err(|_| NameCodecError::TooLong(bytes.len()))?;
    writer.write_u32::<LittleEndian>(len)?;
    writer.write_all(bytes)?;
    writer.write_u8(0)?;
    Ok(())
}

/// Read a name written by [`write_name`]. A non-NUL terminator means the
/// stream is corrupt.
pub fn read_name<R: Read>(reader: &mut R) -> Result<String, NameCodecError> {
    let len = reader.read_u32::<LittleEndian>()?;
    // The length prefix is untrusted: read through take() instead of
    // preallocating it
    let mut bytes = Vec::new();
    reader
        .by_ref()
        .take(u64::from(len))
        .read_to_end(&mut bytes)?;
    if bytes.len() != len as usize {
        return Err(NameCodecError::Truncated {
            expected: len,
            found: bytes.len(),
        });
    }
    let terminator = reader.read_u8()?;
    if terminator != 0 {
        return Err(NameCodecError::BadTerminator(terminator));
    }
    Ok(String::from_utf8(bytes)?)
}

pub fn encode_name(name: &str) -> Result<Vec<u8>, NameCodecError> {
    let mut out = Vec::with_capacity(name.len() + 5);
    write_name(&mut out, name)?;
    Ok(out)
}

pub fn decode_name(bytes: &[u8]) -> Result<String, NameCodecError> {
    read_name(&mut Cursor::new(bytes))
}
