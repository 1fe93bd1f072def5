use ntex_bytes::{BufMut, BytesMut};

use crate::error::DecodeError;
use crate::types::MAX_PACKET_SIZE;

/// Max number of bytes in the remaining length field
pub(crate) const MAX_VARIABLE_LENGTH_BYTES: usize = 4;

macro_rules! ensure {
    ($cond:expr, $e:expr) => {
        if !($cond) {
            return Err($e);
        }
    };
}

macro_rules! prim_enum {
    (
        $( #[$enum_attr:meta] )*
        pub enum $name:ident => $err:ident {
            $(
                $( #[$enum_item_attr:meta] )*
                $var:ident=$val:literal
            ),+
        }) => {
        $( #[$enum_attr] )*
        #[repr(u8)]
        #[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
        pub enum $name {
            $(
                $( #[$enum_item_attr] )*
                $var = $val
            ),+
        }
        impl std::convert::TryFrom<u8> for $name {
            type Error = $crate::error::DecodeError;
            fn try_from(v: u8) -> Result<Self, Self::Error> {
                match v {
                    $($val => Ok($name::$var)),+
                    ,_ => Err($crate::error::DecodeError::$err(v))
                }
            }
        }
        impl From<$name> for u8 {
            fn from(v: $name) -> Self {
                v as u8
            }
        }
    };
}

/// Decodes variable length and returns tuple of (length, bytes consumed)
///
/// Returns `None` if `src` ends before the last length byte.
pub fn decode_variable_length(src: &[u8]) -> Result<Option<(u32, usize)>, DecodeError> {
    let mut value = 0u32;
    for (idx, byte) in src.iter().enumerate() {
        value |= u32::from(byte & 0x7F) << (idx * 7);
        if byte & 0x80 == 0 {
            return Ok(Some((value, idx + 1)));
        }
        ensure!(idx + 1 < MAX_VARIABLE_LENGTH_BYTES, DecodeError::LengthEncodingExceeded);
    }
    Ok(None)
}

/// Writes remaining length, least significant group first.
pub(crate) fn write_variable_length(size: u32, dst: &mut BytesMut) {
    debug_assert!(size <= MAX_PACKET_SIZE, "remaining length {} is out of range", size);

    let len = var_int_len(size);
    for idx in 0..len {
        let group = ((size >> (idx * 7)) & 0x7F) as u8;
        if idx + 1 < len {
            dst.put_u8(group | 0x80);
        } else {
            dst.put_u8(group);
        }
    }
}

/// Number of bytes `write_variable_length` produces for `size`
pub(crate) fn var_int_len(size: u32) -> usize {
    match size {
        0..=127 => 1,
        128..=16383 => 2,
        16384..=2097151 => 3,
        _ => 4,
    }
}
