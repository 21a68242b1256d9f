//! The binary catalog format read by `gettext` at run time, see
//! <https://www.gnu.org/software/gettext/manual/gettext.html#MO-Files>.
//!
//! ```text
//! offset 0   magic number
//! offset 4   file format revision
//! offset 8   number of strings N
//! offset 12  offset of the table with original strings O
//! offset 16  offset of the table with translated strings T
//! offset 20  size of the hash table H
//! offset 24  offset of the hash table
//! O          N (length, offset) pairs, sorted by the original string
//! T          N (length, offset) pairs
//!            H hash table buckets
//!            the strings themselves, each terminated with NUL
//! ```

pub mod hash;
pub mod reader;
pub mod writer;

pub use reader::{read, MoError, MoErrorKind, MoFile};
pub use writer::{write, MoEntry, MoWriterOptions};

use std::fmt;
use std::str::FromStr;

pub const MAGIC: u32 = 0x950412de;
pub const REVISION: u32 = 0;
pub const HEADER_SIZE: usize = 7 * 4;
/// Size of a (length, offset) pair.
pub const STRING_DESCRIPTOR_SIZE: usize = 2 * 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
  Little,
  Big,
}

impl Endianness {
  #[inline]
  pub fn native() -> Self {
    if cfg!(target_endian = "big") {
      Self::Big
    } else {
      Self::Little
    }
  }

  #[inline]
  pub fn opposite(self) -> Self {
    match self {
      Self::Little => Self::Big,
      Self::Big => Self::Little,
    }
  }

  #[inline]
  pub fn encode_u32(self, n: u32) -> [u8; 4] {
    match self {
      Self::Little => n.to_le_bytes(),
      Self::Big => n.to_be_bytes(),
    }
  }

  #[inline]
  pub fn decode_u32(self, bytes: [u8; 4]) -> u32 {
    match self {
      Self::Little => u32::from_le_bytes(bytes),
      Self::Big => u32::from_be_bytes(bytes),
    }
  }
}

impl Default for Endianness {
  #[inline(always)]
  fn default() -> Self { Self::native() }
}

impl fmt::Display for Endianness {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(match self {
      Self::Little => "little",
      Self::Big => "big",
    })
  }
}

impl FromStr for Endianness {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "little" => Ok(Self::Little),
      "big" => Ok(Self::Big),
      "native" => Ok(Self::native()),
      _ => Err(format!("unknown byte order: {:?}", s)),
    }
  }
}
