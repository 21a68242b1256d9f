//! Source encodings of PO files. The lexer only needs to know how wide each
//! character is, so charsets are reduced to a handful of decoding strategies.

use crate::utils::find_subslice;

/// Charset names understood portably by `iconv` implementations, see
/// <https://www.gnu.org/software/gettext/manual/gettext.html#Header-Entry>.
static STANDARD_CHARSETS: &[&str] = &[
  "ASCII",
  "ISO-8859-1",
  "ISO-8859-2",
  "ISO-8859-3",
  "ISO-8859-4",
  "ISO-8859-5",
  "ISO-8859-6",
  "ISO-8859-7",
  "ISO-8859-8",
  "ISO-8859-9",
  "ISO-8859-13",
  "ISO-8859-14",
  "ISO-8859-15",
  "KOI8-R",
  "KOI8-U",
  "KOI8-T",
  "CP850",
  "CP866",
  "CP874",
  "CP932",
  "CP949",
  "CP950",
  "CP1250",
  "CP1251",
  "CP1252",
  "CP1253",
  "CP1254",
  "CP1255",
  "CP1256",
  "CP1257",
  "GB2312",
  "EUC-JP",
  "EUC-KR",
  "EUC-TW",
  "BIG5",
  "BIG5-HKSCS",
  "GBK",
  "GB18030",
  "SHIFT_JIS",
  "JOHAB",
  "TIS-620",
  "VISCII",
  "GEORGIAN-PS",
  "UTF-8",
];

static ALIASES: &[(&str, &str)] = &[
  ("US-ASCII", "ASCII"),
  ("ANSI_X3.4-1968", "ASCII"),
  ("UTF8", "UTF-8"),
  ("LATIN1", "ISO-8859-1"),
  ("ISO8859-1", "ISO-8859-1"),
  ("ISO_8859-1", "ISO-8859-1"),
  ("ISO8859-2", "ISO-8859-2"),
  ("ISO_8859-2", "ISO-8859-2"),
  ("ISO8859-5", "ISO-8859-5"),
  ("ISO_8859-5", "ISO-8859-5"),
  ("ISO8859-7", "ISO-8859-7"),
  ("ISO_8859-7", "ISO-8859-7"),
  ("ISO8859-9", "ISO-8859-9"),
  ("ISO_8859-9", "ISO-8859-9"),
  ("ISO8859-15", "ISO-8859-15"),
  ("ISO_8859-15", "ISO-8859-15"),
  ("WINDOWS-1250", "CP1250"),
  ("WINDOWS-1251", "CP1251"),
  ("WINDOWS-1252", "CP1252"),
  ("WINDOWS-1253", "CP1253"),
  ("WINDOWS-1254", "CP1254"),
  ("WINDOWS-1255", "CP1255"),
  ("WINDOWS-1256", "CP1256"),
  ("WINDOWS-1257", "CP1257"),
  ("SJIS", "SHIFT_JIS"),
  ("SHIFT-JIS", "SHIFT_JIS"),
  ("EUCJP", "EUC-JP"),
  ("EUCKR", "EUC-KR"),
  ("EUCTW", "EUC-TW"),
  ("BIG-5", "BIG5"),
];

/// The placeholder put into PO templates by `xgettext`.
pub const PLACEHOLDER: &str = "CHARSET";

/// Returns the canonical spelling of a charset name, or `None` for names not
/// in the portable list.
pub fn canonicalize(name: &str) -> Option<&'static str> {
  if let Some(&canonical) = STANDARD_CHARSETS.iter().find(|c| c.eq_ignore_ascii_case(name)) {
    return Some(canonical);
  }
  ALIASES.iter().find(|(alias, _)| alias.eq_ignore_ascii_case(name)).map(|&(_, c)| c)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceCharset {
  /// Decoded character by character.
  Utf8,
  /// One byte is one character.
  SingleByte,
  /// A legacy multibyte encoding, split into characters by the ranges of its
  /// lead and trail bytes.
  Multibyte(MultibyteCharset),
}

impl Default for SourceCharset {
  #[inline(always)]
  fn default() -> Self { Self::Utf8 }
}

impl SourceCharset {
  pub fn for_canonical_name(canonical_name: &str) -> Self {
    use MultibyteCharset::*;
    let multibyte = match canonical_name {
      "UTF-8" => return Self::Utf8,
      "EUC-JP" => EucJp,
      "EUC-KR" | "GB2312" => EucKr,
      "EUC-TW" => EucTw,
      "BIG5" | "BIG5-HKSCS" | "CP950" => Big5,
      "GBK" => Gbk,
      "GB18030" => Gb18030,
      "SHIFT_JIS" | "CP932" => ShiftJis,
      "CP949" => Uhc,
      "JOHAB" => Johab,
      _ => return Self::SingleByte,
    };
    Self::Multibyte(multibyte)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultibyteCharset {
  EucJp,
  /// Also covers GB2312, which shares the two-byte EUC layout.
  EucKr,
  EucTw,
  Big5,
  Gbk,
  Gb18030,
  ShiftJis,
  /// Unified Hangul Code, also known as CP949.
  Uhc,
  Johab,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MbSequenceError {
  Invalid,
  IncompleteAtEndOfLine,
  IncompleteAtEndOfFile,
}

/// Checks that `bytes[index]` is a valid continuation of a sequence.
fn trail(bytes: &[u8], index: usize, ranges: &[(u8, u8)]) -> Result<(), MbSequenceError> {
  match bytes.get(index) {
    None => Err(MbSequenceError::IncompleteAtEndOfFile),
    Some(b'\n') => Err(MbSequenceError::IncompleteAtEndOfLine),
    Some(&b) if ranges.iter().any(|&(lo, hi)| lo <= b && b <= hi) => Ok(()),
    Some(_) => Err(MbSequenceError::Invalid),
  }
}

impl MultibyteCharset {
  /// Length in bytes of the character at the start of `bytes`, which must
  /// not be empty. ASCII bytes are always characters on their own, so a
  /// newline never ends up inside a sequence.
  pub fn char_len(self, bytes: &[u8]) -> Result<usize, MbSequenceError> {
    use MultibyteCharset::*;
    const HIGH: (u8, u8) = (0xa1, 0xfe);

    let lead = bytes[0];
    if lead < 0x80 {
      return Ok(1);
    }
    match self {
      EucJp => match lead {
        0x8e => trail(bytes, 1, &[HIGH]).map(|()| 2),
        0x8f => trail(bytes, 1, &[HIGH]).and_then(|()| trail(bytes, 2, &[HIGH])).map(|()| 3),
        0xa1..=0xfe => trail(bytes, 1, &[HIGH]).map(|()| 2),
        _ => Err(MbSequenceError::Invalid),
      },
      EucKr => match lead {
        0xa1..=0xfe => trail(bytes, 1, &[HIGH]).map(|()| 2),
        _ => Err(MbSequenceError::Invalid),
      },
      EucTw => match lead {
        0x8e => {
          trail(bytes, 1, &[(0xa1, 0xb0)])?;
          trail(bytes, 2, &[HIGH])?;
          trail(bytes, 3, &[HIGH])?;
          Ok(4)
        }
        0xa1..=0xfe => trail(bytes, 1, &[HIGH]).map(|()| 2),
        _ => Err(MbSequenceError::Invalid),
      },
      Big5 => match lead {
        0x81..=0xfe => trail(bytes, 1, &[(0x40, 0x7e), HIGH]).map(|()| 2),
        _ => Err(MbSequenceError::Invalid),
      },
      Gbk => match lead {
        0x81..=0xfe => trail(bytes, 1, &[(0x40, 0x7e), (0x80, 0xfe)]).map(|()| 2),
        _ => Err(MbSequenceError::Invalid),
      },
      Gb18030 => match lead {
        0x81..=0xfe => match bytes.get(1) {
          Some(0x30..=0x39) => {
            trail(bytes, 2, &[(0x81, 0xfe)])?;
            trail(bytes, 3, &[(0x30, 0x39)])?;
            Ok(4)
          }
          _ => trail(bytes, 1, &[(0x40, 0x7e), (0x80, 0xfe)]).map(|()| 2),
        },
        _ => Err(MbSequenceError::Invalid),
      },
      ShiftJis => match lead {
        // Half-width katakana.
        0xa1..=0xdf => Ok(1),
        0x81..=0x9f | 0xe0..=0xfc => trail(bytes, 1, &[(0x40, 0x7e), (0x80, 0xfc)]).map(|()| 2),
        _ => Err(MbSequenceError::Invalid),
      },
      Uhc => match lead {
        0x81..=0xfe => trail(bytes, 1, &[(0x41, 0x5a), (0x61, 0x7a), (0x81, 0xfe)]).map(|()| 2),
        _ => Err(MbSequenceError::Invalid),
      },
      Johab => match lead {
        0x84..=0xd3 => trail(bytes, 1, &[(0x41, 0x7e), (0x81, 0xfe)]).map(|()| 2),
        0xd8..=0xde | 0xe0..=0xf9 => trail(bytes, 1, &[(0x31, 0x7e), (0x91, 0xfe)]).map(|()| 2),
        _ => Err(MbSequenceError::Invalid),
      },
    }
  }
}

/// Extracts the value of the `charset=` parameter of the `Content-Type`
/// field from the msgstr of a header entry.
pub fn find_in_header(header: &[u8]) -> Option<&str> {
  const KEY: &[u8] = b"charset=";
  let content_type_start = find_subslice(header, b"Content-Type:")?;
  let rest = &header[content_type_start..];
  let rest = &rest[..rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len())];
  let value_start = find_subslice(rest, KEY)? + KEY.len();
  let value = &rest[value_start..];
  let value_len = value
    .iter()
    .position(|&b| b == b' ' || b == b'\t' || b == b';' || b == b'\n')
    .unwrap_or(value.len());
  std::str::from_utf8(&value[..value_len]).ok().filter(|s| !s.is_empty())
}
