// See:
// <https://github.com/autotools-mirror/gettext/blob/6c9cff1221f2cbf585fbee6f86ff047c8ede5286/gettext-tools/src/po-gram-gen.y>
// <https://github.com/autotools-mirror/gettext/blob/6c9cff1221f2cbf585fbee6f86ff047c8ede5286/gettext-tools/src/po-lex.c>
// <https://github.com/autotools-mirror/gettext/blob/6c9cff1221f2cbf585fbee6f86ff047c8ede5286/gettext-tools/src/write-po.c>
// <https://www.gnu.org/software/gettext/manual/gettext.html#PO-Files>
// <https://www.gnu.org/software/gettext/manual/gettext.html#Header-Entry>
//
// The behavior of GNU gettext on a given file is easiest to compare with:
//
//     msgfmt --check --statistics -o /dev/null file.po
//     msgcat file.po

pub mod charset;
pub mod lexer;
pub mod parser;
pub mod writer;

pub use lexer::{Lexer, LexerOptions};
pub use parser::Parser;

use crate::builder::CatalogBuilder;
use crate::impl_prelude::*;

/// Runs a single PO source through a builder.
pub fn parse(
  src: &[u8],
  file_name: &str,
  options: LexerOptions,
  builder: &mut dyn CatalogBuilder,
) -> AnyResult<()> {
  Parser::new(Lexer::new(src, file_name, options)).parse(builder)
}

/// Escapes a byte string for use inside double quotes in a PO file. Bytes
/// outside of the ASCII control range are copied as is, so that the text
/// stays in the charset it was read in.
pub fn escape_bytes(text: &[u8], out: &mut Vec<u8>) {
  out.reserve(text.len());
  let mut literal_text_start = 0;

  for (i, &b) in text.iter().enumerate() {
    let escape_type = ESCAPE_TYPE_TABLE[b as usize];
    if escape_type == 0 {
      continue;
    }

    out.extend_from_slice(&text[literal_text_start..i]);
    literal_text_start = i + 1;

    if escape_type == OO {
      out.push(b'\\');
      out.push(b'0' + (b >> 6));
      out.push(b'0' + ((b >> 3) & 0o7));
      out.push(b'0' + (b & 0o7));
    } else {
      out.push(b'\\');
      out.push(escape_type);
    };
  }

  out.extend_from_slice(&text[literal_text_start..]);

  const AA: u8 = b'a'; // \x07
  const BB: u8 = b'b'; // \x08
  const TT: u8 = b't'; // \x09
  const NN: u8 = b'n'; // \x0A
  const VV: u8 = b'v'; // \x0B
  const FF: u8 = b'f'; // \x0C
  const RR: u8 = b'r'; // \x0D
  const QU: u8 = b'"'; // \x22
  const BS: u8 = b'\\'; // \x5C
  const OO: u8 = b'0'; // \x00...\x1F except the ones above, and \x7F
  const __: u8 = 0;

  /// See <https://github.com/serde-rs/json/blob/9b64e0b17ca73e7fbecace37758ff19bc35dea05/src/ser.rs#L2123-L2125>.
  static ESCAPE_TYPE_TABLE: [u8; 1 << 8] = [
    //   1   2   3   4   5   6   7   8   9   A   B   C   D   E   F
    OO, OO, OO, OO, OO, OO, OO, AA, BB, TT, NN, VV, FF, RR, OO, OO, // 0
    OO, OO, OO, OO, OO, OO, OO, OO, OO, OO, OO, OO, OO, OO, OO, OO, // 1
    __, __, QU, __, __, __, __, __, __, __, __, __, __, __, __, __, // 2
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 3
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 4
    __, __, __, __, __, __, __, __, __, __, __, __, BS, __, __, __, // 5
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 6
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, OO, // 7
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 8
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 9
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // A
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // B
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // C
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // D
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // E
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // F
  ];
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::builder::CollectingBuilder;

  #[test]
  fn test_escape_bytes() {
    let mut buf = Vec::new();
    escape_bytes(b"say \"hi\"\\\n\t\x07\x0b\x01\x7f caf\xc3\xa9", &mut buf);
    assert_eq!(buf, b"say \\\"hi\\\"\\\\\\n\\t\\a\\v\\001\\177 caf\xc3\xa9".to_vec());
  }

  #[test]
  fn test_escape_then_parse() {
    let text = b"tab\there\x1b[0m \"quoted\"\r\n";
    let mut src = b"msgid \"x\"\nmsgstr \"".to_vec();
    escape_bytes(text, &mut src);
    src.extend_from_slice(b"\"\n");

    let mut builder = CollectingBuilder::new();
    parse(&src, "escape.po", LexerOptions::default(), &mut builder).unwrap();
    let (catalog, _) = builder.into_parts();
    let message = catalog.get("messages").unwrap().get(b"x").unwrap();
    assert_eq!(message.msgstr[0], text.to_vec());
  }
}
