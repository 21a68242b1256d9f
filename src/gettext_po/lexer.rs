use super::charset::{self, MbSequenceError, SourceCharset};
use crate::diagnostics::{Diagnostics, Location};
use crate::utils::parsing::{CharPos, ParsingError};

use std::str;

pub const DEFAULT_MAX_ERRORS: usize = 20;
/// Nothing in the grammar ever needs to look further ahead than this.
const MAX_PUSHBACK: usize = 2;

#[derive(Debug, Clone)]
pub struct LexerOptions {
  /// Emit comments as tokens instead of skipping over them.
  pub pass_comments: bool,
  /// Syntax errors tolerated before the whole file is rejected.
  pub max_errors: usize,
}

impl Default for LexerOptions {
  fn default() -> Self { Self { pass_comments: true, max_errors: DEFAULT_MAX_ERRORS } }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
  pub pos: CharPos,
  /// Set when the token appears on a line starting with `#~`.
  pub obsolete: bool,
  pub type_: TokenType,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenType {
  Domain,
  Msgid,
  MsgidPlural,
  Msgstr,
  /// An identifier which is not a keyword.
  Name(String),
  Number(u64),
  String(Vec<u8>),
  /// Text of a comment line after the `#`.
  Comment(Vec<u8>),
  LeftBracket,
  RightBracket,
  /// Anything the lexer couldn't make sense of.
  Junk,
  Eof,
}

/// One (possibly multibyte) character of the source. A zero length marks the
/// end of input.
#[derive(Debug, Clone, Copy)]
struct MbChar {
  start: usize,
  len: usize,
  /// The decoded character, set only for successfully decoded multibyte
  /// sequences.
  decoded: Option<char>,
}

impl MbChar {
  const EOF: Self = Self { start: 0, len: 0, decoded: None };

  #[inline(always)]
  fn is_eof(&self) -> bool { self.len == 0 }

  #[inline(always)]
  fn single_byte(&self, src: &[u8]) -> Option<u8> {
    if self.len == 1 {
      Some(src[self.start])
    } else {
      None
    }
  }

  #[inline(always)]
  fn is(&self, src: &[u8], byte: u8) -> bool { self.single_byte(src) == Some(byte) }

  #[inline(always)]
  fn bytes<'src>(&self, src: &'src [u8]) -> &'src [u8] { &src[self.start..self.start + self.len] }
}

#[derive(Debug, Clone)]
pub struct Lexer<'src> {
  src: &'src [u8],
  file_name: String,
  options: LexerOptions,
  charset: SourceCharset,
  cursor: usize,
  /// The last character is read first.
  pushback: Vec<MbChar>,
  current_pos: CharPos,
  /// Cleared while skipping comments, which may legitimately be written in
  /// another encoding.
  signal_eilseq: bool,
  obsolete: bool,
  error_count: usize,
}

impl<'src> Lexer<'src> {
  pub fn new(src: &'src [u8], file_name: impl Into<String>, options: LexerOptions) -> Self {
    Self {
      src,
      file_name: file_name.into(),
      options,
      charset: SourceCharset::default(),
      cursor: 0,
      pushback: Vec::with_capacity(MAX_PUSHBACK),
      current_pos: CharPos::default(),
      signal_eilseq: true,
      obsolete: false,
      error_count: 0,
    }
  }

  #[inline(always)]
  pub fn file_name(&self) -> &str { &self.file_name }
  #[inline(always)]
  pub fn current_pos(&self) -> CharPos { self.current_pos }
  #[inline(always)]
  pub fn charset(&self) -> SourceCharset { self.charset }
  /// Number of syntax errors reported so far, by the lexer itself or through
  /// [`Lexer::emit_error`].
  #[inline(always)]
  pub fn error_count(&self) -> usize { self.error_count }

  #[inline]
  pub fn location(&self, pos: CharPos) -> Location { Location::new(&self.file_name, pos) }

  /// Records a syntax error. Once there are too many of them the whole file
  /// is rejected with the returned error.
  pub fn emit_error(
    &mut self,
    diagnostics: &mut Diagnostics,
    pos: CharPos,
    message: impl Into<String>,
  ) -> Result<(), ParsingError> {
    self.error_count += 1;
    diagnostics.error(Some(self.location(pos)), message);
    if self.error_count > self.options.max_errors {
      return Err(ParsingError::new(pos, "too many errors, aborting"));
    }
    Ok(())
  }

  /// Switches the source encoding to the one declared in the `Content-Type`
  /// field of a header entry.
  pub fn switch_charset_from_header(
    &mut self,
    header: &[u8],
    pos: CharPos,
    diagnostics: &mut Diagnostics,
  ) {
    let name = match charset::find_in_header(header) {
      Some(name) => name,
      None => return,
    };
    if name == charset::PLACEHOLDER {
      return;
    }
    match charset::canonicalize(name) {
      Some(canonical_name) => self.charset = SourceCharset::for_canonical_name(canonical_name),
      None => diagnostics.warning(
        Some(self.location(pos)),
        format!(
          "charset \"{}\" is not a portable encoding name, message conversion to the user's \
          charset might not work",
          name,
        ),
      ),
    }
  }

  fn warn_about_encoding(&self, diagnostics: &mut Diagnostics, message: &str) {
    if self.signal_eilseq {
      diagnostics.warning(Some(self.location(self.current_pos)), message);
    }
  }

  fn decode_utf8(&self, start: usize, diagnostics: &mut Diagnostics) -> (usize, Option<char>) {
    let src = self.src;
    if src[start] < 0x80 {
      return (1, None);
    }
    let mut end = start + 1;
    loop {
      match str::from_utf8(&src[start..end]) {
        Ok(s) => return (end - start, s.chars().next()),
        Err(e) if e.error_len().is_some() => {
          self.warn_about_encoding(diagnostics, "invalid multibyte sequence");
          return (1, None);
        }
        Err(_) => {
          if end >= src.len() {
            self.warn_about_encoding(diagnostics, "incomplete multibyte sequence at end of file");
            return (end - start, None);
          }
          if src[end] == b'\n' {
            self.warn_about_encoding(diagnostics, "incomplete multibyte sequence at end of line");
            return (end - start, None);
          }
          end += 1;
        }
      }
    }
  }

  /// Legacy multibyte characters are only delimited, never decoded.
  fn decode_multibyte(
    &self,
    start: usize,
    charset: charset::MultibyteCharset,
    diagnostics: &mut Diagnostics,
  ) -> usize {
    match charset.char_len(&self.src[start..]) {
      Ok(len) => len,
      Err(MbSequenceError::Invalid) => {
        self.warn_about_encoding(diagnostics, "invalid multibyte sequence");
        1
      }
      Err(MbSequenceError::IncompleteAtEndOfLine) => {
        self.warn_about_encoding(diagnostics, "incomplete multibyte sequence at end of line");
        1
      }
      Err(MbSequenceError::IncompleteAtEndOfFile) => {
        self.warn_about_encoding(diagnostics, "incomplete multibyte sequence at end of file");
        self.src.len() - start
      }
    }
  }

  fn mbfile_getc(&mut self, diagnostics: &mut Diagnostics) -> MbChar {
    if let Some(c) = self.pushback.pop() {
      return c;
    }
    if self.cursor >= self.src.len() {
      return MbChar::EOF;
    }
    let start = self.cursor;
    let (len, decoded) = match self.charset {
      SourceCharset::Utf8 => self.decode_utf8(start, diagnostics),
      SourceCharset::SingleByte => (1, None),
      SourceCharset::Multibyte(mb) => (self.decode_multibyte(start, mb, diagnostics), None),
    };
    self.cursor += len;
    MbChar { start, len, decoded }
  }

  fn mbfile_ungetc(&mut self, c: MbChar) {
    debug_assert!(self.pushback.len() < MAX_PUSHBACK, "too many characters pushed back");
    self.pushback.push(c);
  }

  /// Display width of a character at the current column. Control characters
  /// take no space, tabs advance to the next multiple of 8.
  fn char_width(&self, c: &MbChar) -> usize {
    match c.single_byte(self.src) {
      Some(b'\t') => 8 - (self.current_pos.column & 7),
      Some(0x00..=0x1f) | Some(0x7f) => 0,
      Some(_) => 1,
      None => match c.decoded {
        Some('\u{80}'..='\u{9f}') | Some('\u{2028}') | Some('\u{2029}') => 0,
        _ => 1,
      },
    }
  }

  /// Reads a character, eliding backslash-newline pairs, and keeps track of
  /// the position.
  fn lex_getc(&mut self, diagnostics: &mut Diagnostics) -> MbChar {
    loop {
      let c = self.mbfile_getc(diagnostics);
      if c.is_eof() {
        return c;
      }
      self.current_pos.byte_index = c.start + c.len;

      if c.is(self.src, b'\n') {
        self.current_pos.line += 1;
        self.current_pos.column = 0;
        return c;
      }

      self.current_pos.column += self.char_width(&c);

      if !c.is(self.src, b'\\') {
        return c;
      }
      let c2 = self.mbfile_getc(diagnostics);
      if !c2.is(self.src, b'\n') {
        if !c2.is_eof() {
          self.mbfile_ungetc(c2);
        }
        return c;
      }
      self.current_pos.byte_index = c2.start + c2.len;
      self.current_pos.line += 1;
      self.current_pos.column = 0;
    }
  }

  fn lex_ungetc(&mut self, c: MbChar) {
    if c.is_eof() {
      return;
    }
    if c.is(self.src, b'\n') {
      // The column of the previous line is lost, but nobody looks at it
      // before the newline is read again.
      self.current_pos.line -= 1;
    } else {
      self.current_pos.column = self.current_pos.column.saturating_sub(self.char_width(&c));
    }
    self.current_pos.byte_index = c.start;
    self.mbfile_ungetc(c);
  }

  #[inline(always)]
  fn token(&self, pos: CharPos, type_: TokenType) -> Token {
    Token { pos, obsolete: self.obsolete, type_ }
  }

  pub fn next_token(&mut self, diagnostics: &mut Diagnostics) -> Result<Token, ParsingError> {
    loop {
      let start_pos = self.current_pos;
      let c = self.lex_getc(diagnostics);
      if c.is_eof() {
        return Ok(self.token(start_pos, TokenType::Eof));
      }
      let first_byte = match c.single_byte(self.src) {
        Some(b) => b,
        None => return Ok(self.token(start_pos, TokenType::Junk)),
      };

      match first_byte {
        b'\n' => self.obsolete = false,

        // \f and \v are whitespace too
        b' ' | b'\t' | b'\r' | b'\x0c' | b'\x0b' => {}

        b'#' => {
          self.signal_eilseq = false;
          let mut c = self.lex_getc(diagnostics);
          if c.is(self.src, b'~') {
            // Obsolete entries are otherwise normal entries with all lines
            // prefixed by `#~`.
            self.signal_eilseq = true;
            self.obsolete = true;
            continue;
          }

          let mut text = if self.options.pass_comments { Some(Vec::new()) } else { None };
          while !c.is_eof() && !c.is(self.src, b'\n') {
            if let Some(text) = &mut text {
              text.extend_from_slice(c.bytes(self.src));
            }
            c = self.lex_getc(diagnostics);
          }
          let token = text.map(|text| self.token(start_pos, TokenType::Comment(text)));
          self.obsolete = false;
          self.signal_eilseq = true;
          if let Some(token) = token {
            return Ok(token);
          }
        }

        b'"' => return self.lex_string(start_pos, diagnostics),

        b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'$' => {
          let mut name = String::new();
          name.push(first_byte as char);
          loop {
            let c = self.lex_getc(diagnostics);
            match c.single_byte(self.src) {
              Some(b) if b.is_ascii_alphanumeric() || b == b'_' || b == b'$' => {
                name.push(b as char);
              }
              _ => {
                self.lex_ungetc(c);
                break;
              }
            }
          }

          let type_ = match name.as_str() {
            "domain" => TokenType::Domain,
            "msgid" => TokenType::Msgid,
            "msgid_plural" => TokenType::MsgidPlural,
            "msgstr" => TokenType::Msgstr,
            _ => {
              self.emit_error(diagnostics, start_pos, format!("keyword \"{}\" unknown", name))?;
              TokenType::Name(name)
            }
          };
          return Ok(self.token(start_pos, type_));
        }

        b'0'..=b'9' => {
          let mut number = u64::from(first_byte - b'0');
          loop {
            let c = self.lex_getc(diagnostics);
            match c.single_byte(self.src) {
              Some(b @ b'0'..=b'9') => {
                number = number.saturating_mul(10).saturating_add(u64::from(b - b'0'));
              }
              _ => {
                self.lex_ungetc(c);
                break;
              }
            }
          }
          return Ok(self.token(start_pos, TokenType::Number(number)));
        }

        b'[' => return Ok(self.token(start_pos, TokenType::LeftBracket)),
        b']' => return Ok(self.token(start_pos, TokenType::RightBracket)),

        _ => return Ok(self.token(start_pos, TokenType::Junk)),
      }
    }
  }

  /// Unterminated strings are reported, but whatever was collected is still
  /// returned as a token.
  fn lex_string(
    &mut self,
    start_pos: CharPos,
    diagnostics: &mut Diagnostics,
  ) -> Result<Token, ParsingError> {
    let mut text = Vec::new();
    loop {
      let c = self.lex_getc(diagnostics);
      if c.is_eof() {
        let pos = self.current_pos;
        self.emit_error(diagnostics, pos, "end-of-file within string")?;
        break;
      }
      if c.is(self.src, b'\n') {
        let pos = self.current_pos;
        self.emit_error(diagnostics, pos, "end-of-line within string")?;
        break;
      }
      if c.is(self.src, b'"') {
        break;
      }
      if c.is(self.src, b'\\') {
        let b = self.control_sequence(diagnostics)?;
        text.push(b);
        continue;
      }
      text.extend_from_slice(c.bytes(self.src));
    }
    // NUL separates strings in MO files, an embedded one ends the string.
    if let Some(nul_index) = text.iter().position(|&b| b == 0) {
      text.truncate(nul_index);
    }
    Ok(self.token(start_pos, TokenType::String(text)))
  }

  fn control_sequence(&mut self, diagnostics: &mut Diagnostics) -> Result<u8, ParsingError> {
    let c = self.lex_getc(diagnostics);
    let mut message = "invalid control sequence";

    match c.single_byte(self.src) {
      Some(b'n') => return Ok(b'\n'),
      Some(b't') => return Ok(b'\t'),
      Some(b'b') => return Ok(b'\x08'),
      Some(b'r') => return Ok(b'\r'),
      Some(b'f') => return Ok(b'\x0c'),
      Some(b'v') => return Ok(b'\x0b'),
      Some(b'a') => return Ok(b'\x07'),
      Some(b @ b'\\') | Some(b @ b'"') => return Ok(b),

      Some(b @ b'0'..=b'7') => {
        let mut value = u32::from(b - b'0');
        let mut digits = 1;
        while digits < 3 {
          let c = self.lex_getc(diagnostics);
          match c.single_byte(self.src) {
            Some(d @ b'0'..=b'7') => {
              value = value * 8 + u32::from(d - b'0');
              digits += 1;
            }
            _ => {
              self.lex_ungetc(c);
              break;
            }
          }
        }
        return Ok(value as u8);
      }

      Some(b'x') => {
        let c = self.lex_getc(diagnostics);
        if let Some(first_digit) = c.single_byte(self.src).and_then(hex_digit_value) {
          // The digit run is unbounded, only the low byte of the value is kept.
          let mut value = first_digit;
          loop {
            let c = self.lex_getc(diagnostics);
            match c.single_byte(self.src).and_then(hex_digit_value) {
              Some(d) => value = value.wrapping_mul(16).wrapping_add(d),
              None => {
                self.lex_ungetc(c);
                break;
              }
            }
          }
          return Ok(value as u8);
        }
        self.lex_ungetc(c);
        let pos = self.current_pos;
        self.emit_error(diagnostics, pos, message)?;
        return Ok(b' ');
      }

      Some(b'u') | Some(b'U') => message = "\\u and \\U control sequences are not supported",

      _ => {}
    }

    self.lex_ungetc(c);
    let pos = self.current_pos;
    self.emit_error(diagnostics, pos, message)?;
    Ok(b' ')
  }
}

#[inline]
fn hex_digit_value(b: u8) -> Option<u32> { (b as char).to_digit(16) }

#[cfg(test)]
mod tests {
  use super::*;
  use crate::diagnostics::Severity;

  fn lex_with(src: &[u8], options: LexerOptions) -> (Vec<Token>, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let mut lexer = Lexer::new(src, "test.po", options);
    let mut tokens = Vec::new();
    loop {
      let token = lexer.next_token(&mut diagnostics).unwrap();
      if token.type_ == TokenType::Eof {
        break;
      }
      tokens.push(token);
    }
    (tokens, diagnostics)
  }

  fn lex(src: &[u8]) -> (Vec<TokenType>, Diagnostics) {
    let (tokens, diagnostics) = lex_with(src, LexerOptions::default());
    (tokens.into_iter().map(|t| t.type_).collect(), diagnostics)
  }

  fn string(s: &[u8]) -> TokenType { TokenType::String(s.to_vec()) }

  #[test]
  fn test_basic_entry() {
    let (tokens, diagnostics) =
      lex(b"# hello\n#, fuzzy\nmsgid \"a\"\nmsgid_plural \"b\"\nmsgstr[1] \"c\" \"d\"\n");
    assert_eq!(tokens, vec![
      TokenType::Comment(b" hello".to_vec()),
      TokenType::Comment(b", fuzzy".to_vec()),
      TokenType::Msgid,
      string(b"a"),
      TokenType::MsgidPlural,
      string(b"b"),
      TokenType::Msgstr,
      TokenType::LeftBracket,
      TokenType::Number(1),
      TokenType::RightBracket,
      string(b"c"),
      string(b"d"),
    ]);
    assert!(diagnostics.is_empty());
  }

  #[test]
  fn test_positions() {
    let (tokens, _) = lex_with(b"domain \"x\"\n\tmsgid \"y\"", LexerOptions::default());
    let positions: Vec<(usize, usize)> =
      tokens.iter().map(|t| (t.pos.line, t.pos.column)).collect();
    assert_eq!(positions, vec![(1, 0), (1, 7), (2, 8), (2, 14)]);
  }

  #[test]
  fn test_escapes() {
    let (tokens, diagnostics) = lex(b"\"\\n\\t\\x41\\101\\777\\\\\\\"\\a\"");
    assert_eq!(tokens, vec![string(b"\n\tAA\xff\\\"\x07")]);
    assert!(diagnostics.is_empty());

    let (tokens, _) = lex(b"\"\\x4142z\"");
    assert_eq!(tokens, vec![string(b"\x42z")]);
  }

  #[test]
  fn test_invalid_escapes() {
    let (tokens, diagnostics) = lex(b"\"a\\qb\" \"\\xg\" \"\\u00e9\"");
    assert_eq!(tokens, vec![string(b"a qb"), string(b" g"), string(b" u00e9")]);
    let messages: Vec<&str> = diagnostics.messages_with_severity(Severity::Error).collect();
    assert_eq!(messages, vec![
      "invalid control sequence",
      "invalid control sequence",
      "\\u and \\U control sequences are not supported",
    ]);
  }

  #[test]
  fn test_backslash_newline() {
    let (tokens, _) = lex_with(b"ms\\\ngid \"a\\\nb\"", LexerOptions::default());
    assert_eq!(tokens[0].type_, TokenType::Msgid);
    assert_eq!(tokens[1].type_, string(b"ab"));
    assert_eq!(tokens[1].pos.line, 2);
  }

  #[test]
  fn test_obsolete() {
    let src = b"#~ msgid \"a\"\n#~ msgstr \"b\"\nmsgid \"c\"";
    let (tokens, _) = lex_with(src, LexerOptions::default());
    let flags: Vec<bool> = tokens.iter().map(|t| t.obsolete).collect();
    assert_eq!(flags, vec![true, true, true, true, false, false]);
  }

  #[test]
  fn test_skipped_comments() {
    let options = LexerOptions { pass_comments: false, ..Default::default() };
    let (tokens, _) = lex_with(b"# comment\n#. extracted\nmsgid \"a\"", options);
    let tokens: Vec<TokenType> = tokens.into_iter().map(|t| t.type_).collect();
    assert_eq!(tokens, vec![TokenType::Msgid, string(b"a")]);
  }

  #[test]
  fn test_unterminated_strings() {
    let (tokens, diagnostics) = lex(b"msgid \"abc\nmsgstr \"def");
    assert_eq!(tokens, vec![
      TokenType::Msgid,
      string(b"abc"),
      TokenType::Msgstr,
      string(b"def"),
    ]);
    let messages: Vec<&str> = diagnostics.messages_with_severity(Severity::Error).collect();
    assert_eq!(messages, vec!["end-of-line within string", "end-of-file within string"]);
  }

  #[test]
  fn test_unknown_keyword_and_junk() {
    let (tokens, diagnostics) = lex(b"msgctxt \"a\" @");
    assert_eq!(tokens, vec![
      TokenType::Name("msgctxt".to_owned()),
      string(b"a"),
      TokenType::Junk,
    ]);
    assert_eq!(diagnostics.list()[0].message, "keyword \"msgctxt\" unknown");
  }

  #[test]
  fn test_too_many_errors() {
    let mut diagnostics = Diagnostics::new();
    let options = LexerOptions { max_errors: 2, ..Default::default() };
    let mut lexer = Lexer::new(b"foo bar baz", "test.po", options);
    assert!(lexer.next_token(&mut diagnostics).is_ok());
    assert!(lexer.next_token(&mut diagnostics).is_ok());
    let error = lexer.next_token(&mut diagnostics).unwrap_err();
    assert_eq!(error.message, "too many errors, aborting");
    assert_eq!(lexer.error_count(), 3);
  }

  #[test]
  fn test_multibyte() {
    let (tokens, diagnostics) = lex("\"d\u{e9}j\u{e0} \u{2028}\"".as_bytes());
    assert_eq!(tokens, vec![string("d\u{e9}j\u{e0} \u{2028}".as_bytes())]);
    assert!(diagnostics.is_empty());

    // A lone continuation byte falls back to a raw byte.
    let (tokens, diagnostics) = lex(b"\"a\xffb\"");
    assert_eq!(tokens, vec![string(b"a\xffb")]);
    assert!(!diagnostics.has_errors());
    let warnings: Vec<&str> = diagnostics.messages_with_severity(Severity::Warning).collect();
    assert_eq!(warnings, vec!["invalid multibyte sequence"]);

    let (_, diagnostics) = lex(b"\"\xe2\x82\n\"");
    let warnings: Vec<&str> = diagnostics.messages_with_severity(Severity::Warning).collect();
    assert_eq!(warnings, vec!["incomplete multibyte sequence at end of line"]);

    let (tokens, diagnostics) = lex(b"\"\xe2\x82");
    assert_eq!(tokens, vec![string(b"\xe2\x82")]);
    let warnings: Vec<&str> = diagnostics.messages_with_severity(Severity::Warning).collect();
    assert_eq!(warnings, vec!["incomplete multibyte sequence at end of file"]);

    // Comments are not checked.
    let (_, diagnostics) = lex(b"# caf\xe9\n");
    assert!(diagnostics.is_empty());
  }

  #[test]
  fn test_charset_switch() {
    let mut diagnostics = Diagnostics::new();
    let mut lexer = Lexer::new(b"\"caf\xe9\"", "test.po", LexerOptions::default());
    lexer.switch_charset_from_header(
      b"Content-Type: text/plain; charset=ISO-8859-1\n",
      CharPos::default(),
      &mut diagnostics,
    );
    assert_eq!(lexer.charset(), SourceCharset::SingleByte);
    let token = lexer.next_token(&mut diagnostics).unwrap();
    assert_eq!(token.type_, string(b"caf\xe9"));
    assert!(diagnostics.is_empty());

    lexer.switch_charset_from_header(
      b"Content-Type: text/plain; charset=CHARSET\n",
      CharPos::default(),
      &mut diagnostics,
    );
    assert!(diagnostics.is_empty());
    lexer.switch_charset_from_header(
      b"Content-Type: text/plain; charset=klingon\n",
      CharPos::default(),
      &mut diagnostics,
    );
    lexer.switch_charset_from_header(
      b"Content-Type: text/plain; charset=BIG5\n",
      CharPos::default(),
      &mut diagnostics,
    );
    assert_eq!(lexer.charset(), SourceCharset::Multibyte(charset::MultibyteCharset::Big5));
    assert_eq!(diagnostics.list().len(), 1);
    assert!(!diagnostics.has_errors());
  }

  #[test]
  fn test_shift_jis_trail_backslash() {
    let mut diagnostics = Diagnostics::new();
    // U+8868 is encoded as 95 5C, the second byte is an ASCII backslash.
    let mut lexer = Lexer::new(b"\"\x95\x5c\" \"\xb1\\n\"", "test.po", LexerOptions::default());
    lexer.switch_charset_from_header(
      b"Content-Type: text/plain; charset=Shift_JIS\n",
      CharPos::default(),
      &mut diagnostics,
    );
    let first = lexer.next_token(&mut diagnostics).unwrap();
    assert_eq!(first.type_, string(b"\x95\x5c"));
    // Half-width katakana is a single byte, the backslash after it is an escape.
    let second = lexer.next_token(&mut diagnostics).unwrap();
    assert_eq!(second.type_, string(b"\xb1\n"));
    assert_eq!(lexer.next_token(&mut diagnostics).unwrap().type_, TokenType::Eof);
    assert!(diagnostics.is_empty());
  }

  #[test]
  fn test_invalid_legacy_multibyte() {
    let mut diagnostics = Diagnostics::new();
    let mut lexer = Lexer::new(b"\"\x81\x7f\"\n\"\xa4", "test.po", LexerOptions::default());
    lexer.switch_charset_from_header(
      b"Content-Type: text/plain; charset=GBK\n",
      CharPos::default(),
      &mut diagnostics,
    );
    let token = lexer.next_token(&mut diagnostics).unwrap();
    assert_eq!(token.type_, string(b"\x81\x7f"));
    let token = lexer.next_token(&mut diagnostics).unwrap();
    assert_eq!(token.type_, string(b"\xa4"));
    let warnings: Vec<&str> = diagnostics.messages_with_severity(Severity::Warning).collect();
    assert_eq!(warnings, vec![
      "invalid multibyte sequence",
      "incomplete multibyte sequence at end of file",
    ]);
  }

  #[test]
  fn test_invalid_byte_right_after_hash() {
    let (tokens, diagnostics) = lex(b"#\xff comment\nmsgid \"a\"");
    assert_eq!(tokens[0], TokenType::Comment(b"\xff comment".to_vec()));
    assert!(diagnostics.is_empty());

    // The marker of obsolete entries doesn't disable the checks.
    let (_, diagnostics) = lex(b"#~ msgid \"\xff\"");
    let warnings: Vec<&str> = diagnostics.messages_with_severity(Severity::Warning).collect();
    assert_eq!(warnings, vec!["invalid multibyte sequence"]);
  }
}
