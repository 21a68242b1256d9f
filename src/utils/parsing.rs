use crate::impl_prelude::*;

use std::fmt;

/// Position of a character in a source file. Lines are counted from one,
/// columns from zero (in display cells, see the lexer for tab handling).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharPos {
  pub byte_index: usize,
  pub line: usize,
  pub column: usize,
}

impl Default for CharPos {
  #[inline(always)]
  fn default() -> Self { Self { byte_index: 0, line: 1, column: 0 } }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsingError {
  pub pos: CharPos,
  pub message: String,
}

impl ParsingError {
  pub fn new(pos: CharPos, message: impl Into<String>) -> Self {
    Self { pos, message: message.into() }
  }

  #[inline(always)]
  pub fn nice_formatter<'error>(
    &'error self,
    filename: &'error str,
    src: &'error [u8],
  ) -> NiceParsingErrorFormatter<'error> {
    NiceParsingErrorFormatter { error: self, filename, src: Some(src) }
  }
}

impl fmt::Display for ParsingError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}: {}", self.pos.line, self.pos.column + 1, self.message)
  }
}

impl StdError for ParsingError {}

#[derive(Debug)]
pub struct NiceParsingErrorFormatter<'error> {
  error: &'error ParsingError,
  filename: &'error str,
  src: Option<&'error [u8]>,
}

impl<'error> fmt::Display for NiceParsingErrorFormatter<'error> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let pos = self.error.pos;
    writeln!(f, "Syntax error in {}:{}:{}", self.filename, pos.line, pos.column + 1)?;
    if let Some(line_text) = self.src.and_then(|src| find_line(src, pos.line)) {
      let line_number_str = format!("{}", pos.line);
      let line_number_margin = " ".repeat(line_number_str.len());
      writeln!(f, "{} | {}", line_number_str, String::from_utf8_lossy(line_text))?;
      writeln!(f, "{} | {}^", line_number_margin, " ".repeat(pos.column))?;
      write!(f, "{} = {}", line_number_margin, self.error.message)?;
    } else {
      write!(f, "{}", self.error.message)?;
    }
    Ok(())
  }
}

/// Returns the contents of the one-based line `line_number`, without the
/// line terminator.
pub fn find_line(src: &[u8], line_number: usize) -> Option<&[u8]> {
  if line_number == 0 {
    return None;
  }
  src.split(|&b| b == b'\n').nth(line_number - 1).map(|line| match line.last() {
    Some(b'\r') => &line[..line.len() - 1],
    _ => line,
  })
}
