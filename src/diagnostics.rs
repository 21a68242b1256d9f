//! Structured non-fatal findings. Producers (the lexer, the parser, the
//! builders) only record them; deciding how to present them is left to the
//! front end, see [`Diagnostics::log_all`].

use crate::impl_prelude::*;
use crate::utils::parsing::CharPos;

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
  /// Informational, never affects the exit status.
  Warning,
  /// A problem with a single entry. Processing continues, but the run as a
  /// whole is considered failed.
  Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
  pub file_name: String,
  pub line: usize,
  pub column: Option<usize>,
}

impl Location {
  pub fn new(file_name: &str, pos: CharPos) -> Self {
    Self { file_name: file_name.to_owned(), line: pos.line, column: Some(pos.column) }
  }
}

impl fmt::Display for Location {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.file_name, self.line)?;
    if let Some(column) = self.column {
      write!(f, ":{}", column + 1)?;
    }
    Ok(())
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
  pub severity: Severity,
  pub location: Option<Location>,
  pub message: String,
}

impl fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if let Some(location) = &self.location {
      write!(f, "{}: ", location)?;
    }
    if self.severity == Severity::Warning {
      write!(f, "warning: ")?;
    }
    write!(f, "{}", self.message)
  }
}

#[derive(Debug, Default)]
pub struct Diagnostics {
  list: Vec<Diagnostic>,
  error_count: usize,
}

impl Diagnostics {
  pub fn new() -> Self { Self::default() }

  pub fn push(&mut self, diagnostic: Diagnostic) {
    if diagnostic.severity == Severity::Error {
      self.error_count += 1;
    }
    self.list.push(diagnostic);
  }

  pub fn warning(&mut self, location: Option<Location>, message: impl Into<String>) {
    self.push(Diagnostic { severity: Severity::Warning, location, message: message.into() });
  }

  pub fn error(&mut self, location: Option<Location>, message: impl Into<String>) {
    self.push(Diagnostic { severity: Severity::Error, location, message: message.into() });
  }

  #[inline(always)]
  pub fn error_count(&self) -> usize { self.error_count }
  #[inline(always)]
  pub fn has_errors(&self) -> bool { self.error_count > 0 }
  #[inline(always)]
  pub fn list(&self) -> &[Diagnostic] { &self.list }
  #[inline(always)]
  pub fn is_empty(&self) -> bool { self.list.is_empty() }

  pub fn messages_with_severity(&self, severity: Severity) -> impl Iterator<Item = &str> + '_ {
    self.list.iter().filter(move |d| d.severity == severity).map(|d| d.message.as_str())
  }

  /// Hands the collected diagnostics over to the logger and forgets them.
  /// The error counter is kept so that the exit status can still be derived.
  pub fn log_all(&mut self) {
    for diagnostic in self.list.drain(..) {
      match diagnostic.severity {
        Severity::Warning => warn!("{}", diagnostic),
        Severity::Error => error!("{}", diagnostic),
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_counts_only_errors() {
    let mut diagnostics = Diagnostics::new();
    diagnostics.warning(None, "just so you know");
    assert!(!diagnostics.has_errors());
    diagnostics.error(None, "that's bad");
    diagnostics.error(None, "that's also bad");
    assert_eq!(diagnostics.error_count(), 2);
    assert_eq!(diagnostics.list().len(), 3);
    diagnostics.log_all();
    assert!(diagnostics.is_empty());
    assert_eq!(diagnostics.error_count(), 2);
  }

  #[test]
  fn test_display() {
    let diagnostic = Diagnostic {
      severity: Severity::Warning,
      location: Some(Location { file_name: "de.po".to_owned(), line: 3, column: Some(0) }),
      message: "field 'Language-Team' still has initial default value".to_owned(),
    };
    assert_eq!(
      diagnostic.to_string(),
      "de.po:3:1: warning: field 'Language-Team' still has initial default value",
    );
  }
}
