//! Format string checkers. Each dialect parses a format string into a
//! [`Signature`] describing the arguments it consumes, and decides whether
//! the signature of a translation is compatible with that of the original.
//! Dialects register themselves with [`inventory`], see [`REGISTRY`].

pub mod c;
pub mod python;

use crate::impl_prelude::*;

use once_cell::sync::Lazy;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntSize {
  Default,
  Char,
  Short,
  Long,
  LongLong,
  IntMax,
  Size,
  PtrDiff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgType {
  /// Matches an argument of any type.
  Any,
  Integer { size: IntSize, unsigned: bool },
  Float { long: bool },
  Char { wide: bool },
  String { wide: bool },
  Pointer,
  CountPointer { size: IntSize },
}

impl ArgType {
  pub const INT: Self = Self::Integer { size: IntSize::Default, unsigned: false };

  #[inline]
  pub fn is_compatible(self, other: Self) -> bool {
    self == other || self == Self::Any || other == Self::Any
  }
}

/// The arguments consumed by a format string. Positional and named
/// arguments never occur together.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Signature {
  pub directives: usize,
  pub positional: Vec<ArgType>,
  /// Sorted by name, without duplicates.
  pub named: Vec<(String, ArgType)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatParseError {
  UnterminatedDirective { directive: usize },
  InvalidSpecifier { directive: usize, specifier: char },
  ZeroArgumentNumber { directive: usize },
  UnterminatedName { directive: usize },
  MixedNumberedAndUnnumbered { directive: usize },
  MixedNamedAndUnnamed { directive: usize },
  ConflictingTypes { argument: String },
  MissingArgument { number: usize },
}

impl fmt::Display for FormatParseError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Self::UnterminatedDirective { directive } => {
        write!(f, "the string ends in the middle of directive {}", directive)
      }
      Self::InvalidSpecifier { directive, specifier } => write!(
        f,
        "in directive number {}, the character {:?} is not a valid conversion specifier",
        directive, specifier,
      ),
      Self::ZeroArgumentNumber { directive } => write!(
        f,
        "in directive number {}, the argument number 0 is not a positive integer",
        directive,
      ),
      Self::UnterminatedName { directive } => {
        write!(f, "in directive number {}, the argument name is not terminated", directive)
      }
      Self::MixedNumberedAndUnnumbered { directive } => write!(
        f,
        "in directive number {}, numbered and unnumbered argument specifications are mixed",
        directive,
      ),
      Self::MixedNamedAndUnnamed { directive } => write!(
        f,
        "in directive number {}, named and unnamed argument specifications are mixed",
        directive,
      ),
      Self::ConflictingTypes { argument } => {
        write!(f, "the format specifications for argument {} are incompatible", argument)
      }
      Self::MissingArgument { number } => {
        write!(f, "the argument {} is never used by any directive", number)
      }
    }
  }
}

impl StdError for FormatParseError {}

assert_trait_is_object_safe!(FormatChecker);
pub trait FormatChecker: fmt::Debug + Send + Sync {
  /// The dialect name as used in `#, X-format` flags.
  fn id(&self) -> &'static str;

  fn pretty_name(&self) -> &'static str;

  fn parse(&self, format: &[u8]) -> Result<Signature, FormatParseError>;

  /// Returns the reasons why `msgstr` can't be used in place of `msgid`,
  /// an empty list means that the two are compatible.
  fn check(&self, msgid: &Signature, msgstr: &Signature) -> Vec<String>;

  #[inline(always)]
  fn directive_count(&self, signature: &Signature) -> usize { signature.directives }
}

#[derive(Debug)]
pub struct FormatCheckerDeclaration {
  pub id: &'static str,
  pub ctor: fn() -> Box<dyn FormatChecker>,
}

inventory::collect!(FormatCheckerDeclaration);

#[derive(Debug)]
pub struct FormatCheckerRegistry {
  checkers: Vec<Box<dyn FormatChecker>>,
}

impl FormatCheckerRegistry {
  fn collect() -> Self {
    let mut checkers: Vec<Box<dyn FormatChecker>> = Vec::new();
    for decl in inventory::iter::<FormatCheckerDeclaration> {
      let checker = (decl.ctor)();
      assert_eq!(checker.id(), decl.id);
      if checkers.iter().any(|c| c.id() == decl.id) {
        panic!("Duplicate format checker was registered for: {:?}", decl.id);
      }
      checkers.push(checker);
    }
    checkers.sort_by_key(|c| c.id());
    Self { checkers }
  }

  pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
    self.checkers.iter().map(|c| c.id())
  }

  pub fn iter(&self) -> impl Iterator<Item = &dyn FormatChecker> + '_ {
    self.checkers.iter().map(|c| &**c)
  }

  pub fn get(&self, id: &str) -> Option<&dyn FormatChecker> {
    self.iter().find(|c| c.id() == id)
  }
}

pub static REGISTRY: Lazy<FormatCheckerRegistry> = Lazy::new(FormatCheckerRegistry::collect);

/// Compares arguments which are passed in a fixed order.
pub fn check_positional(msgid: &[ArgType], msgstr: &[ArgType], problems: &mut Vec<String>) {
  if msgid.len() != msgstr.len() {
    problems
      .push("number of format specifications in 'msgid' and 'msgstr' does not match".to_owned());
    return;
  }
  for (i, (&a, &b)) in msgid.iter().zip(msgstr.iter()).enumerate() {
    if !a.is_compatible(b) {
      problems.push(format!(
        "format specifications in 'msgid' and 'msgstr' for argument {} are not the same",
        i + 1,
      ));
    }
  }
}

/// A byte cursor shared by the dialect parsers.
#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
  bytes: &'a [u8],
  pos: usize,
}

impl<'a> Cursor<'a> {
  #[inline(always)]
  pub fn new(bytes: &'a [u8]) -> Self { Self { bytes, pos: 0 } }

  #[inline(always)]
  pub fn peek(&self) -> Option<u8> { self.bytes.get(self.pos).copied() }

  #[inline(always)]
  pub fn bump(&mut self) { self.pos += 1; }

  #[inline]
  pub fn next_byte(&mut self) -> Option<u8> {
    let b = self.peek()?;
    self.pos += 1;
    Some(b)
  }

  #[inline]
  pub fn eat(&mut self, expected: u8) -> bool {
    if self.peek() == Some(expected) {
      self.pos += 1;
      true
    } else {
      false
    }
  }

  pub fn skip_while(&mut self, mut predicate: impl FnMut(u8) -> bool) -> &'a [u8] {
    let start = self.pos;
    while let Some(b) = self.peek() {
      if !predicate(b) {
        break;
      }
      self.pos += 1;
    }
    &self.bytes[start..self.pos]
  }

  /// Moves to the byte after the next `%`, returns `false` if there are none.
  pub fn skip_to_directive(&mut self) -> bool {
    match self.bytes[self.pos..].iter().position(|&b| b == b'%') {
      Some(offset) => {
        self.pos += offset + 1;
        true
      }
      None => {
        self.pos = self.bytes.len();
        false
      }
    }
  }

  #[inline(always)]
  pub fn pos(&self) -> usize { self.pos }

  #[inline(always)]
  pub fn set_pos(&mut self, pos: usize) { self.pos = pos; }
}

pub(crate) fn parse_decimal(digits: &[u8]) -> usize {
  digits.iter().fold(0usize, |n, &d| n.saturating_mul(10).saturating_add((d - b'0') as usize))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_registry() {
    let ids: Vec<&str> = REGISTRY.ids().collect();
    assert_eq!(ids, vec!["c", "python"]);
    assert_eq!(REGISTRY.get("python").unwrap().pretty_name(), "Python");
    assert!(REGISTRY.get("lisp").is_none());
  }

  #[test]
  fn test_arg_type_compatibility() {
    let string = ArgType::String { wide: false };
    assert!(ArgType::INT.is_compatible(ArgType::INT));
    assert!(!ArgType::INT.is_compatible(string));
    assert!(ArgType::Any.is_compatible(string));
    assert!(string.is_compatible(ArgType::Any));
  }

  #[test]
  fn test_check_positional() {
    let mut problems = Vec::new();
    check_positional(&[ArgType::INT], &[], &mut problems);
    assert_eq!(problems, vec![
      "number of format specifications in 'msgid' and 'msgstr' does not match",
    ]);
  }
}
