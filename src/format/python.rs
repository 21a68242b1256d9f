//! Python `%`-interpolation, see
//! <https://docs.python.org/3/library/stdtypes.html#printf-style-string-formatting>.
//! A directive is `%`, an optional `(name)` with balanced parentheses, flags,
//! a width, a precision, an ignored size modifier and a conversion type.
//! Named directives require a mapping and unnamed ones a tuple, so the two
//! kinds are exclusive.

use super::{
  check_positional, ArgType, Cursor, FormatChecker, FormatCheckerDeclaration, FormatParseError,
  Signature,
};

use std::cmp::Ordering;

#[derive(Debug)]
pub struct PythonFormatChecker;
inventory::submit!(PythonFormatChecker::declaration());

impl PythonFormatChecker {
  pub const ID: &'static str = "python";

  pub fn declaration() -> FormatCheckerDeclaration {
    FormatCheckerDeclaration { id: Self::ID, ctor: || Box::new(Self) }
  }
}

impl FormatChecker for PythonFormatChecker {
  #[inline(always)]
  fn id(&self) -> &'static str { Self::ID }

  #[inline(always)]
  fn pretty_name(&self) -> &'static str { "Python" }

  fn parse(&self, format: &[u8]) -> Result<Signature, FormatParseError> {
    let mut cursor = Cursor::new(format);
    let mut named: Vec<(String, ArgType)> = Vec::new();
    let mut positional: Vec<ArgType> = Vec::new();
    let mut directives = 0;

    while cursor.skip_to_directive() {
      directives += 1;

      let name = if cursor.eat(b'(') {
        Some(parse_name(&mut cursor, directives)?)
      } else {
        None
      };

      cursor.skip_while(|b| matches!(b, b'-' | b'+' | b' ' | b'#' | b'0'));

      if cursor.eat(b'*') {
        if !named.is_empty() {
          return Err(FormatParseError::MixedNamedAndUnnamed { directive: directives });
        }
        positional.push(ArgType::INT);
      } else {
        cursor.skip_while(|b| b.is_ascii_digit());
      }

      if cursor.eat(b'.') {
        if cursor.eat(b'*') {
          if !named.is_empty() {
            return Err(FormatParseError::MixedNamedAndUnnamed { directive: directives });
          }
          positional.push(ArgType::INT);
        } else {
          cursor.skip_while(|b| b.is_ascii_digit());
        }
      }

      if matches!(cursor.peek(), Some(b'h') | Some(b'l') | Some(b'L')) {
        cursor.bump();
      }

      let specifier = cursor
        .next_byte()
        .ok_or(FormatParseError::UnterminatedDirective { directive: directives })?;
      let type_ = match specifier {
        b'%' => ArgType::Any,
        b'c' => ArgType::Char { wide: false },
        b's' | b'r' => ArgType::String { wide: false },
        b'i' | b'd' | b'u' | b'o' | b'x' | b'X' => ArgType::INT,
        b'e' | b'E' | b'f' | b'g' | b'G' => ArgType::Float { long: false },
        _ => {
          return Err(FormatParseError::InvalidSpecifier {
            directive: directives,
            specifier: specifier as char,
          });
        }
      };

      match name {
        Some(name) => {
          if !positional.is_empty() {
            return Err(FormatParseError::MixedNamedAndUnnamed { directive: directives });
          }
          named.push((name, type_));
        }
        // A plain `%%` consumes nothing.
        None if specifier == b'%' => {}
        None => {
          if !named.is_empty() {
            return Err(FormatParseError::MixedNamedAndUnnamed { directive: directives });
          }
          positional.push(type_);
        }
      }
    }

    Ok(Signature { directives, positional, named: merge_named(named)? })
  }

  fn check(&self, msgid: &Signature, msgstr: &Signature) -> Vec<String> {
    let mut problems = Vec::new();

    if !msgid.named.is_empty() && !msgstr.positional.is_empty() {
      problems.push(
        "format specifications in 'msgid' expect a mapping, those in 'msgstr' expect a tuple"
          .to_owned(),
      );
      return problems;
    }
    if !msgid.positional.is_empty() && !msgstr.named.is_empty() {
      problems.push(
        "format specifications in 'msgid' expect a tuple, those in 'msgstr' expect a mapping"
          .to_owned(),
      );
      return problems;
    }

    if let Some(problem) = check_named(&msgid.named, &msgstr.named) {
      problems.push(problem);
    }
    if !msgid.positional.is_empty() || !msgstr.positional.is_empty() {
      check_positional(&msgid.positional, &msgstr.positional, &mut problems);
    }
    problems
  }
}

/// Reads the name up to the matching closing parenthesis, the opening one
/// has already been consumed.
fn parse_name(cursor: &mut Cursor, directive: usize) -> Result<String, FormatParseError> {
  let mut depth = 0usize;
  let name = cursor.skip_while(|b| match b {
    b'(' => {
      depth += 1;
      true
    }
    b')' if depth == 0 => false,
    b')' => {
      depth -= 1;
      true
    }
    _ => true,
  });
  if !cursor.eat(b')') {
    return Err(FormatParseError::UnterminatedName { directive });
  }
  Ok(String::from_utf8_lossy(name).into_owned())
}

/// Sorts the named arguments and folds repeated ones together. A wildcard
/// takes on the type of the other occurrences.
fn merge_named(
  mut named: Vec<(String, ArgType)>,
) -> Result<Vec<(String, ArgType)>, FormatParseError> {
  named.sort_by(|(a, _), (b, _)| a.cmp(b));
  let mut merged: Vec<(String, ArgType)> = Vec::with_capacity(named.len());
  for (name, type_) in named {
    match merged.last_mut() {
      Some((last_name, last_type)) if *last_name == name => {
        if *last_type == ArgType::Any {
          *last_type = type_;
        } else if type_ != ArgType::Any && type_ != *last_type {
          return Err(FormatParseError::ConflictingTypes { argument: format!("'{}'", name) });
        }
      }
      _ => merged.push((name, type_)),
    }
  }
  Ok(merged)
}

/// Reports the first name missing from either side, then the first name
/// whose types disagree.
fn check_named(msgid: &[(String, ArgType)], msgstr: &[(String, ArgType)]) -> Option<String> {
  let (mut i, mut j) = (0, 0);
  while i < msgid.len() || j < msgstr.len() {
    let ordering = match (msgid.get(i), msgstr.get(j)) {
      (Some((a, _)), Some((b, _))) => a.cmp(b),
      (Some(_), None) => Ordering::Less,
      (None, _) => Ordering::Greater,
    };
    match ordering {
      Ordering::Less => {
        return Some(format!(
          "a format specification for argument '{}' doesn't exist in 'msgstr'",
          msgid[i].0,
        ));
      }
      Ordering::Greater => {
        return Some(format!(
          "a format specification for argument '{}' doesn't exist in 'msgid'",
          msgstr[j].0,
        ));
      }
      Ordering::Equal => {
        i += 1;
        j += 1;
      }
    }
  }

  let ((name, _), _) =
    msgid.iter().zip(msgstr.iter()).find(|((_, a), (_, b))| !a.is_compatible(*b))?;
  Some(format!(
    "format specifications in 'msgid' and 'msgstr' for argument '{}' are not the same",
    name,
  ))
}
