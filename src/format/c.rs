//! `printf` format strings as described in POSIX, see
//! <https://pubs.opengroup.org/onlinepubs/9699919799/functions/fprintf.html>.
//! A directive is `%`, an optional `m$` argument number, flags, a width
//! (digits, `*` or `*m$`), a precision (`.` followed by the same), a size
//! modifier and a conversion specifier. Numbered and unnumbered arguments
//! can't be mixed.

use super::{
  check_positional, parse_decimal, ArgType, Cursor, FormatChecker, FormatCheckerDeclaration,
  FormatParseError, IntSize, Signature,
};

#[derive(Debug)]
pub struct CFormatChecker;
inventory::submit!(CFormatChecker::declaration());

impl CFormatChecker {
  pub const ID: &'static str = "c";

  pub fn declaration() -> FormatCheckerDeclaration {
    FormatCheckerDeclaration { id: Self::ID, ctor: || Box::new(Self) }
  }
}

impl FormatChecker for CFormatChecker {
  #[inline(always)]
  fn id(&self) -> &'static str { Self::ID }

  #[inline(always)]
  fn pretty_name(&self) -> &'static str { "C" }

  fn parse(&self, format: &[u8]) -> Result<Signature, FormatParseError> {
    let mut cursor = Cursor::new(format);
    let mut args = Arguments::default();
    let mut directives = 0;

    while cursor.skip_to_directive() {
      directives += 1;
      let number = parse_arg_number(&mut cursor, directives)?;

      cursor.skip_while(|b| matches!(b, b' ' | b'+' | b'-' | b'#' | b'0' | b'\''));

      if cursor.eat(b'*') {
        let width_number = parse_arg_number(&mut cursor, directives)?;
        args.push(width_number, ArgType::INT, directives)?;
      } else {
        cursor.skip_while(|b| b.is_ascii_digit());
      }

      if cursor.eat(b'.') {
        if cursor.eat(b'*') {
          let precision_number = parse_arg_number(&mut cursor, directives)?;
          args.push(precision_number, ArgType::INT, directives)?;
        } else {
          cursor.skip_while(|b| b.is_ascii_digit());
        }
      }

      let size = parse_size(&mut cursor);
      let is_long = matches!(size, IntSize::Long | IntSize::LongLong);

      let specifier = cursor
        .next_byte()
        .ok_or(FormatParseError::UnterminatedDirective { directive: directives })?;
      let type_ = match specifier {
        b'%' | b'm' => None,
        b'c' => Some(ArgType::Char { wide: is_long }),
        b'C' => Some(ArgType::Char { wide: true }),
        b's' => Some(ArgType::String { wide: is_long }),
        b'S' => Some(ArgType::String { wide: true }),
        b'i' | b'd' => Some(ArgType::Integer { size, unsigned: false }),
        b'u' | b'o' | b'x' | b'X' => Some(ArgType::Integer { size, unsigned: true }),
        b'e' | b'E' | b'f' | b'F' | b'g' | b'G' | b'a' | b'A' => {
          Some(ArgType::Float { long: size == IntSize::LongLong })
        }
        b'p' => Some(ArgType::Pointer),
        b'n' => Some(ArgType::CountPointer { size }),
        _ => {
          return Err(FormatParseError::InvalidSpecifier {
            directive: directives,
            specifier: specifier as char,
          });
        }
      };

      if let Some(type_) = type_ {
        args.push(number, type_, directives)?;
      }
    }

    Ok(Signature { directives, positional: args.into_positional()?, named: Vec::new() })
  }

  fn check(&self, msgid: &Signature, msgstr: &Signature) -> Vec<String> {
    let mut problems = Vec::new();
    check_positional(&msgid.positional, &msgstr.positional, &mut problems);
    problems
  }
}

/// Reads `m$` if it is present, leaving the cursor untouched otherwise.
fn parse_arg_number(
  cursor: &mut Cursor,
  directive: usize,
) -> Result<Option<usize>, FormatParseError> {
  let start = cursor.pos();
  let digits = cursor.skip_while(|b| b.is_ascii_digit());
  if !digits.is_empty() && cursor.eat(b'$') {
    let number = parse_decimal(digits);
    if number == 0 {
      return Err(FormatParseError::ZeroArgumentNumber { directive });
    }
    Ok(Some(number))
  } else {
    cursor.set_pos(start);
    Ok(None)
  }
}

fn parse_size(cursor: &mut Cursor) -> IntSize {
  let mut size = IntSize::Default;
  loop {
    size = match cursor.peek() {
      Some(b'h') if matches!(size, IntSize::Short | IntSize::Char) => IntSize::Char,
      Some(b'h') => IntSize::Short,
      Some(b'l') if matches!(size, IntSize::Long | IntSize::LongLong) => IntSize::LongLong,
      Some(b'l') => IntSize::Long,
      // `q` is the BSD spelling of `ll`.
      Some(b'L') | Some(b'q') => IntSize::LongLong,
      Some(b'j') => IntSize::IntMax,
      Some(b'z') | Some(b'Z') => IntSize::Size,
      Some(b't') => IntSize::PtrDiff,
      _ => return size,
    };
    cursor.bump();
  }
}

#[derive(Debug, Default)]
struct Arguments {
  numbered: Vec<(usize, ArgType)>,
  unnumbered: Vec<ArgType>,
}

impl Arguments {
  fn push(
    &mut self,
    number: Option<usize>,
    type_: ArgType,
    directive: usize,
  ) -> Result<(), FormatParseError> {
    let is_mixed = match number {
      Some(_) => !self.unnumbered.is_empty(),
      None => !self.numbered.is_empty(),
    };
    if is_mixed {
      return Err(FormatParseError::MixedNumberedAndUnnumbered { directive });
    }
    match number {
      Some(number) => self.numbered.push((number, type_)),
      None => self.unnumbered.push(type_),
    }
    Ok(())
  }

  /// Numbered arguments must form the run `1..=N`, an argument referenced
  /// several times must have the same type every time.
  fn into_positional(self) -> Result<Vec<ArgType>, FormatParseError> {
    if self.numbered.is_empty() {
      return Ok(self.unnumbered);
    }

    let mut numbered = self.numbered;
    numbered.sort_by_key(|&(number, _)| number);
    let mut positional: Vec<ArgType> = Vec::with_capacity(numbered.len());
    for (number, type_) in numbered {
      if number == positional.len() {
        if positional[number - 1] != type_ {
          return Err(FormatParseError::ConflictingTypes { argument: number.to_string() });
        }
      } else if number == positional.len() + 1 {
        positional.push(type_);
      } else {
        return Err(FormatParseError::MissingArgument { number: positional.len() + 1 });
      }
    }
    Ok(positional)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(format: &str) -> Result<Signature, FormatParseError> {
    CFormatChecker.parse(format.as_bytes())
  }

  fn check(msgid: &str, msgstr: &str) -> Vec<String> {
    CFormatChecker.check(&parse(msgid).unwrap(), &parse(msgstr).unwrap())
  }

  #[test]
  fn test_parse_types() {
    let signature = parse("%d%% %5.2f %-10s %c %lu %hhd %lld %Lf %p %zu %n %ls %m").unwrap();
    assert_eq!(signature.directives, 14);
    assert_eq!(signature.positional, vec![
      ArgType::INT,
      ArgType::Float { long: false },
      ArgType::String { wide: false },
      ArgType::Char { wide: false },
      ArgType::Integer { size: IntSize::Long, unsigned: true },
      ArgType::Integer { size: IntSize::Char, unsigned: false },
      ArgType::Integer { size: IntSize::LongLong, unsigned: false },
      ArgType::Float { long: true },
      ArgType::Pointer,
      ArgType::Integer { size: IntSize::Size, unsigned: true },
      ArgType::CountPointer { size: IntSize::Default },
      ArgType::String { wide: true },
    ]);
    assert_eq!(CFormatChecker.directive_count(&signature), 14);
  }

  #[test]
  fn test_parse_star_arguments() {
    let signature = parse("%*.*s").unwrap();
    assert_eq!(signature.positional, vec![
      ArgType::INT,
      ArgType::INT,
      ArgType::String { wide: false },
    ]);
    let signature = parse("%2$*1$d").unwrap();
    assert_eq!(signature.positional, vec![ArgType::INT, ArgType::INT]);
  }

  #[test]
  fn test_parse_numbered() {
    let signature = parse("%2$s was %1$d, %2$s").unwrap();
    assert_eq!(signature.positional, vec![ArgType::INT, ArgType::String { wide: false }]);
    assert_eq!(signature.directives, 3);
  }

  #[test]
  fn test_parse_errors() {
    assert_eq!(parse("100%"), Err(FormatParseError::UnterminatedDirective { directive: 1 }));
    assert_eq!(
      parse("%d %y"),
      Err(FormatParseError::InvalidSpecifier { directive: 2, specifier: 'y' }),
    );
    assert_eq!(parse("%0$d"), Err(FormatParseError::ZeroArgumentNumber { directive: 1 }));
    assert_eq!(
      parse("%1$d %s"),
      Err(FormatParseError::MixedNumberedAndUnnumbered { directive: 2 }),
    );
    assert_eq!(
      parse("%s %1$d"),
      Err(FormatParseError::MixedNumberedAndUnnumbered { directive: 2 }),
    );
    assert_eq!(parse("%2$d"), Err(FormatParseError::MissingArgument { number: 1 }));
    assert_eq!(
      parse("%1$d %1$s"),
      Err(FormatParseError::ConflictingTypes { argument: "1".to_owned() }),
    );
  }

  #[test]
  fn test_check() {
    assert!(check("%d and %s", "%d und %s").is_empty());
    assert!(check("%1$d and %2$s", "%2$s und %1$d").is_empty());
    assert!(check("%d and %s", "%1$d und %2$s").is_empty());
    assert_eq!(check("%d and %s", "%s and %d"), vec![
      "format specifications in 'msgid' and 'msgstr' for argument 1 are not the same",
      "format specifications in 'msgid' and 'msgstr' for argument 2 are not the same",
    ]);
    assert_eq!(check("%d files", "files"), vec![
      "number of format specifications in 'msgid' and 'msgstr' does not match",
    ]);
    assert_eq!(check("%ld", "%d").len(), 1);
    assert!(check("100%%", "100 %%").is_empty());
  }
}
