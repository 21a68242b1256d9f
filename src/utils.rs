pub mod parsing;

use std::io;

pub fn fast_concat(strings: &[&str]) -> String {
  let mut capacity = 0;
  for s in strings {
    capacity += s.len();
  }
  let mut result = String::with_capacity(capacity);
  for s in strings {
    result.push_str(s);
  }
  result
}

#[inline]
pub fn is_default<T: Default + PartialEq>(t: &T) -> bool { *t == T::default() }

/// Byte-string version of <https://stackoverflow.com/a/40457615>.
#[derive(Debug)]
pub struct LinesWithEndings<'a> {
  text: &'a [u8],
}

impl<'a> LinesWithEndings<'a> {
  #[inline(always)]
  pub fn new(text: &'a [u8]) -> LinesWithEndings<'a> { LinesWithEndings { text } }
}

impl<'a> Iterator for LinesWithEndings<'a> {
  type Item = &'a [u8];
  fn next(&mut self) -> Option<Self::Item> {
    if self.text.is_empty() {
      return None;
    }
    let split = self.text.iter().position(|&b| b == b'\n').map_or(self.text.len(), |i| i + 1);
    let (line, rest) = self.text.split_at(split);
    self.text = rest;
    Some(line)
  }
}

pub fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
  if needle.is_empty() {
    return Some(0);
  }
  haystack.windows(needle.len()).position(|window| window == needle)
}

pub fn split_filename_extension(filename: &str) -> (&str, Option<&str>) {
  if let Some(dot_index) = filename.rfind('.') {
    if dot_index > 0 {
      return (&filename[..dot_index], Some(&filename[dot_index + 1..]));
    }
  }
  (filename, None)
}

/// Rounds `value` up to the next multiple of `alignment`, which must not be
/// zero.
#[inline]
pub fn align_up(value: usize, alignment: usize) -> usize {
  match value % alignment {
    0 => value,
    rem => value + (alignment - rem),
  }
}

pub fn write_zeroes<W: io::Write + ?Sized>(writer: &mut W, mut count: usize) -> io::Result<()> {
  static ZEROES: [u8; 64] = [0; 64];
  while count > 0 {
    let chunk = count.min(ZEROES.len());
    writer.write_all(&ZEROES[..chunk])?;
    count -= chunk;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_split_filename_extension() {
    assert_eq!(split_filename_extension(""), ("", None));
    assert_eq!(split_filename_extension("name"), ("name", None));
    assert_eq!(split_filename_extension(".name"), (".name", None));
    assert_eq!(split_filename_extension("name."), ("name", Some("")));
    assert_eq!(split_filename_extension("name.mo"), ("name", Some("mo")));
    assert_eq!(split_filename_extension("name.de.gmo"), ("name.de", Some("gmo")));
  }

  #[test]
  fn test_lines_with_endings() {
    let lines: Vec<&[u8]> = LinesWithEndings::new(b"a\nbc\n\nd").collect();
    assert_eq!(lines, vec![&b"a\n"[..], b"bc\n", b"\n", b"d"]);
    assert_eq!(LinesWithEndings::new(b"").count(), 0);
    assert_eq!(LinesWithEndings::new(b"\n").collect::<Vec<_>>(), vec![&b"\n"[..]]);
  }

  #[test]
  fn test_align_up() {
    assert_eq!(align_up(0, 8), 0);
    assert_eq!(align_up(1, 8), 8);
    assert_eq!(align_up(8, 8), 8);
    assert_eq!(align_up(29, 1), 29);
    assert_eq!(align_up(29, 4), 32);
  }

  #[test]
  fn test_write_zeroes() {
    let mut buf = vec![1u8];
    write_zeroes(&mut buf, 100).unwrap();
    assert_eq!(buf.len(), 101);
    assert!(buf[1..].iter().all(|&b| b == 0));
  }
}
