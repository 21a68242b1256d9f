//! Serialization of messages back into the PO format, in the layout `msgcat`
//! produces minus line wrapping.

use crate::catalog::{Catalog, Message, WrapFlag, DEFAULT_DOMAIN_NAME};
use crate::utils;

use std::io::{self, Write};

/// Writes the domains of a catalog one after another, each non-default one
/// introduced with a `domain` directive.
pub fn write_catalog(writer: &mut dyn Write, catalog: &Catalog) -> io::Result<()> {
  let mut is_first_domain = true;
  for domain in catalog.domains() {
    if is_first_domain {
      is_first_domain = false;
    } else {
      writer.write_all(b"\n")?;
    }
    if domain.name() != DEFAULT_DOMAIN_NAME {
      writer.write_all(b"domain ")?;
      write_po_string(writer, b"", domain.name().as_bytes())?;
    }
    write_messages(writer, domain.messages())?;
  }
  Ok(())
}

/// Writes the header entry (if there is one) first, then the rest of the
/// messages in the given order, separated by blank lines.
pub fn write_messages(writer: &mut dyn Write, messages: &[Message]) -> io::Result<()> {
  let header = messages.iter().find(|m| m.is_header());
  let rest = messages.iter().filter(|m| !m.is_header());

  let mut is_first_message = true;
  for message in header.into_iter().chain(rest) {
    if is_first_message {
      is_first_message = false;
    } else {
      writer.write_all(b"\n")?;
    }
    write_message(writer, message)?;
  }
  Ok(())
}

#[allow(clippy::write_with_newline)]
pub fn write_message(writer: &mut dyn Write, message: &Message) -> io::Result<()> {
  for comment in &message.comments {
    write_po_comment(writer, b"#", comment)?;
  }
  for comment in &message.extracted_comments {
    write_po_comment(writer, b"#.", comment)?;
  }

  if !message.file_positions.is_empty() {
    writer.write_all(b"#:")?;
    for pos in &message.file_positions {
      write!(writer, " {}", pos)?;
    }
    writer.write_all(b"\n")?;
  }

  let flags = flag_words(message);
  if !flags.is_empty() {
    write!(writer, "#, {}\n", flags.join(", "))?;
  }

  let prefix: &[u8] = if message.is_obsolete { b"#~ " } else { b"" };
  write_po_section(writer, prefix, b"msgid", &message.msgid)?;
  match &message.msgid_plural {
    Some(msgid_plural) => {
      write_po_section(writer, prefix, b"msgid_plural", msgid_plural)?;
      for (i, form) in message.msgstr.iter().enumerate() {
        write_po_section(writer, prefix, format!("msgstr[{}]", i).as_bytes(), form)?;
      }
    }
    None => {
      let msgstr = message.msgstr.first().map_or(&b""[..], |s| &s[..]);
      write_po_section(writer, prefix, b"msgstr", msgstr)?;
    }
  }
  Ok(())
}

fn flag_words(message: &Message) -> Vec<String> {
  let mut words = Vec::new();
  if message.is_fuzzy {
    words.push("fuzzy".to_owned());
  }
  for (dialect, flag) in &message.format_flags {
    if let Some(prefix) = flag.comment_prefix() {
      words.push(utils::fast_concat(&[prefix, dialect, "-format"]));
    }
  }
  match message.wrap {
    WrapFlag::Yes => words.push("wrap".to_owned()),
    WrapFlag::No => words.push("no-wrap".to_owned()),
    WrapFlag::Undecided => {}
  }
  words
}

fn write_po_comment(writer: &mut dyn Write, prefix: &[u8], text: &[u8]) -> io::Result<()> {
  writer.write_all(prefix)?;
  if !text.is_empty() {
    writer.write_all(b" ")?;
    writer.write_all(text)?;
  }
  writer.write_all(b"\n")
}

fn write_po_section(
  writer: &mut dyn Write,
  prefix: &[u8],
  keyword: &[u8],
  text: &[u8],
) -> io::Result<()> {
  writer.write_all(prefix)?;
  writer.write_all(keyword)?;
  writer.write_all(b" ")?;
  write_po_string(writer, prefix, text)?;
  Ok(())
}

/// Multi-line strings are split after every newline and begin with an empty
/// string on the keyword line.
fn write_po_string(writer: &mut dyn Write, prefix: &[u8], text: &[u8]) -> io::Result<()> {
  let resplit_text: Vec<&[u8]> = utils::LinesWithEndings::new(text).collect();
  if resplit_text.len() != 1 {
    writer.write_all(b"\"\"\n")?;
  }
  let mut buf = Vec::new();
  for (i, substr) in resplit_text.iter().enumerate() {
    if resplit_text.len() != 1 || i > 0 {
      writer.write_all(prefix)?;
    }
    buf.clear();
    super::escape_bytes(substr, &mut buf);
    writer.write_all(b"\"")?;
    writer.write_all(&buf)?;
    writer.write_all(b"\"\n")?;
  }
  Ok(())
}
