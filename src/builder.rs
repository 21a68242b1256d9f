//! The receiving end of the PO parser. The parser only recognizes the
//! grammar, what happens to the entries is decided by a [`CatalogBuilder`],
//! so that one parser serves both the collector used for PO-to-PO work and
//! the MO compiler in [`crate::compile`].

use crate::catalog::{
  Catalog, FilePos, FormatFlag, InsertOutcome, Message, WrapFlag, DEFAULT_DOMAIN_NAME,
};
use crate::diagnostics::{Diagnostics, Location};
use crate::impl_prelude::*;

use indexmap::IndexMap;

pub trait CatalogBuilder {
  fn diagnostics(&mut self) -> &mut Diagnostics;

  fn on_domain(&mut self, name: &[u8], location: Location) -> AnyResult<()>;

  /// Receives the text of a comment line after the `#`.
  fn on_comment(&mut self, text: &[u8], location: Location, obsolete: bool) -> AnyResult<()>;

  /// Receives a complete entry. Comments seen since the previous entry belong
  /// to this one.
  fn on_message(&mut self, message: Message) -> AnyResult<()>;

  fn on_finish(&mut self) -> AnyResult<()>;
}

assert_trait_is_object_safe!(CatalogBuilder);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
  Translator,
  Extracted,
  Reference,
  Flags,
}

/// Information from the comment lines preceding an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingAnnotations {
  pub comments: Vec<Vec<u8>>,
  pub extracted_comments: Vec<Vec<u8>>,
  pub file_positions: Vec<FilePos>,
  pub is_fuzzy: bool,
  pub format_flags: IndexMap<String, FormatFlag>,
  pub wrap: WrapFlag,
}

impl PendingAnnotations {
  pub fn new() -> Self { Self::default() }

  /// Sorts a comment line into the right bucket, the first byte of the text
  /// decides which one.
  pub fn absorb(&mut self, text: &[u8]) -> CommentKind {
    match text.first() {
      Some(b'.') => {
        self.extracted_comments.push(strip_one_space(&text[1..]).to_vec());
        CommentKind::Extracted
      }
      Some(b':') => {
        let text = String::from_utf8_lossy(&text[1..]);
        for reference in text.split_ascii_whitespace() {
          let pos = FilePos::parse(reference);
          if !self.file_positions.contains(&pos) {
            self.file_positions.push(pos);
          }
        }
        CommentKind::Reference
      }
      Some(b',') | Some(b'!') => {
        self.absorb_flags(&String::from_utf8_lossy(&text[1..]));
        CommentKind::Flags
      }
      _ => {
        self.comments.push(strip_one_space(text).to_vec());
        CommentKind::Translator
      }
    }
  }

  fn absorb_flags(&mut self, text: &str) {
    for word in text.split(|c: char| c == ',' || c.is_ascii_whitespace()) {
      match word {
        "" => {}
        "fuzzy" => self.is_fuzzy = true,
        "wrap" => self.wrap = WrapFlag::Yes,
        "no-wrap" => self.wrap = WrapFlag::No,
        _ => {
          if let Some((dialect, flag)) = FormatFlag::parse_comment_word(word) {
            self.format_flags.insert(dialect.to_owned(), flag);
          }
        }
      }
    }
  }

  #[inline]
  pub fn format_flag(&self, dialect: &str) -> FormatFlag {
    self.format_flags.get(dialect).copied().unwrap_or_default()
  }

  /// Moves everything collected so far into the message, leaving `self`
  /// empty for the next entry.
  pub fn apply_to(&mut self, message: &mut Message) {
    let annotations = std::mem::take(self);
    message.comments = annotations.comments;
    message.extracted_comments = annotations.extracted_comments;
    message.file_positions = annotations.file_positions;
    message.is_fuzzy = annotations.is_fuzzy;
    message.format_flags = annotations.format_flags;
    message.wrap = annotations.wrap;
  }
}

fn strip_one_space(text: &[u8]) -> &[u8] {
  match text.first() {
    Some(b' ') => &text[1..],
    _ => text,
  }
}

/// Keeps every entry, with all of its comments, in the domains where it was
/// found. Used whenever PO files are read for anything other than
/// compilation.
#[derive(Debug)]
pub struct CollectingBuilder {
  catalog: Catalog,
  current_domain: String,
  pending: PendingAnnotations,
  diagnostics: Diagnostics,
}

impl CollectingBuilder {
  pub fn new() -> Self { Self::with_catalog(Catalog::new()) }

  /// Continues filling an existing catalog, for reading several files into
  /// one.
  pub fn with_catalog(catalog: Catalog) -> Self {
    Self {
      catalog,
      current_domain: DEFAULT_DOMAIN_NAME.to_owned(),
      pending: PendingAnnotations::new(),
      diagnostics: Diagnostics::new(),
    }
  }

  #[inline(always)]
  pub fn catalog(&self) -> &Catalog { &self.catalog }

  pub fn into_parts(self) -> (Catalog, Diagnostics) { (self.catalog, self.diagnostics) }
}

impl CatalogBuilder for CollectingBuilder {
  fn diagnostics(&mut self) -> &mut Diagnostics { &mut self.diagnostics }

  fn on_domain(&mut self, name: &[u8], _location: Location) -> AnyResult<()> {
    self.current_domain = String::from_utf8_lossy(name).into_owned();
    Ok(())
  }

  fn on_comment(&mut self, text: &[u8], _location: Location, _obsolete: bool) -> AnyResult<()> {
    self.pending.absorb(text);
    Ok(())
  }

  fn on_message(&mut self, mut message: Message) -> AnyResult<()> {
    self.pending.apply_to(&mut message);
    let location = message.pos.clone();
    let current_domain = &self.current_domain;
    let domain =
      self.catalog.domain_or_insert(current_domain, || format!("{}.po", current_domain));
    if let InsertOutcome::Duplicate { existing, same_translation: false } = domain.insert(message)
    {
      let first_location = domain.messages()[existing].pos.as_ref();
      self.diagnostics.error(
        location,
        match first_location {
          Some(first_location) => {
            format!("duplicate message definition, the first one is at {}", first_location)
          }
          None => "duplicate message definition".to_owned(),
        },
      );
    }
    Ok(())
  }

  fn on_finish(&mut self) -> AnyResult<()> {
    self.pending = PendingAnnotations::new();
    Ok(())
  }
}
