//! The in-memory message model shared by the PO reader, the MO codec and the
//! PO writer. All message texts are kept as raw bytes in the source encoding
//! of the catalog: nothing here assumes UTF-8.

use crate::diagnostics::Location;

use indexmap::IndexMap;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

pub const DEFAULT_DOMAIN_NAME: &str = "messages";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatFlag {
  Undecided,
  Yes,
  No,
  Possible,
  Impossible,
}

impl Default for FormatFlag {
  #[inline(always)]
  fn default() -> Self { Self::Undecided }
}

impl FormatFlag {
  /// Whether strings carrying this flag must be verified against their
  /// translations. Undecided strings are not checked.
  #[inline]
  pub fn is_possible(self) -> bool { matches!(self, Self::Yes | Self::Possible) }

  /// The prefix put in front of `<dialect>-format` in a `#,` comment.
  pub fn comment_prefix(self) -> Option<&'static str> {
    match self {
      Self::Undecided => None,
      Self::Yes => Some(""),
      Self::No => Some("no-"),
      Self::Possible => Some("possible-"),
      Self::Impossible => Some("impossible-"),
    }
  }

  /// Splits a word like `no-c-format` into the dialect id and the flag.
  pub fn parse_comment_word(word: &str) -> Option<(&str, Self)> {
    let dialect = word.strip_suffix("-format")?;
    let (dialect, flag) = if let Some(rest) = dialect.strip_prefix("no-") {
      (rest, Self::No)
    } else if let Some(rest) = dialect.strip_prefix("possible-") {
      (rest, Self::Possible)
    } else if let Some(rest) = dialect.strip_prefix("impossible-") {
      (rest, Self::Impossible)
    } else {
      (dialect, Self::Yes)
    };
    if dialect.is_empty() {
      return None;
    }
    Some((dialect, flag))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapFlag {
  Undecided,
  Yes,
  No,
}

impl Default for WrapFlag {
  #[inline(always)]
  fn default() -> Self { Self::Undecided }
}

/// A `file:line` pair from a `#:` reference comment. Some references carry
/// only a file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilePos {
  pub file_name: String,
  pub line: Option<usize>,
}

impl FilePos {
  pub fn parse(reference: &str) -> Self {
    if let Some(colon_index) = reference.rfind(':') {
      let (file_name, line) = (&reference[..colon_index], &reference[colon_index + 1..]);
      if !file_name.is_empty() && !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(line) = line.parse::<usize>() {
          return Self { file_name: file_name.to_owned(), line: Some(line) };
        }
      }
    }
    Self { file_name: reference.to_owned(), line: None }
  }
}

impl fmt::Display for FilePos {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.line {
      Some(line) => write!(f, "{}:{}", self.file_name, line),
      None => write!(f, "{}", self.file_name),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
  pub msgid: Vec<u8>,
  pub msgid_plural: Option<Vec<u8>>,
  /// One element per plural form, never empty.
  pub msgstr: Vec<Vec<u8>>,
  pub comments: Vec<Vec<u8>>,
  pub extracted_comments: Vec<Vec<u8>>,
  pub file_positions: Vec<FilePos>,
  pub is_fuzzy: bool,
  /// Only decided flags are stored, the rest are implicitly `Undecided`.
  pub format_flags: IndexMap<String, FormatFlag>,
  pub wrap: WrapFlag,
  pub is_obsolete: bool,
  /// Where the message was defined, absent for messages read from MO files.
  pub pos: Option<Location>,
}

impl Message {
  pub fn new(msgid: Vec<u8>, msgstr: Vec<u8>) -> Self {
    Self { msgid, msgstr: vec![msgstr], ..Default::default() }
  }

  pub fn new_plural(msgid: Vec<u8>, msgid_plural: Vec<u8>, msgstr: Vec<Vec<u8>>) -> Self {
    let msgstr = if msgstr.is_empty() { vec![Vec::new()] } else { msgstr };
    Self { msgid, msgid_plural: Some(msgid_plural), msgstr, ..Default::default() }
  }

  /// Reassembles a message out of the NUL-delimited key and translation
  /// strings stored in MO files.
  pub fn from_mo_strings(key: &[u8], translation: &[u8]) -> Self {
    let mut key_parts = key.splitn(2, |&b| b == 0);
    let msgid = key_parts.next().unwrap_or_default().to_vec();
    let msgid_plural = key_parts.next().map(|rest| {
      let end = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());
      rest[..end].to_vec()
    });
    let msgstr = translation.split(|&b| b == 0).map(|form| form.to_vec()).collect();
    Self { msgid, msgid_plural, msgstr, ..Default::default() }
  }

  #[inline]
  pub fn is_header(&self) -> bool { self.msgid.is_empty() && !self.is_obsolete }

  #[inline]
  pub fn is_plural(&self) -> bool { self.msgid_plural.is_some() }

  /// A message counts as translated as soon as its first form is non-empty,
  /// which is the same rule the MO compiler uses for filtering.
  #[inline]
  pub fn is_translated(&self) -> bool { self.msgstr.first().map_or(false, |s| !s.is_empty()) }

  /// `msgid`, followed by a NUL and `msgid_plural` for plural messages. This
  /// is the string stored in the original-strings table of MO files.
  pub fn mo_key(&self) -> Vec<u8> {
    let mut key = self.msgid.clone();
    if let Some(msgid_plural) = &self.msgid_plural {
      key.push(0);
      key.extend_from_slice(msgid_plural);
    }
    key
  }

  /// All plural forms joined with NUL bytes, without the final terminator.
  pub fn msgstr_bundle(&self) -> Vec<u8> { self.msgstr.join(&0u8) }

  pub fn format_flag(&self, dialect: &str) -> FormatFlag {
    self.format_flags.get(dialect).copied().unwrap_or_default()
  }

  pub fn set_format_flag(&mut self, dialect: &str, flag: FormatFlag) {
    if flag == FormatFlag::Undecided {
      self.format_flags.remove(dialect);
    } else {
      self.format_flags.insert(dialect.to_owned(), flag);
    }
  }

  pub fn add_file_position(&mut self, pos: FilePos) {
    if !self.file_positions.contains(&pos) {
      self.file_positions.push(pos);
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
  Source,
  ByMsgid,
  ByFilePosition,
}

impl Default for SortOrder {
  #[inline(always)]
  fn default() -> Self { Self::Source }
}

pub fn compare_by_msgid(a: &Message, b: &Message) -> Ordering {
  a.msgid.cmp(&b.msgid).then_with(|| a.msgid_plural.cmp(&b.msgid_plural))
}

/// Messages without references go first, the rest are ordered by their
/// reference lists and then by msgid.
pub fn compare_by_file_position(a: &Message, b: &Message) -> Ordering {
  a.file_positions.cmp(&b.file_positions).then_with(|| compare_by_msgid(a, b))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
  Inserted { index: usize },
  Duplicate { existing: usize, same_translation: bool },
}

#[derive(Debug, Clone)]
pub struct Domain {
  name: String,
  output_target: String,
  messages: Vec<Message>,
  /// msgid -> index into `messages`, used only for duplicate detection.
  lookup_index: HashMap<Vec<u8>, usize>,
}

impl Domain {
  pub fn new(name: String, output_target: String) -> Self {
    Self { name, output_target, messages: Vec::new(), lookup_index: HashMap::new() }
  }

  #[inline(always)]
  pub fn name(&self) -> &str { &self.name }
  #[inline(always)]
  pub fn output_target(&self) -> &str { &self.output_target }
  #[inline(always)]
  pub fn messages(&self) -> &[Message] { &self.messages }
  #[inline(always)]
  pub fn len(&self) -> usize { self.messages.len() }
  #[inline(always)]
  pub fn is_empty(&self) -> bool { self.messages.is_empty() }

  pub fn get(&self, msgid: &[u8]) -> Option<&Message> {
    self.lookup_index.get(msgid).map(|&i| &self.messages[i])
  }

  pub fn header(&self) -> Option<&Message> { self.get(b"").filter(|m| m.is_header()) }

  /// Adds a message unless one with the same msgid is already present, in
  /// which case the new one is dropped and the outcome tells whether the
  /// translations agreed. Obsolete messages don't take part in the lookup,
  /// they may freely repeat active ones.
  pub fn insert(&mut self, message: Message) -> InsertOutcome {
    if !message.is_obsolete {
      if let Some(&existing) = self.lookup_index.get(&message.msgid) {
        let same_translation = self.messages[existing].msgstr == message.msgstr;
        return InsertOutcome::Duplicate { existing, same_translation };
      }
      self.lookup_index.insert(message.msgid.clone(), self.messages.len());
    }
    let index = self.messages.len();
    self.messages.push(message);
    InsertOutcome::Inserted { index }
  }

  pub fn sort(&mut self, order: SortOrder) {
    match order {
      SortOrder::Source => return,
      SortOrder::ByMsgid => self.messages.sort_by(compare_by_msgid),
      SortOrder::ByFilePosition => self.messages.sort_by(compare_by_file_position),
    }
    self.rebuild_lookup_index();
  }

  fn rebuild_lookup_index(&mut self) {
    self.lookup_index.clear();
    for (i, message) in self.messages.iter().enumerate() {
      if !message.is_obsolete {
        self.lookup_index.entry(message.msgid.clone()).or_insert(i);
      }
    }
  }
}

/// Domains in the order they were first mentioned.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
  domains: IndexMap<String, Domain>,
}

impl Catalog {
  pub fn new() -> Self { Self::default() }

  #[inline(always)]
  pub fn domains(&self) -> impl Iterator<Item = &Domain> + '_ { self.domains.values() }
  #[inline(always)]
  pub fn len(&self) -> usize { self.domains.len() }
  #[inline(always)]
  pub fn is_empty(&self) -> bool { self.domains.is_empty() }

  pub fn get(&self, name: &str) -> Option<&Domain> { self.domains.get(name) }
  pub fn get_mut(&mut self, name: &str) -> Option<&mut Domain> { self.domains.get_mut(name) }

  /// Returns the domain called `name`, creating it on first use. The output
  /// target is only consulted when the domain doesn't exist yet.
  pub fn domain_or_insert(
    &mut self,
    name: &str,
    output_target: impl FnOnce() -> String,
  ) -> &mut Domain {
    self
      .domains
      .entry(name.to_owned())
      .or_insert_with(|| Domain::new(name.to_owned(), output_target()))
  }
}
