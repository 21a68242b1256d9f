//! PO to MO compilation, modelled after `msgfmt`. A [`CompilationSession`]
//! owns everything one run accumulates (the catalog, the counters and the
//! diagnostics), every input file is fed to it through a short-lived
//! [`MoCompiler`] which validates the entries and drops the ones that don't
//! belong in the output.

use crate::builder::{CatalogBuilder, PendingAnnotations};
use crate::catalog::{Catalog, Domain, InsertOutcome, Message, DEFAULT_DOMAIN_NAME};
use crate::diagnostics::{Diagnostics, Location};
use crate::format::REGISTRY;
use crate::gettext_po::{self, LexerOptions};
use crate::impl_prelude::*;
use crate::mo::{self, MoEntry, MoWriterOptions};
use crate::utils;

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

pub const STDOUT_TARGET: &str = "-";

#[derive(Debug, Clone)]
pub struct CompileOptions {
  /// Writes everything into this single file instead of one file per
  /// domain, `domain` directives are then ignored.
  pub output_file: Option<String>,
  /// Appends `.mo` to `output_file` unless it already carries a catalog
  /// extension.
  pub strict: bool,
  /// Includes entries marked as fuzzy.
  pub use_fuzzy: bool,
  pub check_format: bool,
  pub check_header: bool,
  pub check_domain: bool,
  /// Reports constructs which other implementations of the format may not
  /// understand.
  pub check_compatibility: bool,
  /// Writes domains which ended up without any messages.
  pub force_empty: bool,
  pub max_errors: usize,
  pub mo: MoWriterOptions,
}

impl Default for CompileOptions {
  fn default() -> Self {
    Self {
      output_file: None,
      strict: false,
      use_fuzzy: false,
      check_format: false,
      check_header: false,
      check_domain: false,
      check_compatibility: false,
      force_empty: false,
      max_errors: gettext_po::lexer::DEFAULT_MAX_ERRORS,
      mo: MoWriterOptions::default(),
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
  pub translated: usize,
  pub fuzzy: usize,
  pub untranslated: usize,
}

impl fmt::Display for Statistics {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let plural = |n: usize, one: &'static str, many: &'static str| if n == 1 { one } else { many };
    write!(
      f,
      "{} translated {}",
      self.translated,
      plural(self.translated, "message", "messages"),
    )?;
    if self.fuzzy > 0 {
      write!(f, ", {} fuzzy {}", self.fuzzy, plural(self.fuzzy, "translation", "translations"))?;
    }
    if self.untranslated > 0 {
      write!(
        f,
        ", {} untranslated {}",
        self.untranslated,
        plural(self.untranslated, "message", "messages"),
      )?;
    }
    write!(f, ".")
  }
}

/// Two entries in one domain share a msgid but not the translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateMessageError {
  pub msgid: Vec<u8>,
  pub location: Option<Location>,
  pub first_location: Option<Location>,
}

impl fmt::Display for DuplicateMessageError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if let Some(location) = &self.location {
      write!(f, "{}: ", location)?;
    }
    write!(f, "duplicate message definition")?;
    if let Some(first_location) = &self.first_location {
      write!(f, "\n{}: ...this is the location of the first definition", first_location)?;
    }
    Ok(())
  }
}

impl StdError for DuplicateMessageError {}

/// Appends the conventional extension unless the name already has one.
pub fn add_mo_suffix(file_name: &str) -> String {
  match utils::split_filename_extension(file_name) {
    (_, Some("mo")) | (_, Some("gmo")) => file_name.to_owned(),
    _ => utils::fast_concat(&[file_name, ".mo"]),
  }
}

#[inline]
fn is_invalid_path_char(c: char) -> bool {
  c.is_ascii_control() || matches!(c, '"' | '*' | '/' | ':' | '<' | '>' | '?' | '\\' | '|')
}

/// The longest prefix of a domain name which can be used as a file name.
pub fn usable_domain_name(name: &str) -> &str {
  match name.find(is_invalid_path_char) {
    Some(index) => &name[..index],
    None => name,
  }
}

#[derive(Debug)]
pub struct CompilationSession {
  options: CompileOptions,
  catalog: Catalog,
  stats: Statistics,
  diagnostics: Diagnostics,
  warned_about_fuzzy: bool,
}

impl CompilationSession {
  pub fn new(options: CompileOptions) -> Self {
    let mut catalog = Catalog::new();
    if let Some(output_file) = &options.output_file {
      let target = if options.strict && output_file != STDOUT_TARGET {
        add_mo_suffix(output_file)
      } else {
        output_file.clone()
      };
      catalog.domain_or_insert(output_file, || target);
    }
    Self {
      options,
      catalog,
      stats: Statistics::default(),
      diagnostics: Diagnostics::new(),
      warned_about_fuzzy: false,
    }
  }

  #[inline(always)]
  pub fn options(&self) -> &CompileOptions { &self.options }
  #[inline(always)]
  pub fn catalog(&self) -> &Catalog { &self.catalog }
  #[inline(always)]
  pub fn statistics(&self) -> Statistics { self.stats }
  #[inline(always)]
  pub fn diagnostics(&self) -> &Diagnostics { &self.diagnostics }
  #[inline(always)]
  pub fn diagnostics_mut(&mut self) -> &mut Diagnostics { &mut self.diagnostics }

  /// Parses and validates a single PO source. An error means that the run
  /// can't continue, problems with individual entries only end up in the
  /// diagnostics.
  pub fn compile_source(&mut self, src: &[u8], file_name: &str) -> AnyResult<()> {
    debug!("Compiling {:?}", file_name);
    let lexer_options = LexerOptions { pass_comments: true, max_errors: self.options.max_errors };
    let mut compiler = MoCompiler::new(self, file_name);
    gettext_po::parse(src, file_name, lexer_options, &mut compiler)
  }

  /// Encodes a domain, returns `false` without writing anything if there is
  /// nothing to write.
  pub fn encode_domain(&self, domain: &Domain, writer: &mut dyn Write) -> AnyResult<bool> {
    if domain.is_empty() && !self.options.force_empty {
      return Ok(false);
    }
    let entries: Vec<MoEntry> = domain.messages().iter().map(MoEntry::from_message).collect();
    mo::write(writer, entries, &self.options.mo)?;
    Ok(true)
  }

  fn write_domain(&self, domain: &Domain, dir: &Path) -> AnyResult<()> {
    if domain.output_target() == STDOUT_TARGET {
      let stdout = io::stdout();
      let mut writer = stdout.lock();
      self.encode_domain(domain, &mut writer).context("Failed to write to stdout")?;
    } else {
      let path = dir.join(domain.output_target());
      let mut writer = io::BufWriter::new(
        fs::File::create(&path)
          .with_context(|| format!("Failed to open file {:?} for writing", path))?,
      );
      self
        .encode_domain(domain, &mut writer)
        .with_context(|| format!("Failed to write domain {:?} to {:?}", domain.name(), path))?;
    }
    Ok(())
  }

  /// Writes every domain to its output target, with relative targets being
  /// resolved against `dir`. A domain which can't be written doesn't stop the
  /// others. Returns the number of files written.
  pub fn write_outputs_in(&self, dir: &Path) -> AnyResult<usize> {
    let mut written = 0;
    let mut failed = 0;
    for domain in self.catalog.domains() {
      if domain.is_empty() && !self.options.force_empty {
        info!("Domain {:?} is empty, not writing {:?}", domain.name(), domain.output_target());
        continue;
      }
      match self.write_domain(domain, dir) {
        Ok(()) => {
          debug!("Wrote {} messages of domain {:?}", domain.len(), domain.name());
          written += 1;
        }
        Err(e) => {
          report_error!(e);
          failed += 1;
        }
      }
    }
    if failed > 0 {
      bail!("Failed to write {} out of {} output files", failed, failed + written);
    }
    Ok(written)
  }

  #[inline]
  pub fn write_outputs(&self) -> AnyResult<usize> { self.write_outputs_in(Path::new("")) }
}

/// The builder which turns the entries of one PO file into the contents of
/// the output domains.
#[derive(Debug)]
pub struct MoCompiler<'a> {
  session: &'a mut CompilationSession,
  file_name: String,
  current_domain: Option<String>,
  has_header_entry: bool,
  pending: PendingAnnotations,
}

impl<'a> MoCompiler<'a> {
  pub fn new(session: &'a mut CompilationSession, file_name: &str) -> Self {
    // Every file starts out in the default domain, unless everything goes
    // into a single output file anyway.
    let current_domain = session.options.output_file.clone();
    Self {
      session,
      file_name: file_name.to_owned(),
      current_domain,
      has_header_entry: false,
      pending: PendingAnnotations::new(),
    }
  }

  fn current_domain(&mut self) -> &mut Domain {
    let name: &str = self.current_domain.get_or_insert_with(|| DEFAULT_DOMAIN_NAME.to_owned());
    self.session.catalog.domain_or_insert(name, || add_mo_suffix(name))
  }

  /// Decides whether an entry goes into the output, counting it otherwise.
  fn filter(&mut self, message: &Message) -> bool {
    let is_untranslated = !message.is_translated();
    let options = &self.session.options;
    if !is_untranslated && (options.use_fuzzy || !message.is_fuzzy || message.is_header()) {
      return true;
    }

    if options.check_compatibility {
      self.session.diagnostics.warning(
        message.pos.clone(),
        if is_untranslated {
          "empty 'msgstr' entry ignored"
        } else {
          "fuzzy 'msgstr' entry ignored"
        },
      );
    }
    if is_untranslated {
      self.session.stats.untranslated += 1;
    } else {
      self.session.stats.fuzzy += 1;
    }
    false
  }

  fn check_message(&mut self, message: &Message) {
    let location = &message.pos;
    let diagnostics = &mut self.session.diagnostics;
    let options = &self.session.options;

    if message.is_header() {
      if options.check_header {
        for problem in check_header_fields(&message.msgstr[0]) {
          diagnostics.warning(location.clone(), problem);
        }
      }
      return;
    }

    for problem in check_newlines(message) {
      diagnostics.error(location.clone(), problem);
    }

    if options.check_compatibility && message.is_plural() {
      diagnostics.error(location.clone(), "plural handling is a GNU gettext extension");
    }

    if options.check_format && !message.is_plural() {
      for problem in check_format_strings(message) {
        diagnostics.error(location.clone(), problem);
      }
    }
  }
}

impl<'a> CatalogBuilder for MoCompiler<'a> {
  fn diagnostics(&mut self) -> &mut Diagnostics { &mut self.session.diagnostics }

  fn on_domain(&mut self, name: &[u8], location: Location) -> AnyResult<()> {
    let name = String::from_utf8_lossy(name);
    let session = &mut *self.session;

    if session.options.output_file.is_some() {
      if session.options.check_domain {
        session.diagnostics.warning(Some(location), format!("'domain {}' directive ignored", name));
      }
      return Ok(());
    }

    let usable_name = usable_domain_name(&name);
    if usable_name.is_empty() {
      session
        .diagnostics
        .error(Some(location), format!("domain name {:?} not suitable as file name", name));
      return Ok(());
    }
    if usable_name.len() < name.len() {
      session.diagnostics.warning(
        Some(location),
        format!("domain name {:?} not suitable as file name: will use prefix", name),
      );
    }
    session.catalog.domain_or_insert(usable_name, || add_mo_suffix(usable_name));
    self.current_domain = Some(usable_name.to_owned());
    Ok(())
  }

  fn on_comment(&mut self, text: &[u8], _location: Location, _obsolete: bool) -> AnyResult<()> {
    self.pending.absorb(text);
    let session = &mut *self.session;
    if self.pending.is_fuzzy
      && session.options.check_compatibility
      && !session.options.use_fuzzy
      && !session.warned_about_fuzzy
    {
      session.warned_about_fuzzy = true;
      session
        .diagnostics
        .warning(None, format!("{}: source file contains fuzzy translation", self.file_name));
    }
    Ok(())
  }

  fn on_message(&mut self, mut message: Message) -> AnyResult<()> {
    self.pending.apply_to(&mut message);
    if message.is_obsolete || !self.filter(&message) {
      return Ok(());
    }

    if message.is_header() {
      self.has_header_entry = true;
    } else if message.is_fuzzy {
      self.session.stats.fuzzy += 1;
    } else {
      self.session.stats.translated += 1;
    }

    self.check_message(&message);

    let is_header = message.is_header();
    let location = message.pos.clone();
    let domain = self.current_domain();
    if let InsertOutcome::Duplicate { existing, same_translation } = domain.insert(message) {
      if !same_translation && !is_header {
        let existing = &domain.messages()[existing];
        return Err(AnyError::new(DuplicateMessageError {
          msgid: existing.msgid.clone(),
          location,
          first_location: existing.pos.clone(),
        }));
      }
      trace!("Dropped a repeated definition of an entry at {:?}", location);
    }
    Ok(())
  }

  fn on_finish(&mut self) -> AnyResult<()> {
    self.pending = PendingAnnotations::new();
    if self.session.options.check_header && !self.has_header_entry {
      let diagnostics = &mut self.session.diagnostics;
      diagnostics
        .warning(None, format!("{}: PO file header missing, fuzzy, or invalid", self.file_name));
      diagnostics.warning(None, format!("{}: charset conversion will not work", self.file_name));
    }
    Ok(())
  }
}

const REQUIRED_HEADER_FIELDS: &[(&str, Option<&str>)] = &[
  ("Project-Id-Version", Some("PACKAGE VERSION")),
  ("PO-Revision-Date", Some("YEAR-MO-DA")),
  ("Last-Translator", Some("FULL NAME")),
  ("Language-Team", Some("LANGUAGE")),
  ("MIME-Version", None),
  ("Content-Type", Some("text/plain; charset=CHARSET")),
  ("Content-Transfer-Encoding", Some("ENCODING")),
];

/// Looks for the fields every header should have, and for values left over
/// from the template generated by `xgettext`.
pub fn check_header_fields(header: &[u8]) -> Vec<String> {
  let mut problems = Vec::new();
  let mut initial: Option<&str> = None;

  for &(field, default_value) in REQUIRED_HEADER_FIELDS {
    let index = match utils::find_subslice(header, field.as_bytes()) {
      Some(index) => index,
      None => {
        problems.push(format!("header field '{}' missing in header", field));
        continue;
      }
    };
    if index != 0 && header[index - 1] != b'\n' {
      problems.push(format!("header field '{}' should start at beginning of line", field));
      continue;
    }

    // The value is expected after a colon and a space.
    let value = header.get(index + field.len() + 2..).unwrap_or_default();
    if let Some(default_value) = default_value {
      if value.starts_with(default_value.as_bytes()) {
        if initial.is_some() {
          problems.push("some header fields still have the initial default value".to_owned());
          initial = None;
          break;
        }
        initial = Some(field);
      }
    }
  }

  if let Some(field) = initial {
    problems.push(format!("field '{}' still has initial default value", field));
  }
  problems
}

/// The msgid and the translations must agree on leading and trailing
/// newlines. Empty plural forms are left alone.
pub fn check_newlines(message: &Message) -> Vec<String> {
  let mut problems = Vec::new();
  if message.msgid.is_empty() {
    return problems;
  }

  fn begins_with_newline(s: &[u8]) -> bool { s.first() == Some(&b'\n') }
  fn ends_with_newline(s: &[u8]) -> bool { s.last() == Some(&b'\n') }

  let tests: [(&str, fn(&[u8]) -> bool); 2] =
    [("begin", begins_with_newline), ("end", ends_with_newline)];
  for &(position, test) in &tests {
    let expected = test(&message.msgid);
    match &message.msgid_plural {
      Some(msgid_plural) => {
        if test(msgid_plural) != expected {
          problems.push(format!(
            "'msgid' and 'msgid_plural' entries do not both {} with '\\n'",
            position,
          ));
        }
        for (i, form) in message.msgstr.iter().enumerate() {
          if !form.is_empty() && test(form) != expected {
            problems.push(format!(
              "'msgid' and 'msgstr[{}]' entries do not both {} with '\\n'",
              i, position,
            ));
          }
        }
      }
      None => {
        let msgstr = &message.msgstr[0];
        if !msgstr.is_empty() && test(msgstr) != expected {
          problems
            .push(format!("'msgid' and 'msgstr' entries do not both {} with '\\n'", position));
        }
      }
    }
  }
  problems
}

/// Runs every dialect the entry is marked with. Entries whose msgid can't be
/// parsed in a dialect are assumed not to be in that dialect after all.
pub fn check_format_strings(message: &Message) -> Vec<String> {
  let mut problems = Vec::new();
  for checker in REGISTRY.iter() {
    if !message.format_flag(checker.id()).is_possible() {
      continue;
    }
    let msgid_signature = match checker.parse(&message.msgid) {
      Ok(signature) => signature,
      Err(_) => continue,
    };
    match checker.parse(&message.msgstr[0]) {
      Ok(msgstr_signature) => {
        problems.extend(checker.check(&msgid_signature, &msgstr_signature));
      }
      Err(reason) => problems.push(format!(
        "'msgstr' is not a valid {} format string, unlike 'msgid'. Reason: {}",
        checker.pretty_name(),
        reason,
      )),
    }
  }
  problems
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::FormatFlag;
  use crate::diagnostics::Severity;
  use crate::mo::reader;

  const HEADER: &str = r#"msgid ""
msgstr ""
"Project-Id-Version: demo 1.0\n"
"PO-Revision-Date: 2021-01-01 00:00+0000\n"
"Last-Translator: Someone <someone@example.com>\n"
"Language-Team: German\n"
"MIME-Version: 1.0\n"
"Content-Type: text/plain; charset=UTF-8\n"
"Content-Transfer-Encoding: 8bit\n"
"#;

  fn compile(options: CompileOptions, src: &str) -> (CompilationSession, AnyResult<()>) {
    let mut session = CompilationSession::new(options);
    let result = session.compile_source(src.as_bytes(), "test.po");
    (session, result)
  }

  fn errors(session: &CompilationSession) -> Vec<&str> {
    session.diagnostics().messages_with_severity(Severity::Error).collect()
  }

  fn warnings(session: &CompilationSession) -> Vec<&str> {
    session.diagnostics().messages_with_severity(Severity::Warning).collect()
  }

  #[test]
  fn test_compile_round_trip() {
    let src = format!(
      "{}{}",
      HEADER,
      r#"
#: src/main.c:10
#, c-format
msgid "Hello, %s!"
msgstr "Hallo, %s!"

msgid "file"
msgid_plural "files"
msgstr[0] "Datei"
msgstr[1] "Dateien"

#, fuzzy
msgid "maybe"
msgstr "vielleicht"

msgid "untranslated"
msgstr ""

#~ msgid "old"
#~ msgstr "alt"
"#,
    );
    let (session, result) = compile(CompileOptions::default(), &src);
    result.unwrap();
    assert!(session.diagnostics().is_empty());
    assert_eq!(session.statistics(), Statistics { translated: 2, fuzzy: 1, untranslated: 1 });
    assert_eq!(
      session.statistics().to_string(),
      "2 translated messages, 1 fuzzy translation, 1 untranslated message.",
    );

    let domain = session.catalog().get(DEFAULT_DOMAIN_NAME).unwrap();
    assert_eq!(domain.output_target(), "messages.mo");
    assert_eq!(domain.len(), 3);

    let mut bytes = Vec::new();
    assert!(session.encode_domain(domain, &mut bytes).unwrap());
    let decoded = reader::read(&mut io::Cursor::new(bytes), "messages.mo").unwrap().messages;
    let ids: Vec<&[u8]> = decoded.iter().map(|m| &m.msgid[..]).collect();
    assert_eq!(ids, vec![&b""[..], b"Hello, %s!", b"file"]);
    assert_eq!(decoded[1].msgstr, vec![b"Hallo, %s!".to_vec()]);
    assert_eq!(decoded[2].msgid_plural.as_deref(), Some(&b"files"[..]));
    assert_eq!(decoded[2].msgstr, vec![b"Datei".to_vec(), b"Dateien".to_vec()]);
  }

  #[test]
  fn test_use_fuzzy() {
    let options = CompileOptions { use_fuzzy: true, ..Default::default() };
    let (session, result) = compile(options, "#, fuzzy\nmsgid \"a\"\nmsgstr \"b\"\n");
    result.unwrap();
    assert_eq!(session.statistics(), Statistics { translated: 0, fuzzy: 1, untranslated: 0 });
    assert_eq!(session.catalog().get(DEFAULT_DOMAIN_NAME).unwrap().len(), 1);
  }

  #[test]
  fn test_duplicates() {
    let src = "msgid \"a\"\nmsgstr \"x\"\n\nmsgid \"a\"\nmsgstr \"x\"\n";
    let (session, result) = compile(CompileOptions::default(), src);
    result.unwrap();
    assert_eq!(session.catalog().get(DEFAULT_DOMAIN_NAME).unwrap().len(), 1);

    let src = "msgid \"a\"\nmsgstr \"x\"\n\nmsgid \"a\"\nmsgstr \"y\"\n";
    let (_, result) = compile(CompileOptions::default(), src);
    let error = result.unwrap_err();
    let duplicate = error.downcast_ref::<DuplicateMessageError>().unwrap();
    assert_eq!(duplicate.msgid, b"a");
    assert_eq!(duplicate.location.as_ref().map(|l| l.line), Some(4));
    assert_eq!(duplicate.first_location.as_ref().map(|l| l.line), Some(1));
    assert_eq!(
      duplicate.to_string(),
      "test.po:4:1: duplicate message definition\n\
      test.po:1:1: ...this is the location of the first definition",
    );
  }

  #[test]
  fn test_duplicates_in_other_domains() {
    let src = "msgid \"a\"\nmsgstr \"x\"\n\ndomain \"other\"\n\nmsgid \"a\"\nmsgstr \"y\"\n";
    let (session, result) = compile(CompileOptions::default(), src);
    result.unwrap();
    let names: Vec<&str> = session.catalog().domains().map(Domain::name).collect();
    assert_eq!(names, vec!["messages", "other"]);
    assert_eq!(session.catalog().get("other").unwrap().output_target(), "other.mo");
  }

  #[test]
  fn test_newlines() {
    let (session, result) = compile(
      CompileOptions::default(),
      "msgid \"\\nHello\"\nmsgstr \"Hello\"\n\nmsgid \"Bye\\n\"\nmsgstr \"Bye\"\n",
    );
    result.unwrap();
    assert_eq!(errors(&session), vec![
      "'msgid' and 'msgstr' entries do not both begin with '\\n'",
      "'msgid' and 'msgstr' entries do not both end with '\\n'",
    ]);

    let mut message =
      Message::new_plural(b"a\n".to_vec(), b"b".to_vec(), vec![b"c\n".to_vec(), b"d".to_vec()]);
    assert_eq!(check_newlines(&message), vec![
      "'msgid' and 'msgid_plural' entries do not both end with '\\n'",
      "'msgid' and 'msgstr[1]' entries do not both end with '\\n'",
    ]);
    message.msgid.clear();
    assert!(check_newlines(&message).is_empty());
  }

  #[test]
  fn test_format_strings() {
    let options = CompileOptions { check_format: true, ..Default::default() };
    let src = r#"
#, c-format
msgid "%d and %s"
msgstr "%s and %d"

#, python-format
msgid "%(x)s-%(y)d"
msgstr "%(y)d-%(x)s"

#, c-format
msgid "%d files"
msgstr "%y Dateien"

msgid "%d unchecked"
msgstr "%s"
"#;
    let (session, result) = compile(options, src);
    result.unwrap();
    assert_eq!(errors(&session), vec![
      "format specifications in 'msgid' and 'msgstr' for argument 1 are not the same",
      "format specifications in 'msgid' and 'msgstr' for argument 2 are not the same",
      "'msgstr' is not a valid C format string, unlike 'msgid'. \
      Reason: in directive number 1, the character 'y' is not a valid conversion specifier",
    ]);

    let mut message = Message::new(b"50%".to_vec(), b"%d".to_vec());
    message.set_format_flag("c", FormatFlag::Possible);
    assert!(check_format_strings(&message).is_empty());
  }

  #[test]
  fn test_header_checks() {
    let options = CompileOptions { check_header: true, ..Default::default() };
    let (session, result) = compile(options.clone(), HEADER);
    result.unwrap();
    assert!(session.diagnostics().is_empty());
    assert_eq!(session.statistics(), Statistics::default());

    let (session, result) = compile(options, "msgid \"a\"\nmsgstr \"b\"\n");
    result.unwrap();
    assert_eq!(warnings(&session), vec![
      "test.po: PO file header missing, fuzzy, or invalid",
      "test.po: charset conversion will not work",
    ]);

    let problems = check_header_fields(
      b"Project-Id-Version: PACKAGE VERSION\n\
      PO-Revision-Date: 2021-01-01\nLast-Translator: A\nLanguage-Team: B\n\
      X-MIME-Version: 1.0\nContent-Type: text/plain; charset=UTF-8\n",
    );
    assert_eq!(problems, vec![
      "header field 'MIME-Version' should start at beginning of line",
      "header field 'Content-Transfer-Encoding' missing in header",
      "field 'Project-Id-Version' still has initial default value",
    ]);

    let problems = check_header_fields(
      b"Project-Id-Version: PACKAGE VERSION\nPO-Revision-Date: YEAR-MO-DA HO:MI+ZONE\n",
    );
    assert_eq!(problems, vec!["some header fields still have the initial default value"]);
  }

  #[test]
  fn test_compatibility_checks() {
    let options = CompileOptions { check_compatibility: true, ..Default::default() };
    let src = r#"
#, fuzzy
msgid "a"
msgstr "b"

msgid "c"
msgstr ""

msgid "file"
msgid_plural "files"
msgstr[0] "Datei"
msgstr[1] "Dateien"
"#;
    let (session, result) = compile(options, src);
    result.unwrap();
    assert_eq!(warnings(&session), vec![
      "test.po: source file contains fuzzy translation",
      "fuzzy 'msgstr' entry ignored",
      "empty 'msgstr' entry ignored",
    ]);
    assert_eq!(errors(&session), vec!["plural handling is a GNU gettext extension"]);
  }

  #[test]
  fn test_domain_directives() {
    let (session, result) = compile(
      CompileOptions::default(),
      "domain \"a/b\"\nmsgid \"x\"\nmsgstr \"y\"\ndomain \"/c\"\nmsgid \"z\"\nmsgstr \"w\"\n",
    );
    result.unwrap();
    assert_eq!(warnings(&session), vec![
      "domain name \"a/b\" not suitable as file name: will use prefix",
    ]);
    assert_eq!(errors(&session), vec!["domain name \"/c\" not suitable as file name"]);
    let domain = session.catalog().get("a").unwrap();
    assert_eq!(domain.output_target(), "a.mo");
    assert_eq!(domain.len(), 2);

    let options = CompileOptions {
      output_file: Some("out".to_owned()),
      strict: true,
      check_domain: true,
      ..Default::default()
    };
    let (session, result) = compile(options, "domain \"other\"\nmsgid \"x\"\nmsgstr \"y\"\n");
    result.unwrap();
    assert_eq!(warnings(&session), vec!["'domain other' directive ignored"]);
    assert_eq!(session.catalog().len(), 1);
    assert_eq!(session.catalog().get("out").unwrap().output_target(), "out.mo");
  }

  #[test]
  fn test_domain_resets_between_files() {
    let mut session = CompilationSession::new(CompileOptions::default());
    session.compile_source(b"domain \"first\"\nmsgid \"a\"\nmsgstr \"b\"\n", "a.po").unwrap();
    session.compile_source(b"msgid \"a\"\nmsgstr \"c\"\n", "b.po").unwrap();
    assert_eq!(session.catalog().get("first").unwrap().len(), 1);
    assert_eq!(session.catalog().get(DEFAULT_DOMAIN_NAME).unwrap().len(), 1);
  }

  #[test]
  fn test_add_mo_suffix() {
    assert_eq!(add_mo_suffix("de"), "de.mo");
    assert_eq!(add_mo_suffix("de.mo"), "de.mo");
    assert_eq!(add_mo_suffix("de.gmo"), "de.gmo");
    assert_eq!(add_mo_suffix(".mo"), ".mo.mo");
    assert_eq!(usable_domain_name("a:b"), "a");
    assert_eq!(usable_domain_name("plain"), "plain");
  }

  #[test]
  fn test_write_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = CompilationSession::new(CompileOptions::default());
    session
      .compile_source(b"domain \"empty\"\n\ndomain \"full\"\nmsgid \"a\"\nmsgstr \"b\"\n", "x.po")
      .unwrap();
    assert_eq!(session.write_outputs_in(dir.path()).unwrap(), 1);
    assert!(dir.path().join("full.mo").exists());
    assert!(!dir.path().join("empty.mo").exists());

    let mut file = fs::File::open(dir.path().join("full.mo")).unwrap();
    let decoded = reader::read(&mut file, "full.mo").unwrap();
    assert_eq!(decoded.messages.len(), 1);

    let options = CompileOptions {
      output_file: Some("forced.mo".to_owned()),
      force_empty: true,
      ..Default::default()
    };
    let mut session = CompilationSession::new(options);
    session.compile_source(b"msgid \"a\"\nmsgstr \"\"\n", "x.po").unwrap();
    assert_eq!(session.statistics().untranslated, 1);
    assert_eq!(session.write_outputs_in(dir.path()).unwrap(), 1);
    assert_eq!(fs::metadata(dir.path().join("forced.mo")).unwrap().len(), 28 + 3 * 4);
  }
}
