use crate::builder::CollectingBuilder;
use crate::catalog::{Catalog, Domain, FormatFlag, Message, SortOrder};
use crate::gettext_po::{self, writer, LexerOptions};
use crate::impl_prelude::*;
use crate::utils;

use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug)]
pub struct ParsePoCommand;

inventory::submit!(super::CommandDeclaration { command: &ParsePoCommand });

impl super::Command for ParsePoCommand {
  fn name(&self) -> &'static str { "parse-po" }

  fn create_arg_parser(&self, app: clap::Command<'static>) -> clap::Command<'static> {
    app
      .about("Debug command for testing the PO parser.")
      .hide(true)
      .arg(
        clap::Arg::new("inputs")
          .value_name("FILE")
          .value_hint(clap::ValueHint::FilePath)
          .value_parser(clap::value_parser!(PathBuf))
          .multiple_values(true),
      )
      .arg(
        clap::Arg::new("json")
          .short('J')
          .long("json")
          .action(clap::ArgAction::SetTrue)
          .help("Print the parsed messages as JSON instead of PO."),
      )
      .arg(
        clap::Arg::new("sort_output")
          .long("sort-output")
          .action(clap::ArgAction::SetTrue)
          .conflicts_with("sort_by_file")
          .help("Sort the messages by msgid."),
      )
      .arg(
        clap::Arg::new("sort_by_file")
          .long("sort-by-file")
          .action(clap::ArgAction::SetTrue)
          .help("Sort the messages by their source references."),
      )
  }

  fn run(&self, _global_opts: super::GlobalOpts, matches: &clap::ArgMatches) -> AnyResult<()> {
    let flag = |name: &str| matches.get_one::<bool>(name).copied().unwrap_or(false);
    let opt_inputs: Vec<PathBuf> = match matches.get_many::<PathBuf>("inputs") {
      Some(values) => values.cloned().collect(),
      None => vec![PathBuf::from(super::STDIO_PATH)],
    };
    let opt_json = flag("json");
    let sort_order = if flag("sort_output") {
      SortOrder::ByMsgid
    } else if flag("sort_by_file") {
      SortOrder::ByFilePosition
    } else {
      SortOrder::Source
    };

    let mut catalog = Catalog::new();
    let mut error_count = 0;
    for input in &opt_inputs {
      let file_name = super::input_name(input);
      let src = super::read_input(input)?;
      let mut builder = CollectingBuilder::with_catalog(catalog);
      let result = gettext_po::parse(&src, &file_name, LexerOptions::default(), &mut builder);
      let (parsed_catalog, mut diagnostics) = builder.into_parts();
      diagnostics.log_all();
      error_count += diagnostics.error_count();
      result.map_err(|e| super::describe_source_error(e, &file_name, &src))?;
      catalog = parsed_catalog;
    }

    let names: Vec<String> = catalog.domains().map(|d| d.name().to_owned()).collect();
    for name in &names {
      if let Some(domain) = catalog.get_mut(name) {
        domain.sort(sort_order);
      }
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if opt_json {
      print_catalog_json(&mut out, &catalog)?;
    } else {
      writer::write_catalog(&mut out, &catalog)?;
    }
    out.flush()?;

    if error_count > 0 {
      return Err(AnyError::new(super::ValidationFailedError { error_count }));
    }
    Ok(())
  }
}

#[derive(Debug, Serialize)]
struct JsonDomain<'a> {
  domain: &'a str,
  messages: Vec<JsonMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonMessage<'a> {
  #[serde(skip_serializing_if = "Option::is_none")]
  location: Option<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  comments: Vec<Cow<'a, str>>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  extracted_comments: Vec<Cow<'a, str>>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  references: Vec<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  flags: Vec<String>,
  #[serde(skip_serializing_if = "utils::is_default")]
  is_obsolete: bool,
  msgid: Cow<'a, str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  msgid_plural: Option<Cow<'a, str>>,
  msgstr: Vec<Cow<'a, str>>,
}

impl<'a> JsonMessage<'a> {
  fn new(message: &'a Message) -> Self {
    let lossy = |s: &'a Vec<u8>| String::from_utf8_lossy(s);

    let mut flags = Vec::new();
    if message.is_fuzzy {
      flags.push("fuzzy".to_owned());
    }
    for (dialect, &flag) in &message.format_flags {
      if let Some(prefix) = FormatFlag::comment_prefix(flag) {
        flags.push(utils::fast_concat(&[prefix, dialect, "-format"]));
      }
    }

    Self {
      location: message.pos.as_ref().map(ToString::to_string),
      comments: message.comments.iter().map(lossy).collect(),
      extracted_comments: message.extracted_comments.iter().map(lossy).collect(),
      references: message.file_positions.iter().map(ToString::to_string).collect(),
      flags,
      is_obsolete: message.is_obsolete,
      msgid: lossy(&message.msgid),
      msgid_plural: message.msgid_plural.as_ref().map(lossy),
      msgstr: message.msgstr.iter().map(lossy).collect(),
    }
  }
}

impl<'a> JsonDomain<'a> {
  fn new(domain: &'a Domain) -> Self {
    let messages = domain.messages().iter().map(JsonMessage::new).collect();
    Self { domain: domain.name(), messages }
  }
}

fn print_catalog_json(out: &mut dyn Write, catalog: &Catalog) -> AnyResult<()> {
  for domain in catalog.domains() {
    serde_json::to_writer_pretty(&mut *out, &JsonDomain::new(domain))?;
    out.write_all(b"\n")?;
  }
  Ok(())
}
