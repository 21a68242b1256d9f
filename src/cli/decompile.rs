use crate::catalog::{self, Message};
use crate::gettext_po::writer;
use crate::impl_prelude::*;
use crate::mo;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct DecompileCommand;

inventory::submit!(super::CommandDeclaration { command: &DecompileCommand });

impl super::Command for DecompileCommand {
  fn name(&self) -> &'static str { "decompile" }

  fn create_arg_parser(&self, app: clap::Command<'static>) -> clap::Command<'static> {
    app
      .about("Converts binary MO catalogs back into a PO file.")
      .arg(
        clap::Arg::new("inputs")
          .value_name("INPUT_PATH")
          .value_hint(clap::ValueHint::FilePath)
          .value_parser(clap::value_parser!(PathBuf))
          .multiple_values(true)
          .help("MO files to read, the standard input is read if none are given."),
      )
      .arg(
        clap::Arg::new("output_file")
          .value_name("PATH")
          .value_hint(clap::ValueHint::FilePath)
          .value_parser(clap::value_parser!(PathBuf))
          .short('o')
          .long("output-file")
          .default_value(super::STDIO_PATH)
          .help("Where to write the PO file, `-` means the standard output."),
      )
      .arg(
        clap::Arg::new("sort_output")
          .short('s')
          .long("sort-output")
          .action(clap::ArgAction::SetTrue)
          .help("Sort the messages by msgid and remove the duplicates."),
      )
      .arg(
        clap::Arg::new("force_po")
          .long("force-po")
          .action(clap::ArgAction::SetTrue)
          .help("Write the output even if it contains no messages."),
      )
  }

  fn run(&self, _global_opts: super::GlobalOpts, matches: &clap::ArgMatches) -> AnyResult<()> {
    let opt_inputs: Vec<PathBuf> = match matches.get_many::<PathBuf>("inputs") {
      Some(values) => values.cloned().collect(),
      None => vec![PathBuf::from(super::STDIO_PATH)],
    };
    let opt_output_file = matches.get_one::<PathBuf>("output_file").unwrap();
    let opt_sort_output = matches.get_one::<bool>("sort_output").copied().unwrap_or(false);
    let opt_force_po = matches.get_one::<bool>("force_po").copied().unwrap_or(false);

    let mut messages = Vec::new();
    for input in &opt_inputs {
      let file_name = super::input_name(input);
      let src = super::read_input(input)?;
      let mo_file = mo::read(&mut io::Cursor::new(src), &file_name)?;
      debug!("Read {} messages from {:?}", mo_file.messages.len(), file_name);
      messages.extend(mo_file.messages);
    }

    if opt_sort_output {
      sort_and_dedup(&mut messages);
    }

    if messages.is_empty() && !opt_force_po {
      info!("No messages were found, not writing {:?}", opt_output_file);
      return Ok(());
    }
    write_output(opt_output_file, &messages)
  }
}

/// Messages with equal msgids are collapsed into the first one.
pub fn sort_and_dedup(messages: &mut Vec<Message>) {
  messages.sort_by(catalog::compare_by_msgid);
  messages.dedup_by(|next, prev| next.msgid == prev.msgid);
}

fn write_output(path: &Path, messages: &[Message]) -> AnyResult<()> {
  let mut writer = super::open_output(path)?;
  writer::write_messages(&mut writer, messages)
    .and_then(|()| writer.flush())
    .with_context(|| format!("Failed to write to {:?}", path))?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_sort_and_dedup() {
    let mut messages = vec![
      Message::new(b"b".to_vec(), b"2".to_vec()),
      Message::new(b"a".to_vec(), b"1".to_vec()),
      Message::new(b"b".to_vec(), b"3".to_vec()),
      Message::new(Vec::new(), b"Content-Type: text/plain\n".to_vec()),
    ];
    sort_and_dedup(&mut messages);
    let msgids: Vec<&[u8]> = messages.iter().map(|m| &m.msgid[..]).collect();
    assert_eq!(msgids, vec![&b""[..], b"a", b"b"]);
    assert_eq!(messages[2].msgstr, vec![b"2".to_vec()]);
  }

  #[test]
  fn test_write_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.po");
    let messages = vec![Message::new(b"hello".to_vec(), b"hola".to_vec())];
    write_output(&path, &messages).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "msgid \"hello\"\nmsgstr \"hola\"\n");
  }
}
