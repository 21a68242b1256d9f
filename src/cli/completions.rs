// Search for "completions" in <https://github.com/rust-lang/rustup/blob/44be718122ecff073bcb2dfd44c6b50ed84c7696/src/cli/rustup_mode.rs>.

use crate::impl_prelude::*;

use clap_complete::Shell;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct CompletionsCommand;

inventory::submit!(super::CommandDeclaration { command: &CompletionsCommand });

impl super::Command for CompletionsCommand {
  fn name(&self) -> &'static str { "completions" }

  fn create_arg_parser(&self, app: clap::Command<'static>) -> clap::Command<'static> {
    app
      .about("Generates a script which completes the commands and options of pocc in a shell.")
      .arg(
        clap::Arg::new("shell")
          .value_name("SHELL")
          .value_hint(clap::ValueHint::Other)
          .required(true)
          .value_parser(clap::value_parser!(Shell)),
      )
      .arg(
        clap::Arg::new("output_file")
          .value_name("PATH")
          .value_hint(clap::ValueHint::FilePath)
          .short('o')
          .long("output-file")
          .value_parser(clap::value_parser!(PathBuf))
          .default_value(super::STDIO_PATH)
          .help("Write the script into this file, `-` means the standard output."),
      )
  }

  fn run(&self, _global_opts: super::GlobalOpts, matches: &clap::ArgMatches) -> AnyResult<()> {
    let opt_shell = *matches.get_one::<Shell>("shell").unwrap();
    let opt_output_file = matches.get_one::<PathBuf>("output_file").unwrap();

    let mut out = super::open_output(opt_output_file)?;
    write_script(opt_shell, &mut *out).with_context(|| {
      format!("Failed to write the {} completions to {:?}", opt_shell, opt_output_file)
    })?;
    if opt_output_file != Path::new(super::STDIO_PATH) {
      info!("Wrote the {} completions to {:?}", opt_shell, opt_output_file);
    }
    Ok(())
  }
}

fn write_script(shell: Shell, out: &mut dyn Write) -> AnyResult<()> {
  let (mut arg_parser, _) = super::create_complete_arg_parser();
  clap_complete::generate(shell, &mut arg_parser, crate::CRATE_BIN_NAME, out);
  out.write_all(b"\n")?;
  out.flush()?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cli::Command as _;

  #[test]
  fn test_bash_script_lists_commands() {
    let mut out = Vec::new();
    write_script(Shell::Bash, &mut out).unwrap();
    let script = String::from_utf8(out).unwrap();
    assert!(script.contains("decompile"));
    assert!(script.contains("--use-fuzzy"));
    assert!(script.contains("--check-compatibility"));
    assert!(script.ends_with('\n'));
  }

  #[test]
  fn test_output_file() {
    let (arg_parser, _) = super::super::create_complete_arg_parser();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pocc.fish");
    let matches = arg_parser
      .try_get_matches_from(&["pocc", "completions", "fish", "-o", path.to_str().unwrap()])
      .unwrap();
    let (_, matches) = matches.subcommand().unwrap();
    CompletionsCommand.run(super::super::GlobalOpts { verbose: false }, matches).unwrap();
    let script = std::fs::read_to_string(&path).unwrap();
    assert!(script.contains("compile"));
  }
}
