pub mod compile;
pub mod completions;
pub mod decompile;
pub mod parse_po;

use crate::impl_prelude::*;
use crate::utils::parsing::ParsingError;

use std::fmt;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

pub const STDIO_PATH: &str = "-";
pub const STDIN_NAME: &str = "<stdin>";

#[derive(Debug, Clone, Copy)]
pub struct GlobalOpts {
  pub verbose: bool,
}

assert_trait_is_object_safe!(Command);
pub trait Command: fmt::Debug + Sync {
  fn name(&self) -> &'static str;

  fn create_arg_parser(&self, app: clap::Command<'static>) -> clap::Command<'static>;

  fn run(&self, global_opts: GlobalOpts, matches: &clap::ArgMatches) -> AnyResult<()>;
}

#[derive(Debug)]
pub struct CommandDeclaration {
  pub command: &'static dyn Command,
}

inventory::collect!(CommandDeclaration);

/// The run went through, but some entries had problems. This only affects
/// the exit status, the problems themselves have already been logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationFailedError {
  pub error_count: usize,
}

impl fmt::Display for ValidationFailedError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "found {} {}",
      self.error_count,
      if self.error_count == 1 { "error" } else { "errors" },
    )
  }
}

impl StdError for ValidationFailedError {}

pub fn create_complete_arg_parser() -> (clap::Command<'static>, Vec<&'static dyn Command>) {
  let mut commands: Vec<&'static dyn Command> = Vec::new();
  for decl in inventory::iter::<CommandDeclaration> {
    if commands.iter().any(|c| c.name() == decl.command.name()) {
      panic!("Duplicate command was registered: {:?}", decl.command.name());
    }
    commands.push(decl.command);
  }
  commands.sort_by_key(|c| c.name());

  let mut arg_parser = clap::Command::new(crate::CRATE_TITLE)
    .version(crate::CRATE_VERSION)
    .about("Compiler and decompiler of gettext message catalogs.")
    .subcommand_required(true)
    .arg_required_else_help(true)
    .arg(
      clap::Arg::new("verbose")
        .short('v')
        .long("verbose")
        .action(clap::ArgAction::SetTrue)
        .global(true)
        .help("Print more logs, may help with troubleshooting."),
    );
  for command in &commands {
    let subcommand = command.create_arg_parser(clap::Command::new(command.name()));
    arg_parser = arg_parser.subcommand(subcommand);
  }

  (arg_parser, commands)
}

/// The entry point of the binary. Returns the exit code.
pub fn main() -> i32 {
  let logger_installed = crate::logging::init_stdio_logger();
  match try_main() {
    Ok(()) => 0,
    Err(e) => {
      if let Some(validation_error) = e.downcast_ref::<ValidationFailedError>() {
        if logger_installed {
          error!("{}", validation_error);
        } else {
          eprintln!("ERROR: {}", validation_error);
        }
      } else {
        report_critical_error!(e);
      }
      1
    }
  }
}

pub fn try_main() -> AnyResult<()> {
  let (arg_parser, commands) = create_complete_arg_parser();
  let matches = arg_parser.get_matches();
  let (command_name, command_matches) =
    matches.subcommand().ok_or_else(|| format_err!("No command was given"))?;

  let global_opts = GlobalOpts {
    verbose: command_matches.get_one::<bool>("verbose").copied().unwrap_or(false),
  };
  crate::logging::set_verbosity(global_opts.verbose);
  crate::logging::print_banner_message();

  let command = commands
    .iter()
    .find(|c| c.name() == command_name)
    .ok_or_else(|| format_err!("Unknown command: {:?}", command_name))?;
  command.run(global_opts, command_matches)
}

pub fn input_name(path: &Path) -> Cow<str> {
  if path == Path::new(STDIO_PATH) {
    Cow::Borrowed(STDIN_NAME)
  } else {
    path.to_string_lossy()
  }
}

/// Syntax errors get the offending line attached, everything else just the
/// name of the file.
pub fn describe_source_error(error: AnyError, file_name: &str, src: &[u8]) -> AnyError {
  let description = match error.downcast_ref::<ParsingError>() {
    Some(parsing_error) => parsing_error.nice_formatter(file_name, src).to_string(),
    None => format!("Failed to process {:?}", file_name),
  };
  error.context(description)
}

/// Reads a whole input file, `-` stands for the standard input.
pub fn read_input(path: &Path) -> AnyResult<Vec<u8>> {
  if path == Path::new(STDIO_PATH) {
    let mut buf = Vec::new();
    io::stdin().read_to_end(&mut buf).context("Failed to read from stdin")?;
    Ok(buf)
  } else {
    fs::read(path).with_context(|| format!("Failed to read file {:?}", path))
  }
}

/// Opens an output file for writing, `-` stands for the standard output.
pub fn open_output(path: &Path) -> AnyResult<Box<dyn Write>> {
  if path == Path::new(STDIO_PATH) {
    Ok(Box::new(io::stdout()))
  } else {
    let file = fs::File::create(path)
      .with_context(|| format!("Failed to open file {:?} for writing", path))?;
    Ok(Box::new(io::BufWriter::new(file)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_commands_are_registered() {
    let (arg_parser, commands) = create_complete_arg_parser();
    let names: Vec<&str> = commands.iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["compile", "completions", "decompile", "parse-po"]);
    arg_parser.debug_assert();
  }

  #[test]
  fn test_parse_compile_flags() {
    let (arg_parser, _) = create_complete_arg_parser();
    let matches = arg_parser
      .try_get_matches_from(&["pocc", "compile", "-v", "-c", "-o", "de.mo", "de.po"])
      .unwrap();
    let (name, matches) = matches.subcommand().unwrap();
    assert_eq!(name, "compile");
    assert_eq!(matches.get_one::<bool>("verbose"), Some(&true));
    assert_eq!(matches.get_one::<bool>("check"), Some(&true));
    assert_eq!(matches.get_one::<String>("output_file").map(String::as_str), Some("de.mo"));
  }

  #[test]
  fn test_sort_flags_conflict() {
    let (arg_parser, _) = create_complete_arg_parser();
    let result = arg_parser.try_get_matches_from(&[
      "pocc",
      "parse-po",
      "--sort-output",
      "--sort-by-file",
    ]);
    assert!(result.is_err());
  }

  #[test]
  fn test_validation_failed_message() {
    assert_eq!(ValidationFailedError { error_count: 1 }.to_string(), "found 1 error");
    assert_eq!(ValidationFailedError { error_count: 3 }.to_string(), "found 3 errors");
  }
}
