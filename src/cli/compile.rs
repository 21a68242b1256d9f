use crate::compile::{CompilationSession, CompileOptions};
use crate::impl_prelude::*;
use crate::mo::{Endianness, MoWriterOptions};

use std::path::PathBuf;

#[derive(Debug)]
pub struct CompileCommand;

inventory::submit!(super::CommandDeclaration { command: &CompileCommand });

impl super::Command for CompileCommand {
  fn name(&self) -> &'static str { "compile" }

  fn create_arg_parser(&self, app: clap::Command<'static>) -> clap::Command<'static> {
    app
      .about("Compiles PO files into binary MO catalogs.")
      .arg(
        clap::Arg::new("inputs")
          .value_name("INPUT_PATH")
          .value_hint(clap::ValueHint::FilePath)
          .value_parser(clap::value_parser!(PathBuf))
          .multiple_values(true)
          .help("PO files to compile, the standard input is read if none are given."),
      )
      .arg(
        clap::Arg::new("output_file")
          .value_name("PATH")
          .value_hint(clap::ValueHint::FilePath)
          .short('o')
          .long("output-file")
          .help(
            "Write all messages into this file instead of one file per domain. `domain` \
            directives in the inputs are ignored. `-` means the standard output.",
          ),
      )
      .arg(
        clap::Arg::new("strict")
          .long("strict")
          .action(clap::ArgAction::SetTrue)
          .help("Append the .mo extension to the output file name if it is missing."),
      )
      .arg(
        clap::Arg::new("alignment")
          .value_name("BYTES")
          .short('a')
          .long("alignment")
          .value_parser(clap::value_parser!(u32).range(1..))
          .default_value("1")
          .help("Align every string in the output on a multiple of this many bytes."),
      )
      .arg(
        clap::Arg::new("no_hash")
          .long("no-hash")
          .action(clap::ArgAction::SetTrue)
          .help("Don't include the hash table, the lookups will be slower."),
      )
      .arg(
        clap::Arg::new("endianness")
          .value_name("ORDER")
          .long("endianness")
          .value_parser(["little", "big", "native"])
          .default_value("native")
          .help("Byte order of the numbers in the output."),
      )
      .arg(
        clap::Arg::new("use_fuzzy")
          .short('f')
          .long("use-fuzzy")
          .action(clap::ArgAction::SetTrue)
          .help("Include the entries marked as fuzzy."),
      )
      .arg(
        clap::Arg::new("check")
          .short('c')
          .long("check")
          .action(clap::ArgAction::SetTrue)
          .help("Shorthand for --check-format --check-header --check-domain."),
      )
      .arg(
        clap::Arg::new("check_format")
          .long("check-format")
          .action(clap::ArgAction::SetTrue)
          .help("Verify the format strings of the translations against their msgids."),
      )
      .arg(
        clap::Arg::new("check_header")
          .long("check-header")
          .action(clap::ArgAction::SetTrue)
          .help("Verify the presence and the contents of the header entry."),
      )
      .arg(
        clap::Arg::new("check_domain")
          .long("check-domain")
          .action(clap::ArgAction::SetTrue)
          .help("Warn about `domain` directives which conflict with --output-file."),
      )
      .arg(
        clap::Arg::new("check_compatibility")
          .short('C')
          .long("check-compatibility")
          .action(clap::ArgAction::SetTrue)
          .help("Report the features which other implementations of gettext may not support."),
      )
      .arg(
        clap::Arg::new("statistics")
          .long("statistics")
          .action(clap::ArgAction::SetTrue)
          .help("Print the numbers of translated, fuzzy and untranslated messages."),
      )
      .arg(
        clap::Arg::new("force_empty")
          .long("force-empty")
          .action(clap::ArgAction::SetTrue)
          .help("Write the output files even if they would contain no messages."),
      )
      .arg(
        clap::Arg::new("max_errors")
          .value_name("COUNT")
          .long("max-errors")
          .value_parser(clap::value_parser!(usize))
          .default_value("20")
          .help("Give up on an input after this many syntax errors."),
      )
  }

  fn run(&self, global_opts: super::GlobalOpts, matches: &clap::ArgMatches) -> AnyResult<()> {
    let flag = |name: &str| matches.get_one::<bool>(name).copied().unwrap_or(false);

    let opt_inputs: Vec<PathBuf> = match matches.get_many::<PathBuf>("inputs") {
      Some(values) => values.cloned().collect(),
      None => vec![PathBuf::from(super::STDIO_PATH)],
    };
    let opt_check = flag("check");
    let opt_statistics = flag("statistics");

    let endianness = match matches.get_one::<String>("endianness") {
      Some(s) => s.parse::<Endianness>().map_err(|e| format_err!("{}", e))?,
      None => Endianness::native(),
    };
    let options = CompileOptions {
      output_file: matches.get_one::<String>("output_file").cloned(),
      strict: flag("strict"),
      use_fuzzy: flag("use_fuzzy"),
      check_format: opt_check || flag("check_format"),
      check_header: opt_check || flag("check_header"),
      check_domain: opt_check || flag("check_domain"),
      check_compatibility: flag("check_compatibility"),
      force_empty: flag("force_empty"),
      max_errors: matches.get_one::<usize>("max_errors").copied().unwrap_or(20),
      mo: MoWriterOptions {
        alignment: matches.get_one::<u32>("alignment").map_or(1, |&n| n as usize),
        hash_table: !flag("no_hash"),
        endianness,
      },
    };
    debug!("{:#?}", options);

    let mut session = CompilationSession::new(options);
    for input in &opt_inputs {
      let file_name = super::input_name(input);
      let src = super::read_input(input)?;
      let result = session.compile_source(&src, &file_name);
      // Whatever was found before a fatal error is still worth showing.
      session.diagnostics_mut().log_all();
      result.map_err(|e| super::describe_source_error(e, &file_name, &src))?;
    }

    session.write_outputs()?;

    if opt_statistics || global_opts.verbose {
      info!("{}", session.statistics());
    }

    let error_count = session.diagnostics().error_count();
    if error_count > 0 {
      return Err(AnyError::new(super::ValidationFailedError { error_count }));
    }
    Ok(())
  }
}
