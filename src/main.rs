fn main() { std::process::exit(pocc::cli::main()); }
