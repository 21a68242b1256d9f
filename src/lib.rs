#![deny(missing_debug_implementations)]
#![allow(clippy::new_without_default)]

#[macro_use]
pub mod macros;
#[macro_use]
pub mod logging;

pub mod builder;
pub mod catalog;
pub mod cli;
pub mod compile;
pub mod diagnostics;
pub mod format;
pub mod gettext_po;
pub mod impl_prelude;
pub mod mo;
pub mod utils;

pub const CRATE_TITLE: &str = "PoCC";
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
pub const CRATE_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const CRATE_BIN_NAME: &str = "pocc";
