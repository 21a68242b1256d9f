pub use anyhow::{
  bail, ensure, format_err, Context as ResultContextExt, Error as AnyError, Result as AnyResult,
};
pub use log::{debug, error, info, log_enabled, trace, warn};
pub use std::borrow::Cow;
pub use std::error::Error as StdError;
