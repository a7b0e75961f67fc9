mod diagnostic;
mod error;
mod error_kind;
mod utils;

pub use diagnostic::{BuildError, Diagnostic};
pub use error::*;
pub use error_kind::*;
pub use utils::{format_quoted_strings, PathExt, CWD};

pub type Result<T> = std::result::Result<T, Error>;
pub use anyhow;
pub use anyhow::format_err;
