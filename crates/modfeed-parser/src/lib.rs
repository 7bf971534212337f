pub mod aliases;
pub mod context;
pub mod error;
pub mod modules;
pub mod validate;
pub mod worker;

pub use aliases::{AliasSet, AliasTable};
pub use context::ParseContext;
pub use error::ParseError;
pub use modules::{pipeline, run_modules, ParseModule};
pub use validate::validate;
pub use worker::{parse_record, run_parse_worker};
