//! Command handlers, called from `main` after config and pool are
//! established.

mod ingest;
mod mappings;
mod purge;
mod seed;

pub(crate) use ingest::run_ingest;
pub(crate) use mappings::{run_link_vendor, run_mappings};
pub(crate) use purge::run_purge;
pub(crate) use seed::run_seed;
