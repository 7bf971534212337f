//! Site importer: reconciles validated import records into the catalog
//! and hides rejected ones.

pub mod error;
pub mod import;
pub mod reconcile;
pub mod worker;

pub use error::ImportError;
pub use import::{import_record, offer_availability};
pub use reconcile::{product_slug, reconcile, ReconcileTarget};
pub use worker::run_import_worker;
