pub mod error;
pub mod hash;
pub mod images;
pub mod pipeline;
pub mod price;

pub use error::IngestError;
pub use hash::content_hash;
pub use images::{image_path, store_images, FsImageStore, ImageFetcher, ImageStore};
pub use pipeline::{finish_feed, ingest_item, IngestOutcome};
pub use price::parse_price;
