pub mod app_config;
pub mod config;
pub mod item;
pub mod sources;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use item::{Gender, ItemFields, ScrapedItem};
pub use sources::{load_alias_seeds, load_vendors, slugify, AliasSeed, AliasSeedFile, VendorEntry, VendorsFile};
