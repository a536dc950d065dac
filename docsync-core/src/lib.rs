//! docsync core library: domain types, configuration and errors.
//!
//! - [`types`]: newtypes and domain structs shared by every crate
//! - [`config`]: the [`Config`] value built once at startup
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::{
    AzureGateway, Backend, Config, Credentials, FileSettings, Overrides, SelectionStrategy,
    UpdateFormat, WritePolicy,
};
pub use error::ConfigError;
pub use types::{Diff, DocName, Document, RevRange, UpdateResult};
