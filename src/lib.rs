#[macro_use]
extern crate serde_derive;

pub mod app;
pub mod column;
pub mod config;
pub mod db;
pub mod error;
pub mod normalize;
pub mod shell;
pub mod sheet;
pub mod statement;
pub mod store;

pub use app::{App, ImportReport};
pub use column::{Column, Schema, TypePrompt, ValueKind};
pub use error::{Error, MissingSentinel, Result};
