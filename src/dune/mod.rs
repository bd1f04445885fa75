pub mod client;

pub use client::{DuneClient, DuneError};
