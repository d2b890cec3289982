//! Dispatch sheets: merge e-commerce order exports, group the orders by
//! delivery region and render a right-to-left PDF for drivers.
//!
//! The pipeline is linear: [`loader`] reads workbooks and CSV files,
//! [`normalize`] merges and repairs the rows and classifies each one with
//! [`regions`], [`reports`] orders and groups them, and [`render`] produces
//! the document.

pub mod cli;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod output;
pub mod regions;
pub mod render;
pub mod reports;
pub mod types;
pub mod util;

pub use error::{DispatchError, Result};
