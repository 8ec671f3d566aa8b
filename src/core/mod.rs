//! Core conversion logic: price catalog, calculator and selector state

pub mod catalog;
pub mod config;
pub mod convert;
pub mod form;
pub mod log;
pub mod price;
pub mod selector;
pub mod session;
pub mod settle;

// Re-export main types for cleaner imports
pub use catalog::PriceCatalog;
pub use convert::{ConversionResult, convert};
pub use price::{PriceFeed, PriceObservation};
