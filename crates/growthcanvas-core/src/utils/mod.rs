//! Utility functions for formatting numbers in tables.

pub mod format;

pub use format::{format_count, format_currency, format_percent, truncate_string};
