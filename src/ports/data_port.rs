//! Market data port trait.
//!
//! The data source supplies both panels at once. Implementations may cache,
//! so the returned panels are shared and must be treated as read-only.

use crate::domain::error::ScreenerError;
use crate::domain::panel::MarketData;
use std::sync::Arc;

pub trait MarketDataPort {
    fn load(&self) -> Result<Arc<MarketData>, ScreenerError>;

    /// Short human-readable description of where the panels come from.
    fn describe(&self) -> String;
}
