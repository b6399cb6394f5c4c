//! Report generation port trait.

use crate::domain::error::ScreenerError;
use crate::domain::screen::{ScreenParams, ScreenResult};
use std::path::Path;

/// Port for writing screen reports.
pub trait ReportPort {
    fn write(
        &self,
        result: &ScreenResult,
        params: &ScreenParams,
        output_path: &Path,
    ) -> Result<(), ScreenerError>;
}
