//! Time handling for catalog timestamps.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::CuratorError;

/// Timestamp format used by the catalog's `startTimeFromAscendingNode`
/// property: ISO 8601 with fractional seconds and a literal `Z`.
const ACQUISITION_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Parse a catalog acquisition timestamp into its calendar date.
pub fn parse_acquisition_date(s: &str) -> Result<NaiveDate, CuratorError> {
    NaiveDateTime::parse_from_str(s, ACQUISITION_FORMAT)
        .map(|dt| dt.date())
        .map_err(|_| CuratorError::InvalidTimestamp(s.to_string()))
}
