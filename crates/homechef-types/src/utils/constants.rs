//! Display placeholders for incomplete order records.

/// Shown when an address or delivery date is missing.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Shown when an order carries no customer name.
pub const UNKNOWN_CUSTOMER: &str = "Unknown Customer";

/// Group key for orders whose address has no city.
pub const UNKNOWN_AREA: &str = "Unknown area";
