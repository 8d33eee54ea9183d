//! Constants and flag bits shared across seqmap crates

/// Hard ceiling on wrapper/factory unwrap steps when opening a source.
pub const MAX_UNWRAP_DEPTH: usize = 10;

/// Regular comparison: numbers and numeric strings numerically, otherwise bytewise.
pub const SORT_REGULAR: u32 = 0;
/// Compare values as numbers.
pub const SORT_NUMERIC: u32 = 1;
/// Compare values as strings, bytewise.
pub const SORT_STRING: u32 = 2;
/// Compare values as strings using the collation approximation.
pub const SORT_LOCALE_STRING: u32 = 5;
/// Compare values as strings in natural order ("img2" < "img10").
pub const SORT_NATURAL: u32 = 6;
/// Mask covering the comparison mode bits.
pub const SORT_MODE_MASK: u32 = 0b111;
/// Case-insensitive modifier for string and natural modes.
pub const SORT_FLAG_CASE: u32 = 1 << 3;
/// Sort by key instead of by value.
pub const SORT_BY_KEY: u32 = 1 << 8;
/// Sort in descending order.
pub const SORT_DESC: u32 = 1 << 9;

/// Default separator used when joining key paths.
pub const DEFAULT_PATH_GLUE: &str = "/";
/// Default indentation unit for tree rendering.
pub const DEFAULT_INDENT: &str = "  ";
