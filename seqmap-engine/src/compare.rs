//! Value comparison modes used by the sort engine

use seqmap_core::constants::{
    SORT_BY_KEY, SORT_DESC, SORT_FLAG_CASE, SORT_LOCALE_STRING, SORT_MODE_MASK, SORT_NATURAL,
    SORT_NUMERIC, SORT_REGULAR, SORT_STRING,
};
use seqmap_core::{Assoc, Value};
use std::cmp::Ordering;
use std::ops::BitOr;

/// Comparison mode selected by the low flag bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Numbers and numeric strings numerically, everything else as strings
    #[default]
    Regular,
    /// Both sides as numbers
    Numeric,
    /// Both sides as strings, bytewise
    String,
    /// Both sides as strings, case-folded first
    LocaleString,
    /// Digit runs compared by magnitude
    Natural,
}

/// Sort flag word: a mode plus modifier bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortFlags(u32);

impl SortFlags {
    /// Regular comparison, ascending, by value
    pub const REGULAR: SortFlags = SortFlags(SORT_REGULAR);
    /// Numeric comparison
    pub const NUMERIC: SortFlags = SortFlags(SORT_NUMERIC);
    /// Bytewise string comparison
    pub const STRING: SortFlags = SortFlags(SORT_STRING);
    /// Case-folded string comparison
    pub const LOCALE_STRING: SortFlags = SortFlags(SORT_LOCALE_STRING);
    /// Natural order comparison
    pub const NATURAL: SortFlags = SortFlags(SORT_NATURAL);
    /// Case-insensitive modifier
    pub const CASE_INSENSITIVE: SortFlags = SortFlags(SORT_FLAG_CASE);
    /// Order by key instead of value
    pub const BY_KEY: SortFlags = SortFlags(SORT_BY_KEY);
    /// Descending order
    pub const DESC: SortFlags = SortFlags(SORT_DESC);

    /// Flags from a raw bit word
    pub const fn from_bits(bits: u32) -> Self {
        SortFlags(bits)
    }

    /// Raw bit word
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether every bit of `other` is set
    pub const fn contains(self, other: SortFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Comparison mode; unknown mode values fall back to regular
    pub fn mode(self) -> SortMode {
        match self.0 & SORT_MODE_MASK {
            SORT_NUMERIC => SortMode::Numeric,
            SORT_STRING => SortMode::String,
            SORT_LOCALE_STRING => SortMode::LocaleString,
            SORT_NATURAL => SortMode::Natural,
            _ => SortMode::Regular,
        }
    }

    /// Whether the case-insensitive bit is set
    pub fn case_insensitive(self) -> bool {
        self.contains(Self::CASE_INSENSITIVE)
    }

    /// Whether elements are ordered by key
    pub fn by_key(self) -> bool {
        self.contains(Self::BY_KEY)
    }

    /// Whether the order is descending
    pub fn descending(self) -> bool {
        self.contains(Self::DESC)
    }

    /// Same flags with the direction and target bits cleared
    pub fn comparison_only(self) -> SortFlags {
        SortFlags(self.0 & !(SORT_BY_KEY | SORT_DESC))
    }
}

impl BitOr for SortFlags {
    type Output = SortFlags;

    fn bitor(self, rhs: SortFlags) -> SortFlags {
        SortFlags(self.0 | rhs.0)
    }
}

/// Compare two values under `flags` (direction and target bits ignored)
pub fn compare_values(a: &Value, b: &Value, flags: SortFlags) -> Ordering {
    let fold = flags.case_insensitive();
    match flags.mode() {
        SortMode::Regular => regular_cmp(a, b),
        SortMode::Numeric => float_cmp(a.to_number(), b.to_number()),
        SortMode::String => string_cmp(&a.to_display_string(), &b.to_display_string(), fold),
        SortMode::LocaleString => locale_cmp(&a.to_display_string(), &b.to_display_string()),
        SortMode::Natural => {
            let (a, b) = (a.to_display_string(), b.to_display_string());
            if fold {
                natural_cmp(&a.to_lowercase(), &b.to_lowercase())
            } else {
                natural_cmp(&a, &b)
            }
        }
    }
}

/// Total preorder on floats: NaN sorts before every number and ties with NaN
fn float_cmp(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

fn string_cmp(a: &str, b: &str, fold: bool) -> Ordering {
    if fold {
        a.to_lowercase().cmp(&b.to_lowercase())
    } else {
        a.cmp(b)
    }
}

/// Case-folded comparison; the original text breaks ties so the order stays total
fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Loose comparison across value kinds
///
/// Values fall into classes ordered as: null and booleans (by truthiness),
/// numbers together with numeric strings (by exact numeric value),
/// non-numeric strings (bytewise), sequences (by length, then entry by
/// entry), objects (by type name). Ordering the classes first keeps the
/// comparison a total preorder on any mix of kinds.
pub fn regular_cmp(a: &Value, b: &Value) -> Ordering {
    let (ca, cb) = (Class::of(a), Class::of(b));
    match (ca, cb) {
        (Class::Falsy, Class::Falsy) | (Class::Truthy, Class::Truthy) => Ordering::Equal,
        (Class::Number(x), Class::Number(y)) => number_cmp(x, y),
        (Class::Text(x), Class::Text(y)) => x.cmp(y),
        (Class::Seq(x), Class::Seq(y)) => x.len().cmp(&y.len()).then_with(|| {
            x.values()
                .zip(y.values())
                .map(|(x, y)| regular_cmp(x, y))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        }),
        (Class::Object(x), Class::Object(y)) => x.cmp(y),
        _ => ca.rank().cmp(&cb.rank()),
    }
}

/// Comparison class of a value under the regular mode
#[derive(Clone, Copy)]
enum Class<'a> {
    Falsy,
    Truthy,
    Number(Number),
    Text(&'a str),
    Seq(&'a Assoc),
    Object(&'a str),
}

impl<'a> Class<'a> {
    fn of(value: &'a Value) -> Self {
        match value {
            Value::Null | Value::Bool(false) => Class::Falsy,
            Value::Bool(true) => Class::Truthy,
            Value::Int(n) => Class::Number(Number::Int(*n)),
            Value::Float(f) => Class::Number(Number::Float(*f)),
            Value::Str(s) => match s.trim().parse::<i64>() {
                Ok(n) => Class::Number(Number::Int(n)),
                Err(_) => match Value::numeric_str(s) {
                    Some(f) => Class::Number(Number::Float(f)),
                    None => Class::Text(s),
                },
            },
            Value::Seq(seq) => Class::Seq(seq),
            Value::Object(object) => Class::Object(object.type_name()),
        }
    }

    fn rank(self) -> u8 {
        match self {
            Class::Falsy => 0,
            Class::Truthy => 1,
            Class::Number(_) => 2,
            Class::Text(_) => 3,
            Class::Seq(_) => 4,
            Class::Object(_) => 5,
        }
    }
}

#[derive(Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

/// Exact comparison between integers and floats
fn number_cmp(a: Number, b: Number) -> Ordering {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => x.cmp(&y),
        (Number::Float(x), Number::Float(y)) => float_cmp(x, y),
        (Number::Int(x), Number::Float(y)) => int_float_cmp(x, y),
        (Number::Float(x), Number::Int(y)) => int_float_cmp(y, x).reverse(),
    }
}

fn int_float_cmp(int: i64, float: f64) -> Ordering {
    // 2^63 and beyond is outside i64
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if float.is_nan() {
        return Ordering::Greater;
    }
    if float >= LIMIT {
        return Ordering::Less;
    }
    if float < -LIMIT {
        return Ordering::Greater;
    }
    let floor = float.floor();
    // floor is integral and within [-2^63, 2^63), so the cast is exact
    match i128::from(int).cmp(&(floor as i128)) {
        Ordering::Equal if float > floor => Ordering::Less,
        ord => ord,
    }
}

/// Natural order: runs of digits compare by magnitude, other characters one by one
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        if a[i].is_ascii_digit() && b[j].is_ascii_digit() {
            let (start_a, start_b) = (i, j);
            while i < a.len() && a[i].is_ascii_digit() {
                i += 1;
            }
            while j < b.len() && b[j].is_ascii_digit() {
                j += 1;
            }
            let run_a = trim_zeros(&a[start_a..i]);
            let run_b = trim_zeros(&b[start_b..j]);
            let ord = run_a.len().cmp(&run_b.len()).then_with(|| run_a.cmp(run_b));
            if ord.is_ne() {
                return ord;
            }
        } else {
            let ord = a[i].cmp(&b[j]);
            if ord.is_ne() {
                return ord;
            }
            i += 1;
            j += 1;
        }
    }

    (a.len() - i).cmp(&(b.len() - j))
}

fn trim_zeros(digits: &[u8]) -> &[u8] {
    let start = digits.iter().position(|&d| d != b'0').unwrap_or(digits.len());
    &digits[start..]
}
