//! Turns wheel digits into the text shown on the machine's total readout.

use crate::state::WheelStore;

/// Separators and grouping rule for formatted numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locale {
    pub decimal_separator: char,
    pub group_separator: char,
    /// Integers shorter than this are left ungrouped
    pub min_grouping_digits: usize,
}

impl Locale {
    /// Spanish: `12.345,678`, with four digit integers left as `1234`
    pub fn es_es() -> Self {
        Locale {
            decimal_separator: ',',
            group_separator: '.',
            min_grouping_digits: 5,
        }
    }

    /// US English: `1,234.567`
    pub fn en_us() -> Self {
        Locale {
            decimal_separator: '.',
            group_separator: ',',
            min_grouping_digits: 4,
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().replace('_', "-").as_str() {
            "es" | "es-es" => Some(Self::es_es()),
            "en" | "en-us" => Some(Self::en_us()),
            _ => None,
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::es_es()
    }
}

/// Inserts the group separator every three digits from the right.
pub fn group_integer(digits: &str, locale: &Locale) -> String {
    if digits.len() < locale.min_grouping_digits {
        return digits.to_string();
    }
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (position, digit) in digits.chars().enumerate() {
        if position > 0 && (digits.len() - position) % 3 == 0 {
            grouped.push(locale.group_separator);
        }
        grouped.push(digit);
    }
    grouped
}

fn digit_char(digit: u8) -> char {
    char::from(b'0' + digit)
}

/// Formats the machine's total. Wheels at or above `split_index` form the integer part, the rest
/// form a fractional part that always shows all of its digits.
pub fn format_total(store: &WheelStore, split_index: usize, locale: &Locale) -> String {
    let digits: Vec<u8> = store.digits().collect();
    let split = split_index.min(digits.len());

    let integer: String = digits[split..].iter().rev().copied().map(digit_char).collect();
    let integer = match integer.trim_start_matches('0') {
        "" => "0",
        trimmed => trimmed,
    };
    let grouped = group_integer(integer, locale);
    if split == 0 {
        return grouped;
    }

    let fraction: String = digits[..split].iter().rev().copied().map(digit_char).collect();
    format!("{grouped}{}{fraction}", locale.decimal_separator)
}

/// Total expressed in units of the least significant wheel
pub fn total_units(store: &WheelStore) -> u128 {
    store
        .digits()
        .rev()
        .fold(0u128, |total, digit| total * 10 + u128::from(digit))
}

/// Label for the button that adds one unit to wheel `index`, e.g. `+0,01` or `+100`.
pub fn place_label(index: usize, split_index: usize, locale: &Locale) -> String {
    if index >= split_index {
        let unit = format!("1{}", "0".repeat(index - split_index));
        format!("+{}", group_integer(&unit, locale))
    } else {
        let leading_zeros = split_index - index - 1;
        format!(
            "+0{}{}1",
            locale.decimal_separator,
            "0".repeat(leading_zeros)
        )
    }
}
