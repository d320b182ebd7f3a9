/// Accumulators wrap at this power of ten, so `value % 10` always matches the units added.
pub const WHEEL_MODULUS: u64 = 1_000_000_000_000_000_000;

/// Accumulated value of every digit wheel, least significant first.
///
/// A wheel keeps counting past 9, wrapping at [`WHEEL_MODULUS`]; only `value % 10` is ever shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelStore {
    values: Vec<u64>,
}

impl WheelStore {
    pub fn new(wheel_count: usize) -> Self {
        WheelStore {
            values: vec![0; wheel_count],
        }
    }

    /// Number of wheels
    pub fn wheel_count(&self) -> usize {
        self.values.len()
    }

    /// Accumulated units on wheel `index`, modulo [`WHEEL_MODULUS`]
    pub fn value(&self, index: usize) -> Option<u64> {
        self.values.get(index).copied()
    }

    /// Digit wheel `index` shows
    pub fn digit(&self, index: usize) -> Option<u8> {
        self.value(index).map(digit_of)
    }

    /// Digits from the least significant wheel upwards
    pub fn digits(&self) -> impl DoubleEndedIterator<Item = u8> + ExactSizeIterator + '_ {
        self.values.iter().map(|&value| digit_of(value))
    }

    /// Adds `amount` to a wheel and returns the digit it showed before. Out-of-range indexes are
    /// ignored.
    pub fn add(&mut self, index: usize, amount: u64) -> Option<u8> {
        let value = self.values.get_mut(index)?;
        let old_digit = digit_of(*value);
        *value = (*value % WHEEL_MODULUS + amount % WHEEL_MODULUS) % WHEEL_MODULUS;
        Some(old_digit)
    }

    /// Puts every wheel back to zero
    pub fn clear(&mut self) {
        self.values.iter_mut().for_each(|value| *value = 0);
    }
}

fn digit_of(value: u64) -> u8 {
    (value % 10) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn digit_is_value_mod_ten() {
        let mut store = WheelStore::new(3);
        assert_eq!(store.add(1, 23), Some(0));
        assert_eq!(store.value(1), Some(23));
        assert_eq!(store.digit(1), Some(3));
        assert_eq!(store.add(1, 1), Some(3));
        assert_eq!(store.digits().collect::<Vec<_>>(), vec![0, 4, 0]);
    }

    #[test]
    fn out_of_range_is_ignored() {
        let mut store = WheelStore::new(2);
        assert_eq!(store.add(2, 1), None);
        assert_eq!(store.digit(2), None);
        assert_eq!(store, WheelStore::new(2));
    }

    #[test]
    fn clear_zeroes_every_wheel() {
        let mut store = WheelStore::new(4);
        store.add(0, 7);
        store.add(3, 12);
        store.clear();
        assert_eq!(store, WheelStore::new(4));
        assert_eq!(store.wheel_count(), 4);
    }

    #[test]
    fn huge_amounts_keep_the_digit_exact() {
        let mut store = WheelStore::new(1);
        assert_eq!(store.add(0, u64::MAX), Some(0));
        assert_eq!(store.digit(0), Some(5));
        assert_eq!(store.add(0, 1), Some(5));
        assert_eq!(store.digit(0), Some(6));
        for _ in 0..9 {
            store.add(0, 1);
        }
        assert_eq!(store.digit(0), Some(5));
    }

    #[test]
    fn value_wraps_at_the_modulus() {
        let mut store = WheelStore::new(1);
        store.add(0, WHEEL_MODULUS - 1);
        store.add(0, 3);
        assert_eq!(store.value(0), Some(2));
        assert_eq!(store.digit(0), Some(2));
    }
}
