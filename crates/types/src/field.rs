//! Fixed-point field scalar.

use std::fmt;

use borsh::{BorshDeserialize, BorshSerialize};

use crate::constants::FIELD_SCALE;

/// A signed fixed-point scalar counted in units of `10^-9`.
///
/// Encodes on the wire as a 32-byte big-endian two's-complement word.
#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, BorshDeserialize,
    BorshSerialize,
)]
pub struct Field(i128);

impl Field {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Wraps a raw unit count.
    pub const fn from_raw(raw: i128) -> Self {
        Self(raw)
    }

    /// Scales a whole number into fixed-point units.
    pub const fn from_int(value: i64) -> Self {
        Self(value as i128 * FIELD_SCALE)
    }

    /// Rounds a decimal to the nearest fixed-point unit.
    pub fn from_decimal(value: f64) -> Self {
        Self((value * FIELD_SCALE as f64).round() as i128)
    }

    /// Returns the raw unit count.
    pub const fn raw(self) -> i128 {
        self.0
    }

    /// Converts back to a decimal, losing precision past `f64`.
    pub fn to_decimal(self) -> f64 {
        self.0 as f64 / FIELD_SCALE as f64
    }

    /// Returns `true` if zero.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Subtraction modulo `2^128`.
    pub const fn wrapping_sub(self, rhs: Self) -> Self {
        Self(self.0.wrapping_sub(rhs.0))
    }

    /// Encodes into a sign-extended 32-byte big-endian word.
    pub fn to_word(self) -> [u8; 32] {
        let fill = if self.0 < 0 { 0xff } else { 0x00 };
        let mut word = [fill; 32];
        word[16..].copy_from_slice(&self.0.to_be_bytes());
        word
    }

    /// Decodes a sign-extended word, returning `None` if the upper half is not
    /// a sign extension of the lower half.
    pub fn from_word(word: &[u8; 32]) -> Option<Self> {
        let mut low = [0; 16];
        low.copy_from_slice(&word[16..]);
        let value = i128::from_be_bytes(low);
        let fill = if value < 0 { 0xff } else { 0x00 };
        word[..16]
            .iter()
            .all(|b| *b == fill)
            .then_some(Self(value))
    }
}

impl From<i128> for Field {
    fn from(raw: i128) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = FIELD_SCALE as u128;
        write!(f, "{sign}{}.{:09}", abs / scale, abs % scale)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_decimal_scaling() {
        assert_eq!(Field::from_decimal(0.1).raw(), 100_000_000);
        assert_eq!(Field::from_decimal(0.5).raw(), 500_000_000);
        assert_eq!(Field::from_int(42).raw(), 42 * FIELD_SCALE);
        assert_eq!(Field::from_decimal(-1.25).to_string(), "-1.250000000");
    }

    #[test]
    fn test_negative_word_is_sign_extended() {
        let word = Field::from_raw(-1).to_word();
        assert_eq!(word, [0xff; 32]);
        assert_eq!(Field::from_word(&word), Some(Field::from_raw(-1)));
    }

    #[test]
    fn test_rejects_non_canonical_word() {
        let mut word = Field::from_raw(7).to_word();
        word[0] = 1;
        assert_eq!(Field::from_word(&word), None);

        let mut word = Field::from_raw(-7).to_word();
        word[3] = 0;
        assert_eq!(Field::from_word(&word), None);
    }

    proptest! {
        #[test]
        fn word_decoding_inverts_encoding(raw in any::<i128>()) {
            let field = Field::from_raw(raw);
            prop_assert_eq!(Field::from_word(&field.to_word()), Some(field));
        }
    }
}
