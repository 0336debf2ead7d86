use proptest::prelude::*;
use study_planner::numerals::{
    NumeralError, from_hebrew_numeral, hebrew_numeral_or_decimal, to_hebrew_numeral,
};

#[test]
fn pinned_numerals() {
    assert_eq!(to_hebrew_numeral(15, true).unwrap(), "ט״ו");
    assert_eq!(to_hebrew_numeral(16, true).unwrap(), "ט״ז");
    assert_eq!(to_hebrew_numeral(1000, true).unwrap(), "א׳");
    assert_eq!(to_hebrew_numeral(2222, true).unwrap(), "ב׳רכ״ב");
    assert_eq!(to_hebrew_numeral(5784, true).unwrap(), "ה׳תשפ״ד");
    assert_eq!(to_hebrew_numeral(5001, true).unwrap(), "ה׳א");
    assert_eq!(to_hebrew_numeral(1, true).unwrap(), "א");
}

#[test]
fn unpunctuated_numerals_have_no_marks() {
    assert_eq!(to_hebrew_numeral(15, false).unwrap(), "טו");
    assert_eq!(to_hebrew_numeral(50, false).unwrap(), "נ");
    assert_eq!(to_hebrew_numeral(999, false).unwrap(), "תתקצט");
    assert_eq!(to_hebrew_numeral(5784, false).unwrap(), "ה׳תשפד");
}

#[test]
fn out_of_range_is_an_error_with_decimal_fallback() {
    assert_eq!(to_hebrew_numeral(0, true), Err(NumeralError::OutOfRange(0)));
    assert_eq!(to_hebrew_numeral(10_000, true), Err(NumeralError::OutOfRange(10_000)));
    assert_eq!(hebrew_numeral_or_decimal(10_000, true), "10000");
    assert_eq!(hebrew_numeral_or_decimal(12, true), "י״ב");
}

#[test]
fn parsing_is_permissive() {
    assert_eq!(from_hebrew_numeral("תשפ\"ד"), 784);
    assert_eq!(from_hebrew_numeral("ך"), 20);
    assert_eq!(from_hebrew_numeral("abc"), 0);
    // Ill-formed order still sums.
    assert_eq!(from_hebrew_numeral("אי"), 11);
    // Only a leading letter takes the thousands geresh.
    assert_eq!(from_hebrew_numeral("ה׳תשפ״ה"), 5785);
    assert_eq!(from_hebrew_numeral("ב׳ג׳"), 2003);
}

proptest! {
    #[test]
    fn prop_round_trip_without_punctuation(n in 1u32..=9999) {
        prop_assert_eq!(from_hebrew_numeral(&to_hebrew_numeral(n, false).unwrap()), n);
    }

    #[test]
    fn prop_round_trip_with_punctuation(n in 1u32..=9999) {
        prop_assert_eq!(from_hebrew_numeral(&to_hebrew_numeral(n, true).unwrap()), n);
    }
}
