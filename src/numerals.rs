use std::fmt;

pub const GERESH: char = '\u{05F3}';
pub const GERSHAYIM: char = '\u{05F4}';

const ONES: [char; 9] = ['א', 'ב', 'ג', 'ד', 'ה', 'ו', 'ז', 'ח', 'ט'];
const TENS: [char; 9] = ['י', 'כ', 'ל', 'מ', 'נ', 'ס', 'ע', 'פ', 'צ'];
const HUNDREDS: [char; 4] = ['ק', 'ר', 'ש', 'ת'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumeralError {
    OutOfRange(u32),
}

impl fmt::Display for NumeralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumeralError::OutOfRange(n) => {
                write!(f, "{n} cannot be written as a Hebrew numeral (valid range 1-9999)")
            }
        }
    }
}

impl std::error::Error for NumeralError {}

/// Convert `n` (1..=9999) to Hebrew letters.
///
/// Thousands are written as a single letter followed by a geresh. The tens and
/// units of the remainder use טו / טז for 15 and 16. With `punctuate`, a
/// gershayim goes before the last letter of the sub-thousand part when that
/// part has at least two letters, so it never lands next to the thousands
/// geresh.
pub fn to_hebrew_numeral(n: u32, punctuate: bool) -> Result<String, NumeralError> {
    if !(1..=9999).contains(&n) {
        return Err(NumeralError::OutOfRange(n));
    }

    let mut out = String::new();
    let thousands = n / 1000;
    if thousands > 0 {
        out.push(ONES[(thousands - 1) as usize]);
        out.push(GERESH);
    }

    let mut letters = remainder_letters(n % 1000);
    if punctuate && letters.len() > 1 {
        letters.insert(letters.len() - 1, GERSHAYIM);
    }
    out.extend(letters);
    Ok(out)
}

/// Fallback policy used for display labels: numbers outside the Hebrew range
/// are rendered in decimal instead of failing.
pub fn hebrew_numeral_or_decimal(n: u32, punctuate: bool) -> String {
    to_hebrew_numeral(n, punctuate).unwrap_or_else(|_| n.to_string())
}

/// Sum the letter values of `s`.
///
/// A leading letter followed by a geresh counts in thousands, as written by
/// [`to_hebrew_numeral`]. Other geresh/gershayim marks (and their ASCII
/// stand-ins) are ignored, final forms count like their regular letters, and
/// anything unrecognised adds nothing. No check is made that the letters form
/// a well-ordered numeral.
pub fn from_hebrew_numeral(s: &str) -> u32 {
    let mut chars = s.trim().chars().peekable();
    let mut total = 0;
    let mut leading = true;
    while let Some(c) = chars.next() {
        let value = letter_value(c);
        if leading && value > 0 && chars.peek() == Some(&GERESH) {
            chars.next();
            total += value * 1000;
        } else {
            total += value;
        }
        if value > 0 {
            leading = false;
        }
    }
    total
}

pub fn letter_value(c: char) -> u32 {
    match c {
        'א' => 1,
        'ב' => 2,
        'ג' => 3,
        'ד' => 4,
        'ה' => 5,
        'ו' => 6,
        'ז' => 7,
        'ח' => 8,
        'ט' => 9,
        'י' => 10,
        'כ' | 'ך' => 20,
        'ל' => 30,
        'מ' | 'ם' => 40,
        'נ' | 'ן' => 50,
        'ס' => 60,
        'ע' => 70,
        'פ' | 'ף' => 80,
        'צ' | 'ץ' => 90,
        'ק' => 100,
        'ר' => 200,
        'ש' => 300,
        'ת' => 400,
        _ => 0,
    }
}

fn remainder_letters(r: u32) -> Vec<char> {
    let mut letters = Vec::new();

    let hundreds = r / 100;
    match hundreds {
        0 => {}
        1..=4 => letters.push(HUNDREDS[(hundreds - 1) as usize]),
        5..=8 => {
            letters.push('ת');
            letters.push(HUNDREDS[(hundreds - 5) as usize]);
        }
        _ => letters.extend(['ת', 'ת', 'ק']),
    }

    match r % 100 {
        15 => letters.extend(['ט', 'ו']),
        16 => letters.extend(['ט', 'ז']),
        tu => {
            if tu >= 10 {
                letters.push(TENS[(tu / 10 - 1) as usize]);
            }
            if tu % 10 > 0 {
                letters.push(ONES[(tu % 10 - 1) as usize]);
            }
        }
    }
    letters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remainder_letters_handles_hundreds_above_four_hundred() {
        assert_eq!(remainder_letters(500).into_iter().collect::<String>(), "תק");
        assert_eq!(remainder_letters(800).into_iter().collect::<String>(), "תת");
        assert_eq!(remainder_letters(900).into_iter().collect::<String>(), "תתק");
        assert!(remainder_letters(0).is_empty());
    }

    #[test]
    fn remainder_letters_avoids_divine_name_inside_hundreds() {
        assert_eq!(remainder_letters(115).into_iter().collect::<String>(), "קטו");
        assert_eq!(remainder_letters(716).into_iter().collect::<String>(), "תשטז");
    }
}
