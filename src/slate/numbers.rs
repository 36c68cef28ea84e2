//! Spoken number parsing for slate calls.
//!
//! Narrators call scene and take numbers as digits ("take 3"), as words
//! ("scene twenty three"), or mixed. The parser consumes the leading numeric
//! phrase of a token run and reports how many words it used, so the caller
//! can treat the rest of the phrase as suffix letters.

/// A parsed leading number phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedNumber {
    /// The numeric value of the consumed phrase.
    pub value: u64,
    /// How many whitespace tokens were consumed, including "and".
    pub words_consumed: usize,
}

/// Value of a unit word (zero through nineteen).
fn unit_value(token: &str) -> Option<u64> {
    let value = match token {
        "zero" => 0,
        "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        "thirteen" => 13,
        "fourteen" => 14,
        "fifteen" => 15,
        "sixteen" => 16,
        "seventeen" => 17,
        "eighteen" => 18,
        "nineteen" => 19,
        _ => return None,
    };
    Some(value)
}

/// Value of a tens word (twenty through ninety).
fn tens_value(token: &str) -> Option<u64> {
    let value = match token {
        "twenty" => 20,
        "thirty" => 30,
        "forty" => 40,
        "fifty" => 50,
        "sixty" => 60,
        "seventy" => 70,
        "eighty" => 80,
        "ninety" => 90,
        _ => return None,
    };
    Some(value)
}

/// Multiplier of a scale word.
fn scale_value(token: &str) -> Option<u64> {
    match token {
        "hundred" => Some(100),
        "thousand" => Some(1000),
        _ => None,
    }
}

/// Parse the leading number phrase of `input`.
///
/// Case-insensitive; hyphens are treated as spaces ("twenty-three").
/// Consumption is greedy left-to-right and halts silently at the first
/// unrecognized token. A pure digit token terminates the phrase: its value
/// is added to whatever words accumulated before it ("twenty 3" → 23).
/// Scale words multiply the accumulator, treating an empty accumulator as 1
/// ("hundred" alone → 100). "and" is consumed without contributing.
///
/// Returns `None` only when no numeric token was recognized at all.
pub fn parse(input: &str) -> Option<ParsedNumber> {
    let normalized = input.to_lowercase().replace('-', " ");

    let mut current: u64 = 0;
    let mut consumed = 0usize;
    let mut matched_numeric = false;

    for token in normalized.split_whitespace() {
        if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
            // Digit token terminates word-number parsing
            // An unparseable digit run (absurdly long) halts like any
            // other unrecognized token
            let Ok(digits) = token.parse::<u64>() else {
                break;
            };
            current += digits;
            consumed += 1;
            matched_numeric = true;
            break;
        } else if let Some(value) = unit_value(token) {
            current += value;
            consumed += 1;
            matched_numeric = true;
        } else if let Some(value) = tens_value(token) {
            current += value;
            consumed += 1;
            matched_numeric = true;
        } else if let Some(scale) = scale_value(token) {
            current = current.max(1) * scale;
            consumed += 1;
            matched_numeric = true;
        } else if token == "and" {
            // Connective: consumed, contributes nothing, does not reset
            consumed += 1;
        } else {
            // Unrecognized token halts consumption without error
            break;
        }
    }

    if matched_numeric {
        Some(ParsedNumber {
            value: current,
            words_consumed: consumed,
        })
    } else {
        None
    }
}
