// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

const INFINITY_SPELLINGS: [&str; 3] = ["Infinity", "+Infinity", "-Infinity"];

/// Whether `input` is acceptable content for a numeric cell.
///
/// Surrounding whitespace is ignored and blank text reads as zero. Accepted
/// forms are signed decimals with optional fraction and exponent, the exact
/// `Infinity` spellings, and unsigned `0x`/`0b`/`0o` integer literals.
/// `NaN`, `inf` and other `f64::from_str` extras are rejected.
pub fn is_numeric_text(input: &str) -> bool {
    let trimmed = input.trim();
    if trimmed.is_empty() || INFINITY_SPELLINGS.contains(&trimmed) {
        return true;
    }
    if let Some((radix, digits)) = split_radix_prefix(trimmed) {
        return !digits.is_empty() && digits.chars().all(|ch| ch.is_digit(radix));
    }
    if !trimmed
        .chars()
        .all(|ch| ch.is_ascii_digit() || matches!(ch, '+' | '-' | '.' | 'e' | 'E'))
    {
        return false;
    }
    trimmed.parse::<f64>().is_ok()
}

fn split_radix_prefix(input: &str) -> Option<(u32, &str)> {
    let prefix = input.get(..2)?;
    let radix = match prefix {
        "0x" | "0X" => 16,
        "0b" | "0B" => 2,
        "0o" | "0O" => 8,
        _ => return None,
    };
    Some((radix, &input[2..]))
}

/// Keypress filter for numeric cells: only decimal digits get through.
pub fn accepts_numeric_keypress(ch: char) -> bool {
    ch.is_ascii_digit()
}
