// src/core/text.rs
//! Input validation and letter helpers shared by every engine.

/// Keeps ASCII letters only, uppercased.
pub fn normalize_text(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Rejects empty text and text where fewer than half the characters are ASCII letters.
pub fn is_valid_input(text: &str) -> bool {
    let total = text.chars().count();
    if total == 0 {
        return false;
    }
    let letters = text.chars().filter(char::is_ascii_alphabetic).count();
    letters * 2 >= total
}

/// Index 0..26 of an ASCII letter, either case.
#[inline]
pub fn letter_index(c: char) -> Option<usize> {
    if c.is_ascii_alphabetic() {
        Some((c.to_ascii_uppercase() as u8 - b'A') as usize)
    } else {
        None
    }
}

/// Rotates a letter forward by `shift` positions, preserving case.
/// Anything that is not an ASCII letter is returned unchanged.
#[inline]
pub fn shift_letter(c: char, shift: u8) -> char {
    let shift = shift % 26;
    if c.is_ascii_uppercase() {
        (b'A' + (c as u8 - b'A' + shift) % 26) as char
    } else if c.is_ascii_lowercase() {
        (b'a' + (c as u8 - b'a' + shift) % 26) as char
    } else {
        c
    }
}
