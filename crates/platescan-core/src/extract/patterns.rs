//! Regex patterns for identification number extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Maximal run of ASCII digits. `\d` is Unicode-aware in the regex crate,
    // so the class is spelled out.
    pub static ref DIGIT_RUN: Regex = Regex::new(r"[0-9]+").unwrap();
}
