//! Fragment scanner: finds the identification number in OCR output.
//!
//! Fragments are examined in the order the OCR backend returned them. Each
//! fragment has its whitespace removed, and the compacted text is searched
//! for the leftmost maximal run of ASCII digits whose length is exactly the
//! configured digit count. The first fragment that has such a run decides
//! the result. Digits from different fragments are never combined, and
//! punctuation or letters inside a fragment keep digit groups apart.
//!
//! Digits separated only by ASCII whitespace inside one fragment do merge. On a
//! nameplate that mostly reflects a printed number split into groups, but it
//! can also join two unrelated numbers sitting on adjacent lines of the same
//! OCR block.

use serde::Serialize;
use tracing::{debug, trace};

use crate::models::config::ScannerConfig;
use crate::ocr::TextFragment;

use super::patterns::DIGIT_RUN;
use super::{Category, ExtractionMatch, FieldExtractor};

/// An identification number and its category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ExtractionResult {
    number: String,
    category: Category,
}

impl ExtractionResult {
    pub(crate) fn new(number: impl Into<String>, category: Category) -> Self {
        Self {
            number: number.into(),
            category,
        }
    }

    /// The exact digit string.
    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn category(&self) -> Category {
        self.category
    }
}

/// ASCII whitespace: space, tab, newline, vertical tab, form feed, carriage return.
fn is_separator_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

/// Remove ASCII whitespace, leaving everything else in place.
///
/// Unicode spaces such as U+00A0 or U+3000 are kept, so they separate digit
/// groups the same way punctuation does.
pub fn compact(text: &str) -> String {
    text.chars().filter(|&c| !is_separator_space(c)).collect()
}

fn clean_runs(text: &str, digit_count: usize) -> impl Iterator<Item = regex::Match<'_>> {
    DIGIT_RUN
        .find_iter(text)
        .filter(move |run| run.len() == digit_count)
}

/// Leftmost maximal digit run of exactly `digit_count` digits.
///
/// Longer and shorter runs are skipped whole, never cut down to size.
pub fn find_clean_run(text: &str, digit_count: usize) -> Option<&str> {
    clean_runs(text, digit_count).next().map(|run| run.as_str())
}

/// Identification number extractor for a single piece of text.
#[derive(Debug, Clone, Default)]
pub struct IdNumberExtractor {
    config: ScannerConfig,
}

impl IdNumberExtractor {
    /// Create an extractor for the given policy.
    pub fn new(config: ScannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    fn to_match(&self, run: regex::Match<'_>) -> ExtractionMatch<ExtractionResult> {
        let number = run.as_str();
        let category = Category::classify(
            number,
            self.config.classify_position,
            self.config.classify_trigger,
        );
        ExtractionMatch::new(ExtractionResult::new(number, category), number)
            .with_position(run.start(), run.end())
    }
}

impl FieldExtractor for IdNumberExtractor {
    type Output = ExtractionMatch<ExtractionResult>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let compacted = compact(text);
        clean_runs(&compacted, self.config.digit_count)
            .next()
            .map(|run| self.to_match(run))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let compacted = compact(text);
        clean_runs(&compacted, self.config.digit_count)
            .map(|run| self.to_match(run))
            .collect()
    }
}

/// Stateless scanner over the ordered fragments of one image.
#[derive(Debug, Clone, Default)]
pub struct FragmentScanner {
    extractor: IdNumberExtractor,
}

impl FragmentScanner {
    /// Create a scanner for the given policy.
    pub fn new(config: ScannerConfig) -> Self {
        Self {
            extractor: IdNumberExtractor::new(config),
        }
    }

    pub fn config(&self) -> &ScannerConfig {
        self.extractor.config()
    }

    /// Find the first fragment holding a clean run, with its location.
    pub fn locate(&self, fragments: &[TextFragment]) -> Option<ExtractionMatch<ExtractionResult>> {
        fragments.iter().enumerate().find_map(|(index, fragment)| {
            self.extractor
                .extract(&fragment.text)
                .map(|found| found.with_fragment_index(index))
        })
    }

    /// Scan fragments in order and return the first identification number.
    pub fn scan(&self, fragments: &[TextFragment]) -> Option<ExtractionResult> {
        match self.locate(fragments) {
            Some(found) => {
                debug!(
                    "Matched {} number in fragment {} of {}",
                    found.value.category(),
                    found.fragment_index.unwrap_or_default(),
                    fragments.len()
                );
                Some(found.value)
            }
            None => {
                trace!(
                    "No {}-digit number in {} fragments",
                    self.config().digit_count,
                    fragments.len()
                );
                None
            }
        }
    }
}

/// Scan fragments with the given policy.
pub fn scan_fragments(
    fragments: &[TextFragment],
    config: &ScannerConfig,
) -> Option<ExtractionResult> {
    FragmentScanner::new(config.clone()).scan(fragments)
}
