//! Identification number extraction from OCR fragments.

pub mod category;
pub mod patterns;
pub mod scanner;

pub use category::Category;
pub use scanner::{
    compact, find_clean_run, scan_fragments, ExtractionResult, FragmentScanner, IdNumberExtractor,
};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// An extracted value with where it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Byte range in the whitespace-compacted text.
    pub position: Option<(usize, usize)>,
    /// Index of the fragment the value came from, when scanning fragments.
    pub fragment_index: Option<usize>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            fragment_index: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }

    pub fn with_fragment_index(mut self, index: usize) -> Self {
        self.fragment_index = Some(index);
        self
    }
}
