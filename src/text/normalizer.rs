use crate::text::markup::visible_text;
use crate::text::morphology::Morphology;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Reduces text to lemma occurrence counts
///
/// Shared by the indexing pipeline and the search engine so that document
/// and query vocabularies line up.
#[derive(Clone)]
pub struct Lemmatizer {
    morphology: Arc<dyn Morphology>,
}

impl Lemmatizer {
    /// Creates a lemmatizer over the given analyzer
    pub fn new(morphology: Arc<dyn Morphology>) -> Self {
        Self { morphology }
    }

    /// Splits text into lowercase letter-only tokens
    pub fn tokens(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphabetic())
            .filter(|token| !token.is_empty())
            .map(|token| token.to_lowercase())
            .collect()
    }

    /// Returns the tokens of `text` that carry search signal
    ///
    /// Conjunctions, prepositions and interjections are dropped.
    pub fn words(&self, text: &str) -> Vec<String> {
        Self::tokens(text)
            .into_iter()
            .filter(|word| !self.morphology.part_of_speech(word).is_closed_class())
            .collect()
    }

    /// Returns the base form of a single word
    pub fn normal_form(&self, word: &str) -> String {
        self.morphology.normal_form(&word.to_lowercase())
    }

    /// Counts lemma occurrences in a document or query
    ///
    /// Markup is stripped first; plain text passes through unchanged.
    ///
    /// # Arguments
    ///
    /// * `text` - HTML document or plain text
    ///
    /// # Returns
    ///
    /// A map from lemma to the number of tokens with that base form
    pub fn normalize(&self, text: &str) -> HashMap<String, u32> {
        let visible = visible_text(text);
        let mut counts = HashMap::new();

        for word in self.words(&visible) {
            let lemma = self.morphology.normal_form(&word);
            if lemma.is_empty() {
                continue;
            }
            *counts.entry(lemma).or_insert(0) += 1;
        }

        counts
    }

    /// Returns the word of `text` that shares the base form of `word`
    ///
    /// Falls back to `word` itself (lowercased) when the text holds no such word.
    pub fn cognate_form(&self, text: &str, word: &str) -> String {
        let target = self.normal_form(word);

        Self::tokens(text)
            .into_iter()
            .find(|token| self.morphology.normal_form(token) == target)
            .unwrap_or_else(|| word.to_lowercase())
    }

    /// Returns true if `text` holds a word for every one of `lemmas`
    pub fn contains_lemmas(&self, text: &str, lemmas: &[&str]) -> bool {
        let present: HashSet<String> = Self::tokens(text)
            .iter()
            .map(|token| self.morphology.normal_form(token))
            .collect();

        lemmas.iter().all(|lemma| present.contains(*lemma))
    }
}

impl std::fmt::Debug for Lemmatizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lemmatizer").finish_non_exhaustive()
    }
}
