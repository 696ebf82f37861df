//! Morphological analysis: base forms and closed-class word tags
//!
//! Base forms come from the Snowball stemmers (English and Russian, picked
//! by the script of the word). Closed-class words (conjunctions,
//! prepositions, interjections) come from a built-in dictionary that can be
//! extended with a word list file.

use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while building a morphology
#[derive(Debug, Error)]
pub enum MorphologyError {
    #[error("Failed to read dictionary {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed dictionary line {line}: '{content}'")]
    Malformed { line: usize, content: String },

    #[error("Unknown part-of-speech tag '{tag}' on dictionary line {line}")]
    UnknownTag { line: usize, tag: String },
}

/// Result type alias for morphology construction
pub type MorphologyResult<T> = std::result::Result<T, MorphologyError>;

/// Coarse part-of-speech tag, only as fine as filtering needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartOfSpeech {
    Conjunction,
    Interjection,
    Preposition,
    /// Anything that carries search signal
    Content,
}

impl PartOfSpeech {
    /// Returns true for the classes that are dropped before indexing
    pub fn is_closed_class(&self) -> bool {
        !matches!(self, Self::Content)
    }

    /// Parses a dictionary tag (`CONJ`, `PREP`, `INTJ`)
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_uppercase().as_str() {
            "CONJ" => Some(Self::Conjunction),
            "PREP" => Some(Self::Preposition),
            "INTJ" => Some(Self::Interjection),
            _ => None,
        }
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Conjunction => "CONJ",
            Self::Interjection => "INTJ",
            Self::Preposition => "PREP",
            Self::Content => "CONTENT",
        };
        write!(f, "{}", tag)
    }
}

/// A morphological analyzer
///
/// Implementations receive lowercase single words and must be deterministic.
pub trait Morphology: Send + Sync {
    /// Returns the normalized base form of a word
    fn normal_form(&self, word: &str) -> String;

    /// Returns the coarse part of speech of a word
    fn part_of_speech(&self, word: &str) -> PartOfSpeech;
}

const ENGLISH_CONJUNCTIONS: &[&str] = &[
    "and", "or", "but", "nor", "yet", "so", "because", "although", "though", "if", "unless",
    "whereas", "whether", "while", "than", "either", "neither", "both",
];

const ENGLISH_PREPOSITIONS: &[&str] = &[
    "of", "in", "on", "at", "to", "by", "with", "from", "about", "into", "onto", "over", "under",
    "after", "before", "between", "through", "during", "without", "within", "against", "among",
    "upon", "across", "behind", "beyond", "near", "toward", "towards", "per", "via", "for",
    "since", "until", "off", "amid", "despite", "beneath", "beside", "besides", "throughout",
];

const ENGLISH_INTERJECTIONS: &[&str] = &[
    "oh", "ah", "wow", "hey", "oops", "alas", "ouch", "hooray", "ugh", "hmm", "huh", "bravo",
];

const RUSSIAN_CONJUNCTIONS: &[&str] = &[
    "и", "а", "но", "или", "да", "что", "чтобы", "если", "когда", "хотя", "либо", "зато",
    "однако", "тоже", "также", "потому", "поэтому", "ибо", "пока", "будто", "словно", "ни",
    "как", "то",
];

const RUSSIAN_PREPOSITIONS: &[&str] = &[
    "в", "во", "на", "с", "со", "к", "ко", "по", "о", "об", "обо", "от", "ото", "до", "из",
    "изо", "у", "за", "под", "подо", "над", "перед", "при", "про", "для", "без", "через",
    "между", "около", "вокруг", "после", "среди", "сквозь", "вместо", "кроме", "ради", "возле",
];

const RUSSIAN_INTERJECTIONS: &[&str] = &[
    "ах", "ох", "эх", "ой", "ай", "увы", "ура", "ого", "эй", "ух", "ага", "ишь",
];

/// Snowball-backed morphology for English and Russian text
pub struct SnowballMorphology {
    english: Stemmer,
    russian: Stemmer,
    closed_class: HashMap<String, PartOfSpeech>,
}

impl SnowballMorphology {
    /// Creates a morphology with the built-in closed-class dictionary
    pub fn new() -> Self {
        let mut closed_class = HashMap::new();

        let builtin: [(&[&str], PartOfSpeech); 6] = [
            (ENGLISH_CONJUNCTIONS, PartOfSpeech::Conjunction),
            (ENGLISH_PREPOSITIONS, PartOfSpeech::Preposition),
            (ENGLISH_INTERJECTIONS, PartOfSpeech::Interjection),
            (RUSSIAN_CONJUNCTIONS, PartOfSpeech::Conjunction),
            (RUSSIAN_PREPOSITIONS, PartOfSpeech::Preposition),
            (RUSSIAN_INTERJECTIONS, PartOfSpeech::Interjection),
        ];
        for (words, pos) in builtin {
            for word in words {
                closed_class.insert((*word).to_string(), pos);
            }
        }

        Self {
            english: Stemmer::create(Algorithm::English),
            russian: Stemmer::create(Algorithm::Russian),
            closed_class,
        }
    }

    /// Creates a morphology and extends its dictionary from an optional word list file
    ///
    /// # Arguments
    ///
    /// * `path` - File with one `word TAG` pair per line; `#` starts a comment
    ///
    /// # Returns
    ///
    /// * `Ok(SnowballMorphology)` - Ready analyzer
    /// * `Err(MorphologyError)` - The file is unreadable or has a malformed line
    pub fn with_dictionary(path: Option<&Path>) -> MorphologyResult<Self> {
        let mut morphology = Self::new();

        if let Some(path) = path {
            let content = std::fs::read_to_string(path).map_err(|source| MorphologyError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            morphology.extend_from_str(&content)?;
        }

        Ok(morphology)
    }

    /// Adds closed-class entries parsed from word list text
    pub fn extend_from_str(&mut self, content: &str) -> MorphologyResult<()> {
        for (index, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut parts = line.split_whitespace();
            let (word, tag) = match (parts.next(), parts.next(), parts.next()) {
                (Some(word), Some(tag), None) => (word, tag),
                _ => {
                    return Err(MorphologyError::Malformed {
                        line: index + 1,
                        content: raw.to_string(),
                    })
                }
            };

            let pos = PartOfSpeech::from_tag(tag).ok_or_else(|| MorphologyError::UnknownTag {
                line: index + 1,
                tag: tag.to_string(),
            })?;

            self.closed_class.insert(word.to_lowercase(), pos);
        }

        Ok(())
    }

    fn stemmer_for(&self, word: &str) -> &Stemmer {
        if word.chars().any(is_cyrillic) {
            &self.russian
        } else {
            &self.english
        }
    }
}

impl Default for SnowballMorphology {
    fn default() -> Self {
        Self::new()
    }
}

impl Morphology for SnowballMorphology {
    fn normal_form(&self, word: &str) -> String {
        let word = word.to_lowercase().replace('ё', "е");
        self.stemmer_for(&word).stem(&word).into_owned()
    }

    fn part_of_speech(&self, word: &str) -> PartOfSpeech {
        self.closed_class
            .get(&word.to_lowercase())
            .copied()
            .unwrap_or(PartOfSpeech::Content)
    }
}

fn is_cyrillic(c: char) -> bool {
    matches!(c, '\u{0400}'..='\u{04FF}')
}
