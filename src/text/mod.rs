//! Text normalization for indexing and querying
//!
//! - `markup`: visible text, text blocks and title of an HTML document
//! - `morphology`: base forms and closed-class tags
//! - `normalizer`: the `Lemmatizer` built on top of both

mod markup;
mod morphology;
mod normalizer;

pub use markup::{text_blocks, title, visible_text};
pub use morphology::{
    Morphology, MorphologyError, MorphologyResult, PartOfSpeech, SnowballMorphology,
};
pub use normalizer::Lemmatizer;
