pub mod interpret;
pub mod normalize;
pub mod parse;

pub use interpret::{interpret, PhraseHit, SymptomMatch, SynonymIndex};
pub use normalize::normalize;
pub use parse::parse_free_text;
