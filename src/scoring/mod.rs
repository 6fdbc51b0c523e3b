pub mod candidates;
pub mod confidence;
pub mod merge;
pub mod specialty;

pub use candidates::{generate_candidates, CandidateDisease};
pub use confidence::{compute as compute_confidence, Confidence};
pub use merge::{merge_decision, MergedSpecialty};
pub use specialty::{score_specialties, SpecialtyScore, SpecialtyScoring};
