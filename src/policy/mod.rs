pub mod emergency;
pub mod stop;

pub use emergency::{check_emergency, check_same_day, PolicyHit};
pub use stop::{derive_urgency, effective_max_questions, max_questions_reached};
