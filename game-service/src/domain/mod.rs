pub mod score_validator;

pub use score_validator::{ScoreValidator, DEFAULT_DURATION_SECS};
