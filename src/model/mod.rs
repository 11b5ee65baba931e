mod types;

pub use types::{Criterion, Evaluation, Judge, RoundSnapshot};
