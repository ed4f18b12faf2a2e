pub mod analysis;
pub mod fallback;
pub mod invoker;
pub mod profile_guide;
pub mod prompt;
pub mod validate;

pub use analysis::{AnalysisHandler, MissingInputError};
