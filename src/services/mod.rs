pub mod gemini; // Google Generative Language API client
pub mod identity;
pub mod inference;

pub use gemini::GeminiClient;
pub use identity::{AnonymousIdentity, AuthApiClient, IdentityService};
pub use inference::{InferenceProvider, ProviderError};
