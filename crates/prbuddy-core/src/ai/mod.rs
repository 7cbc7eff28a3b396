// SPDX-License-Identifier: Apache-2.0

//! AI integration module.
//!
//! Builds the prompt, sends it to Gemini, and extracts the structured draft
//! from the reply.

pub mod extract;
pub mod gemini;
pub mod prompt;
pub mod provider;
pub mod types;

pub use extract::{GenerationResult, extract};
pub use gemini::GeminiClient;
pub use prompt::PromptTemplate;
pub use provider::Generator;
pub use types::GeneratedPr;
