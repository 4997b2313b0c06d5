//! Prompt templates for the synthesis call

use crate::session::entities::InvocationRequest;

/// Templates for the prompt sent to the synthesis model
pub struct SynthesisPrompt;

impl SynthesisPrompt {
    /// System prompt for the synthesis call
    pub fn system() -> &'static str {
        r#"You are merging several assistant answers to the same question into one unified answer.
Combine the strongest elements of each answer, resolve contradictions in favor of the better-supported position, and remove repetition.
Write the result as a single coherent answer. Do not mention the individual sources, their names, or that multiple answers were involved."#
    }

    /// User prompt for the synthesis call, one labelled section per contributor.
    pub fn user(contributions: &[(String, String)]) -> String {
        let mut prompt = String::from("Answers to merge:\n");

        for (name, text) in contributions {
            prompt.push_str(&format!("\n--- {} ---\n{}\n", name, text));
        }

        prompt.push_str("\nProvide the single unified answer.");
        prompt
    }

    /// The complete request for a synthesis invocation.
    pub fn request(contributions: &[(String, String)]) -> InvocationRequest {
        InvocationRequest::from_user_message(Self::system(), Self::user(contributions))
    }
}
