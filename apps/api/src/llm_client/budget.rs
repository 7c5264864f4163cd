//! Approximate token budget for optimize requests.
//!
//! Four characters per token is coarse but needs no tokenizer, and it is
//! checked before anything goes over the network.

use crate::llm_client::LlmError;

pub const DEFAULT_MAX_INPUT_TOKENS: usize = 3000;

const CHARS_PER_TOKEN: usize = 4;

/// `ceil(chars / 4)`.
pub fn estimate_tokens(chars: usize) -> usize {
    chars.div_ceil(CHARS_PER_TOKEN)
}

/// Fails with [`LlmError::InputTooLarge`] when the combined prompt text is
/// estimated above `max_input_tokens`. Returns the estimate otherwise.
pub fn check_input_budget(
    system_prompt: &str,
    cv_text: &str,
    job_description: &str,
    max_input_tokens: usize,
) -> Result<usize, LlmError> {
    let chars = system_prompt.chars().count()
        + cv_text.chars().count()
        + job_description.chars().count();
    let estimated = estimate_tokens(chars);

    if estimated > max_input_tokens {
        return Err(LlmError::InputTooLarge(format!(
            "the CV and job description come to about {estimated} tokens; the limit is {max_input_tokens}"
        )));
    }
    Ok(estimated)
}
