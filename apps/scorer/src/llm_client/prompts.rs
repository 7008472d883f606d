// Shared prompt fragments for report annotation.

/// System instruction that constrains the model to a single-word answer.
pub const SINGLE_WORD_SYSTEM: &str = "You respond with only a single word per response. \
    Do not include any additional text or explanations. \
    Do not include a summary or use examples. \
    Respond to the prompt with one word.";

/// Wraps the report text between literal markers, followed by the instruction.
pub fn build_report_prompt(text: &str, instruction: &str) -> String {
    format!("BEGIN REPORT\n{text}\nEND REPORT\n\n{instruction}")
}
