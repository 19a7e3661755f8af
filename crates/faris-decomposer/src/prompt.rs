//! Prompt construction for claim decomposition

use faris_domain::Domain;

/// Header every decomposition prompt starts with
pub const TASK_HEADER: &str = "TASK: decompose answer into atomic claims";

/// System prompt for the decomposition call
pub const SYSTEM_PROMPT: &str =
    "You split answers into atomic claims. You respond with JSON only.";

/// Builds the decomposition prompt
pub struct PromptBuilder<'a> {
    question: &'a str,
    answer: &'a str,
    domain: Domain,
    context: Option<&'a str>,
    max_claims: usize,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(question: &'a str, answer: &'a str, domain: Domain) -> Self {
        Self {
            question,
            answer,
            domain,
            context: None,
            max_claims: 20,
        }
    }

    /// Add reference context
    pub fn with_context(mut self, context: Option<&'a str>) -> Self {
        self.context = context;
        self
    }

    /// Limit the number of requested claims
    pub fn with_max_claims(mut self, max_claims: usize) -> Self {
        self.max_claims = max_claims;
        self
    }

    /// Build the complete prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(TASK_HEADER);
        prompt.push_str("\n\n");
        prompt.push_str(DECOMPOSITION_INSTRUCTIONS);
        prompt.push_str("\n\n");
        prompt.push_str(&format!("Domain: {}\n", self.domain));
        prompt.push_str(&format!("Extract at most {} claims.\n\n", self.max_claims));

        prompt.push_str("Question:\n---\n");
        prompt.push_str(self.question);
        prompt.push_str("\n---\n\n");

        prompt.push_str("Answer:\n---\n");
        prompt.push_str(self.answer);
        prompt.push_str("\n---\n\n");

        if let Some(context) = self.context {
            prompt.push_str("Reference context:\n---\n");
            prompt.push_str(context);
            prompt.push_str("\n---\n\n");
        }

        prompt.push_str(OUTPUT_FORMAT_REMINDER);
        prompt
    }
}

const DECOMPOSITION_INSTRUCTIONS: &str = r#"Break the answer into atomic claims.

Rules:
- One assertion per claim; split compound sentences
- Each claim must be self-contained (resolve pronouns)
- Keep the answer's wording where possible so claims can be located in it
- Preserve the order in which claims appear in the answer
- claim_type is "factual" (checkable fact), "opinion" (subjective judgment) or "reasoning" (an inference step)
- List unstated premises a claim depends on as implicit_assumptions
- Code blocks are not claims; describe what the code asserts only if the prose makes a claim about it"#;

const OUTPUT_FORMAT_REMINDER: &str = r#"Output format (JSON object only, no additional text):
{
  "claims": [
    {"claim_text": "...", "claim_type": "factual", "implicit_assumptions": ["..."]}
  ],
  "overall_assumptions": ["..."],
  "reasoning_chain": ["..."]
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_starts_with_task_header() {
        let prompt = PromptBuilder::new("q", "a", Domain::General).build();
        assert!(prompt.starts_with(TASK_HEADER));
    }

    #[test]
    fn test_prompt_includes_inputs() {
        let prompt = PromptBuilder::new("Is aspirin safe?", "Aspirin is safe.", Domain::Medical)
            .with_context(Some("Aspirin can cause bleeding."))
            .with_max_claims(5)
            .build();

        assert!(prompt.contains("Is aspirin safe?"));
        assert!(prompt.contains("Aspirin is safe."));
        assert!(prompt.contains("Reference context:"));
        assert!(prompt.contains("Aspirin can cause bleeding."));
        assert!(prompt.contains("Domain: medical"));
        assert!(prompt.contains("at most 5 claims"));
    }

    #[test]
    fn test_prompt_without_context() {
        let prompt = PromptBuilder::new("q", "a", Domain::Code).build();
        assert!(!prompt.contains("Reference context:"));
        assert!(prompt.contains("claim_text"));
    }
}
