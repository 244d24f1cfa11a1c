use crate::reasoning::DraftStep;

const INTRO: &str = "You are a chain-of-thought reasoning system. Break the following problem down into logical steps.";
const INSTRUCTIONS: &str = "Think through this step by step, giving clear reasoning for each step. Structure your response as a series of reasoning steps, each building on the previous ones.";
const PER_STEP_HEADER: &str = "For each step, provide:";
const PER_STEP: &[&str] = &[
    "A clear title describing what you are analyzing",
    "Detailed reasoning and analysis",
    "Any intermediate conclusions",
];
const CLOSING: &str =
    "Work carefully and methodically through the problem before giving your final answer.";

const ANSWER_INTRO: &str =
    "Based on the following chain of thought reasoning, provide a clear and concise final answer.";
const ANSWER_REQUEST: &str =
    "Now provide a direct, well-reasoned final answer to the original query:";

/// The prompt that asks the model for the raw reasoning text.
pub fn build_reasoning_prompt(query: &str, signature: &str) -> String {
    let per_step = PER_STEP
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{intro}\n\nSignature: {signature}\nQuery: {query}\n\n{instructions}\n\n{per_step_header}\n{per_step}\n\n{closing}\n",
        intro = INTRO,
        signature = signature,
        query = query,
        instructions = INSTRUCTIONS,
        per_step_header = PER_STEP_HEADER,
        per_step = per_step,
        closing = CLOSING,
    )
}

/// The prompt that turns the drafted steps into a final answer.
pub fn build_answer_prompt(query: &str, signature: &str, steps: &[DraftStep]) -> String {
    let steps = steps
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {}: {}", i + 1, step.title, step.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{intro}\n\nOriginal Query: {query}\nSignature: {signature}\n\nReasoning Steps:\n{steps}\n\n{request}\n",
        intro = ANSWER_INTRO,
        query = query,
        signature = signature,
        steps = steps,
        request = ANSWER_REQUEST,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasoning_prompt_carries_query_and_signature() {
        let prompt = build_reasoning_prompt("why is the sky blue?", "question -> answer");
        assert!(prompt.contains("Signature: question -> answer"));
        assert!(prompt.contains("Query: why is the sky blue?"));
    }

    #[test]
    fn reasoning_prompt_lists_step_requirements() {
        let prompt = build_reasoning_prompt("q", "s");
        for (i, item) in PER_STEP.iter().enumerate() {
            assert!(prompt.contains(&format!("{}. {}", i + 1, item)));
        }
    }

    #[test]
    fn answer_prompt_numbers_steps() {
        let steps = vec![
            DraftStep {
                title: "Problem Understanding".to_string(),
                content: "look closely".to_string(),
            },
            DraftStep {
                title: "Reasoning Step 1".to_string(),
                content: "Rayleigh scattering".to_string(),
            },
        ];
        let prompt = build_answer_prompt("why?", "question -> answer", &steps);
        assert!(prompt.contains("Original Query: why?"));
        assert!(prompt.contains("1. Problem Understanding: look closely"));
        assert!(prompt.contains("2. Reasoning Step 1: Rayleigh scattering"));
        assert!(prompt.trim_end().ends_with(ANSWER_REQUEST));
    }

    #[test]
    fn answer_prompt_with_no_steps() {
        let prompt = build_answer_prompt("q", "s", &[]);
        assert!(prompt.contains("Reasoning Steps:\n\n"));
    }
}
