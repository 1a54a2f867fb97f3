use crate::models::{PromptRequest, ReferenceImage};

pub const INTRO: &str = include_str!("../data/prompts/intro.txt");
pub const TASK: &str = include_str!("../data/prompts/task.txt");
const EXAMPLES: &str = include_str!("../data/prompts/examples.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

/// Sample descriptions shown to the user before they type their own.
pub fn example_prompts() -> Vec<&'static str> {
    EXAMPLES
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Build the request: intro, every reference image, then the task block with
/// `user_instructions` inserted exactly as typed.
pub fn assemble(references: &[ReferenceImage], user_instructions: &str) -> PromptRequest {
    let task = render(TASK.trim(), &[("user_instructions", user_instructions)]);
    PromptRequest::new(INTRO.trim().to_string(), references, task)
}
