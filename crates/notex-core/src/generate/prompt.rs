//! Prompt assembly for notes generation.

use minijinja::{Environment, UndefinedBehavior};

use super::GenerateRequest;

const NOTES_TEMPLATE: &str = include_str!("../../prompts/notes.md");

/// Renders the notes prompt for a request.
pub fn build(request: &GenerateRequest) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.add_template("notes", NOTES_TEMPLATE)?;
    env.get_template("notes")?.render(request)
}
