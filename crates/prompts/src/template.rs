//! Prompt templates with `{variable}` placeholders.

use scour_core::error::PromptError;
use std::collections::HashMap;

/// A prompt template with named input variables.
///
/// Rendering substitutes every `{name}` placeholder for a declared variable.
/// A placeholder for an undeclared or unprovided variable is an error, so
/// typos fail loudly instead of leaking braces into the prompt. `{{` and
/// `}}` escape literal braces.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    input_variables: Vec<String>,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>, input_variables: Vec<String>) -> Self {
        Self {
            template: template.into(),
            input_variables,
        }
    }

    /// Declared variable names.
    pub fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    /// Render the template with the given variable values.
    pub fn render(&self, vars: &HashMap<String, String>) -> Result<String, PromptError> {
        for name in &self.input_variables {
            if !vars.contains_key(name) {
                return Err(PromptError::MissingVariable { name: name.clone() });
            }
        }

        let mut out = String::with_capacity(self.template.len());
        let mut chars = self.template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    out.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    out.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    for c in chars.by_ref() {
                        if c == '}' {
                            break;
                        }
                        name.push(c);
                    }
                    match vars.get(&name) {
                        Some(value) => out.push_str(value),
                        None => return Err(PromptError::MissingVariable { name }),
                    }
                }
                _ => out.push(c),
            }
        }

        Ok(out)
    }
}
