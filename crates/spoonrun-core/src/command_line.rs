//! Immutable argument-token sequences and their rendering.

use std::fmt;

use serde::Serialize;

/// Characters that force a token to be quoted when rendered.
const SHELL_SIGNIFICANT: [char; 10] = ['&', '|', '<', '>', '^', '(', ')', '%', '!', ';'];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgToken {
    pub value: String,
    pub quoted: bool,
}

impl ArgToken {
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            quoted: false,
        }
    }

    pub fn quoted(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            quoted: true,
        }
    }

    fn needs_quotes(&self) -> bool {
        self.quoted
            || self.value.is_empty()
            || self.value.contains('"')
            || self
                .value
                .chars()
                .any(|c| c.is_whitespace() || SHELL_SIGNIFICANT.contains(&c))
    }

    /// Render the token for a command line, quoting when required.
    pub fn render(&self) -> String {
        if !self.needs_quotes() {
            return self.value.clone();
        }
        format!("\"{}\"", self.value.replace('"', "\\\""))
    }
}

/// Program plus arguments, produced by a command builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    tokens: Vec<ArgToken>,
}

impl CommandSpec {
    pub fn program(&self) -> &str {
        &self.tokens[0].value
    }

    pub fn args(&self) -> &[ArgToken] {
        &self.tokens[1..]
    }

    pub fn arg_values(&self) -> Vec<String> {
        self.args().iter().map(|token| token.value.clone()).collect()
    }

    pub fn tokens(&self) -> &[ArgToken] {
        &self.tokens
    }

    /// Space-separated command line with per-token quoting.
    pub fn render(&self) -> String {
        self.tokens
            .iter()
            .map(ArgToken::render)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Accumulates tokens for a [`CommandSpec`]; the program is always first.
#[derive(Debug, Clone)]
pub struct CommandSpecBuilder {
    tokens: Vec<ArgToken>,
}

impl CommandSpecBuilder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            tokens: vec![ArgToken::plain(program)],
        }
    }

    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.tokens.push(ArgToken::plain(value));
        self
    }

    pub fn quoted_arg(mut self, value: impl Into<String>) -> Self {
        self.tokens.push(ArgToken::quoted(value));
        self
    }

    pub fn arg_if(self, condition: bool, value: impl Into<String>) -> Self {
        if condition { self.arg(value) } else { self }
    }

    pub fn opt_arg(self, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.arg(value),
            None => self,
        }
    }

    pub fn build(self) -> CommandSpec {
        CommandSpec {
            tokens: self.tokens,
        }
    }
}
