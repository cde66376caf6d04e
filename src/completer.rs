use reedline::{Completer, Span, Suggestion};

/// Shell commands with their one-line descriptions
pub const COMMANDS: &[(&str, &str)] = &[
    ("/symptoms", "list the catalogue"),
    ("/pick", "select a numbered search result"),
    ("/toggle", "add or remove a symptom"),
    ("/diagnose", "request a diagnosis"),
    ("/reset", "start over"),
    ("/close", "hide the diagnosis"),
    ("/logs", "show recent log lines"),
    ("/help", "show help"),
    ("/quit", "exit"),
];

pub struct CommandCompleter;

impl Completer for CommandCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let input = &line[..pos];

        // Only the first word is a command; free text is search input
        if !input.starts_with('/') || input.contains(char::is_whitespace) {
            return Vec::new();
        }

        COMMANDS
            .iter()
            .filter(|(name, _)| name.starts_with(input))
            .map(|(name, description)| Suggestion {
                value: name.to_string(),
                description: Some(description.to_string()),
                extra: None,
                span: Span { start: 0, end: pos },
                style: None,
                append_whitespace: matches!(*name, "/pick" | "/toggle"),
            })
            .collect()
    }
}
