//! Help topics for the interactive console.

const HEADER: &str = "Documented commands (type help <topic>):";

/// Topic name and help text, sorted by name.
const TOPICS: &[(&str, &str)] = &[
    ("EOF", "Exit the console at end of input."),
    (
        "all",
        "Print every instance, or every instance of one class.\n\
         Usage: all [<class>]  |  <class>.all()",
    ),
    ("cls", "Clear the screen."),
    (
        "count",
        "Print the number of instances of a class.\n\
         Usage: count <class>  |  <class>.count()",
    ),
    (
        "create",
        "Create a new instance, save it and print its id.\n\
         Usage: create <class>  |  <class>.create()",
    ),
    (
        "destroy",
        "Delete an instance and save the change.\n\
         Usage: destroy <class> <id>  |  <class>.destroy(\"<id>\")",
    ),
    (
        "help",
        "List available commands, or show help for one.\n\
         Usage: help [<topic>]  |  ? [<topic>]",
    ),
    ("quit", "Exit the console."),
    (
        "show",
        "Print the string form of an instance.\n\
         Usage: show <class> <id>  |  <class>.show(\"<id>\")",
    ),
    (
        "update",
        "Set attributes on an instance and save the change.\n\
         Usage: update <class> <id> <name> <value>\n       \
         <class>.update(\"<id>\", \"<name>\", <value>)\n       \
         <class>.update(\"<id>\", {\"<name>\": <value>, ...})",
    ),
];

/// The topic index printed by a bare `help`.
pub fn overview() -> String {
    let names: Vec<&str> = TOPICS.iter().map(|(name, _)| *name).collect();
    format!("{}\n{}\n{}\n", HEADER, "=".repeat(HEADER.len()), names.join("  "))
}

pub fn topic(name: &str) -> Option<&'static str> {
    TOPICS
        .iter()
        .find(|(topic, _)| *topic == name)
        .map(|(_, text)| *text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::command::Verb;

    #[test]
    fn test_overview_lists_every_verb() {
        let text = overview();
        assert!(text.starts_with(
            "Documented commands (type help <topic>):\n========================================\n"
        ));
        let verbs = [
            "EOF", "all", "cls", "count", "create", "destroy", "help", "quit", "show", "update",
        ];
        for verb in verbs {
            assert!(Verb::from_str(verb).is_some());
            assert!(text.contains(verb), "missing {}", verb);
        }
    }

    #[test]
    fn test_topic_lookup() {
        assert!(topic("update").expect("update").contains("update"));
        assert!(topic("nope").is_none());
    }
}
