//! Help text for console commands
//!
//! `help` lists every documented verb; `help <verb>` prints its usage.

const COMMANDS: [(&str, &str); 9] = [
    ("EOF", "Exit the shell at end of input (Ctrl-D)."),
    (
        "all",
        "Print every record, or only those of one class.\n\
         Usage: all [<class>]  |  <class>.all()",
    ),
    (
        "count",
        "Print the number of records, or of one class.\n\
         Usage: count [<class>]  |  <class>.count()",
    ),
    (
        "create",
        "Create a record of a class, save it and print its id.\n\
         Usage: create <class>",
    ),
    (
        "destroy",
        "Delete a record and save.\n\
         Usage: destroy <class> <id>  |  <class>.destroy(<id>)",
    ),
    ("help", "List commands, or describe one.\nUsage: help [<command>]"),
    ("quit", "Quit command to exit the program."),
    (
        "show",
        "Print one record.\n\
         Usage: show <class> <id>  |  <class>.show(<id>)",
    ),
    (
        "update",
        "Set one attribute on a record and save.\n\
         Usage: update <class> <id> <attribute> <value>\n\
         \x20      <class>.update(<id>, <attribute>, <value>)\n\
         \x20      <class>.update(<id>, {<attribute>: <value>, ...})",
    ),
];

/// Help text for a topic, or the command overview when `topic` is `None`.
pub fn help_text(topic: Option<&str>) -> String {
    match topic {
        None => overview(),
        Some(t) => match COMMANDS.iter().find(|(name, _)| *name == t) {
            Some((_, text)) => text.to_string(),
            None => format!("*** No help on {}", t),
        },
    }
}

fn overview() -> String {
    let header = "Documented commands (type help <topic>):";
    let names: Vec<&str> = COMMANDS.iter().map(|(name, _)| *name).collect();
    format!(
        "\n{}\n{}\n{}\n",
        header,
        "=".repeat(header.len()),
        names.join("  ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overview_lists_every_verb() {
        let text = help_text(None);
        for verb in super::super::parse::VERBS {
            assert!(text.contains(verb), "missing {}", verb);
        }
    }

    #[test]
    fn test_topic_help() {
        assert!(help_text(Some("update")).contains("<class>.update(<id>, {"));
        assert_eq!(help_text(Some("quit")), "Quit command to exit the program.");
        assert_eq!(help_text(Some("fly")), "*** No help on fly");
    }
}
