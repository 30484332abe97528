//! Reply texts sent back to the chat.

/// Marker that prefixes an inline note reference (`#recipe`).
pub const REFERENCE_MARKER: char = '#';

pub const UNAUTHORIZED: &str =
    "You are not authorized to use this bot. Contact the bot owner to get access.";

pub const GREETING: &str = "Hello! This is your notes bot. Send /help to see what it can do.";

pub const HELP: &str = "The following commands are available:\n\n\
/start - Start the bot\n\
/list - List all saved notes\n\
/list <prefix> - List notes starting with the prefix\n\
/notes - Same as /list\n\
/save <note_name> - Save the replied-to message as a note\n\
/update <note_name> - Replace a note with the replied-to message\n\
/delete <note_name> - Delete a note\n\
#<note_name> - Retrieve a note\n\
/help - Show this help message";

pub const NAME_REQUIRED: &str = "Please provide a note name.";

pub const SAVE_REPLY_REQUIRED: &str = "Please reply to a text message to save a note.";

pub const UPDATE_REPLY_REQUIRED: &str = "Please reply to a text message to update a note.";

pub const NO_NOTES: &str = "No notes saved yet.";

pub const INTERNAL_ERROR: &str =
    "Something went wrong while processing your request. Please try again.";

pub fn saved(name: &str) -> String {
    format!("Note \"{name}\" saved successfully.")
}

pub fn updated(name: &str) -> String {
    format!("Note \"{name}\" updated successfully.")
}

pub fn deleted(name: &str) -> String {
    format!("Note \"{name}\" deleted successfully.")
}

pub fn does_not_exist(name: &str) -> String {
    format!("Note \"{name}\" does not exist.")
}

pub fn not_found(name: &str) -> String {
    format!("Note \"{name}\" not found.")
}

/// `List of saved notes:` followed by one `#name` per line.
pub fn note_list(names: &[String]) -> String {
    let mut out = String::from("List of saved notes:");
    for name in names {
        out.push('\n');
        out.push(REFERENCE_MARKER);
        out.push_str(name);
    }
    out
}

pub fn note_body(name: &str, text: &str) -> String {
    format!("Note \"{name}\":\n***********\n\n{text}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_marks_every_name() {
        let names = vec!["a".to_string(), "b".to_string()];
        assert_eq!(note_list(&names), "List of saved notes:\n#a\n#b");
    }

    #[test]
    fn body_contains_name_and_text() {
        let body = note_body("recipe", "Recipe body");
        assert!(body.starts_with("Note \"recipe\":"));
        assert!(body.ends_with("\n\nRecipe body"));
    }
}
