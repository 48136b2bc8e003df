/// Normalizes paragraph whitespace in a bot reply.
///
/// Replies that already contain a numbered (`"\n1."`) or bulleted (`"\n•"`)
/// list are passed through untouched. Everything else is split on blank
/// lines, each paragraph trimmed, and rejoined with blank lines.
pub fn format_response(text: &str) -> String {
    if text.contains("\n1.") || text.contains("\n•") {
        return text.to_string();
    }
    text.split("\n\n")
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_list_passes_through() {
        let text = "Here are some options:\n1. A\n2. B";
        assert_eq!(format_response(text), text);
    }

    #[test]
    fn test_bulleted_list_passes_through_untrimmed() {
        let text = "  Options:  \n\n• one\n• two  ";
        assert_eq!(format_response(text), text);
    }

    #[test]
    fn test_paragraphs_are_trimmed() {
        let text = "  First paragraph.  \n\n   Second one.\n\n";
        assert_eq!(format_response(text), "First paragraph.\n\nSecond one.\n\n");
    }

    #[test]
    fn test_idempotent_on_formatted_text() {
        let once = format_response("  a  \n\n  b  ");
        assert_eq!(format_response(&once), once);
    }

    #[test]
    fn test_list_marker_at_start_is_not_a_list() {
        // The marker must follow a newline.
        assert_eq!(format_response("1. only item  "), "1. only item");
    }
}
