use crate::models::feedback::TranscriptTurn;

/// Flattens a turn-structured transcript into the text block the scoring
/// prompt embeds. One line per turn, original order, no truncation; an empty
/// transcript yields an empty string.
pub fn format_transcript(transcript: &[TranscriptTurn]) -> String {
    transcript
        .iter()
        .map(|turn| format!("- {}: {}\n", turn.role, turn.content))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(role: &str, content: &str) -> TranscriptTurn {
        TranscriptTurn {
            role: role.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_empty_transcript_formats_to_empty_string() {
        assert_eq!(format_transcript(&[]), "");
    }

    #[test]
    fn test_single_turn() {
        assert_eq!(format_transcript(&[turn("user", "hi")]), "- user: hi\n");
    }

    #[test]
    fn test_turn_order_preserved() {
        let transcript = vec![
            turn("interviewer", "Why Rust?"),
            turn("candidate", "Memory safety without a garbage collector."),
            turn("interviewer", "Go on."),
        ];
        assert_eq!(
            format_transcript(&transcript),
            "- interviewer: Why Rust?\n\
             - candidate: Memory safety without a garbage collector.\n\
             - interviewer: Go on.\n"
        );
    }
}
