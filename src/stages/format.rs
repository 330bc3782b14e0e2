use crate::models::{Transcript, Turn};

/// Flatten a transcript into one `role: utterance` line per turn
///
/// `raw` is either a JSON array of turns or free text. Anything that does not
/// parse as a turn array is returned unchanged.
pub fn format_transcript(raw: &str) -> String {
    match serde_json::from_str::<Transcript>(raw) {
        Ok(turns) => turns.iter().map(Turn::to_line).collect::<Vec<_>>().join("\n"),
        Err(_) => raw.to_string(),
    }
}
