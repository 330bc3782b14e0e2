use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

/// Transcript id used when the input has no file name
pub const PASTED_TRANSCRIPT_ID: &str = "pasted-transcript";

/// Raw transcript text plus the id it is validated under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedTranscript {
    pub content: String,
    pub transcript_id: String,
}

/// Read a transcript file; its id is the file stem (`call_0042.json` -> `call_0042`)
pub fn load_transcript(path: &Path) -> Result<LoadedTranscript> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    let transcript_id = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(PASTED_TRANSCRIPT_ID)
        .to_string();

    Ok(LoadedTranscript {
        content,
        transcript_id,
    })
}

/// Read a pasted transcript from stdin
pub fn read_transcript_stdin() -> Result<LoadedTranscript> {
    let mut content = String::new();
    std::io::stdin()
        .read_to_string(&mut content)
        .context("Failed to read transcript from stdin")?;

    Ok(LoadedTranscript {
        content,
        transcript_id: PASTED_TRANSCRIPT_ID.to_string(),
    })
}
