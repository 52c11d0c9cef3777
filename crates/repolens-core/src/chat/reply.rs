use serde::Deserialize;

use crate::explore::strip_fences;

/// Meaningful characters needed before the sniffer decides.
const SNIFF_CHARS: usize = 5;

/// What the answering model meant by its reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Answer(String),
    FileRequest(String),
}

#[derive(Deserialize)]
struct FileRequestBody {
    missing_file: String,
}

fn normalize_path(path: &str) -> String {
    path.trim()
        .trim_start_matches("./")
        .trim_start_matches('/')
        .to_owned()
}

/// Classify a complete reply. A reply is a file request when it carries a
/// `{"missing_file": "<path>"}` object with a non-empty path; anything else
/// is an answer, returned verbatim.
#[must_use]
pub fn parse_reply(text: &str) -> Reply {
    let cleaned = strip_fences(text);
    if cleaned.contains("missing_file")
        && let Some(start) = cleaned.find('{')
        && let Some(len) = cleaned[start..].find('}')
        && let Ok(body) = serde_json::from_str::<FileRequestBody>(&cleaned[start..=start + len])
    {
        let path = normalize_path(&body.missing_file);
        if !path.is_empty() {
            return Reply::FileRequest(path);
        }
    }
    Reply::Answer(text.to_owned())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SniffState {
    Undecided,
    Holding,
    PassThrough,
}

/// Decides, from the first fragments of a streamed reply, whether it is
/// prose to forward immediately or a structured request to hold back.
#[derive(Debug)]
pub struct ReplySniffer {
    buffer: String,
    state: SniffState,
}

impl Default for ReplySniffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplySniffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            state: SniffState::Undecided,
        }
    }

    /// Feed one fragment. Returns the text that can be shown now, if any.
    pub fn push(&mut self, fragment: &str) -> Option<String> {
        match self.state {
            SniffState::PassThrough => Some(fragment.to_owned()),
            SniffState::Holding => {
                self.buffer.push_str(fragment);
                None
            }
            SniffState::Undecided => {
                self.buffer.push_str(fragment);
                let cleaned = strip_fences(&self.buffer);
                let cleaned = cleaned.strip_prefix("```").unwrap_or(cleaned).trim_start();
                if cleaned.chars().count() < SNIFF_CHARS {
                    return None;
                }
                if cleaned.starts_with('{') {
                    self.state = SniffState::Holding;
                    None
                } else {
                    self.state = SniffState::PassThrough;
                    Some(std::mem::take(&mut self.buffer))
                }
            }
        }
    }

    /// End of stream. `None` when everything was already forwarded,
    /// otherwise the classified held text.
    #[must_use]
    pub fn finish(self) -> Option<Reply> {
        match self.state {
            SniffState::PassThrough => None,
            SniffState::Undecided | SniffState::Holding => Some(parse_reply(&self.buffer)),
        }
    }
}
