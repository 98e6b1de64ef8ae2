//! Splitting long replies into WhatsApp-sized pieces.

/// Twilio's WhatsApp body limit, in characters.
pub const WHATSAPP_MAX_LENGTH: usize = 1600;

const PARAGRAPH_SEP: &str = "\n\n";
const SENTENCE_SEP: &str = ". ";

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split `message` into chunks of at most `max_len` characters.
///
/// Paragraphs are packed greedily; a paragraph that does not fit on its own
/// is split on sentence boundaries, and a single sentence longer than
/// `max_len` is hard-split.
pub fn chunk_message(message: &str, max_len: usize) -> Vec<String> {
    if max_len == 0 || char_len(message) <= max_len {
        return vec![message.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for paragraph in message.split(PARAGRAPH_SEP) {
        if try_append(&mut current, paragraph, PARAGRAPH_SEP, max_len) {
            continue;
        }
        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        if char_len(paragraph) <= max_len {
            current.push_str(paragraph);
            continue;
        }

        for sentence in paragraph.split(SENTENCE_SEP) {
            if try_append(&mut current, sentence, SENTENCE_SEP, max_len) {
                continue;
            }
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            if char_len(sentence) <= max_len {
                current.push_str(sentence);
            } else {
                let mut pieces = hard_split(sentence, max_len);
                current = pieces.pop().unwrap_or_default();
                chunks.extend(pieces);
            }
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Append `part` (with `sep` if `current` is non-empty) when the result still
/// fits.
fn try_append(current: &mut String, part: &str, sep: &str, max_len: usize) -> bool {
    let extra = if current.is_empty() { 0 } else { char_len(sep) };
    if char_len(current) + extra + char_len(part) > max_len {
        return false;
    }
    if !current.is_empty() {
        current.push_str(sep);
    }
    current.push_str(part);
    true
}

fn hard_split(text: &str, max_len: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_len)
        .map(|c| c.iter().collect())
        .collect()
}
