//! Sentence segmentation.
//!
//! A whitespace run is a boundary when the character before it is `.`, `!` or
//! `?` and the character before that is a letter, `)`, `]`, `"` or `'`. List
//! markers such as `3.` therefore stay attached to their sentence.

fn closes_sentence(prev: char, punct: char) -> bool {
    matches!(punct, '.' | '!' | '?')
        && (prev.is_ascii_alphabetic() || matches!(prev, ')' | ']' | '"' | '\''))
}

/// Split `text` into trimmed, non-empty sentences.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    // Last two non-boundary chars seen before the current position.
    let mut prev2: Option<char> = None;
    let mut prev1: Option<char> = None;
    let mut iter = text.char_indices().peekable();

    while let Some((idx, ch)) = iter.next() {
        if ch.is_whitespace() {
            let boundary = matches!((prev2, prev1), (Some(a), Some(b)) if closes_sentence(a, b));
            // Consume the whole whitespace run.
            let mut end = idx + ch.len_utf8();
            while let Some(&(j, c)) = iter.peek() {
                if !c.is_whitespace() {
                    break;
                }
                end = j + c.len_utf8();
                iter.next();
            }
            if boundary {
                push_trimmed(&mut sentences, &text[start..idx]);
                start = end;
                prev2 = None;
                prev1 = None;
            } else {
                prev2 = prev1;
                prev1 = Some(' ');
            }
            continue;
        }
        prev2 = prev1;
        prev1 = Some(ch);
    }
    push_trimmed(&mut sentences, &text[start..]);
    sentences
}

fn push_trimmed(out: &mut Vec<String>, piece: &str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        out.push(piece.to_string());
    }
}

/// Whitespace-separated word count.
pub fn word_count(sentence: &str) -> usize {
    sentence.split_whitespace().count()
}
