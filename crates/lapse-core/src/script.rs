//! Fixed narrative content and presentation helpers shared by clients.

/// The partner's first line, shown at `0:00` before the user types anything.
pub const OPENING_LINE: &str = "Happy Anniversary, darling! I can't believe it's been 40 years. \
     *He gestures to a small wrapped gift on the table.*";

/// Shown in place of a reply when the partner cannot be reached.
pub const FALLBACK_REPLY: &str = "I'm sorry, I'm having trouble responding right now.";

/// Length of the whole experience.
pub const EXPERIENCE_SECS: u64 = 240;

/// `m:ss`, e.g. `3:07`.
pub fn format_clock(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// A run of message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Speech(&'a str),
    /// Text between a pair of asterisks, without the asterisks.
    Narration(&'a str),
}

/// Split `*stage directions*` out of a message.
///
/// A lone `*` without a closing partner, and an empty `**` pair, stay part of
/// the surrounding speech.
pub fn split_narration(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut speech_start = 0;
    let mut cursor = 0;

    while let Some(open) = text[cursor..].find('*').map(|i| cursor + i) {
        let Some(close) = text[open + 1..].find('*').map(|i| open + 1 + i) else {
            break;
        };
        if close == open + 1 {
            // The second `*` of an empty pair may still open a run.
            cursor = open + 1;
            continue;
        }
        if open > speech_start {
            segments.push(Segment::Speech(&text[speech_start..open]));
        }
        segments.push(Segment::Narration(&text[open + 1..close]));
        speech_start = close + 1;
        cursor = speech_start;
    }

    if speech_start < text.len() {
        segments.push(Segment::Speech(&text[speech_start..]));
    }
    segments
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn clock_pads_seconds() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(65), "1:05");
        assert_eq!(format_clock(EXPERIENCE_SECS), "4:00");
    }

    #[test]
    fn opening_line_ends_with_narration() {
        let segments = split_narration(OPENING_LINE);
        assert_eq!(
            segments.last(),
            Some(&Segment::Narration("He gestures to a small wrapped gift on the table."))
        );
    }

    #[test]
    fn narration_interleaves_with_speech() {
        assert_eq!(
            split_narration("Hi *waves* there *smiles*"),
            vec![
                Segment::Speech("Hi "),
                Segment::Narration("waves"),
                Segment::Speech(" there "),
                Segment::Narration("smiles"),
            ]
        );
    }

    #[test]
    fn unmatched_and_empty_asterisks_are_speech() {
        assert_eq!(
            split_narration("5 * 3 is **fifteen"),
            vec![Segment::Speech("5 "), Segment::Narration(" 3 is "), Segment::Speech("*fifteen")]
        );
        assert_eq!(split_narration("a ** b"), vec![Segment::Speech("a ** b")]);
        assert_eq!(split_narration("lonely *"), vec![Segment::Speech("lonely *")]);
        assert!(split_narration("").is_empty());
    }

    #[test]
    fn doubled_asterisks_wrap_narration() {
        assert_eq!(
            split_narration("**He smiles.**"),
            vec![
                Segment::Speech("*"),
                Segment::Narration("He smiles."),
                Segment::Speech("*"),
            ]
        );
    }
}
