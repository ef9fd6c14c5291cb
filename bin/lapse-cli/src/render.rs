//! Terminal formatting for the transcript.

use lapse_core::Stage;
use lapse_core::script::{EXPERIENCE_SECS, Segment, format_clock, split_narration};

const ITALIC: &str = "\x1b[3m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// `Stage 2/4: The Confusion - Gaslighting  [1:05 / 4:00]`
pub fn stage_header(stage: Stage, elapsed: u64, color: bool) -> String {
    let title = format!("Stage {}/4: {}", stage.number(), stage.name());
    let clock = format!("[{} / {}]", format_clock(elapsed), format_clock(EXPERIENCE_SECS));
    if color {
        format!("{BOLD}{title}{RESET}  {DIM}{clock}{RESET}")
    } else {
        format!("{title}  {clock}")
    }
}

/// Partner line with narration set in italics.
pub fn partner_line(text: &str, color: bool) -> String {
    let mut out = String::from("Partner: ");
    for segment in split_narration(text) {
        match segment {
            Segment::Speech(s) => out.push_str(s),
            Segment::Narration(n) if color => {
                out.push_str(ITALIC);
                out.push_str(n);
                out.push_str(RESET);
            }
            Segment::Narration(n) => {
                out.push('*');
                out.push_str(n);
                out.push('*');
            }
        }
    }
    out
}

pub fn user_line(text: &str) -> String {
    format!("You: {text}")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn narration_is_italicised() {
        let line = partner_line("Oh! *He smiles.* Thank you.", true);
        assert_eq!(line, "Partner: Oh! \x1b[3mHe smiles.\x1b[0m Thank you.");
    }

    #[test]
    fn plain_mode_keeps_asterisks() {
        let line = partner_line("Oh! *He smiles.* Thank you.", false);
        assert_eq!(line, "Partner: Oh! *He smiles.* Thank you.");
    }

    #[test]
    fn header_shows_clock_against_total() {
        let header = stage_header(Stage::Two, 65, true);
        assert!(header.contains("Stage 2/4: The Confusion - Gaslighting"));
        assert!(header.contains("[1:05 / 4:00]"));
        assert!(header.contains(BOLD));
    }

    #[test]
    fn plain_header_has_no_escape_codes() {
        assert_eq!(
            stage_header(Stage::Two, 65, false),
            "Stage 2/4: The Confusion - Gaslighting  [1:05 / 4:00]"
        );
    }
}
