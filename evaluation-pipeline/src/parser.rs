//! Extracts a numeric score and an explanation from free-text model output.
//!
//! The model is instructed to answer with exactly two labeled fields:
//!
//! ```text
//! SCORE: <non-negative integer>
//! EXPLANATION: <remaining text, may span lines>
//! ```
//!
//! Models deviate, so parsing degrades in a fixed chain: score label with
//! digits, then explanation label; explanation missing means the score line
//! is stripped and the remainder becomes the comment; score missing means
//! score 0 and the whole raw text becomes the comment. Out-of-range scores
//! are passed through unclamped so operator-facing output surfaces model
//! misbehavior instead of hiding it.

const SCORE_LABEL: &str = "SCORE:";
const EXPLANATION_LABEL: &str = "EXPLANATION:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredAnswer {
    pub score: i64,
    pub comment: String,
}

pub fn parse_scored_answer(text: &str) -> ScoredAnswer {
    let Some((label_start, score)) = find_score(text) else {
        return ScoredAnswer {
            score: 0,
            comment: text.to_string(),
        };
    };

    if let Some(explanation_at) = text.find(EXPLANATION_LABEL) {
        let comment = text
            .get(explanation_at.saturating_add(EXPLANATION_LABEL.len())..)
            .unwrap_or_default()
            .trim()
            .to_string();
        return ScoredAnswer { score, comment };
    }

    // No explanation label: drop the score line, keep the rest verbatim.
    ScoredAnswer {
        score,
        comment: strip_line_at(text, label_start),
    }
}

/// First occurrence of `SCORE:` that is actually followed by digits
/// (ignoring spaces and tabs). Returns the label offset and parsed value.
fn find_score(text: &str) -> Option<(usize, i64)> {
    let mut search_from = 0;
    while let Some(relative) = text.get(search_from..)?.find(SCORE_LABEL) {
        let label_start = search_from.saturating_add(relative);
        let after_label = label_start.saturating_add(SCORE_LABEL.len());
        let rest = text.get(after_label..).unwrap_or_default();
        let digits: String = rest
            .trim_start_matches([' ', '\t'])
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();

        if let Ok(score) = digits.parse::<i64>() {
            return Some((label_start, score));
        }

        search_from = after_label;
    }
    None
}

/// Removes the whole line containing the given offset, trimming the result.
fn strip_line_at(text: &str, offset: usize) -> String {
    let line_start = text
        .get(..offset)
        .and_then(|head| head.rfind('\n'))
        .map_or(0, |idx| idx.saturating_add(1));
    let line_end = text
        .get(offset..)
        .and_then(|tail| tail.find('\n'))
        .map_or(text.len(), |idx| offset.saturating_add(idx).saturating_add(1));

    let mut remainder = String::with_capacity(text.len());
    remainder.push_str(text.get(..line_start).unwrap_or_default());
    remainder.push_str(text.get(line_end..).unwrap_or_default());
    remainder.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_answer() {
        let parsed = parse_scored_answer("SCORE: 7\nEXPLANATION: Good docs");
        assert_eq!(parsed.score, 7);
        assert_eq!(parsed.comment, "Good docs");
    }

    #[test]
    fn multiline_explanation_is_taken_to_end_of_input() {
        let parsed =
            parse_scored_answer("SCORE: 5\nEXPLANATION: First line.\nSecond line.\n");
        assert_eq!(parsed.score, 5);
        assert_eq!(parsed.comment, "First line.\nSecond line.");
    }

    #[test]
    fn missing_labels_fall_back_to_raw_text() {
        let parsed = parse_scored_answer("no labels here");
        assert_eq!(parsed.score, 0);
        assert_eq!(parsed.comment, "no labels here");
    }

    #[test]
    fn missing_explanation_strips_score_line() {
        let parsed = parse_scored_answer("SCORE: 3 only");
        assert_eq!(parsed.score, 3);
        assert_eq!(parsed.comment, "");

        let parsed = parse_scored_answer("Preamble.\nSCORE: 3\nTrailing remark.");
        assert_eq!(parsed.score, 3);
        assert_eq!(parsed.comment, "Preamble.\nTrailing remark.");
    }

    #[test]
    fn score_label_without_digits_is_skipped() {
        let parsed = parse_scored_answer("SCORE: unclear\nSCORE: 4\nEXPLANATION: second wins");
        assert_eq!(parsed.score, 4);
        assert_eq!(parsed.comment, "second wins");
    }

    #[test]
    fn out_of_range_scores_pass_through_unclamped() {
        let parsed = parse_scored_answer("SCORE: 99\nEXPLANATION: overachiever");
        assert_eq!(parsed.score, 99);
    }

    #[test]
    fn idempotent_on_clean_comment_text() {
        let stored_comment = "The contractor provided certification evidence.";
        let reparsed = parse_scored_answer(stored_comment);
        assert_eq!(reparsed.score, 0);
        assert_eq!(reparsed.comment, stored_comment);
    }
}
