use crate::{FontId, InvoiceError, Pt, TextMeasurer};

/// Breaks text into lines no wider than `max_width`, character by character.
///
/// Characters are packed greedily: each one is appended to the current line if the
/// line still fits, otherwise the line is finished and the character starts the next
/// one. Whitespace gets no special treatment, so text in scripts without spaces wraps
/// the same way as any other. A single character wider than `max_width` still gets a
/// line of its own rather than being dropped.
///
/// The result is never empty: empty input produces one empty line, so callers can
/// always count at least one line per field.
///
/// Line boundaries do not depend on alignment; right-aligned fields wrap with this
/// same function and only anchor each line differently when drawn.
pub fn wrap_text<M: TextMeasurer + ?Sized>(
    measurer: &M,
    text: &str,
    font: FontId,
    size: Pt,
    max_width: Pt,
) -> Result<Vec<String>, InvoiceError> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        let mut candidate = current.clone();
        candidate.push(ch);
        let fits = measurer.measure(&candidate, font, size)? <= max_width;
        if fits || current.is_empty() {
            current = candidate;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push(ch);
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FixedAdvance, RejectChar};
    use proptest::prelude::*;

    const SIZE: Pt = Pt(10.0);

    fn wrap(text: &str, max_width: f32) -> Vec<String> {
        wrap_text(&FixedAdvance, text, FontId(0), SIZE, Pt(max_width)).unwrap()
    }

    #[test]
    fn empty_text_is_one_empty_line() {
        assert_eq!(wrap("", 100.0), vec![String::new()]);
        assert_eq!(wrap("", 0.0), vec![String::new()]);
    }

    #[test]
    fn short_text_stays_on_one_line() {
        assert_eq!(wrap("hello", 100.0), vec!["hello"]);
    }

    #[test]
    fn breaks_mid_word_at_exact_width() {
        // 5pt per ascii char: 4 chars fit in 20pt
        assert_eq!(wrap("asdf asdf", 20.0), vec!["asdf", " asd", "f"]);
    }

    #[test]
    fn full_width_characters_wrap_without_spaces() {
        // 10pt per character
        assert_eq!(
            wrap("請求書の明細です", 30.0),
            vec!["請求書", "の明細", "です"]
        );
    }

    #[test]
    fn oversized_character_gets_its_own_line() {
        assert_eq!(wrap("あ", 4.0), vec!["あ"]);
        assert_eq!(wrap("aあb", 6.0), vec!["a", "あ", "b"]);
    }

    #[test]
    fn measurement_failures_propagate() {
        let result = wrap_text(&RejectChar('x'), "abxd", FontId(0), SIZE, Pt(100.0));
        assert!(matches!(result, Err(InvoiceError::MissingGlyph { ch: 'x', .. })));
    }

    proptest! {
        #[test]
        fn wrapping_preserves_text_and_respects_width(
            text in "[a-z あ-ん 0-9]{0,60}",
            max_width in 1.0f32..120.0,
        ) {
            let lines = wrap(&text, max_width);
            prop_assert!(!lines.is_empty());
            prop_assert_eq!(lines.concat(), text.clone());
            for line in &lines {
                let width = FixedAdvance.measure(line, FontId(0), SIZE).unwrap();
                prop_assert!(width <= Pt(max_width) || line.chars().count() == 1);
            }
        }
    }
}
