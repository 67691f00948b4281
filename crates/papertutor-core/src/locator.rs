//! Slicing paper text between outline labels.
//!
//! Labels are matched verbatim against the extracted text by first occurrence.
//! Headings whose spacing or casing changed during extraction will not be found.

/// Text from `label`'s first occurrence up to the first occurrence of the label that
/// follows it in `labels`, or to the end of `text` when it is the last one.
///
/// Returns `None` when `label` is not in `labels` or does not occur in `text`.
/// When the next label does not occur, the slice runs to the end of `text`; when it
/// occurs only before `label`, the slice is empty.
#[must_use]
pub fn locate_section<'a, S: AsRef<str>>(text: &'a str, label: &str, labels: &[S]) -> Option<&'a str> {
    let Some(index) = labels.iter().position(|l| l.as_ref() == label) else {
        tracing::debug!(label, "label not in outline");
        return None;
    };
    let Some(start) = text.find(label) else {
        tracing::debug!(label, "label not found in paper text");
        return None;
    };
    let end = labels
        .get(index + 1)
        .and_then(|next| text.find(next.as_ref()))
        .unwrap_or(text.len());

    if end < start {
        tracing::debug!(label, start, end, "next label precedes section start");
        return Some(&text[start..start]);
    }
    Some(&text[start..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAPER: &str = "Title\nABSTRACT\nshort\n1 INTRODUCTION\nintro text\n2 RELATED WORK\n\
                         2.1 Evaluating Code Summarization\nfirst\n2.2 Assessing Comments\nsecond\nREFERENCES\n[1] x";

    fn labels() -> Vec<&'static str> {
        vec![
            "1 INTRODUCTION",
            "2 RELATED WORK",
            "2.1 Evaluating Code Summarization",
            "2.2 Assessing Comments",
            "REFERENCES",
        ]
    }

    #[test]
    fn slice_runs_to_next_label() {
        let slice = locate_section(PAPER, "2.1 Evaluating Code Summarization", &labels()).unwrap();
        assert_eq!(slice, "2.1 Evaluating Code Summarization\nfirst\n");
    }

    #[test]
    fn last_label_runs_to_end_of_text() {
        let slice = locate_section(PAPER, "REFERENCES", &labels()).unwrap();
        assert_eq!(slice, "REFERENCES\n[1] x");
    }

    #[test]
    fn missing_next_label_runs_to_end_of_text() {
        let labels = ["1 INTRODUCTION", "9 NOT IN TEXT"];
        let slice = locate_section(PAPER, "1 INTRODUCTION", &labels).unwrap();
        assert!(slice.starts_with("1 INTRODUCTION"));
        assert!(slice.ends_with("[1] x"));
    }

    #[test]
    fn next_label_before_start_gives_empty_slice() {
        let labels = ["2 RELATED WORK", "ABSTRACT"];
        assert_eq!(locate_section(PAPER, "2 RELATED WORK", &labels), Some(""));
    }

    #[test]
    fn label_absent_from_text_is_none() {
        let labels = ["1 Introduction"];
        assert_eq!(locate_section(PAPER, "1 Introduction", &labels), None);
    }

    #[test]
    fn label_absent_from_list_is_none() {
        assert_eq!(locate_section(PAPER, "ABSTRACT", &labels()), None);
    }

    #[test]
    fn empty_text_with_unknown_label_does_not_panic() {
        let labels = ["Methods"];
        assert_eq!(locate_section("", "Methods", &labels), None);
    }

    #[test]
    fn multibyte_text_slices_on_char_boundaries() {
        let text = "מבוא\n1 INTRO\nטקסט\n2 NEXT\nסוף";
        let labels = ["1 INTRO", "2 NEXT"];
        assert_eq!(locate_section(text, "1 INTRO", &labels), Some("1 INTRO\nטקסט\n"));
    }

    mod proptest_locator {
        use super::*;
        use proptest::prelude::*;

        fn offset(text: &str, slice: &str) -> usize {
            slice.as_ptr() as usize - text.as_ptr() as usize
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(500))]

            #[test]
            fn adjacent_slices_tile_the_text(
                head in "[a-z \n]{0,40}",
                parts in proptest::collection::vec(("[A-Z]{1,8}", "[a-z \n]{0,60}"), 1..12),
            ) {
                let labels: Vec<String> = parts
                    .iter()
                    .enumerate()
                    .map(|(i, (name, _))| format!("<{i}:{name}>"))
                    .collect();
                let mut text = head.clone();
                for (label, (_, body)) in labels.iter().zip(&parts) {
                    text.push_str(label);
                    text.push_str(body);
                }

                let slices: Vec<&str> = labels
                    .iter()
                    .map(|l| locate_section(&text, l, &labels).unwrap())
                    .collect();

                for pair in slices.windows(2) {
                    prop_assert_eq!(offset(&text, pair[0]) + pair[0].len(), offset(&text, pair[1]));
                }
                let last = slices[slices.len() - 1];
                prop_assert_eq!(offset(&text, last) + last.len(), text.len());
                prop_assert_eq!(offset(&text, slices[0]), head.len());
            }

            #[test]
            fn never_panics_on_arbitrary_input(
                text in "\\PC{0,300}",
                labels in proptest::collection::vec("\\PC{0,12}", 0..6),
                pick in 0usize..8,
            ) {
                let label = labels.get(pick).cloned().unwrap_or_default();
                let _ = locate_section(&text, &label, &labels);
            }
        }
    }
}
