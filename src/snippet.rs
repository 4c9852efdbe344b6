//! Highlighted context windows around docstring matches.

use crate::render::escape_html;

/// Truncation marker placed where a window does not reach the text bounds.
pub const ELLIPSIS: &str = "…";
pub const MARK_OPEN: &str = "<mark>";
pub const MARK_CLOSE: &str = "</mark>";

/// Builds one highlighted fragment per `[start, length]` span and joins them.
///
/// Spans are in characters. Each fragment keeps up to `pad` characters of
/// context on either side, clamped to the text. Fragments are ordered by start
/// offset, and two ellipses meeting at a fragment boundary collapse into one;
/// ellipses in the text itself are kept.
/// Overlapping fragments are not merged.
///
/// Returns `None` when no span falls inside the text.
pub fn extract_snippet(text: &str, spans: &[[usize; 2]], pad: usize) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let slice = |from: usize, to: usize| escape_html(&chars[from..to].iter().collect::<String>());

    let mut fragments: Vec<(usize, String)> = spans
        .iter()
        .filter(|[start, _]| *start < len)
        .map(|&[start, length]| {
            let end = start.saturating_add(length).min(len);
            let before = start.saturating_sub(pad);
            let after = end.saturating_add(pad).min(len);

            let mut fragment = String::new();
            if before > 0 {
                fragment.push_str(ELLIPSIS);
            }
            fragment.push_str(&slice(before, start));
            fragment.push_str(MARK_OPEN);
            fragment.push_str(&slice(start, end));
            fragment.push_str(MARK_CLOSE);
            fragment.push_str(&slice(end, after));
            if after < len {
                fragment.push_str(ELLIPSIS);
            }
            (start, fragment)
        })
        .collect();

    if fragments.is_empty() {
        return None;
    }

    fragments.sort_by_key(|(start, _)| *start);
    let mut joined = String::new();
    for (_, fragment) in fragments {
        let fragment = if joined.ends_with(ELLIPSIS) {
            fragment.strip_prefix(ELLIPSIS).unwrap_or(&fragment)
        } else {
            &fragment
        };
        joined.push_str(fragment);
    }
    Some(joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    const TEXT: &str = "The quick brown fox jumps over the lazy dog";

    #[test]
    fn window_around_match() {
        let snippet = extract_snippet(TEXT, &[[16, 3]], 4).unwrap();
        check!(snippet == "…own <mark>fox</mark> jum…");
    }

    #[rstest]
    #[case([0, 3], "<mark>The</mark> qui…")]
    #[case([40, 3], "…azy <mark>dog</mark>")]
    #[case([40, 10], "…azy <mark>dog</mark>")]
    fn window_clamped_to_bounds(#[case] span: [usize; 2], #[case] expected: &str) {
        check!(extract_snippet(TEXT, &[span], 4).unwrap() == expected);
    }

    #[test]
    fn fragments_ordered_by_start() {
        let snippet = extract_snippet(TEXT, &[[40, 3], [4, 5]], 2).unwrap();
        check!(snippet.find("quick").unwrap() < snippet.find("dog").unwrap());
    }

    #[test]
    fn adjacent_ellipses_collapse() {
        let snippet = extract_snippet(TEXT, &[[4, 5], [20, 5]], 2).unwrap();
        check!(snippet == "…e <mark>quick</mark> b…x <mark>jumps</mark> o…");
        check!(!snippet.contains("……"));
    }

    #[test]
    fn ellipses_in_text_survive() {
        let snippet = extract_snippet("Wait…… then the thing happens", &[[16, 5]], 30).unwrap();
        check!(snippet == "Wait…… then the <mark>thing</mark> happens");
    }

    #[test]
    fn out_of_range_spans_ignored() {
        check!(extract_snippet(TEXT, &[[100, 3]], 4).is_none());
        check!(extract_snippet("", &[[0, 1]], 4).is_none());
        check!(extract_snippet(TEXT, &[], 4).is_none());
    }

    #[test]
    fn multibyte_text_sliced_by_character() {
        let snippet = extract_snippet("naïve café au lait", &[[6, 4]], 3).unwrap();
        check!(snippet == "…ve <mark>café</mark> au…");
    }

    #[test]
    fn context_is_escaped() {
        let snippet = extract_snippet("a <b> tag", &[[6, 3]], 10).unwrap();
        check!(snippet == "a &lt;b&gt; <mark>tag</mark>");
    }
}
