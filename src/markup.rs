//! Locating drawing regions in free text.
//!
//! A region runs from `\begin{tikzpicture}` to the matching `\end{tikzpicture}`.
//! Whitespace is allowed between the command and its brace, as TeX allows it.

use std::sync::LazyLock;

use regex::Regex;
use snafu::prelude::*;

use crate::{NoMarkupFoundSnafu, TabvarError};

static BEGIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\begin\s*\{tikzpicture\}").expect("valid marker pattern"));
static END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\end\s*\{tikzpicture\}").expect("valid marker pattern"));

/// Byte ranges of every marker `pattern` finds in `text`.
fn markers<'a>(text: &'a str, pattern: &'a Regex) -> impl Iterator<Item = (usize, usize)> + 'a {
    pattern.find_iter(text).map(|m| (m.start(), m.end()))
}

/// The innermost region in `text`: the last opening marker before the first closing one.
pub fn extract_region(text: &str) -> Option<&str> {
    let (end_start, end_stop) = markers(text, &END).next()?;
    let (begin_start, _) = markers(&text[..end_start], &BEGIN).last()?;
    Some(&text[begin_start..end_stop])
}

/// Like [`extract_region`], failing with [`TabvarError::NoMarkupFound`].
pub fn require_region(text: &str) -> Result<&str, TabvarError> {
    extract_region(text).context(NoMarkupFoundSnafu)
}

/// At least one region, and every opening marker closed in order.
pub fn is_well_formed(text: &str) -> bool {
    let mut events: Vec<(usize, i32)> = markers(text, &BEGIN)
        .map(|(at, _)| (at, 1))
        .chain(markers(text, &END).map(|(at, _)| (at, -1)))
        .collect();
    if events.is_empty() {
        return false;
    }
    events.sort_unstable();

    let mut depth = 0;
    for (_, step) in events {
        depth += step;
        if depth < 0 {
            return false;
        }
    }
    depth == 0
}

#[cfg(test)]
mod tests {
    use assertables::{assert_err, assert_ok};
    use pretty_assertions as pa;

    use super::*;

    #[test]
    fn region_is_cut_from_prose() {
        let text = "Here is the figure:\n\
                    \\begin{tikzpicture}\\draw (0,0)--(1,1);\\end{tikzpicture}\n\
                    Hope it helps.";
        pa::assert_eq!(
            extract_region(text),
            Some("\\begin{tikzpicture}\\draw (0,0)--(1,1);\\end{tikzpicture}")
        );
    }

    #[test]
    fn whitespace_before_the_brace() {
        let text = "\\begin {tikzpicture}\n\\fill (0,0) circle (1pt);\n\\end  {tikzpicture}";
        pa::assert_eq!(extract_region(text), Some(text));
    }

    #[test]
    fn markers_may_break_across_lines() {
        let text = "Answer:\n\\begin\n\t{tikzpicture}\\fill (0,0) circle (1pt);\\end\r\n{tikzpicture} done";
        pa::assert_eq!(
            extract_region(text),
            Some("\\begin\n\t{tikzpicture}\\fill (0,0) circle (1pt);\\end\r\n{tikzpicture}")
        );
        assert!(is_well_formed(text));
        assert!(!is_well_formed("\\begin{tikz picture}\\end{tikzpicture}"));
    }

    #[test]
    fn innermost_region_wins() {
        let inner = "\\begin{tikzpicture}\\draw (0,0)--(1,0);\\end{tikzpicture}";
        let text = format!("\\begin{{tikzpicture}}\\node {{{inner}}};\\end{{tikzpicture}}");
        pa::assert_eq!(extract_region(&text), Some(inner));
    }

    #[test]
    fn other_environments_are_ignored() {
        let text = "\\begin{center}\\begin{tikzpicture}\\end{tikzpicture}\\end{center}";
        pa::assert_eq!(
            extract_region(text),
            Some("\\begin{tikzpicture}\\end{tikzpicture}")
        );
    }

    #[test]
    fn missing_region_is_an_error() {
        assert_err!(require_region("I cannot draw that."));
        assert_err!(require_region("\\begin{tikzpicture} never closed"));
        assert!(matches!(
            require_region("\\end{tikzpicture}\\begin{tikzpicture}"),
            Err(TabvarError::NoMarkupFound)
        ));
        assert_ok!(require_region("\\begin{tikzpicture}\\end{tikzpicture}"));
    }

    #[test]
    fn well_formedness() {
        assert!(is_well_formed("\\begin{tikzpicture}\\end{tikzpicture}"));
        assert!(is_well_formed(
            "a \\begin{tikzpicture}\\end{tikzpicture} b \\begin{tikzpicture}\\end{tikzpicture}"
        ));
        assert!(!is_well_formed("no markup"));
        assert!(!is_well_formed("\\begin{tikzpicture}"));
        assert!(!is_well_formed("\\end{tikzpicture}\\begin{tikzpicture}"));
    }
}
