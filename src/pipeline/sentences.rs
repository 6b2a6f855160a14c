// Sentence splitting for transcript text.
//
// A sentence ends immediately after `.`, `!` or `?` when that mark is
// followed by whitespace. The whitespace run is kept as the sentence's
// separator so the original text can always be rebuilt exactly.

/// One sentence and the whitespace that followed it in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentenceSpan<'a> {
    pub text: &'a str,
    pub separator: &'a str,
}

/// Lazy iterator over the sentences of a text. See [`split_sentences`].
#[derive(Debug, Clone)]
pub struct Sentences<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Sentences<'a> {
    type Item = SentenceSpan<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.rest;
        if rest.is_empty() {
            return None;
        }

        let mut chars = rest.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            if !is_terminal(c) {
                continue;
            }
            let end = i + c.len_utf8();
            if !matches!(chars.peek(), Some((_, next)) if next.is_whitespace()) {
                continue;
            }
            let sep_len = rest[end..]
                .find(|ch: char| !ch.is_whitespace())
                .unwrap_or(rest.len() - end);
            self.rest = &rest[end + sep_len..];
            return Some(SentenceSpan {
                text: &rest[..end],
                separator: &rest[end..end + sep_len],
            });
        }

        self.rest = "";
        Some(SentenceSpan {
            text: rest,
            separator: "",
        })
    }
}

fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Split text into sentences, keeping separators.
///
/// Empty text yields nothing. Trailing whitespace after the last sentence
/// becomes that sentence's separator rather than an empty sentence.
pub fn split_sentences(text: &str) -> Sentences<'_> {
    Sentences { rest: text }
}

/// Rough sentence count used to size chunks.
///
/// Every terminal mark closes a sentence whether or not whitespace follows,
/// plus one for any text after the last mark. This deliberately counts
/// more aggressively than [`split_sentences`]: a single split sentence full
/// of figures like "3.5%" can weigh several sentences.
pub fn estimate_sentence_count(text: &str) -> usize {
    let marks = text.chars().filter(|&c| is_terminal(c)).count();
    let trailing = text
        .rfind(is_terminal)
        .map(|i| i + 1 < text.len())
        .unwrap_or(!text.is_empty());
    marks + usize::from(trailing)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(s: &str) -> Vec<&str> {
        split_sentences(s).map(|span| span.text).collect()
    }

    #[test]
    fn splits_on_terminal_punctuation_followed_by_space() {
        assert_eq!(
            texts("Revenue grew 5%. Tariffs hurt margins! Why? Because."),
            vec!["Revenue grew 5%.", "Tariffs hurt margins!", "Why?", "Because."]
        );
    }

    #[test]
    fn does_not_split_inside_numbers_or_ellipses() {
        assert_eq!(texts("Up 3.5% vs. last year... Mostly."), vec!["Up 3.5% vs.", "last year...", "Mostly."]);
    }

    #[test]
    fn estimate_counts_marks_and_remainder() {
        assert_eq!(estimate_sentence_count("Margins rose."), 1);
        assert_eq!(estimate_sentence_count("Up 3.5% this year."), 2);
        assert_eq!(estimate_sentence_count("No punctuation"), 1);
        assert_eq!(estimate_sentence_count("One. Two"), 2);
        assert_eq!(estimate_sentence_count(""), 0);
    }
}
