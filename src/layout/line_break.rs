//! Greedy word wrapping into fixed-width lines

use crate::model::page::{LineRange, TextRange};
use smallvec::SmallVec;
use std::ops::Range;
use unicode_segmentation::UnicodeSegmentation;

/// One wrapped output line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedLine {
    /// Byte range within the element content
    pub byte_range: Range<usize>,
    /// Character range within the element content
    pub char_range: Range<usize>,
    /// Width in character cells
    pub width: u32,
    /// A single word is wider than the line
    pub overflow: bool,
}

/// Wrapped form of one element's content
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrappedText {
    lines: SmallVec<[WrappedLine; 4]>,
}

impl WrappedText {
    /// Zero-line text (page breaks)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn line_count(&self) -> u32 {
        self.lines.len() as u32
    }

    pub fn lines(&self) -> &[WrappedLine] {
        &self.lines
    }

    /// Character offset where wrapped line `index` starts
    pub fn char_offset(&self, index: usize) -> Option<usize> {
        self.lines.get(index).map(|l| l.char_range.start)
    }

    /// Character slice of `content` covering a range of wrapped lines
    pub fn text_range(&self, range: LineRange) -> Option<TextRange> {
        if range.is_empty() {
            return None;
        }
        let first = self.lines.get(range.start as usize)?;
        let last = self.lines.get(range.end as usize - 1)?;
        Some(TextRange {
            start: first.char_range.start,
            end: last.char_range.end,
        })
    }

    /// Content text of one line
    pub fn line_text<'a>(&self, content: &'a str, index: usize) -> Option<&'a str> {
        self.lines.get(index).and_then(|l| content.get(l.byte_range.clone()))
    }

    pub fn has_overflow(&self) -> bool {
        self.lines.iter().any(|l| l.overflow)
    }
}

/// A word inside one paragraph, offsets relative to the paragraph
struct Word {
    start: usize,
    end: usize,
    char_start: usize,
    char_end: usize,
}

/// Line being filled
struct OpenLine {
    start: usize,
    end: usize,
    char_start: usize,
    char_end: usize,
    width: u32,
}

/// Greedy word wrapper
#[derive(Debug, Default)]
pub struct LineWrapper;

impl LineWrapper {
    pub fn new() -> Self {
        Self
    }

    /// Wrap `text` into lines of at most `max_chars` grapheme clusters.
    ///
    /// Every `\n` ends a line. A word longer than `max_chars` gets a line of
    /// its own and is flagged as overflowing rather than broken.
    pub fn wrap(&self, text: &str, max_chars: u32, uppercase: bool) -> WrappedText {
        let max_chars = max_chars.max(1);
        let mut lines = SmallVec::new();
        let mut byte_base = 0;
        let mut char_base = 0;

        for paragraph in text.split('\n') {
            let chars = paragraph.chars().count();
            let body = paragraph.strip_suffix('\r').unwrap_or(paragraph);
            wrap_paragraph(body, byte_base, char_base, max_chars, uppercase, &mut lines);
            byte_base += paragraph.len() + 1;
            char_base += chars + 1;
        }

        WrappedText { lines }
    }
}

fn measure(text: &str, uppercase: bool) -> u32 {
    if uppercase && text.chars().any(char::is_lowercase) {
        text.to_uppercase().graphemes(true).count() as u32
    } else {
        text.graphemes(true).count() as u32
    }
}

fn is_break_space(c: char) -> bool {
    c.is_whitespace() && c != '\u{a0}'
}

fn split_words(paragraph: &str) -> SmallVec<[Word; 16]> {
    let mut words = SmallVec::new();
    let mut open: Option<(usize, usize)> = None;
    let mut char_count = 0;

    for (char_idx, (byte_idx, c)) in paragraph.char_indices().enumerate() {
        if is_break_space(c) {
            if let Some((start, char_start)) = open.take() {
                words.push(Word {
                    start,
                    end: byte_idx,
                    char_start,
                    char_end: char_idx,
                });
            }
        } else if open.is_none() {
            open = Some((byte_idx, char_idx));
        }
        char_count = char_idx + 1;
    }
    if let Some((start, char_start)) = open {
        words.push(Word {
            start,
            end: paragraph.len(),
            char_start,
            char_end: char_count,
        });
    }
    words
}

fn wrap_paragraph(
    paragraph: &str,
    byte_base: usize,
    char_base: usize,
    max_chars: u32,
    uppercase: bool,
    out: &mut SmallVec<[WrappedLine; 4]>,
) {
    let words = split_words(paragraph);

    if words.is_empty() {
        // Blank or whitespace-only paragraph still occupies a line
        let chars = paragraph.chars().count();
        out.push(WrappedLine {
            byte_range: byte_base..byte_base + paragraph.len(),
            char_range: char_base..char_base + chars,
            width: measure(paragraph, uppercase),
            overflow: false,
        });
        return;
    }

    let push = |line: OpenLine, out: &mut SmallVec<[WrappedLine; 4]>| {
        out.push(WrappedLine {
            byte_range: byte_base + line.start..byte_base + line.end,
            char_range: char_base + line.char_start..char_base + line.char_end,
            width: line.width,
            overflow: line.width > max_chars,
        });
    };

    let mut current: Option<OpenLine> = None;
    for (i, word) in words.iter().enumerate() {
        current = Some(match current.take() {
            Some(mut line) => {
                let gap = measure(&paragraph[line.end..word.start], uppercase);
                let width = measure(&paragraph[word.start..word.end], uppercase);
                if line.width + gap + width <= max_chars {
                    line.end = word.end;
                    line.char_end = word.char_end;
                    line.width += gap + width;
                    line
                } else {
                    push(line, out);
                    OpenLine {
                        start: word.start,
                        end: word.end,
                        char_start: word.char_start,
                        char_end: word.char_end,
                        width,
                    }
                }
            }
            None => {
                // Leading indentation stays on the first line
                let start = if i == 0 { 0 } else { word.start };
                let char_start = if i == 0 { 0 } else { word.char_start };
                OpenLine {
                    start,
                    end: word.end,
                    char_start,
                    char_end: word.char_end,
                    width: measure(&paragraph[start..word.end], uppercase),
                }
            }
        });
    }
    if let Some(line) = current {
        push(line, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts<'a>(content: &'a str, wrapped: &WrappedText) -> Vec<&'a str> {
        (0..wrapped.line_count() as usize)
            .map(|i| wrapped.line_text(content, i).unwrap())
            .collect()
    }

    #[test]
    fn test_empty_content() {
        let wrapped = LineWrapper::new().wrap("", 60, false);
        assert_eq!(wrapped.line_count(), 1);
        assert_eq!(wrapped.lines()[0].byte_range, 0..0);
    }

    #[test]
    fn test_line_wrap() {
        let content = "Hello World";
        let wrapped = LineWrapper::new().wrap(content, 5, false);
        assert_eq!(texts(content, &wrapped), ["Hello", "World"]);
    }

    #[test]
    fn test_exact_fit_stays_on_one_line() {
        let content = "aaaa bbbb";
        let wrapped = LineWrapper::new().wrap(content, 9, false);
        assert_eq!(wrapped.line_count(), 1);
        assert_eq!(wrapped.lines()[0].width, 9);
    }

    #[test]
    fn test_explicit_newline() {
        let content = "Hi\nthere";
        let wrapped = LineWrapper::new().wrap(content, 60, false);
        assert_eq!(texts(content, &wrapped), ["Hi", "there"]);
        assert_eq!(wrapped.lines()[1].byte_range, 3..8);
        assert_eq!(wrapped.char_offset(1), Some(3));
    }

    #[test]
    fn test_blank_paragraphs_count() {
        let wrapped = LineWrapper::new().wrap("one\n\ntwo\n", 60, false);
        assert_eq!(wrapped.line_count(), 4);
    }

    #[test]
    fn test_long_word_is_not_truncated() {
        let content = "a supercalifragilistic b";
        let wrapped = LineWrapper::new().wrap(content, 10, false);
        assert_eq!(texts(content, &wrapped), ["a", "supercalifragilistic", "b"]);
        assert!(wrapped.lines()[1].overflow);
        assert!(!wrapped.lines()[0].overflow);
        assert!(wrapped.has_overflow());
    }

    #[test]
    fn test_multibyte_offsets() {
        let content = "héllo wörld";
        let wrapped = LineWrapper::new().wrap(content, 5, false);
        assert_eq!(texts(content, &wrapped), ["héllo", "wörld"]);
        assert_eq!(wrapped.lines()[1].byte_range, 7..13);
        assert_eq!(wrapped.lines()[1].char_range, 6..11);
    }

    #[test]
    fn test_uppercase_measurement() {
        // "ß" uppercases to "SS"
        let wrapped = LineWrapper::new().wrap("straße x", 8, true);
        assert_eq!(wrapped.line_count(), 2);
        let wrapped = LineWrapper::new().wrap("straße x", 8, false);
        assert_eq!(wrapped.line_count(), 1);
    }

    #[test]
    fn test_text_range_of_split() {
        let content = "one two three four";
        let wrapped = LineWrapper::new().wrap(content, 8, false);
        assert_eq!(texts(content, &wrapped), ["one two", "three", "four"]);
        let range = wrapped.text_range(LineRange::new(1, 3)).unwrap();
        assert_eq!((range.start, range.end), (8, 18));
        assert_eq!(wrapped.text_range(LineRange::new(2, 2)), None);
    }
}
