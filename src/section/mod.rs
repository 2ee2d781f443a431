use regex::Regex;

/// Extract the block under a Markdown heading.
///
/// `level` is the heading marker (`"##"`, `"###"`, ...). The block starts at
/// the first line that reads exactly `{level} {name}` (trailing spaces and
/// `\r` are tolerated) and ends right before the next heading of the same
/// level, or at the end of `text`. `name` is matched literally and
/// case-sensitively.
pub fn extract_section<'a>(text: &'a str, name: &str, level: &str) -> Option<&'a str> {
    let level = regex::escape(level);
    let heading = Regex::new(&format!(
        r"(?m)^{level} {}[ \t]*\r?$",
        regex::escape(name)
    ))
    .ok()?;
    let start = heading.find(text)?.start();

    // Skip past the matched heading line before looking for the next one.
    let body_start = text[start..]
        .find('\n')
        .map_or(text.len(), |offset| start + offset + 1);
    let next_heading = Regex::new(&format!(r"(?m)^{level} ")).ok()?;
    let end = next_heading
        .find(&text[body_start..])
        .map_or(text.len(), |m| body_start + m.start());

    Some(&text[start..end])
}

/// A heading line and the span of text it governs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingSpan<'a> {
    /// Heading text with the marker and trailing whitespace removed.
    pub name: &'a str,
    /// Offset of the heading line.
    pub start: usize,
    /// Offset just past the heading line.
    pub body_start: usize,
    /// Offset of the next same-level heading, or the end of the text.
    pub end: usize,
}

impl<'a> HeadingSpan<'a> {
    /// Text under the heading, excluding the heading line itself.
    pub fn body(&self, text: &'a str) -> &'a str {
        &text[self.body_start..self.end]
    }
}

/// Every heading at `level`, in document order, with the same boundary
/// rules as [`extract_section`].
pub fn heading_spans<'a>(text: &'a str, level: &str) -> Vec<HeadingSpan<'a>> {
    let Ok(heading) = Regex::new(&format!(r"(?m)^{} (.*?)[ \t]*\r?$", regex::escape(level)))
    else {
        return Vec::new();
    };

    let mut spans: Vec<HeadingSpan<'a>> = heading
        .captures_iter(text)
        .filter_map(|cap| {
            let line = cap.get(0)?;
            let name = cap.get(1)?.as_str();
            let body_start = (line.end() + 1).min(text.len());
            Some(HeadingSpan {
                name,
                start: line.start(),
                body_start,
                end: text.len(),
            })
        })
        .collect();

    for i in 1..spans.len() {
        spans[i - 1].end = spans[i].start;
    }
    spans
}
