//! Column wrapping of tagged output lines.
//!
//! [`WrapWriter`] renders a content string into one or more lines, each
//! starting with a tag prefix (e.g. `"DE   "` or, for feature qualifiers,
//! `"FT                   "`) and none exceeding `max_line_length`
//! characters. Content is split into tokens at the configured
//! [`WrapChar`] and tokens are packed greedily; a token is never split
//! unless `force_line_break` is set.
//!
//! ```
//! use embl_io::wrap::{WrapChar, WrapWriter};
//!
//! let w = WrapWriter::new().wrap_char(WrapChar::Comma).max_line_length(20);
//! let lines = w.wrap("FT   CDS  ", "FT        ", "join(1..100,200..300,400..500)");
//! assert_eq!(lines, vec![
//!     "FT   CDS  join(1..100,",
//!     "FT        200..300,",
//!     "FT        400..500)",
//! ]);
//! ```
//!
//! Note that the first line in the example above is longer than 20
//! characters: a single token that does not fit the line budget is written
//! unbroken.

use std::io;

/// Default maximum line length including the tag prefix
pub const MAX_LINE_LENGTH: usize = 80;

/// Where lines may be broken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WrapChar {
    /// Between words. Whitespace runs are collapsed.
    Space,
    /// At single spaces only. The content is kept as is, whitespace runs
    /// are never broken (used for qualifier values and comments).
    SingleSpace,
    /// After a comma; the content is otherwise left untouched (used for
    /// locations).
    Comma,
    /// After words ending with `;` (accession and keyword lists, lineages).
    /// Whitespace runs are collapsed.
    Semicolon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WrapType {
    /// Everything on one line regardless of its length
    None,
    FormatWrap,
}

impl Default for WrapType {
    fn default() -> Self {
        WrapType::FormatWrap
    }
}

/// Wrapping configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrapWriter {
    pub wrap_char: WrapChar,
    pub wrap_type: WrapType,
    pub max_line_length: usize,
    /// Break exactly at the line budget, even inside tokens
    pub force_line_break: bool,
}

impl Default for WrapWriter {
    fn default() -> Self {
        WrapWriter {
            wrap_char: WrapChar::Space,
            wrap_type: WrapType::FormatWrap,
            max_line_length: MAX_LINE_LENGTH,
            force_line_break: false,
        }
    }
}

impl WrapWriter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn wrap_char(mut self, wrap_char: WrapChar) -> Self {
        self.wrap_char = wrap_char;
        self
    }

    #[inline]
    pub fn wrap_type(mut self, wrap_type: WrapType) -> Self {
        self.wrap_type = wrap_type;
        self
    }

    #[inline]
    pub fn max_line_length(mut self, max_line_length: usize) -> Self {
        self.max_line_length = max_line_length;
        self
    }

    #[inline]
    pub fn force_line_break(mut self, force: bool) -> Self {
        self.force_line_break = force;
        self
    }

    /// Writes `content` with `prefix` on every line. Returns the number of
    /// lines written.
    #[inline]
    pub fn write_block<W: io::Write>(&self, out: &mut W, prefix: &str, content: &str) -> io::Result<usize> {
        self.write_block_with(out, prefix, prefix, content)
    }

    /// Like `write_block()`, but the first line gets a different prefix
    /// (e.g. a feature key).
    pub fn write_block_with<W: io::Write>(
        &self,
        out: &mut W,
        first_prefix: &str,
        prefix: &str,
        content: &str,
    ) -> io::Result<usize> {
        let lines = self.wrap(first_prefix, prefix, content);
        for line in &lines {
            out.write_all(line.as_bytes())?;
            out.write_all(b"\n")?;
        }
        Ok(lines.len())
    }

    /// Returns the wrapped lines (without line terminators). Empty content
    /// yields a single line holding the trimmed first prefix.
    pub fn wrap(&self, first_prefix: &str, prefix: &str, content: &str) -> Vec<String> {
        let tokens = self.tokens(content);
        if tokens.is_empty() {
            return vec![first_prefix.trim_end().to_string()];
        }
        let sep = self.separator();

        if self.wrap_type == WrapType::None {
            return vec![format!("{}{}", first_prefix, tokens.join(sep))];
        }
        if self.force_line_break {
            return self.chunk(first_prefix, prefix, &tokens.join(sep));
        }

        let sep_len = sep.len();
        let mut lines = vec![];
        let mut line = first_prefix.to_string();
        let mut budget = self.budget(first_prefix);
        let mut used = 0;
        for token in tokens {
            let n = token.chars().count();
            if used == 0 {
                line.push_str(&token);
                used = n;
            } else if used + sep_len + n <= budget {
                line.push_str(sep);
                line.push_str(&token);
                used += sep_len + n;
            } else {
                lines.push(line);
                line = prefix.to_string();
                budget = self.budget(prefix);
                line.push_str(&token);
                used = n;
            }
        }
        lines.push(line);
        lines
    }

    // breaks at exactly the line budget
    fn chunk(&self, first_prefix: &str, prefix: &str, content: &str) -> Vec<String> {
        let mut lines = vec![];
        let mut chars = content.chars().peekable();
        let mut p = first_prefix;
        while chars.peek().is_some() {
            let budget = self.budget(p).max(1);
            let mut line = p.to_string();
            line.extend(chars.by_ref().take(budget));
            lines.push(line);
            p = prefix;
        }
        lines
    }

    #[inline]
    fn budget(&self, prefix: &str) -> usize {
        self.max_line_length.saturating_sub(prefix.chars().count())
    }

    #[inline]
    fn separator(&self) -> &'static str {
        match self.wrap_char {
            WrapChar::Space | WrapChar::SingleSpace | WrapChar::Semicolon => " ",
            WrapChar::Comma => "",
        }
    }

    fn tokens(&self, content: &str) -> Vec<String> {
        match self.wrap_char {
            WrapChar::Space => content.split_whitespace().map(|s| s.to_string()).collect(),
            WrapChar::SingleSpace => {
                if content.is_empty() {
                    return vec![];
                }
                // a break is possible between two non-empty parts
                let mut tokens: Vec<String> = vec![];
                let mut prev_empty = false;
                for part in content.split(' ') {
                    match tokens.last_mut() {
                        Some(last) if prev_empty || part.is_empty() => {
                            last.push(' ');
                            last.push_str(part);
                        }
                        _ => tokens.push(part.to_string()),
                    }
                    prev_empty = part.is_empty();
                }
                tokens
            }
            WrapChar::Comma => content.split_inclusive(',').map(|s| s.to_string()).collect(),
            WrapChar::Semicolon => {
                let mut tokens = vec![];
                let mut current = String::new();
                for word in content.split_whitespace() {
                    if !current.is_empty() {
                        current.push(' ');
                    }
                    current.push_str(word);
                    if word.ends_with(';') {
                        tokens.push(std::mem::replace(&mut current, String::new()));
                    }
                }
                if !current.is_empty() {
                    tokens.push(current);
                }
                tokens
            }
        }
    }
}
