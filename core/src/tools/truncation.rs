//! Keeps tool output fed back into an agent loop within a token budget.

/// Token budget for all tool output produced during one agent invocation.
pub const TOOL_OUTPUT_TOKEN_BUDGET: usize = 20_000;

/// Running budget shared by the tool results of one agent invocation.
/// Token counts use a ~4 characters per token approximation.
#[derive(Debug)]
pub struct OutputTruncator {
    limit: usize,
    accumulated_tokens: usize,
}

impl OutputTruncator {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            accumulated_tokens: 0,
        }
    }

    fn estimate_tokens(text: &str) -> usize {
        text.len().div_ceil(4)
    }

    fn marker(&self) -> String {
        format!("[Tool output truncated at {} token budget]", self.limit)
    }

    /// Returns `content`, cut on a line boundary if it does not fit in the
    /// remaining budget, and whether anything was dropped. When not even the
    /// first line fits, that line is cut on a char boundary instead.
    pub fn truncate_if_needed(&mut self, content: &str) -> (String, bool) {
        if self.is_at_limit() {
            return (self.marker(), true);
        }

        let content_tokens = Self::estimate_tokens(content);
        if self.accumulated_tokens + content_tokens <= self.limit {
            self.accumulated_tokens += content_tokens;
            return (content.to_string(), false);
        }

        let remaining_chars = self.limit.saturating_sub(self.accumulated_tokens) * 4;
        let mut truncated = String::new();
        for line in content.lines() {
            // +1 for the newline joining it to the previous line
            if truncated.len() + line.len() + 1 > remaining_chars {
                break;
            }
            if !truncated.is_empty() {
                truncated.push('\n');
            }
            truncated.push_str(line);
        }
        if truncated.is_empty() {
            let end = content
                .char_indices()
                .map(|(idx, ch)| idx + ch.len_utf8())
                .take_while(|end| *end <= remaining_chars)
                .last()
                .unwrap_or(0);
            truncated.push_str(&content[..end]);
        }

        self.accumulated_tokens = self.limit;
        truncated.push_str("\n\n");
        truncated.push_str(&self.marker());
        (truncated, true)
    }

    pub fn current_tokens(&self) -> usize {
        self.accumulated_tokens
    }

    pub fn is_at_limit(&self) -> bool {
        self.accumulated_tokens >= self.limit
    }
}

impl Default for OutputTruncator {
    fn default() -> Self {
        Self::new(TOOL_OUTPUT_TOKEN_BUDGET)
    }
}
