//! Splitting an input line into shell words.
//!
//! The rules are deliberately small: whitespace separates words, a pair of
//! double quotes groups everything between them (spaces included) into a
//! single word, and the quote characters themselves never appear in the
//! output. There is no escape character.

/// Upper bound on the length of a single token, in characters.
///
/// Characters beyond the cap are dropped rather than the whole line being
/// rejected, so overly long input degrades instead of failing.
pub const MAX_TOKEN_LEN: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Start,
    ReadingWord,
    ReadingQuoted,
}

struct LexingFsm {
    state: LexingState,
    buffer: String,
    buffer_len: usize,
    tokens: Vec<String>,
}

impl LexingFsm {
    fn new() -> Self {
        LexingFsm {
            state: LexingState::Start,
            buffer: String::new(),
            buffer_len: 0,
            tokens: Vec::new(),
        }
    }

    fn run(mut self, line: &str) -> Vec<String> {
        for ch in line.chars() {
            match self.state {
                LexingState::Start => self.handle_start(ch),
                LexingState::ReadingWord => self.handle_word(ch),
                LexingState::ReadingQuoted => self.handle_quoted(ch),
            }
        }

        // A pending word is flushed at end of input. This also covers an
        // unbalanced trailing quote: the partial token is kept.
        if self.buffer_len > 0 {
            self.flush();
        }

        self.tokens
    }

    fn handle_start(&mut self, ch: char) {
        match ch {
            ' ' | '\t' => {}
            '"' => self.state = LexingState::ReadingQuoted,
            c => {
                self.push(c);
                self.state = LexingState::ReadingWord;
            }
        }
    }

    fn handle_word(&mut self, ch: char) {
        match ch {
            ' ' | '\t' => {
                self.flush();
                self.state = LexingState::Start;
            }
            '"' => self.state = LexingState::ReadingQuoted,
            c => self.push(c),
        }
    }

    fn handle_quoted(&mut self, ch: char) {
        match ch {
            // The closing quote always emits, so `""` produces an empty
            // token instead of being skipped.
            '"' => {
                self.flush();
                self.state = LexingState::Start;
            }
            c => self.push(c),
        }
    }

    fn push(&mut self, ch: char) {
        if self.buffer_len < MAX_TOKEN_LEN {
            self.buffer.push(ch);
            self.buffer_len += 1;
        }
    }

    fn flush(&mut self) {
        self.tokens.push(std::mem::take(&mut self.buffer));
        self.buffer_len = 0;
    }
}

/// Splits `line` into shell words.
///
/// Never fails: blank input yields an empty vector, unbalanced quotes flush
/// whatever was collected, and oversized tokens are truncated to
/// [`MAX_TOKEN_LEN`] characters.
pub fn tokenize(line: &str) -> Vec<String> {
    LexingFsm::new().run(line)
}
