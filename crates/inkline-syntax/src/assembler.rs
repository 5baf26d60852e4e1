//! # Assembler - Building the Tree
//!
//! The assembler turns token groups into [`Node`]s. It keeps a stack of open
//! frames, each holding the opener's delimiter and the nodes collected since.
//!
//! ## Pairing
//!
//! An opening group pushes one frame per delimiter, outermost first. A
//! closing run is consumed from the front, so its first characters close
//! the innermost frame: with `_` and `__` defined, `___a___` opens `__` then
//! `_`, and the closer pairs `_` before `__`.
//!
//! Each step tries the top frame first and wraps its nodes in a
//! [`Node::Formatted`] named after the rule. Failing that, the front piece
//! may close a deeper frame, but only when none of the frames above it can
//! still be closed later in the run or the block. Those frames are demoted
//! to text, innermost first. A piece that closes nothing is retried shorter
//! (`__` as `_`) before it falls back to text.
//!
//! ## Duplicate tags
//!
//! Identical delimiters next to each other in one run keep only the outer
//! one as a tag. With only `*` defined, `**foo**` is `*` wrapping `*foo*`.
//! Identical tags in separate runs nest as usual.
//!
//! ## One-sided tags
//!
//! A prefix-only frame ends at the first whitespace, the next tag or the end
//! of the block. A suffix-only delimiter wraps the word or formatted node
//! right before it.
//!
//! Nothing here fails: whatever cannot pair is kept as text, so the text of
//! the tree always spells out the block.

use crate::lexer::is_whitespace;
use crate::resolver::leading_piece;
use crate::rules::{Delimiter, RuleTable};
use crate::token::{Node, TokenGroup, TokenKind};

#[derive(Debug)]
enum FrameKind {
    Root,
    Tag,
    PrefixOnly { tag: String },
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    delimiter: String,
    children: Vec<Node>,
}

impl Frame {
    fn new(kind: FrameKind, delimiter: &str) -> Self {
        Self {
            kind,
            delimiter: delimiter.to_string(),
            children: Vec::new(),
        }
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Node::Text(existing)) = self.children.last_mut() {
            existing.push_str(text);
        } else {
            self.children.push(Node::Text(text.to_string()));
        }
    }

    fn push_node(&mut self, node: Node) {
        match node {
            Node::Text(text) => self.push_text(&text),
            other => self.children.push(other),
        }
    }
}

/// Assembles scanned groups into the final tree.
pub fn assemble(groups: Vec<TokenGroup>, rules: &RuleTable) -> Vec<Node> {
    let closers = groups
        .iter()
        .filter(|g| g.kind() == TokenKind::InlineClose)
        .map(TokenGroup::source)
        .collect();
    let mut assembler = Assembler::new(rules, closers);
    for group in groups {
        assembler.feed(group);
    }
    assembler.finish()
}

/// Outcome of one step over a closing run.
enum Step {
    /// This many bytes of the run were handled.
    Consumed(usize),
    /// Retry with the piece capped at this many bytes.
    Shorter(usize),
}

struct Assembler<'r> {
    rules: &'r RuleTable,
    /// `stack[0]` is the root frame and is never popped before `finish`.
    stack: Vec<Frame>,
    /// Source of every closing group in the block, in order.
    closers: Vec<String>,
    /// Closing groups fed so far.
    seen_closers: usize,
}

impl<'r> Assembler<'r> {
    fn new(rules: &'r RuleTable, closers: Vec<String>) -> Self {
        Self {
            rules,
            stack: vec![Frame::new(FrameKind::Root, "")],
            closers,
            seen_closers: 0,
        }
    }

    fn top(&mut self) -> &mut Frame {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn feed(&mut self, group: TokenGroup) {
        match group.kind() {
            TokenKind::TextNode => {
                for token in group.candidates() {
                    self.push_text(&token.value);
                }
            }
            TokenKind::InlineOpen => {
                self.end_prefix_only();
                let pieces: Vec<String> = group
                    .into_candidates()
                    .into_iter()
                    .map(|t| t.value)
                    .collect();
                self.open(&pieces);
            }
            TokenKind::InlineClose => {
                self.end_prefix_only();
                self.seen_closers += 1;
                self.close(&group.source());
            }
        }
    }

    /// Adds text to the top frame, ending prefix-only frames at whitespace.
    fn push_text(&mut self, text: &str) {
        let mut rest = text;
        while matches!(self.top().kind, FrameKind::PrefixOnly { .. }) {
            let Some(at) = rest.find(is_whitespace) else {
                break;
            };
            let (word, tail) = rest.split_at(at);
            self.top().push_text(word);
            self.pop_prefix_only();
            rest = tail;
        }
        self.top().push_text(rest);
    }

    fn open(&mut self, pieces: &[String]) {
        let rules = self.rules;
        let innermost = pieces.len().saturating_sub(1);
        for (index, piece) in pieces.iter().enumerate() {
            if index > 0 && pieces[index - 1] == *piece {
                log::trace!("duplicate opener {piece:?} kept as text");
                self.push_text(piece);
                continue;
            }
            if let Some(rule) = rules.prefix_only(piece) {
                if index == innermost {
                    let tag = rule.name.clone();
                    self.stack
                        .push(Frame::new(FrameKind::PrefixOnly { tag }, piece));
                } else {
                    self.push_text(piece);
                }
            } else if rules.matches(piece, Delimiter::Prefix) {
                self.stack.push(Frame::new(FrameKind::Tag, piece));
            } else {
                self.push_text(piece);
            }
        }
    }

    fn close(&mut self, run: &str) {
        let mut rest = run;
        let mut limit = run.len();
        while !rest.is_empty() {
            match self.close_next(rest, limit) {
                Step::Consumed(len) => {
                    rest = &rest[len..];
                    limit = rest.len();
                }
                Step::Shorter(len) => limit = len,
            }
        }
    }

    /// Handles the front of a closing run. `limit` caps the front piece
    /// while a piece that closed nothing is retried shorter.
    fn close_next(&mut self, rest: &str, limit: usize) -> Step {
        let rules = self.rules;
        let piece = leading_piece(&rest[..limit], rules, Delimiter::Suffix);
        let after = &rest[piece.len()..];
        let fresh = limit == rest.len();

        if fresh
            && !after.is_empty()
            && leading_piece(after, rules, Delimiter::Suffix) == piece
        {
            log::trace!("duplicate closer {piece:?} kept as text");
            self.push_text(piece);
            return Step::Consumed(piece.len());
        }
        if let Some(rule) = rules.suffix_only(piece) {
            let tag = rule.name.clone();
            self.wrap_trailing(tag, piece);
            return Step::Consumed(piece.len());
        }
        if fresh && let Some((tag, len)) = self.close_top(rest) {
            self.pop_formatted(tag, &rest[..len]);
            return Step::Consumed(len);
        }
        if let Some((depth, tag)) = self.find_opener(piece)
            && !self.closed_later(depth, after)
        {
            while self.stack.len() - 1 > depth {
                self.demote_top();
            }
            self.pop_formatted(tag, piece);
            return Step::Consumed(piece.len());
        }
        if piece.len() > 1 {
            return Step::Shorter(piece.len() - 1);
        }
        self.push_text(piece);
        Step::Consumed(piece.len())
    }

    /// Rule name and suffix length if the front of `run` closes the top frame.
    fn close_top(&self, run: &str) -> Option<(String, usize)> {
        let frame = self.stack.last()?;
        if !matches!(frame.kind, FrameKind::Tag) {
            return None;
        }
        self.rules
            .closing(&frame.delimiter, run)
            .map(|rule| (rule.name.clone(), rule.suffix.len()))
    }

    /// Whether a frame above `depth` can still be closed by `after` (the
    /// rest of the current run) or by a later closing run.
    fn closed_later(&self, depth: usize, after: &str) -> bool {
        let later = &self.closers[self.seen_closers.min(self.closers.len())..];
        self.stack[depth + 1..].iter().any(|frame| {
            self.rules.suffixes_for(&frame.delimiter).any(|suffix| {
                after.contains(suffix) || later.iter().any(|run| run.contains(suffix))
            })
        })
    }

    /// Nearest open frame that `suffix` closes, with the rule's name.
    fn find_opener(&self, suffix: &str) -> Option<(usize, String)> {
        self.stack
            .iter()
            .enumerate()
            .skip(1)
            .rev()
            .find_map(|(depth, frame)| match frame.kind {
                FrameKind::Tag => self
                    .rules
                    .pairing(&frame.delimiter, suffix)
                    .map(|rule| (depth, rule.name.clone())),
                _ => None,
            })
    }

    fn pop_formatted(&mut self, tag: String, suffix: &str) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let parent = self.top();
        if frame.children.is_empty() {
            parent.push_text(&frame.delimiter);
            parent.push_text(suffix);
        } else {
            log::trace!("paired {:?}..{:?} as {tag}", frame.delimiter, suffix);
            parent.push_node(Node::Formatted {
                tag,
                children: frame.children,
            });
        }
    }

    fn pop_prefix_only(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let tag = match &frame.kind {
            FrameKind::PrefixOnly { tag } => tag.clone(),
            _ => {
                self.stack.push(frame);
                return;
            }
        };
        let parent = self.top();
        if frame.children.is_empty() {
            parent.push_text(&frame.delimiter);
        } else {
            parent.push_node(Node::Formatted {
                tag,
                children: frame.children,
            });
        }
    }

    fn end_prefix_only(&mut self) {
        while matches!(self.top().kind, FrameKind::PrefixOnly { .. }) {
            self.pop_prefix_only();
        }
    }

    /// Turns the top frame back into text: its delimiter, then its nodes.
    fn demote_top(&mut self) {
        if self.stack.len() < 2 {
            return;
        }
        let Some(frame) = self.stack.pop() else {
            return;
        };
        log::debug!("unbalanced {:?} demoted to text", frame.delimiter);
        let parent = self.top();
        parent.push_text(&frame.delimiter);
        for child in frame.children {
            parent.push_node(child);
        }
    }

    /// Wraps the word or node just before a suffix-only delimiter.
    fn wrap_trailing(&mut self, tag: String, suffix: &str) {
        let frame = self.top();
        match frame.children.pop() {
            Some(Node::Text(text)) => {
                let start = text.rfind(is_whitespace).map(|at| at + 1).unwrap_or(0);
                let (before, word) = text.split_at(start);
                if word.is_empty() {
                    frame.push_text(&text);
                    frame.push_text(suffix);
                } else {
                    let wrapped = Node::Formatted {
                        tag,
                        children: vec![Node::text(word)],
                    };
                    frame.push_text(before);
                    frame.children.push(wrapped);
                }
            }
            Some(node) => frame.children.push(Node::Formatted {
                tag,
                children: vec![node],
            }),
            None => frame.push_text(suffix),
        }
    }

    fn finish(mut self) -> Vec<Node> {
        self.end_prefix_only();
        while self.stack.len() > 1 {
            self.demote_top();
        }
        self.stack
            .pop()
            .map(|root| root.children)
            .unwrap_or_default()
    }
}
