//! Tokens passed between the scanner and the assembler, and the final tree.

use serde::Serialize;

use crate::rules::RuleTable;

/// What a scanned token may turn out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    TextNode,
    InlineOpen,
    InlineClose,
}

/// A scanned token. `value` is all text or all markup characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
}

impl Token {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::TextNode,
            value: value.into(),
        }
    }

    pub fn open(value: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::InlineOpen,
            value: value.into(),
        }
    }

    pub fn close(value: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::InlineClose,
            value: value.into(),
        }
    }
}

/// Candidate tokens for one source span, outermost first.
///
/// The scanner never builds an empty group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenGroup {
    candidates: Vec<Token>,
}

impl TokenGroup {
    pub fn new(candidates: Vec<Token>) -> Self {
        debug_assert!(!candidates.is_empty(), "token groups are never empty");
        Self { candidates }
    }

    pub fn single(token: Token) -> Self {
        Self {
            candidates: vec![token],
        }
    }

    pub fn candidates(&self) -> &[Token] {
        &self.candidates
    }

    pub fn into_candidates(self) -> Vec<Token> {
        self.candidates
    }

    /// Kind shared by every candidate in the group.
    pub fn kind(&self) -> TokenKind {
        self.candidates
            .first()
            .map(|t| t.kind)
            .unwrap_or(TokenKind::TextNode)
    }

    pub fn is_ambiguous(&self) -> bool {
        self.candidates.len() > 1
    }

    /// The source characters this group was scanned from.
    pub fn source(&self) -> String {
        self.candidates.iter().map(|t| t.value.as_str()).collect()
    }
}

/// A node of the assembled tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Node {
    /// Literal text, delimiters of unmatched tags included.
    Text(String),
    /// A span wrapped by the rule named `tag`.
    Formatted { tag: String, children: Vec<Node> },
}

impl Node {
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(value.into())
    }

    pub fn formatted(tag: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Formatted {
            tag: tag.into(),
            children,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text),
            Node::Formatted { .. } => None,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            Node::Text(_) => None,
            Node::Formatted { tag, .. } => Some(tag),
        }
    }

    /// Child nodes; empty for text.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Text(_) => &[],
            Node::Formatted { children, .. } => children,
        }
    }

    /// Literal text under this node without any delimiters.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.write_plain(&mut out);
        out
    }

    fn write_plain(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Formatted { children, .. } => {
                for child in children {
                    child.write_plain(out);
                }
            }
        }
    }

    /// Re-renders the node with the delimiters `rules` gives its tag.
    pub fn to_source(&self, rules: &RuleTable) -> String {
        let mut out = String::new();
        self.write_source(rules, &mut out);
        out
    }

    fn write_source(&self, rules: &RuleTable, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Formatted { tag, children } => {
                let rule = rules.get(tag);
                if let Some(rule) = rule {
                    out.push_str(&rule.prefix);
                }
                for child in children {
                    child.write_source(rules, out);
                }
                if let Some(rule) = rule {
                    out.push_str(&rule.suffix);
                }
            }
        }
    }
}

/// Re-renders a whole block; see [`Node::to_source`].
pub fn to_source(nodes: &[Node], rules: &RuleTable) -> String {
    nodes.iter().map(|n| n.to_source(rules)).collect()
}

/// Formats nodes as an indented outline, one node per line.
///
/// ```text
/// TEXT "see "
/// FORMATTED bold
///   TEXT "this"
/// ```
pub fn outline(nodes: &[Node]) -> String {
    let mut out = String::new();
    write_outline(nodes, 0, &mut out);
    out
}

fn write_outline(nodes: &[Node], depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(&format!("{indent}TEXT {text:?}\n")),
            Node::Formatted { tag, children } => {
                out.push_str(&format!("{indent}FORMATTED {tag}\n"));
                write_outline(children, depth + 1, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Rule;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<Node> {
        vec![
            Node::text("see "),
            Node::formatted(
                "bold",
                vec![Node::text("very "), Node::formatted("italic", vec![Node::text("this")])],
            ),
        ]
    }

    #[test]
    fn group_source_concatenates_candidates() {
        let group = TokenGroup::new(vec![Token::open("__"), Token::open("*")]);
        assert_eq!(group.source(), "__*");
        assert_eq!(group.kind(), TokenKind::InlineOpen);
        assert!(group.is_ambiguous());
        assert!(!TokenGroup::single(Token::text("x")).is_ambiguous());
    }

    #[test]
    fn accessors() {
        let nodes = sample();
        assert_eq!(nodes[0].as_text(), Some("see "));
        assert_eq!(nodes[0].tag(), None);
        assert!(nodes[0].children().is_empty());
        assert_eq!(nodes[1].tag(), Some("bold"));
        assert_eq!(nodes[1].children().len(), 2);
    }

    #[test]
    fn plain_text_drops_delimiters() {
        let nodes = sample();
        let text: String = nodes.iter().map(Node::plain_text).collect();
        assert_eq!(text, "see very this");
    }

    #[test]
    fn to_source_restores_delimiters() {
        assert_eq!(to_source(&sample(), &RuleTable::reference()), "see *very /this/*");
    }

    #[test]
    fn to_source_with_one_sided_rule() {
        let rules = RuleTable::new([Rule::new("mention", "-", "")]).unwrap();
        let nodes = vec![Node::formatted("mention", vec![Node::text("alice")])];
        assert_eq!(to_source(&nodes, &rules), "-alice");
    }

    #[test]
    fn outline_indents_children() {
        assert_eq!(
            outline(&sample()),
            "TEXT \"see \"\nFORMATTED bold\n  TEXT \"very \"\n  FORMATTED italic\n    TEXT \"this\"\n"
        );
    }
}
