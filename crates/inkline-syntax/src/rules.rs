//! # Rule Table
//!
//! A rule names a formatting tag and the delimiters that open and close it.
//! The table keeps rules in declaration order: when two rules could match the
//! same run, the one declared first wins, so parses are reproducible no
//! matter where the table came from.
//!
//! ## Rule Shapes
//!
//! | prefix | suffix | shape |
//! |--------|--------|-------|
//! | `*` | `*` | wrapping |
//! | `/-` | `-/` | paired |
//! | `-` | (empty) | prefix-only |
//! | (empty) | `-` | suffix-only |
//!
//! ## The Formatting Paradox
//!
//! A sequence that wraps (`*foo*`) may not also be a one-sided tag (`*foo`).
//! If both existed, `**foo*` could mean either, so construction rejects the
//! table instead of leaving the choice to the parser.

use serde::{Deserialize, Serialize};

use crate::error::RuleError;
use crate::lexer::is_markup_char;

/// A named tag with its opening and closing delimiters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub suffix: String,
}

/// How a rule's delimiters relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleShape {
    Wrapping,
    Paired,
    PrefixOnly,
    SuffixOnly,
    Empty,
}

/// Which side of a rule a run is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Prefix,
    Suffix,
}

impl Delimiter {
    /// Returns this side's delimiter of `rule`.
    pub fn of(self, rule: &Rule) -> &str {
        match self {
            Delimiter::Prefix => &rule.prefix,
            Delimiter::Suffix => &rule.suffix,
        }
    }
}

impl Rule {
    pub fn new(
        name: impl Into<String>,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    /// A rule opened and closed by the same delimiter.
    pub fn wrapping(name: impl Into<String>, delimiter: impl Into<String>) -> Self {
        let delimiter = delimiter.into();
        Self::new(name, delimiter.clone(), delimiter)
    }

    pub fn shape(&self) -> RuleShape {
        match (self.prefix.is_empty(), self.suffix.is_empty()) {
            (true, true) => RuleShape::Empty,
            (false, true) => RuleShape::PrefixOnly,
            (true, false) => RuleShape::SuffixOnly,
            (false, false) if self.prefix == self.suffix => RuleShape::Wrapping,
            (false, false) => RuleShape::Paired,
        }
    }
}

/// Validated, ordered set of rules.
///
/// Immutable once built; share one table between any number of parses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    /// Validates `rules` and keeps them in the order given.
    pub fn new(rules: impl IntoIterator<Item = Rule>) -> Result<Self, RuleError> {
        let rules: Vec<Rule> = rules.into_iter().collect();

        for (index, rule) in rules.iter().enumerate() {
            check_rule(rule)?;
            if rules[..index].iter().any(|r| r.name == rule.name) {
                return Err(RuleError::DuplicateRule {
                    name: rule.name.clone(),
                });
            }
        }
        check_paradox(&rules)?;
        check_ambiguity(&rules)?;

        Ok(Self { rules })
    }

    /// The reference dialect: bold, italic, underline, strikethrough and code.
    pub fn reference() -> Self {
        Self {
            rules: vec![
                Rule::wrapping("bold", "*"),
                Rule::wrapping("italic", "/"),
                Rule::wrapping("underline", "_"),
                Rule::wrapping("strikethrough", "-"),
                Rule::wrapping("code", "`"),
            ],
        }
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Rules in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns `true` if some rule's `side` delimiter is exactly `sequence`.
    pub fn matches(&self, sequence: &str, side: Delimiter) -> bool {
        !sequence.is_empty() && self.rules.iter().any(|r| side.of(r) == sequence)
    }

    /// The prefix-only rule opened by `sequence`, if any.
    pub fn prefix_only(&self, sequence: &str) -> Option<&Rule> {
        self.rules
            .iter()
            .find(|r| r.shape() == RuleShape::PrefixOnly && r.prefix == sequence)
    }

    /// The suffix-only rule closed by `sequence`, if any.
    pub fn suffix_only(&self, sequence: &str) -> Option<&Rule> {
        self.rules
            .iter()
            .find(|r| r.shape() == RuleShape::SuffixOnly && r.suffix == sequence)
    }

    /// The first rule opened by `prefix` and closed by `suffix`.
    pub fn pairing(&self, prefix: &str, suffix: &str) -> Option<&Rule> {
        if prefix.is_empty() || suffix.is_empty() {
            return None;
        }
        self.rules
            .iter()
            .find(|r| r.prefix == prefix && r.suffix == suffix)
    }

    /// The rule opened by `prefix` whose suffix begins `run`.
    ///
    /// Longer suffixes win; declaration order breaks ties.
    pub fn closing(&self, prefix: &str, run: &str) -> Option<&Rule> {
        if prefix.is_empty() {
            return None;
        }
        self.rules
            .iter()
            .filter(|r| r.prefix == prefix && !r.suffix.is_empty())
            .filter(|r| run.starts_with(r.suffix.as_str()))
            .fold(None, |best: Option<&Rule>, rule| match best {
                Some(best) if best.suffix.len() >= rule.suffix.len() => Some(best),
                _ => Some(rule),
            })
    }

    /// Suffixes that close a tag opened by `prefix`.
    pub fn suffixes_for<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.rules
            .iter()
            .filter(move |r| !prefix.is_empty() && r.prefix == prefix && !r.suffix.is_empty())
            .map(|r| r.suffix.as_str())
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::reference()
    }
}

impl<'a> IntoIterator for &'a RuleTable {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn check_rule(rule: &Rule) -> Result<(), RuleError> {
    if rule.shape() == RuleShape::Empty {
        return Err(RuleError::EmptyRule {
            name: rule.name.clone(),
        });
    }
    for delimiter in [&rule.prefix, &rule.suffix] {
        if let Some(found) = delimiter.chars().find(|c| !is_markup_char(*c)) {
            return Err(RuleError::InvalidDelimiter {
                name: rule.name.clone(),
                delimiter: delimiter.clone(),
                found,
            });
        }
    }
    Ok(())
}

/// A one-sided rule's delimiter must not also be a wrapping delimiter.
fn check_paradox(rules: &[Rule]) -> Result<(), RuleError> {
    for one_sided in rules {
        let sequence = match one_sided.shape() {
            RuleShape::PrefixOnly => &one_sided.prefix,
            RuleShape::SuffixOnly => &one_sided.suffix,
            _ => continue,
        };
        if let Some(wrapping) = rules
            .iter()
            .find(|r| r.shape() == RuleShape::Wrapping && &r.prefix == sequence)
        {
            return Err(RuleError::RuleConflict {
                sequence: sequence.clone(),
                wrapping: wrapping.name.clone(),
                one_sided: one_sided.name.clone(),
            });
        }
    }
    Ok(())
}

/// A prefix-only prefix opens nothing else; a suffix-only suffix closes
/// nothing else. The two one-sided kinds may share a sequence.
fn check_ambiguity(rules: &[Rule]) -> Result<(), RuleError> {
    for (index, one_sided) in rules.iter().enumerate() {
        let side = match one_sided.shape() {
            RuleShape::PrefixOnly => Delimiter::Prefix,
            RuleShape::SuffixOnly => Delimiter::Suffix,
            _ => continue,
        };
        let sequence = side.of(one_sided);
        let clash = rules
            .iter()
            .enumerate()
            .find(|(other, r)| *other != index && side.of(r) == sequence);
        if let Some((other, rule)) = clash {
            let (first, second) = if other < index {
                (rule, one_sided)
            } else {
                (one_sided, rule)
            };
            return Err(RuleError::AmbiguousDelimiter {
                sequence: sequence.to_string(),
                first: first.name.clone(),
                second: second.name.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(Rule::wrapping("bold", "*"), RuleShape::Wrapping)]
    #[case(Rule::new("aside", "/-", "-/"), RuleShape::Paired)]
    #[case(Rule::new("mention", "-", ""), RuleShape::PrefixOnly)]
    #[case(Rule::new("footnote", "", "-"), RuleShape::SuffixOnly)]
    #[case(Rule::new("nothing", "", ""), RuleShape::Empty)]
    fn rule_shapes(#[case] rule: Rule, #[case] expected: RuleShape) {
        assert_eq!(rule.shape(), expected);
    }

    #[test]
    fn reference_table_is_valid() {
        let rules: Vec<Rule> = RuleTable::reference().iter().cloned().collect();
        assert_eq!(RuleTable::new(rules).unwrap(), RuleTable::reference());
    }

    #[test]
    fn iteration_keeps_declaration_order() {
        let table = RuleTable::new([
            Rule::wrapping("z", "_"),
            Rule::wrapping("a", "__"),
            Rule::wrapping("m", "*"),
        ])
        .unwrap();
        let names: Vec<&str> = table.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn lookup_by_name() {
        let table = RuleTable::reference();
        assert_eq!(table.get("code"), Some(&Rule::wrapping("code", "`")));
        assert_eq!(table.get("missing"), None);
    }

    #[test]
    fn wrapping_and_prefix_only_is_a_paradox() {
        let err = RuleTable::new([Rule::wrapping("bold", "*"), Rule::new("star", "*", "")])
            .unwrap_err();
        assert_eq!(
            err,
            RuleError::RuleConflict {
                sequence: "*".into(),
                wrapping: "bold".into(),
                one_sided: "star".into(),
            }
        );
    }

    #[test]
    fn wrapping_and_suffix_only_is_a_paradox() {
        let err = RuleTable::new([Rule::new("tail", "", "_"), Rule::wrapping("underline", "_")])
            .unwrap_err();
        assert!(matches!(err, RuleError::RuleConflict { .. }));
    }

    #[test]
    fn prefix_only_and_suffix_only_may_share_a_sequence() {
        let table =
            RuleTable::new([Rule::new("mention", "-", ""), Rule::new("footnote", "", "-")])
                .unwrap();
        assert_eq!(table.prefix_only("-").map(|r| r.name.as_str()), Some("mention"));
        assert_eq!(table.suffix_only("-").map(|r| r.name.as_str()), Some("footnote"));
    }

    #[test]
    fn prefix_only_shared_with_paired_prefix_is_ambiguous() {
        let err = RuleTable::new([Rule::new("aside", "/", "-"), Rule::new("mention", "/", "")])
            .unwrap_err();
        assert_eq!(
            err,
            RuleError::AmbiguousDelimiter {
                sequence: "/".into(),
                first: "aside".into(),
                second: "mention".into(),
            }
        );
    }

    #[test]
    fn empty_rule_is_rejected() {
        let err = RuleTable::new([Rule::new("nothing", "", "")]).unwrap_err();
        assert_eq!(
            err,
            RuleError::EmptyRule {
                name: "nothing".into()
            }
        );
    }

    #[test]
    fn non_markup_delimiter_is_rejected() {
        let err = RuleTable::new([Rule::wrapping("hash", "#")]).unwrap_err();
        assert_eq!(
            err,
            RuleError::InvalidDelimiter {
                name: "hash".into(),
                delimiter: "#".into(),
                found: '#',
            }
        );
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err =
            RuleTable::new([Rule::wrapping("bold", "*"), Rule::wrapping("bold", "**")]).unwrap_err();
        assert_eq!(
            err,
            RuleError::DuplicateRule {
                name: "bold".into()
            }
        );
    }

    #[test]
    fn pairing_prefers_declaration_order() {
        let table = RuleTable::new([
            Rule::wrapping("strong", "*"),
            Rule::wrapping("bold", "*"),
        ])
        .unwrap();
        assert_eq!(table.pairing("*", "*").map(|r| r.name.as_str()), Some("strong"));
        assert_eq!(table.pairing("*", ""), None);
    }

    #[test]
    fn closing_prefers_the_longest_suffix_at_the_front() {
        let table = RuleTable::new([
            Rule::new("short", "/-", "-"),
            Rule::new("long", "/-", "-/"),
            Rule::wrapping("italic", "/"),
        ])
        .unwrap();
        assert_eq!(table.closing("/-", "-/ x").map(|r| r.name.as_str()), Some("long"));
        assert_eq!(table.closing("/-", "-*").map(|r| r.name.as_str()), Some("short"));
        assert_eq!(table.closing("/", "-/"), None);
        assert_eq!(table.closing("", "-"), None);
        assert_eq!(table.suffixes_for("/-").collect::<Vec<_>>(), vec!["-", "-/"]);
    }

    #[test]
    fn matches_checks_the_requested_side() {
        let table = RuleTable::new([Rule::new("aside", "/-", "-/")]).unwrap();
        assert!(table.matches("/-", Delimiter::Prefix));
        assert!(!table.matches("/-", Delimiter::Suffix));
        assert!(table.matches("-/", Delimiter::Suffix));
        assert!(!table.matches("", Delimiter::Prefix));
    }
}
