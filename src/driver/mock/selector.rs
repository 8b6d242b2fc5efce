//! Locator evaluation for the in-memory DOM
//!
//! Covers the CSS and XPath shapes the component layer produces: compound CSS
//! selectors joined by descendant combinators, and single-step XPath
//! expressions with attribute, `contains()` and text predicates.

use super::dom::{MockDom, NodeId};
use crate::driver::locator::By;
use crate::{Error, Result};

/// Evaluate a locator below `scope`, or over the whole document when `None`
pub(crate) fn select(dom: &MockDom, scope: Option<NodeId>, by: &By) -> Result<Vec<NodeId>> {
    if let Some(node) = scope {
        dom.ensure_attached(node)?;
    }

    let candidates = |scope: Option<NodeId>| match scope {
        Some(node) => dom.descendants(node),
        None => {
            let mut all = vec![dom.root()];
            all.extend(dom.descendants(dom.root()));
            all
        }
    };

    let found: Vec<NodeId> = match by {
        By::Id(id) => candidates(scope)
            .into_iter()
            .filter(|n| dom.attr(*n, "id") == Some(id.as_str()))
            .collect(),
        By::ClassName(class) => candidates(scope)
            .into_iter()
            .filter(|n| dom.has_class(*n, class))
            .collect(),
        By::TagName(tag) => candidates(scope)
            .into_iter()
            .filter(|n| dom.tag(*n).map_or(false, |t| t.eq_ignore_ascii_case(tag)))
            .collect(),
        By::Css(selector) => {
            let chain = parse_css(selector)?;
            candidates(scope)
                .into_iter()
                .filter(|n| matches_chain(dom, *n, &chain))
                .collect()
        }
        By::XPath(expression) => {
            let query = parse_xpath(expression)?;
            let base = if query.absolute { None } else { scope };
            candidates(base)
                .into_iter()
                .filter(|n| query.matches(dom, *n))
                .collect()
        }
    };
    Ok(found)
}

#[derive(Debug, Clone, PartialEq)]
enum AttrOp {
    Exists,
    Equals(String),
    Contains(String),
    Prefix(String),
    Suffix(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, AttrOp)>,
}

impl Compound {
    fn matches(&self, dom: &MockDom, node: NodeId) -> bool {
        if let Some(tag) = &self.tag {
            if !dom.tag(node).map_or(false, |t| t.eq_ignore_ascii_case(tag)) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if dom.attr(node, "id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| dom.has_class(node, c)) {
            return false;
        }
        self.attrs.iter().all(|(name, op)| {
            let value = dom.attr(node, name);
            match (op, value) {
                (_, None) => false,
                (AttrOp::Exists, Some(_)) => true,
                (AttrOp::Equals(v), Some(actual)) => actual == v,
                (AttrOp::Contains(v), Some(actual)) => actual.contains(v.as_str()),
                (AttrOp::Prefix(v), Some(actual)) => actual.starts_with(v.as_str()),
                (AttrOp::Suffix(v), Some(actual)) => actual.ends_with(v.as_str()),
            }
        })
    }
}

fn unsupported(kind: &str, selector: &str) -> Error {
    Error::internal(format!("Unsupported {} for mock DOM: {}", kind, selector))
}

fn parse_css(selector: &str) -> Result<Vec<Compound>> {
    let chain: Vec<Compound> = selector
        .split_whitespace()
        .map(|part| parse_compound(part).ok_or_else(|| unsupported("css selector", selector)))
        .collect::<Result<_>>()?;
    if chain.is_empty() {
        return Err(unsupported("css selector", selector));
    }
    Ok(chain)
}

fn parse_compound(part: &str) -> Option<Compound> {
    let mut compound = Compound::default();
    let mut rest = part;

    let tag_end = rest.find(['#', '.', '[']).unwrap_or(rest.len());
    let tag = &rest[..tag_end];
    if !tag.is_empty() && tag != "*" {
        compound.tag = Some(tag.to_string());
    }
    rest = &rest[tag_end..];

    while !rest.is_empty() {
        let marker = rest.chars().next()?;
        rest = &rest[1..];
        match marker {
            '#' | '.' => {
                let end = rest.find(['#', '.', '[']).unwrap_or(rest.len());
                let name = rest[..end].to_string();
                if name.is_empty() {
                    return None;
                }
                if marker == '#' {
                    compound.id = Some(name);
                } else {
                    compound.classes.push(name);
                }
                rest = &rest[end..];
            }
            '[' => {
                let end = rest.find(']')?;
                compound.attrs.push(parse_attr_test(&rest[..end])?);
                rest = &rest[end + 1..];
            }
            _ => return None,
        }
    }
    Some(compound)
}

fn parse_attr_test(body: &str) -> Option<(String, AttrOp)> {
    let ops: [(&str, fn(String) -> AttrOp); 4] = [
        ("*=", AttrOp::Contains),
        ("^=", AttrOp::Prefix),
        ("$=", AttrOp::Suffix),
        ("=", AttrOp::Equals),
    ];
    for (symbol, build) in ops {
        if let Some((name, value)) = body.split_once(symbol) {
            return Some((name.trim().to_string(), build(unquote(value.trim())?)));
        }
    }
    Some((body.trim().to_string(), AttrOp::Exists))
}

fn unquote(value: &str) -> Option<String> {
    let bytes = value.as_bytes();
    match bytes.first() {
        Some(b'\'') | Some(b'"') if value.len() >= 2 && bytes[value.len() - 1] == bytes[0] => {
            Some(value[1..value.len() - 1].to_string())
        }
        Some(b'\'') | Some(b'"') => None,
        _ => Some(value.to_string()),
    }
}

fn matches_chain(dom: &MockDom, node: NodeId, chain: &[Compound]) -> bool {
    let Some((last, ancestors)) = chain.split_last() else {
        return false;
    };
    if !last.matches(dom, node) {
        return false;
    }

    let mut remaining = ancestors.iter().rev().peekable();
    let mut current = dom.parent(node);
    while let Some(compound) = remaining.peek() {
        match current {
            Some(ancestor) => {
                if compound.matches(dom, ancestor) {
                    remaining.next();
                }
                current = dom.parent(ancestor);
            }
            None => return false,
        }
    }
    true
}

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    Attr(String, AttrOp),
    TextEquals(String),
    TextContains(String),
}

#[derive(Debug, Clone, PartialEq)]
struct XPathQuery {
    absolute: bool,
    tag: Option<String>,
    predicates: Vec<Predicate>,
}

impl XPathQuery {
    fn matches(&self, dom: &MockDom, node: NodeId) -> bool {
        if let Some(tag) = &self.tag {
            if !dom.tag(node).map_or(false, |t| t.eq_ignore_ascii_case(tag)) {
                return false;
            }
        }
        self.predicates.iter().all(|predicate| match predicate {
            Predicate::Attr(name, op) => Compound {
                attrs: vec![(name.clone(), op.clone())],
                ..Default::default()
            }
            .matches(dom, node),
            Predicate::TextEquals(v) => dom.own_text(node).trim() == v,
            Predicate::TextContains(v) => dom.own_text(node).contains(v.as_str()),
        })
    }
}

fn parse_xpath(expression: &str) -> Result<XPathQuery> {
    let err = || unsupported("xpath", expression);

    let (absolute, step) = if let Some(rest) = expression.strip_prefix(".//") {
        (false, rest)
    } else if let Some(rest) = expression.strip_prefix("//") {
        (true, rest)
    } else {
        return Err(err());
    };

    let name_end = step.find('[').unwrap_or(step.len());
    let name = step[..name_end].trim();
    if name.is_empty() || name.contains('/') {
        return Err(err());
    }

    let mut predicates = Vec::new();
    let mut rest = &step[name_end..];
    while !rest.is_empty() {
        let body_end = closing_bracket(rest).ok_or_else(err)?;
        for clause in rest[1..body_end].split(" and ") {
            predicates.push(parse_predicate(clause.trim()).ok_or_else(err)?);
        }
        rest = &rest[body_end + 1..];
    }

    Ok(XPathQuery {
        absolute,
        tag: (name != "*").then(|| name.to_string()),
        predicates,
    })
}

/// Index of the `]` closing the predicate that opens at `text[0]`
fn closing_bracket(text: &str) -> Option<usize> {
    if !text.starts_with('[') {
        return None;
    }
    let mut quote: Option<char> = None;
    for (i, ch) in text.char_indices().skip(1) {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'') | (None, '"') => quote = Some(ch),
            (None, ']') => return Some(i),
            _ => {}
        }
    }
    None
}

fn parse_predicate(clause: &str) -> Option<Predicate> {
    if let Some(args) = clause
        .strip_prefix("contains(")
        .and_then(|c| c.strip_suffix(')'))
    {
        let (subject, literal) = args.split_once(',')?;
        let literal = unquote(literal.trim())?;
        let subject = subject.trim();
        return if subject == "text()" || subject == "." {
            Some(Predicate::TextContains(literal))
        } else {
            let name = subject.strip_prefix('@')?;
            Some(Predicate::Attr(name.to_string(), AttrOp::Contains(literal)))
        };
    }

    if let Some((subject, literal)) = clause.split_once('=') {
        let literal = unquote(literal.trim())?;
        let subject = subject.trim();
        return match subject {
            "text()" | "." | "normalize-space()" | "normalize-space(text())" => {
                Some(Predicate::TextEquals(literal))
            }
            _ => {
                let name = subject.strip_prefix('@')?;
                Some(Predicate::Attr(name.to_string(), AttrOp::Equals(literal)))
            }
        };
    }

    let name = clause.strip_prefix('@')?;
    Some(Predicate::Attr(name.to_string(), AttrOp::Exists))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mock::dom::NodeSpec;

    fn fixture() -> (MockDom, NodeId) {
        let mut dom = MockDom::new();
        let table = dom.append(
            dom.root(),
            NodeSpec::new("div").id("taskTable").class("ia_tableComponent").children([
                NodeSpec::new("div")
                    .class("ia_table__cell ia_table__cell--selected")
                    .attr("data-column-id", "area")
                    .child(NodeSpec::new("div").class("content").text("North")),
                NodeSpec::new("div")
                    .class("ia_table__cell")
                    .attr("data-column-id", "line")
                    .child(NodeSpec::new("div").class("content").text("L2")),
            ]),
        );
        dom.append(dom.root(), NodeSpec::new("div").class("ia_table__cell"));
        (dom, table)
    }

    #[test]
    fn test_class_name_matches_whole_tokens_in_scope() {
        let (dom, table) = fixture();
        let cells = dom.find(Some(table), &By::class_name("ia_table__cell")).unwrap();
        assert_eq!(cells.len(), 2);

        let partial = dom.find(Some(table), &By::class_name("ia_table")).unwrap();
        assert!(partial.is_empty());
    }

    #[test]
    fn test_partial_class_xpath_stays_in_scope() {
        let (dom, table) = fixture();
        let found = dom
            .find(Some(table), &By::partial_class_name("cell--sel"))
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(dom.attr(found[0], "data-column-id"), Some("area"));
    }

    #[test]
    fn test_css_descendant_and_attribute() {
        let (dom, _) = fixture();
        let found = dom
            .find(None, &By::css("#taskTable div[data-column-id='line'] .content"))
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(dom.own_text(found[0]), "L2");
    }

    #[test]
    fn test_xpath_text_predicate() {
        let (dom, _) = fixture();
        let found = dom
            .find(None, &By::xpath("//div[@class='content' and text()='North']"))
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_unsupported_xpath_is_reported() {
        let (dom, _) = fixture();
        let result = dom.find(None, &By::xpath("/html/body"));
        assert!(matches!(result, Err(Error::Internal(_))));
    }
}
