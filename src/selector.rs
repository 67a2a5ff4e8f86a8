use crate::dom::{Dom, NodeId, class_tokens};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SelectorAttrCondition {
    Exists { key: String },
    Eq { key: String, value: String },
    StartsWith { key: String, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SelectorStep {
    pub(crate) tag: Option<String>,
    pub(crate) id: Option<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) attrs: Vec<SelectorAttrCondition>,
}

impl SelectorStep {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attrs.is_empty()
    }
}

/// Parse a selector list into groups of descendant-combined compound steps.
///
/// Supported syntax: tag, `#id`, `.class`, `[attr]`, `[attr=value]`,
/// `[attr^=value]`, compounds of those, the descendant combinator, and
/// comma-separated groups. Anything else is an `UnsupportedSelector` error.
pub(crate) fn parse_selector_groups(selector: &str) -> Result<Vec<Vec<SelectorStep>>> {
    let trimmed = selector.trim();
    if trimmed.is_empty() {
        return Err(Error::UnsupportedSelector(selector.to_string()));
    }

    let mut groups = Vec::new();
    for group in trimmed.split(',') {
        let group = group.trim();
        if group.is_empty() {
            return Err(Error::UnsupportedSelector(selector.to_string()));
        }
        let mut steps = Vec::new();
        for compound in group.split_ascii_whitespace() {
            steps.push(parse_compound(selector, compound)?);
        }
        groups.push(steps);
    }
    Ok(groups)
}

fn parse_compound(full: &str, compound: &str) -> Result<SelectorStep> {
    let mut step = SelectorStep::default();
    let chars: Vec<char> = compound.chars().collect();
    let mut i = 0usize;

    while i < chars.len() {
        match chars[i] {
            '#' => {
                let (name, next) = read_name(&chars, i + 1);
                if name.is_empty() {
                    return Err(Error::UnsupportedSelector(full.to_string()));
                }
                step.id = Some(name);
                i = next;
            }
            '.' => {
                let (name, next) = read_name(&chars, i + 1);
                if name.is_empty() {
                    return Err(Error::UnsupportedSelector(full.to_string()));
                }
                step.classes.push(name);
                i = next;
            }
            '[' => {
                let close = chars[i..]
                    .iter()
                    .position(|ch| *ch == ']')
                    .map(|offset| i + offset)
                    .ok_or_else(|| Error::UnsupportedSelector(full.to_string()))?;
                let body: String = chars[i + 1..close].iter().collect();
                step.attrs.push(parse_attr_condition(full, &body)?);
                i = close + 1;
            }
            ch if ch.is_ascii_alphanumeric() || ch == '-' || ch == '*' => {
                let (name, next) = read_name(&chars, i);
                if step.tag.is_some() || name.is_empty() {
                    return Err(Error::UnsupportedSelector(full.to_string()));
                }
                if name != "*" {
                    step.tag = Some(name.to_ascii_lowercase());
                }
                i = next;
            }
            _ => return Err(Error::UnsupportedSelector(full.to_string())),
        }
    }

    if step.is_empty() {
        return Err(Error::UnsupportedSelector(full.to_string()));
    }
    Ok(step)
}

fn read_name(chars: &[char], from: usize) -> (String, usize) {
    let mut i = from;
    let mut name = String::new();
    if chars.get(i) == Some(&'*') {
        return ("*".to_string(), i + 1);
    }
    while i < chars.len() {
        let ch = chars[i];
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
            name.push(ch);
            i += 1;
        } else {
            break;
        }
    }
    (name, i)
}

fn parse_attr_condition(full: &str, body: &str) -> Result<SelectorAttrCondition> {
    let body = body.trim();
    if let Some((key, raw_value)) = body.split_once("^=") {
        return Ok(SelectorAttrCondition::StartsWith {
            key: key.trim().to_ascii_lowercase(),
            value: unquote(raw_value),
        });
    }
    if let Some((key, raw_value)) = body.split_once('=') {
        return Ok(SelectorAttrCondition::Eq {
            key: key.trim().to_ascii_lowercase(),
            value: unquote(raw_value),
        });
    }
    if body.is_empty() {
        return Err(Error::UnsupportedSelector(full.to_string()));
    }
    Ok(SelectorAttrCondition::Exists {
        key: body.to_ascii_lowercase(),
    })
}

fn unquote(raw: &str) -> String {
    let raw = raw.trim();
    raw.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .or_else(|| {
            raw.strip_prefix('\'')
                .and_then(|rest| rest.strip_suffix('\''))
        })
        .unwrap_or(raw)
        .to_string()
}

impl Dom {
    pub(crate) fn matches_selector_chain(&self, node_id: NodeId, steps: &[SelectorStep]) -> bool {
        let Some((last, ancestors)) = steps.split_last() else {
            return false;
        };
        if !self.matches_step(node_id, last) {
            return false;
        }

        // Remaining steps must match strictly higher ancestors, right to
        // left (descendant combinator).
        let mut cursor = self.parent(node_id);
        for step in ancestors.iter().rev() {
            loop {
                let Some(current) = cursor else {
                    return false;
                };
                cursor = self.parent(current);
                if self.matches_step(current, step) {
                    break;
                }
            }
        }
        true
    }

    fn matches_step(&self, node_id: NodeId, step: &SelectorStep) -> bool {
        let Some(element) = self.element(node_id) else {
            return false;
        };

        if let Some(tag) = &step.tag {
            if !element.tag_name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        if let Some(id) = &step.id {
            if element.attrs.get("id") != Some(id) {
                return false;
            }
        }

        if !step.classes.is_empty() {
            let names = class_tokens(element.attrs.get("class").map(String::as_str));
            if !step
                .classes
                .iter()
                .all(|class| names.iter().any(|name| name == class))
            {
                return false;
            }
        }

        step.attrs.iter().all(|condition| match condition {
            SelectorAttrCondition::Exists { key } => element.attrs.contains_key(key),
            SelectorAttrCondition::Eq { key, value } => {
                element.attrs.get(key).map(String::as_str) == Some(value.as_str())
            }
            SelectorAttrCondition::StartsWith { key, value } => element
                .attrs
                .get(key)
                .is_some_and(|attr| attr.starts_with(value)),
        })
    }
}
