//! Minimal ElementTree-style path expressions.
//!
//! Supported forms: `Name`, `A/B`, `./A`, `.//A/B`, `A//B`, `*` and `.`.

use std::str::FromStr;

use crate::XmlError;

/// How a step walks away from its context node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Direct element children.
    Child,
    /// Any element below the context, in document order.
    Descendant,
}

/// One `/`-separated step of a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub axis: Axis,
    /// Element name, or `*` for any element.
    pub name: String,
}

impl Step {
    pub fn matches(&self, name: &str) -> bool {
        self.name == "*" || self.name == name
    }
}

/// Parsed path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlPath {
    steps: Vec<Step>,
}

impl XmlPath {
    pub fn parse(path: &str) -> Result<Self, XmlError> {
        let invalid = |reason: &str| XmlError::Path {
            path: path.to_string(),
            reason: reason.to_string(),
        };
        if path.is_empty() {
            return Err(invalid("empty path"));
        }
        if path == "." {
            return Ok(XmlPath { steps: Vec::new() });
        }

        let mut rest = match path.strip_prefix('.') {
            Some(tail) if tail.starts_with('/') => tail,
            Some(_) => return Err(invalid("'.' must be followed by '/'")),
            None => path,
        };
        let mut steps = Vec::new();
        while !rest.is_empty() {
            let axis = if let Some(tail) = rest.strip_prefix("//") {
                rest = tail;
                Axis::Descendant
            } else if let Some(tail) = rest.strip_prefix('/') {
                rest = tail;
                Axis::Child
            } else {
                Axis::Child
            };
            let end = rest.find('/').unwrap_or(rest.len());
            let name = &rest[..end];
            if name.is_empty() {
                return Err(invalid("empty step"));
            }
            if name == "." || name == ".." {
                return Err(invalid("relative steps are only allowed as a prefix"));
            }
            steps.push(Step {
                axis,
                name: name.to_string(),
            });
            rest = &rest[end..];
        }
        Ok(XmlPath { steps })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

impl FromStr for XmlPath {
    type Err = XmlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        XmlPath::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axes(path: &str) -> Vec<(Axis, String)> {
        XmlPath::parse(path)
            .expect("parse")
            .steps()
            .iter()
            .map(|step| (step.axis, step.name.clone()))
            .collect()
    }

    #[test]
    fn parses_supported_forms() {
        assert_eq!(
            axes(".//ZoneSettings/ReceivingNote"),
            vec![
                (Axis::Descendant, "ZoneSettings".to_string()),
                (Axis::Child, "ReceivingNote".to_string()),
            ]
        );
        assert_eq!(
            axes("SampleRef/FileRef"),
            vec![
                (Axis::Child, "SampleRef".to_string()),
                (Axis::Child, "FileRef".to_string()),
            ]
        );
        assert_eq!(
            axes("DrumCell//FileRef"),
            vec![
                (Axis::Child, "DrumCell".to_string()),
                (Axis::Descendant, "FileRef".to_string()),
            ]
        );
        assert_eq!(axes("./*"), vec![(Axis::Child, "*".to_string())]);
        assert!(axes(".").is_empty());
    }

    #[test]
    fn rejects_malformed_paths() {
        for bad in ["", "A//", "A/", ".A", "A/../B", "A///B"] {
            assert!(XmlPath::parse(bad).is_err(), "{bad} should be rejected");
        }
    }
}
