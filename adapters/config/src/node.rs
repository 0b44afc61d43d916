//! Brace-delimited node text parser.

use thiserror::Error;

/// Errors reported while parsing node text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A closing brace appeared with no node open.
    #[error("unbalanced closing brace on line {line}")]
    UnbalancedBrace {
        /// One-based source line of the brace.
        line: usize,
    },
    /// An opening brace appeared with no node name before it.
    #[error("opening brace without a node name on line {line}")]
    AnonymousNode {
        /// One-based source line of the brace.
        line: usize,
    },
    /// A node name was declared but never opened.
    #[error("node `{name}` declared on line {line} has no opening brace")]
    MissingBody {
        /// Declared node name.
        name: String,
        /// One-based source line of the declaration.
        line: usize,
    },
    /// A `key = value` line appeared outside any node.
    #[error("value outside of any node on line {line}")]
    ValueOutsideNode {
        /// One-based source line of the value.
        line: usize,
    },
    /// The text ended while a node was still open.
    #[error("node `{name}` is never closed")]
    UnclosedNode {
        /// Name of the still-open node.
        name: String,
    },
}

/// One named node holding `key = value` pairs and child nodes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigNode {
    name: String,
    values: Vec<(String, String)>,
    children: Vec<ConfigNode>,
}

impl ConfigNode {
    /// Parses node text into its top-level nodes.
    ///
    /// Blank lines and `//` comment lines are skipped. The opening brace may
    /// share a line with the node name or follow on the next line.
    pub fn parse(text: &str) -> Result<Vec<ConfigNode>, ConfigError> {
        let mut roots: Vec<ConfigNode> = Vec::new();
        let mut stack: Vec<ConfigNode> = Vec::new();
        let mut pending: Option<(String, usize)> = None;

        for (index, raw) in text.lines().enumerate() {
            let lineno = index + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                if let Some((name, declared)) = pending.take() {
                    return Err(ConfigError::MissingBody {
                        name,
                        line: declared,
                    });
                }
                let Some(open) = stack.last_mut() else {
                    return Err(ConfigError::ValueOutsideNode { line: lineno });
                };
                open.values
                    .push((key.trim().to_owned(), value.trim().to_owned()));
                continue;
            }
            if line == "{" {
                let Some((name, _)) = pending.take() else {
                    return Err(ConfigError::AnonymousNode { line: lineno });
                };
                stack.push(ConfigNode {
                    name,
                    values: Vec::new(),
                    children: Vec::new(),
                });
                continue;
            }
            if line == "}" {
                let Some(closed) = stack.pop() else {
                    return Err(ConfigError::UnbalancedBrace { line: lineno });
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(closed),
                    None => roots.push(closed),
                }
                continue;
            }
            if let Some((name, declared)) = pending.take() {
                return Err(ConfigError::MissingBody {
                    name,
                    line: declared,
                });
            }
            // A bare name, optionally with the brace on the same line.
            match line.strip_suffix('{') {
                Some(name) => stack.push(ConfigNode {
                    name: name.trim().to_owned(),
                    values: Vec::new(),
                    children: Vec::new(),
                }),
                None => pending = Some((line.to_owned(), lineno)),
            }
        }

        if let Some((name, declared)) = pending {
            return Err(ConfigError::MissingBody {
                name,
                line: declared,
            });
        }
        if let Some(open) = stack.pop() {
            return Err(ConfigError::UnclosedNode { name: open.name });
        }
        Ok(roots)
    }

    /// Node name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// First value stored under the key, if any.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(stored, _)| stored == key)
            .map(|(_, value)| value.as_str())
    }

    /// All values stored under the key, in declaration order.
    pub fn values_of<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> {
        self.values
            .iter()
            .filter(move |(stored, _)| stored == key)
            .map(|(_, value)| value.as_str())
    }

    /// All child nodes with the given name, in declaration order.
    pub fn nodes<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ConfigNode> {
        self.children.iter().filter(move |child| child.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_nodes_and_values() {
        let text = "
TASK_EXPERIMENT
{
    experimentID = thermalScan
    name = Thermal Scan

    DETAIL
    {
        generic = first
        generic = second
    }
}
";
        let roots = ConfigNode::parse(text).unwrap();
        assert_eq!(roots.len(), 1);
        let node = &roots[0];
        assert_eq!(node.name(), "TASK_EXPERIMENT");
        assert_eq!(node.value("experimentID"), Some("thermalScan"));
        assert_eq!(node.value("name"), Some("Thermal Scan"));
        assert_eq!(node.value("missing"), None);
        let detail = node.nodes("DETAIL").next().unwrap();
        let generics: Vec<&str> = detail.values_of("generic").collect();
        assert_eq!(generics, vec!["first", "second"]);
    }

    #[test]
    fn accepts_brace_on_the_name_line() {
        let roots = ConfigNode::parse("SETTINGS {\n  key = 1\n}\n").unwrap();
        assert_eq!(roots[0].name(), "SETTINGS");
        assert_eq!(roots[0].value("key"), Some("1"));
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let roots = ConfigNode::parse("// header\n\nA\n{\n  // inner\n  k = v\n}\n").unwrap();
        assert_eq!(roots[0].value("k"), Some("v"));
    }

    #[test]
    fn parses_several_top_level_nodes() {
        let roots = ConfigNode::parse("A\n{\n}\nB\n{\n}\n").unwrap();
        let names: Vec<&str> = roots.iter().map(ConfigNode::name).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn rejects_stray_closing_brace() {
        assert_eq!(
            ConfigNode::parse("}\n"),
            Err(ConfigError::UnbalancedBrace { line: 1 })
        );
    }

    #[test]
    fn rejects_value_outside_any_node() {
        assert_eq!(
            ConfigNode::parse("key = value\n"),
            Err(ConfigError::ValueOutsideNode { line: 1 })
        );
    }

    #[test]
    fn rejects_unclosed_node() {
        assert_eq!(
            ConfigNode::parse("A\n{\n  k = v\n"),
            Err(ConfigError::UnclosedNode {
                name: "A".to_owned()
            })
        );
    }

    #[test]
    fn rejects_name_without_body() {
        assert_eq!(
            ConfigNode::parse("A\nk = v\n"),
            Err(ConfigError::MissingBody {
                name: "A".to_owned(),
                line: 1,
            })
        );
    }

    #[test]
    fn rejects_anonymous_brace() {
        assert_eq!(
            ConfigNode::parse("{\n}\n"),
            Err(ConfigError::AnonymousNode { line: 1 })
        );
    }
}
