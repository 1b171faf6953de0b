// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::xml::Element;

/// Subtree filter for `get-config`, described as slash-separated paths
/// instead of hand-written XML.
///
/// Specs are plain data and deserialize from YAML, e.g.:
///
/// ```yaml
/// type: subtree
/// paths:
///   - path: interfaces/interface
///     matches:
///       - name: ge-0/0/0
///       - name: ge-0/0/1
///   - path: system/services
/// ```
///
/// which selects two specific `<interface>` list entries and the whole
/// `services` subtree in one filter.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[non_exhaustive]
pub struct FilterSpec {
    /// Value of the `type` attribute on `<filter>`, usually `subtree`.
    /// Omitted from the XML when `None`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub filter_type: Option<String>,
    #[serde(default)]
    pub paths: Vec<FilterPath>,
}

/// One selected path. With no `matches` the final path segment becomes a
/// single empty selector node (select-all); with N match entries it
/// becomes N sibling nodes, one per entry, each carrying the entry's
/// key/value pairs as leaf children. That is how multiple distinct
/// instances of a list node are requested in one filter.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[non_exhaustive]
pub struct FilterPath {
    pub path: String,
    // serde_json::Map preserves insertion order, keeping leaf elements in
    // the order the caller wrote them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<Map<String, Value>>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// A spec with `type="subtree"` preset.
    pub fn subtree() -> Self {
        Self {
            filter_type: Some("subtree".to_string()),
            ..Default::default()
        }
    }

    pub fn add_path(
        &mut self,
        path: &str,
        matches: Vec<Map<String, Value>>,
    ) -> &mut Self {
        self.paths.push(FilterPath {
            path: path.to_string(),
            matches,
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Builds the `<filter>` element. Paths sharing a prefix reuse the
    /// already-created intermediate containers instead of duplicating
    /// them (walk-and-reuse).
    pub(crate) fn to_element(&self) -> Element {
        let mut filter = Element::new("filter");
        if let Some(filter_type) = &self.filter_type {
            filter.set_attribute("type", filter_type);
        }
        for path in &self.paths {
            path.build(&mut filter);
        }
        filter
    }
}

impl FilterPath {
    fn build(&self, filter: &mut Element) {
        let segments: Vec<&str> = self
            .path
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        let Some((last, parents)) = segments.split_last() else {
            return;
        };

        let mut cursor = &mut *filter;
        for segment in parents {
            cursor = cursor.child_mut_or_insert(segment);
        }

        if self.matches.is_empty() {
            // Select-all for this subtree.
            cursor.add_child(Element::new(last));
            return;
        }
        for entry in &self.matches {
            let node = cursor.add_child(Element::new(last));
            for (name, value) in entry {
                node.add_child(Element::new_with_text(
                    name,
                    &scalar_to_text(value),
                ));
            }
        }
    }
}

fn scalar_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        v => v.to_string(),
    }
}
