//! XML to JSON rendering in the attribute-prefixed style used by PAN-OS
//! tooling (`@name` for attributes, `#text` for mixed text).
//!
//! Rules for an element:
//! - no attributes and no children: its text as a string, or `null`
//! - otherwise an object; attributes become `@key`, text becomes `#text`
//! - repeated child tags collapse into an array in document order

use serde_json::{Map, Value};

use crate::tree::XmlNode;

/// Render `node` as `{ "<tag>": <body> }`.
pub fn to_json(node: &XmlNode) -> Value {
    let mut root = Map::new();
    root.insert(node.tag.clone(), element_body(node));
    Value::Object(root)
}

fn element_body(node: &XmlNode) -> Value {
    if node.attributes.is_empty() && node.children.is_empty() {
        return text_of(node).map_or(Value::Null, Value::String);
    }

    let mut body = Map::new();
    for (key, value) in &node.attributes {
        body.insert(format!("@{key}"), Value::String(value.clone()));
    }

    for child in &node.children {
        let value = element_body(child);
        match body.get_mut(&child.tag) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                body.insert(child.tag.clone(), value);
            }
        }
    }

    if let Some(text) = text_of(node) {
        body.insert("#text".to_string(), Value::String(text));
    }
    Value::Object(body)
}

/// Text with surrounding whitespace stripped; blank text counts as none.
fn text_of(node: &XmlNode) -> Option<String> {
    node.text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::to_json;
    use crate::parse;

    #[test]
    fn renders_entries_members_and_attributes() {
        let node = parse(
            br#"<rules>
                <entry name="web">
                  <from><member>trust</member></from>
                  <to><member>untrust</member><member>dmz</member></to>
                  <action> allow </action>
                  <disabled/>
                </entry>
            </rules>"#,
        )
        .expect("parse");

        assert_eq!(
            to_json(&node),
            json!({
                "rules": {
                    "entry": {
                        "@name": "web",
                        "from": { "member": "trust" },
                        "to": { "member": ["untrust", "dmz"] },
                        "action": "allow",
                        "disabled": null
                    }
                }
            })
        );
    }

    #[test]
    fn repeated_entries_become_array() {
        let node = parse(br#"<rules><entry name="a"/><entry name="b"/><entry name="c"/></rules>"#)
            .expect("parse");
        let value = to_json(&node);
        let entries = value["rules"]["entry"].as_array().expect("array");
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2]["@name"], "c");
    }
}
