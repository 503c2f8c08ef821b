//! PAN-OS XML API response envelope.
//!
//! The management API wraps every payload as
//! `<response status="success|error"><result>...</result></response>`.
//! Configuration exported through the API keeps that wrapper, so callers that
//! accept saved API output unwrap it here first.

use thiserror::Error;

use crate::tree::XmlNode;

/// Error reported by the device inside a `status="error"` envelope.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The device rejected the request; message text is passed through as-is.
    #[error("{message}")]
    Rejected {
        message: String,
        code: Option<String>,
    },
    /// A success envelope carried no `<result>` element.
    #[error("response envelope has no result element")]
    MissingResult,
}

/// Unwrap a response envelope, returning the payload root.
///
/// Documents that are not wrapped in `<response>` are returned unchanged.
/// For a success envelope the payload is the single element child of
/// `<result>`, or `<result>` itself when it holds several elements.
pub fn unwrap_response(root: XmlNode) -> Result<XmlNode, ApiError> {
    if root.tag != "response" {
        return Ok(root);
    }

    let status = root.attributes.get("status").map(String::as_str);
    if status == Some("error") {
        return Err(ApiError::Rejected {
            message: error_message(&root),
            code: root.attributes.get("code").cloned(),
        });
    }

    let mut result = root
        .children
        .into_iter()
        .find(|c| c.tag == "result")
        .ok_or(ApiError::MissingResult)?;
    if result.children.len() == 1 {
        return Ok(result.children.remove(0));
    }
    Ok(result)
}

/// Collect `<msg>` text, including multi-line `<msg><line>..</line></msg>` bodies.
fn error_message(root: &XmlNode) -> String {
    let mut lines = Vec::new();
    collect_msg(root, &mut lines);
    if lines.is_empty() {
        return "request failed without a message".to_string();
    }
    lines.join(" ")
}

fn collect_msg(node: &XmlNode, out: &mut Vec<String>) {
    for child in &node.children {
        match child.tag.as_str() {
            "msg" | "line" => {
                if let Some(text) = child.text.as_deref().map(str::trim) {
                    out.push(text.to_string());
                }
                collect_msg(child, out);
            }
            _ => collect_msg(child, out),
        }
    }
}
