use std::path::PathBuf;

use panos_xml::{parse, parse_file, write, write_file, XmlNode};
use pretty_assertions::assert_eq;

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

#[test]
fn parse_write_parse_round_trip_preserves_tree_shape() {
    let first = parse_file(&fixture("fixtures/panorama-running.xml"))
        .expect("initial parse should succeed");

    let written = write(&first).expect("write should succeed");
    let second = parse(&written).expect("re-parse should succeed");

    assert_eq!(first, second);
}

#[test]
fn write_file_replaces_document_and_keeps_appended_entry() {
    let out_dir = tempfile::tempdir().expect("tempdir should be created");
    let out_path = out_dir.path().join("running.xml");

    let mut node = parse_file(&fixture("fixtures/firewall-running.xml")).expect("parse");
    write_file(&node, &out_path).expect("first write");

    let mut rule = XmlNode::entry("appended");
    rule.children.push(XmlNode::member_list("from", ["trust"]));
    rule.children.push(XmlNode::with_text("action", "deny"));
    node.ensure_path_mut(&["shared", "rulebase", "security", "rules"])
        .children
        .push(rule);
    write_file(&node, &out_path).expect("second write");

    let reparsed = parse_file(&out_path).expect("parse_file should succeed");
    assert_eq!(node, reparsed);
    assert!(!out_dir.path().join("running.xml.tmp").exists());
}

#[test]
fn element_text_is_written_back_verbatim() {
    let out_dir = tempfile::tempdir().expect("tempdir should be created");
    let out_path = out_dir.path().join("running.xml");
    let node = parse(
        br#"<config><shared><address><entry name="web">
            <ip-netmask>10.0.0.0/24</ip-netmask>
            <description>  indented note  </description>
        </entry></address></shared></config>"#,
    )
    .expect("parse");

    write_file(&node, &out_path).expect("write");

    let written = std::fs::read_to_string(&out_path).expect("read");
    assert!(written.contains("<description>  indented note  </description>"));
    assert_eq!(parse_file(&out_path).expect("reparse"), node);
}
