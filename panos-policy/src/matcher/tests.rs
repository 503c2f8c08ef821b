use std::net::IpAddr;

use panos_xml::parse;

use super::service::port_in_service;
use super::{addresses_contain, rule_matches, services_contain, Criteria, PortQuery};
use crate::error::PolicyError;
use crate::objects::{
    AddressGroup, AddressKind, AddressObject, Protocol, ServiceGroup, ServiceObject, Side, Tag,
};
use crate::rule::{RuleSpec, SecurityRule};
use crate::scope::{ObjectScope, ScopeChain};

fn ip(s: &str) -> IpAddr {
    s.parse().expect("ip")
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn tcp(port: &str) -> PortQuery {
    PortQuery::new(port, Protocol::Tcp).expect("port")
}

fn udp(port: &str) -> PortQuery {
    PortQuery::new(port, Protocol::Udp).expect("port")
}

fn web_service() -> ServiceObject {
    ServiceObject {
        name: "svc-web".to_string(),
        protocol: Protocol::Tcp,
        destination_port: "443,8000-8100".to_string(),
        source_port: None,
        description: None,
    }
}

fn dns_service() -> ServiceObject {
    ServiceObject {
        name: "svc-dns".to_string(),
        protocol: Protocol::Udp,
        destination_port: "53".to_string(),
        source_port: Some("1024-65535".to_string()),
        description: None,
    }
}

fn address(name: &str, kind: AddressKind) -> AddressObject {
    AddressObject {
        name: name.to_string(),
        kind,
        description: None,
        tags: Vec::new(),
    }
}

fn global_scope() -> ObjectScope {
    let mut scope = ObjectScope::new("global");
    scope.add_address(address(
        "web-servers",
        AddressKind::IpNetmask("10.0.0.0/24".to_string()),
    ));
    scope.add_address(address(
        "dhcp-pool",
        AddressKind::IpRange("10.0.0.10-10.0.0.20".to_string()),
    ));
    scope.add_address_group(AddressGroup {
        name: "only-web".to_string(),
        static_members: strings(&["web-servers"]),
        dynamic_filter: None,
    });
    scope.add_address_group(AddressGroup {
        name: "outer".to_string(),
        static_members: strings(&["only-web"]),
        dynamic_filter: None,
    });
    scope.add_address_group(AddressGroup {
        name: "loop".to_string(),
        static_members: strings(&["loop", "missing"]),
        dynamic_filter: None,
    });
    scope.add_service(web_service());
    scope.add_service(dns_service());
    scope.add_service_group(ServiceGroup {
        name: "sg-web".to_string(),
        members: strings(&["svc-web"]),
    });
    scope.add_tag(Tag {
        name: "web".to_string(),
        color: None,
        comments: None,
    });
    scope
}

fn chain() -> ScopeChain {
    ScopeChain::new(vec![global_scope()])
}

fn rule(configure: impl FnOnce(&mut RuleSpec)) -> SecurityRule {
    let mut spec = RuleSpec::new("r");
    configure(&mut spec);
    spec.build().expect("rule")
}

#[test]
fn any_address_matches_every_ip() {
    let scopes = chain();
    for query in ["10.0.0.1", "203.0.113.9", "::1"] {
        assert!(addresses_contain(&strings(&["any"]), ip(query), &scopes));
    }
}

#[test]
fn netmask_object_containment() {
    let scopes = chain();
    let tokens = strings(&["web-servers"]);
    assert!(addresses_contain(&tokens, ip("10.0.0.5"), &scopes));
    assert!(!addresses_contain(&tokens, ip("10.0.1.5"), &scopes));
}

#[test]
fn range_object_bounds_are_exclusive() {
    let scopes = chain();
    let tokens = strings(&["dhcp-pool"]);
    assert!(!addresses_contain(&tokens, ip("10.0.0.10"), &scopes));
    assert!(addresses_contain(&tokens, ip("10.0.0.15"), &scopes));
}

#[test]
fn single_member_group_agrees_with_its_member() {
    let scopes = chain();
    for query in ["10.0.0.5", "10.0.1.5", "10.0.0.255"] {
        assert_eq!(
            addresses_contain(&strings(&["only-web"]), ip(query), &scopes),
            addresses_contain(&strings(&["web-servers"]), ip(query), &scopes),
        );
    }
}

#[test]
fn nested_groups_match_and_cycles_terminate() {
    let scopes = chain();
    assert!(addresses_contain(&strings(&["outer"]), ip("10.0.0.9"), &scopes));
    assert!(!addresses_contain(&strings(&["loop"]), ip("10.0.0.9"), &scopes));
}

#[test]
fn literal_networks_match_and_garbage_is_skipped() {
    let scopes = chain();
    let tokens = strings(&["not-an-object", "192.168.50.0/24"]);
    assert!(addresses_contain(&tokens, ip("192.168.50.7"), &scopes));
    assert!(!addresses_contain(&tokens, ip("192.168.51.7"), &scopes));
    assert!(!addresses_contain(&strings(&["nope"]), ip("10.0.0.5"), &scopes));
}

#[test]
fn service_object_port_spec() {
    let svc = web_service();
    let dst = Side::Destination;
    assert!(port_in_service(&svc, dst, &tcp("443")).expect("443"));
    assert!(port_in_service(&svc, dst, &tcp("8050")).expect("8050"));
    assert!(!port_in_service(&svc, dst, &udp("8050")).expect("udp"));
    assert!(!port_in_service(&svc, dst, &tcp("8101")).expect("8101"));
    assert!(!port_in_service(&svc, dst, &tcp("8000")).expect("bound"));
}

#[test]
fn single_ports_compare_as_text() {
    let svc = web_service();
    let padded = PortQuery::new("0443", Protocol::Tcp).expect("port");
    assert!(!port_in_service(&svc, Side::Destination, &padded).expect("padded"));
}

#[test]
fn missing_source_port_spec_never_matches() {
    let svc = web_service();
    assert!(!port_in_service(&svc, Side::Source, &tcp("443")).expect("source"));
}

#[test]
fn source_port_range_is_exclusive() {
    let svc = dns_service();
    assert!(port_in_service(&svc, Side::Source, &udp("5000")).expect("inside"));
    assert!(!port_in_service(&svc, Side::Source, &udp("1024")).expect("lower bound"));
    assert!(!port_in_service(&svc, Side::Source, &udp("65535")).expect("upper bound"));
    assert!(!port_in_service(&svc, Side::Source, &tcp("5000")).expect("protocol"));
    assert!(!port_in_service(&svc, Side::Destination, &udp("5000")).expect("other side"));
}

#[test]
fn source_port_criterion_through_rule() {
    let scopes = chain();
    let r = rule(|s| s.service = strings(&["svc-dns"]));
    let mut criteria = Criteria {
        source_port: Some(udp("40000")),
        ..Criteria::default()
    };
    assert!(rule_matches(&r, &criteria, &scopes).expect("inside"));

    criteria.source_port = Some(udp("1024"));
    assert!(!rule_matches(&r, &criteria, &scopes).expect("bound"));

    criteria.source_port = Some(udp("40000"));
    criteria.destination_port = Some(udp("53"));
    assert!(rule_matches(&r, &criteria, &scopes).expect("both sides"));
}

#[test]
fn queried_port_text_is_trimmed() {
    let padded = PortQuery::new(" 443 ", Protocol::Tcp).expect("port");
    assert_eq!(padded.port, "443");
    assert!(port_in_service(&web_service(), Side::Destination, &padded).expect("443"));
}

#[test]
fn malformed_ports_fail() {
    assert!(matches!(
        PortQuery::new("http", Protocol::Tcp),
        Err(PolicyError::InvalidPort(p)) if p == "http"
    ));

    let broken = ServiceObject {
        destination_port: "80-x".to_string(),
        ..web_service()
    };
    assert!(matches!(
        port_in_service(&broken, Side::Destination, &tcp("80")),
        Err(PolicyError::InvalidPort(_))
    ));
}

#[test]
fn service_any_and_application_default() {
    let scopes = chain();
    let query = tcp("80");
    assert!(services_contain(&strings(&["any"]), Side::Destination, &query, &scopes).expect("any"));
    assert!(!services_contain(
        &strings(&["application-default"]),
        Side::Destination,
        &query,
        &scopes
    )
    .expect("app-default"));
    assert!(
        services_contain(&strings(&["sg-web"]), Side::Destination, &tcp("443"), &scopes)
            .expect("group")
    );
    assert!(
        !services_contain(&strings(&["unknown"]), Side::Destination, &tcp("443"), &scopes)
            .expect("unknown")
    );
}

#[test]
fn empty_criteria_is_a_vacuous_hit() {
    let criteria = Criteria::default();
    assert!(criteria.is_empty());
    let r = rule(|s| s.from_zone = strings(&["trust"]));
    assert!(rule_matches(&r, &criteria, &chain()).expect("match"));
}

#[test]
fn zone_any_is_always_a_wildcard() {
    let scopes = chain();
    let criteria = Criteria {
        source_zone: Some("untrust".to_string()),
        ..Criteria::default()
    };
    let wildcard = rule(|s| s.from_zone = strings(&["any"]));
    let exact = rule(|s| s.from_zone = strings(&["trust", "untrust"]));
    let other = rule(|s| s.from_zone = strings(&["trust"]));
    assert!(rule_matches(&wildcard, &criteria, &scopes).expect("wildcard"));
    assert!(rule_matches(&exact, &criteria, &scopes).expect("exact"));
    assert!(!rule_matches(&other, &criteria, &scopes).expect("other"));
}

#[test]
fn every_supplied_criterion_must_hold() {
    let scopes = chain();
    let r = rule(|s| {
        s.from_zone = strings(&["trust"]);
        s.destination = strings(&["web-servers"]);
        s.service = strings(&["svc-web"]);
        s.tag = Some("web".to_string());
    });
    let mut criteria = Criteria {
        source_zone: Some("trust".to_string()),
        destination_ip: Some(ip("10.0.0.7")),
        destination_port: Some(tcp("443")),
        tag: Some("web".to_string()),
        ..Criteria::default()
    };
    assert!(rule_matches(&r, &criteria, &scopes).expect("all"));

    criteria.destination_port = Some(udp("443"));
    assert!(!rule_matches(&r, &criteria, &scopes).expect("protocol"));
}

#[test]
fn application_default_rule_does_not_match_port_80() {
    let r = rule(|_| {});
    let criteria = Criteria {
        destination_port: Some(tcp("80")),
        ..Criteria::default()
    };
    assert!(!rule_matches(&r, &criteria, &chain()).expect("match"));
}

#[test]
fn tag_criterion_requires_a_defined_tag() {
    let scopes = chain();
    let criteria = Criteria {
        tag: Some("web".to_string()),
        ..Criteria::default()
    };
    let tagged = rule(|s| s.tag = Some("web".to_string()));
    let undefined = rule(|s| s.tag = Some("ghost".to_string()));
    assert!(rule_matches(&tagged, &criteria, &scopes).expect("tagged"));
    assert!(!rule_matches(&undefined, &criteria, &scopes).expect("undefined"));
}

#[test]
fn device_group_scope_only_fills_gaps() {
    let dg = parse(
        br#"<entry name="dg">
            <address>
              <entry name="web-servers"><ip-netmask>172.16.0.0/16</ip-netmask></entry>
              <entry name="dg-net"><ip-netmask>172.17.0.0/16</ip-netmask></entry>
            </address>
        </entry>"#,
    )
    .expect("parse");
    let scopes = ScopeChain::new(vec![global_scope(), ObjectScope::load("dg", &[&dg])]);

    assert!(!addresses_contain(&strings(&["web-servers"]), ip("172.16.0.1"), &scopes));
    assert!(addresses_contain(&strings(&["dg-net"]), ip("172.17.0.1"), &scopes));
}
