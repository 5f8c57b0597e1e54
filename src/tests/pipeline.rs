//! End-to-end checks across parsing, normalization, ordering and encoding.

use std::collections::BTreeSet;

use yare::parameterized;

use crate::codec::{decode, encode};
use crate::error::DnError;
use crate::normalizer::OidMap;
use crate::parser::{ComplexParser, FastParseOutcome, FastParser};
use crate::traits::WireRecord;
use crate::types::{Ava, Dn, Rdn, Value};

fn dn(text: &str) -> Dn {
    Dn::parse(text).unwrap()
}

fn shape(rdns: &[Rdn]) -> Vec<(String, String, usize, usize)> {
    rdns.iter()
        .map(|rdn| {
            (
                rdn.up_name().to_string(),
                rdn.norm_name().to_string(),
                rdn.start(),
                rdn.length(),
            )
        })
        .collect()
}

#[test]
fn test_plain_dn_round_trips_as_text() {
    let name = dn("cn=John Smith,dc=example,dc=com");
    assert_eq!(name.size(), 3);
    assert_eq!(name.get(0), Some("dc=com"));
    assert_eq!(name.get(2), Some("cn=John Smith"));
    assert_eq!(name.to_display_string(), "cn=John Smith,dc=example,dc=com");

    let spaced = dn("cn=John Smith ,  dc=example,dc=com");
    assert_eq!(spaced.to_canonical_string(), name.to_canonical_string());
    assert_eq!(spaced, name);
}

#[test]
fn test_escaped_value_is_decoded() {
    let name = dn(r#"cn=James \"Jim\" Smith\, III,dc=example"#);
    let ava = name.leaf_rdn().and_then(Rdn::ava).unwrap();
    assert_eq!(ava.norm_value(), &Value::text(r#"James "Jim" Smith, III"#));
    assert_eq!(ava.up_name(), r#"cn=James \"Jim\" Smith\, III"#);
    assert_eq!(name.size(), 2);
}

#[test]
fn test_hexstring_value_is_binary() {
    let name = dn("1.2.840.113549=#0400");
    let ava = name.leaf_rdn().and_then(Rdn::ava).unwrap();
    assert!(ava.is_binary());
    assert_eq!(ava.norm_value().as_bytes(), &[0x04, 0x00]);
    assert_eq!(name.norm_name(), "1.2.840.113549=#0400");
}

#[test]
fn test_parent_and_child() {
    let parent = dn("dc=example,dc=com");
    let child = dn("dc=foo,dc=example,dc=com");
    assert!(parent.is_parent_of(&child));
    assert!(child.is_child_of(&parent));
    assert!(!child.is_parent_of(&parent));
    assert!(!parent.is_parent_of_str("DC=Foo, DC=Example, DC=Com"));
    assert!(parent.is_parent_of_str("dc=foo,dc=example,dc=com"));
    assert_eq!(child.suffix(1).unwrap().up_name(), "dc=foo");
    assert_eq!(child.prefix(2).unwrap(), parent);
}

#[test]
fn test_normalize_with_custom_schema() {
    let mut map = OidMap::new();
    map.insert("cn", "2.5.4.3", |value: &Value| -> Result<Value, DnError> {
        Ok(value.map_text(|s| s.to_lowercase()))
    })
    .unwrap();

    let name = dn("CN=Test").normalize(&map).unwrap();
    let ava = name.leaf_rdn().and_then(Rdn::ava).unwrap();
    assert_eq!(ava.norm_type(), "2.5.4.3");
    assert_eq!(ava.norm_value(), &Value::text("test"));
    assert_eq!(ava.up_type(), "CN");
}

#[test]
fn test_encoding_rejects_empty_up_type() {
    let ava = Ava::new("cn", "cn", Value::text("a"), Value::text("a")).unwrap();
    let broken = Ava {
        up_type: String::new(),
        ..ava
    };
    assert_eq!(broken.encode().unwrap_err(), DnError::codec("upType"));
}

#[parameterized(
    empty = { "" },
    single = { "dc=com" },
    three = { "cn=John Smith,ou=People,dc=example,dc=com" },
    spaces = { "cn = John Smith , dc = com" },
    semicolon = { "cn=a;dc=com" },
    trailing_space = { "cn=a,dc=com   " },
    numeric_oid = { "2.5.4.3=a,0.9.2342.19200300.100.1.25=com" },
    oid_prefix = { "OID.2.5.4.3=a" },
    hyphen = { "x-attr=a-b_c.d" },
)]
fn test_tiers_agree_on_plain_names(text: &str) {
    let FastParseOutcome::Done(fast) = FastParser::new(text).parse() else {
        panic!("{text:?} should stay on the fast tier");
    };
    let full = ComplexParser::new(text).parse_dn().unwrap();
    assert_eq!(shape(&fast), shape(&full));
    assert_eq!(fast, full);
}

#[parameterized(
    multi_valued = { "cn=a+sn=b,dc=com" },
    quoted = { r#"cn="a, b",dc=com"# },
    escaped = { r"cn=a\,b,dc=com" },
    hex = { "cn=#0400" },
    unicode = { "cn=Jörg,dc=com" },
)]
fn test_complex_names_escalate(text: &str) {
    assert!(matches!(
        FastParser::new(text).parse(),
        FastParseOutcome::TooComplex { .. }
    ));
    assert_eq!(
        crate::parser::parse_dn(text).unwrap(),
        ComplexParser::new(text).parse_dn().unwrap()
    );
}

#[parameterized(
    trailing_comma = { "cn=a," },
    missing_equals = { "cn" },
    empty_type = { "=a" },
    bad_hex = { "cn=#04G0" },
    unterminated_quote = { r#"cn="abc"# },
)]
fn test_syntax_errors_come_from_the_full_tier(text: &str) {
    let err = Dn::parse(text).unwrap_err();
    assert!(matches!(err, DnError::Syntax { .. }), "{err:?}");
    assert!(!Dn::is_valid(text));
}

#[test]
fn test_total_order_is_root_first() {
    let names: BTreeSet<Dn> = [
        "cn=b,dc=com",
        "dc=com",
        "cn=a,dc=org",
        "cn=a,dc=com",
        "dc=org",
        "",
    ]
    .into_iter()
    .map(dn)
    .collect();

    let ordered: Vec<&str> = names.iter().map(Dn::up_name).collect();
    assert_eq!(
        ordered,
        vec!["", "dc=com", "cn=a,dc=com", "cn=b,dc=com", "dc=org", "cn=a,dc=org"]
    );
}

#[test]
fn test_normalized_dn_survives_encoding() {
    let map = OidMap::standard();
    let original =
        Dn::normalize_str("CN=John  Smith+UID=jsmith, OU=People, DC=Example, DC=Com", &map)
            .unwrap();
    let decoded = decode(&encode(&original).unwrap()).unwrap();

    assert_eq!(decoded, original);
    assert_eq!(decoded.up_name(), original.up_name());
    assert_eq!(decoded.norm_name(), original.norm_name());
    assert_eq!(decoded.bytes(), original.norm_name().as_bytes());
    insta::assert_snapshot!(decoded.norm_name(), @"2.5.4.3=john smith+0.9.2342.19200300.100.1.1=jsmith,2.5.4.11=people,0.9.2342.19200300.100.1.25=example,0.9.2342.19200300.100.1.25=com");
}

#[test]
fn test_rebuilding_a_dn_from_parts() {
    let mut name = dn("dc=example,dc=com");
    name.add_str("ou=People").unwrap();
    name.add(Rdn::new("cn", "Jane").unwrap());
    assert_eq!(name.up_name(), "cn=Jane,ou=People,dc=example,dc=com");

    let removed = name.remove(0).unwrap();
    assert_eq!(removed.up_name(), "dc=com");
    assert_eq!(name.up_name(), "cn=Jane,ou=People,dc=example");

    let text = name.to_string();
    assert_eq!(dn(&text), name);
}
