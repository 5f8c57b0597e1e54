//! Distinguished names.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::DnError;
use crate::normalizer::NameNormalizer;
use crate::parser;

use super::rdn::Rdn;

/// The DN with no RDNs, identity element for [`Dn::concat`].
pub const EMPTY_DN: Dn = Dn::empty();

/// A sequence of RDNs naming an entry, from the entry itself up to the root.
///
/// RDNs are stored leaf-first, in the order they appear in the text, but
/// positional accessors ([`Dn::get`], [`Dn::get_rdn`], [`Dn::insert`],
/// [`Dn::remove`]) count from the root: for `cn=John,dc=example,dc=com`,
/// position 0 is `dc=com`.
///
/// Equality, ordering and hashing only look at the normalized RDNs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Dn {
    rdns: Vec<Rdn>,
    up_name: String,
    norm_name: String,
    bytes: Vec<u8>,
    normalized: bool,
}

impl Dn {
    pub const fn empty() -> Self {
        Dn {
            rdns: Vec::new(),
            up_name: String::new(),
            norm_name: String::new(),
            bytes: Vec::new(),
            normalized: true,
        }
    }

    pub fn new() -> Self {
        Self::empty()
    }

    /// Parses `text`, keeping it verbatim as the user provided name.
    pub fn parse(text: &str) -> Result<Self, DnError> {
        let rdns = parser::parse_dn(text)?;
        let mut dn = Dn {
            rdns,
            up_name: text.to_string(),
            norm_name: String::new(),
            bytes: Vec::new(),
            normalized: false,
        };
        dn.derive_norm_name();
        Ok(dn)
    }

    /// Builds a DN from RDNs given leaf-first.
    pub fn from_rdns(rdns: impl IntoIterator<Item = Rdn>) -> Self {
        let mut dn = Dn {
            rdns: rdns.into_iter().collect(),
            normalized: false,
            ..Self::empty()
        };
        dn.refresh();
        dn
    }

    /// Builds a DN from a list of components.
    ///
    /// A component containing `=` is taken as one or more complete RDNs;
    /// otherwise it is an attribute type and the next component is its
    /// value: `["cn=Test", "ou", "people", "dc=example,dc=com"]` gives
    /// `cn=Test,ou=people,dc=example,dc=com`.
    pub fn from_parts<S: AsRef<str>>(parts: &[S]) -> Result<Self, DnError> {
        let mut text = String::new();
        let mut value_expected = false;

        for (i, part) in parts.iter().enumerate() {
            let part = part.as_ref();
            if value_expected {
                text.push('=');
                text.push_str(part);
                value_expected = false;
                continue;
            }
            if i > 0 {
                text.push(',');
            }
            text.push_str(part);
            value_expected = !part.contains('=');
        }

        if value_expected {
            return Err(DnError::syntax(
                "a value is missing on the last RDN",
                text.len(),
            ));
        }

        Self::parse(&text)
    }

    /// Parses `text` and normalizes the result.
    pub fn normalize_str<N>(text: &str, normalizer: &N) -> Result<Self, DnError>
    where
        N: NameNormalizer + ?Sized,
    {
        Self::parse(text)?.normalize(normalizer)
    }

    /// Whether `text` is a syntactically valid DN.
    pub fn is_valid(text: &str) -> bool {
        parser::is_valid(text)
    }

    /// Reassembles a DN read back from its binary record.
    pub(crate) fn from_decoded(up_name: String, norm_name: String, rdns: Vec<Rdn>) -> Self {
        let bytes = norm_name.as_bytes().to_vec();
        Dn {
            rdns,
            up_name,
            norm_name,
            bytes,
            normalized: true,
        }
    }

    /// A copy whose RDNs went through `normalizer`. The user provided name is
    /// kept and the copy is flagged as normalized.
    pub fn normalize<N>(&self, normalizer: &N) -> Result<Self, DnError>
    where
        N: NameNormalizer + ?Sized,
    {
        let rdns = self
            .rdns
            .iter()
            .map(|rdn| rdn.normalized_with(normalizer))
            .collect::<Result<Vec<_>, _>>()?;

        let mut dn = Dn {
            rdns,
            up_name: self.up_name.clone(),
            norm_name: String::new(),
            bytes: Vec::new(),
            normalized: true,
        };
        dn.derive_norm_name();
        Ok(dn)
    }

    pub fn up_name(&self) -> &str {
        &self.up_name
    }

    pub fn norm_name(&self) -> &str {
        &self.norm_name
    }

    pub fn to_display_string(&self) -> String {
        self.up_name.clone()
    }

    pub fn to_canonical_string(&self) -> String {
        self.norm_name.clone()
    }

    /// UTF-8 bytes of the normalized name.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    pub fn size(&self) -> usize {
        self.rdns.len()
    }

    pub fn len(&self) -> usize {
        self.rdns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rdns.is_empty()
    }

    /// RDNs in storage order, leaf first.
    pub fn rdns(&self) -> &[Rdn] {
        &self.rdns
    }

    /// RDNs from the root down to the leaf.
    pub fn iter(&self) -> std::iter::Rev<std::slice::Iter<'_, Rdn>> {
        self.rdns.iter().rev()
    }

    /// Normalized name of the RDN at `posn`, counted from the root.
    pub fn get(&self, posn: usize) -> Option<&str> {
        self.get_rdn(posn).map(Rdn::norm_name)
    }

    /// The RDN at `posn`, counted from the root.
    pub fn get_rdn(&self, posn: usize) -> Option<&Rdn> {
        let idx = self.rdns.len().checked_sub(posn)?.checked_sub(1)?;
        self.rdns.get(idx)
    }

    /// The leaf RDN, the leftmost one in the text.
    pub fn leaf_rdn(&self) -> Option<&Rdn> {
        self.rdns.first()
    }

    /// The `n` RDNs nearest the root.
    pub fn prefix(&self, n: usize) -> Result<Self, DnError> {
        self.check_bound(n, self.rdns.len())?;
        Ok(self.slice(self.rdns.len() - n..self.rdns.len()))
    }

    /// The `n` RDNs nearest the leaf.
    pub fn suffix(&self, n: usize) -> Result<Self, DnError> {
        self.check_bound(n, self.rdns.len())?;
        Ok(self.slice(0..n))
    }

    fn slice(&self, range: std::ops::Range<usize>) -> Self {
        let mut dn = Dn {
            rdns: self.rdns[range].to_vec(),
            normalized: self.normalized,
            ..Self::empty()
        };
        dn.refresh();
        dn
    }

    fn check_bound(&self, posn: usize, max: usize) -> Result<(), DnError> {
        if posn > max {
            return Err(DnError::IndexOutOfBounds {
                posn,
                size: self.rdns.len(),
            });
        }
        Ok(())
    }

    /// Whether `parent` names an ancestor of this DN, or this DN itself.
    /// Comparison is anchored at the root. The empty DN is everyone's parent.
    pub fn is_child_of(&self, parent: &Dn) -> bool {
        if parent.size() > self.size() {
            return false;
        }
        self.iter().zip(parent.iter()).all(|(mine, theirs)| mine == theirs)
    }

    pub fn is_parent_of(&self, child: &Dn) -> bool {
        child.is_child_of(self)
    }

    /// Like [`Dn::is_child_of`], answering `false` when `parent` does not parse.
    pub fn is_child_of_str(&self, parent: &str) -> bool {
        Dn::parse(parent).is_ok_and(|parent| self.is_child_of(&parent))
    }

    /// Like [`Dn::is_parent_of`], answering `false` when `child` does not parse.
    pub fn is_parent_of_str(&self, child: &str) -> bool {
        Dn::parse(child).is_ok_and(|child| self.is_parent_of(&child))
    }

    /// Whether the leftmost RDNs of this DN are those of `dn`.
    ///
    /// Anchored at the leaf: `cn=xxx,ou=yyy` has suffix `cn=xxx` but not
    /// `ou=yyy`.
    pub fn has_suffix(&self, dn: &Dn) -> bool {
        if dn.size() > self.size() {
            return false;
        }
        self.rdns
            .iter()
            .zip(dn.rdns.iter())
            .all(|(mine, theirs)| mine == theirs)
    }

    /// Adds an RDN at the leaf end.
    pub fn add(&mut self, rdn: Rdn) -> &mut Self {
        self.rdns.insert(0, rdn);
        self.refresh();
        self
    }

    /// Parses `comp` as one RDN and adds it at the leaf end. An empty
    /// component is ignored.
    pub fn add_str(&mut self, comp: &str) -> Result<&mut Self, DnError> {
        if comp.is_empty() {
            return Ok(self);
        }
        let rdn = Rdn::parse(comp)?;
        Ok(self.add(rdn))
    }

    /// Inserts an RDN so that it ends up at `posn`, counted from the root.
    pub fn insert(&mut self, posn: usize, rdn: Rdn) -> Result<&mut Self, DnError> {
        self.check_bound(posn, self.rdns.len())?;
        let real_pos = self.rdns.len() - posn;
        self.rdns.insert(real_pos, rdn);
        self.refresh();
        Ok(self)
    }

    /// Adds all RDNs of `dn` at the leaf end, keeping their order.
    pub fn add_all(&mut self, dn: &Dn) -> &mut Self {
        if dn.is_empty() {
            return self;
        }
        self.rdns.splice(0..0, dn.rdns.iter().cloned());
        self.refresh();
        self
    }

    /// Adds all RDNs of `dn` so that its root-most RDN lands at `posn`,
    /// counted from the root.
    pub fn add_all_at(&mut self, posn: usize, dn: &Dn) -> Result<&mut Self, DnError> {
        self.check_bound(posn, self.rdns.len())?;
        if dn.is_empty() {
            return Ok(self);
        }
        let real_pos = self.rdns.len() - posn;
        self.rdns.splice(real_pos..real_pos, dn.rdns.iter().cloned());
        self.refresh();
        Ok(self)
    }

    /// Removes and returns the RDN at `posn`, counted from the root.
    pub fn remove(&mut self, posn: usize) -> Result<Rdn, DnError> {
        if posn >= self.rdns.len() {
            return Err(DnError::IndexOutOfBounds {
                posn,
                size: self.rdns.len(),
            });
        }
        let real_pos = self.rdns.len() - posn - 1;
        let rdn = self.rdns.remove(real_pos);
        self.refresh();
        Ok(rdn)
    }

    /// The DN whose text is `self,parent`: this DN placed under `parent`.
    pub fn concat(&self, parent: &Dn) -> Dn {
        if self.is_empty() {
            return parent.clone();
        }
        if parent.is_empty() {
            return self.clone();
        }
        let mut dn = parent.clone();
        dn.add_all(self);
        dn
    }

    /// Recomputes every derived string after a structural change.
    fn refresh(&mut self) {
        self.up_name = self.rdns.iter().map(Rdn::up_name).join(",");
        self.derive_norm_name();
    }

    fn derive_norm_name(&mut self) {
        self.norm_name = self.rdns.iter().map(Rdn::norm_name).join(",");
        self.bytes = self.norm_name.as_bytes().to_vec();
    }
}

impl Default for Dn {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for Dn {
    fn eq(&self, other: &Self) -> bool {
        self.rdns == other.rdns
    }
}

impl Eq for Dn {}

impl Hash for Dn {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rdns.hash(state);
    }
}

impl PartialOrd for Dn {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Dn {
    /// Root-first, RDN by RDN; a DN sorts right before its descendants.
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl Display for Dn {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.up_name)
    }
}

impl FromStr for Dn {
    type Err = DnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dn::parse(s)
    }
}

impl TryFrom<String> for Dn {
    type Error = DnError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Dn::parse(&value)
    }
}

impl From<Dn> for String {
    fn from(dn: Dn) -> Self {
        dn.up_name
    }
}

impl<'a> IntoIterator for &'a Dn {
    type Item = &'a Rdn;
    type IntoIter = std::iter::Rev<std::slice::Iter<'a, Rdn>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use yare::parameterized;

    fn dn(text: &str) -> Dn {
        Dn::parse(text).unwrap()
    }

    #[test]
    fn test_parse_addresses_from_the_root() {
        let name = dn("cn=John Smith,dc=example,dc=com");
        assert_eq!(name.size(), 3);
        assert_eq!(name.get(0), Some("dc=com"));
        assert_eq!(name.get(1), Some("dc=example"));
        assert_eq!(name.get(2), Some("cn=John Smith"));
        assert_eq!(name.get(3), None);
        assert_eq!(name.get(usize::MAX), None);
        assert!(name.get_rdn(usize::MAX).is_none());
        assert_eq!(name.leaf_rdn().map(Rdn::norm_name), Some("cn=John Smith"));
        assert_eq!(name.to_display_string(), "cn=John Smith,dc=example,dc=com");
    }

    #[test]
    fn test_norm_name_and_bytes() {
        let name = dn(" CN = John , DC=Example ;dc=com ");
        insta::assert_snapshot!(name.norm_name(), @"cn=John,dc=Example,dc=com");
        assert_eq!(name.bytes(), name.norm_name().as_bytes());
        assert_eq!(name.up_name(), " CN = John , DC=Example ;dc=com ");
        assert!(!name.is_normalized());
    }

    #[test]
    fn test_empty_dn() {
        let empty = dn("");
        assert!(empty.is_empty());
        assert_eq!(empty, EMPTY_DN);
        assert_eq!(empty.get(0), None);
        assert!(EMPTY_DN.is_normalized());
        assert_eq!(Dn::default(), Dn::new());
    }

    #[parameterized(
        parent = { "dc=foo,dc=example,dc=com", "dc=example,dc=com", true },
        itself = { "dc=example,dc=com", "dc=example,dc=com", true },
        empty_parent = { "dc=com", "", true },
        sibling = { "dc=foo,dc=example,dc=com", "dc=other,dc=com", false },
        longer = { "dc=com", "dc=example,dc=com", false },
        leaf_match_only = { "cn=a,dc=org", "cn=a", false },
    )]
    fn test_is_child_of(child: &str, parent: &str, expected: bool) {
        assert_eq!(dn(child).is_child_of(&dn(parent)), expected);
        assert_eq!(dn(parent).is_parent_of(&dn(child)), expected);
    }

    #[test]
    fn test_is_parent_of_case_insensitive_type() {
        let parent = dn("dc=example,dc=com");
        assert!(parent.is_parent_of(&dn("DC=foo,DC=example,dc=com")));
    }

    #[test]
    fn test_string_relations_are_false_on_bad_input() {
        let name = dn("dc=example,dc=com");
        assert!(name.is_child_of_str("dc=com"));
        assert!(name.is_parent_of_str("cn=x,dc=example,dc=com"));
        assert!(!name.is_child_of_str("dc=com,,"));
        assert!(!name.is_parent_of_str("=broken"));
    }

    #[parameterized(
        leaf = { "cn=xxx,ou=yyy", "cn=xxx", true },
        root = { "cn=xxx,ou=yyy", "ou=yyy", false },
        whole = { "cn=xxx,ou=yyy", "cn=xxx,ou=yyy", true },
        empty = { "cn=xxx,ou=yyy", "", true },
        longer = { "cn=xxx", "cn=xxx,ou=yyy", false },
    )]
    fn test_has_suffix_is_anchored_at_the_leaf(name: &str, suffix: &str, expected: bool) {
        assert_eq!(dn(name).has_suffix(&dn(suffix)), expected);
    }

    #[test]
    fn test_prefix_and_suffix() {
        let name = dn("cn=a,ou=b,dc=c,dc=d");
        assert_eq!(name.prefix(2).unwrap().norm_name(), "dc=c,dc=d");
        assert_eq!(name.suffix(2).unwrap().norm_name(), "cn=a,ou=b");
        assert_eq!(name.prefix(0).unwrap(), EMPTY_DN);
        assert_eq!(name.suffix(4).unwrap(), name);
        assert_eq!(
            name.prefix(5).unwrap_err(),
            DnError::IndexOutOfBounds { posn: 5, size: 4 }
        );
    }

    #[test]
    fn test_add_and_insert() {
        let mut name = dn("dc=example,dc=com");
        name.add(Rdn::parse("ou=people").unwrap());
        assert_eq!(name.norm_name(), "ou=people,dc=example,dc=com");

        name.add_str("cn=John").unwrap();
        name.add_str("").unwrap();
        assert_eq!(name.norm_name(), "cn=John,ou=people,dc=example,dc=com");

        name.insert(1, Rdn::parse("o=acme").unwrap()).unwrap();
        assert_eq!(name.get(1), Some("o=acme"));
        assert_eq!(name.norm_name(), "cn=John,ou=people,dc=example,o=acme,dc=com");
        assert_eq!(name.up_name(), "cn=John,ou=people,dc=example,o=acme,dc=com");

        assert!(name.insert(9, Rdn::parse("o=x").unwrap()).is_err());
    }

    #[test]
    fn test_add_all() {
        let mut name = dn("dc=example,dc=com");
        name.add_all(&dn("cn=a,ou=b"));
        assert_eq!(name.norm_name(), "cn=a,ou=b,dc=example,dc=com");

        let mut name = dn("cn=x,dc=com");
        name.add_all_at(1, &dn("ou=p,o=q")).unwrap();
        assert_eq!(name.norm_name(), "cn=x,ou=p,o=q,dc=com");
        assert_eq!(name.get(1), Some("o=q"));
    }

    #[test]
    fn test_remove_counts_from_the_root() {
        let mut name = dn("cn=a,ou=b,dc=c");
        let removed = name.remove(0).unwrap();
        assert_eq!(removed.norm_name(), "dc=c");
        assert_eq!(name.norm_name(), "cn=a,ou=b");
        assert!(matches!(
            name.remove(2),
            Err(DnError::IndexOutOfBounds { posn: 2, size: 2 })
        ));
    }

    #[test]
    fn test_concat() {
        let child = dn("cn=a");
        let parent = dn("dc=example,dc=com");
        assert_eq!(child.concat(&parent).norm_name(), "cn=a,dc=example,dc=com");
        assert_eq!(child.concat(&EMPTY_DN), child);
        assert_eq!(EMPTY_DN.concat(&parent), parent);
    }

    #[test]
    fn test_ordering_is_root_first() {
        let names: BTreeSet<Dn> = [
            "dc=org",
            "cn=b,dc=com",
            "dc=com",
            "cn=a,dc=com",
            "cn=x,ou=y,dc=com",
        ]
        .into_iter()
        .map(dn)
        .collect();

        let ordered: Vec<&str> = names.iter().map(Dn::norm_name).collect();
        assert_eq!(
            ordered,
            vec!["dc=com", "cn=a,dc=com", "cn=b,dc=com", "cn=x,ou=y,dc=com", "dc=org"]
        );
    }

    #[test]
    fn test_from_parts() {
        let name = Dn::from_parts(&["cn=Test", "ou", "people", "dc=example,dc=com"]).unwrap();
        assert_eq!(name.norm_name(), "cn=Test,ou=people,dc=example,dc=com");
        assert_eq!(name.size(), 4);

        assert!(matches!(
            Dn::from_parts(&["cn=Test", "ou"]),
            Err(DnError::Syntax { .. })
        ));
    }

    #[test]
    fn test_from_rdns_is_leaf_first() {
        let name = Dn::from_rdns(vec![
            Rdn::parse("cn=a").unwrap(),
            Rdn::parse("dc=com").unwrap(),
        ]);
        assert_eq!(name.up_name(), "cn=a,dc=com");
        assert_eq!(name.get(0), Some("dc=com"));
    }

    #[test]
    fn test_is_valid() {
        assert!(Dn::is_valid("cn=a,dc=com"));
        assert!(Dn::is_valid(""));
        assert!(!Dn::is_valid("cn"));
    }

    #[test]
    fn test_root_first_iteration() {
        let name = dn("cn=a,ou=b,dc=c");
        let order: Vec<&str> = (&name).into_iter().map(Rdn::norm_name).collect();
        assert_eq!(order, vec!["dc=c", "ou=b", "cn=a"]);
    }

    #[test]
    fn test_serde_uses_display_string() {
        let name = dn("CN=John,dc=com");
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, r#""CN=John,dc=com""#);
        let back: Dn = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);
        assert_eq!(back.up_name(), "CN=John,dc=com");

        assert!(serde_json::from_str::<Dn>(r#""not a dn""#).is_err());
    }

    #[test]
    fn test_clone_is_deep() {
        let original = dn("cn=a,dc=com");
        let mut copy = original.clone();
        copy.add_str("ou=x").unwrap();
        assert_eq!(original.size(), 2);
        assert_eq!(copy.size(), 3);
    }
}
