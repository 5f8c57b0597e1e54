//! Relative distinguished names: one `+`-joined group of AVAs.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use itertools::Itertools;

use crate::error::DnError;
use crate::normalizer::NameNormalizer;
use crate::parser;

use super::ava::Ava;
use super::value::Value;

/// One level of a DN, holding at least one AVA.
///
/// AVAs are kept in the order they were added, which is also the order of
/// the `+`-joined components in [`Rdn::norm_name`]. Equality and ordering
/// treat the AVAs as a set, so `cn=a+sn=b` equals `sn=b+cn=a`.
#[derive(Debug, Clone)]
pub struct Rdn {
    pub(crate) avas: Vec<Ava>,
    pub(crate) up_name: String,
    pub(crate) norm_name: String,
    pub(crate) start: usize,
    pub(crate) length: usize,
}

impl Rdn {
    /// A single-valued RDN from a type and a text value, without parsing.
    pub fn new(up_type: &str, up_value: &str) -> Result<Self, DnError> {
        let ava = Ava::new(
            up_type,
            up_type,
            Value::text(up_value),
            Value::text(up_value),
        )?;
        Ok(Self::from_ava(ava))
    }

    pub fn from_ava(ava: Ava) -> Self {
        let up_name = ava.up_name().to_string();
        let length = up_name.len();
        let mut rdn = Rdn {
            avas: vec![ava],
            up_name,
            norm_name: String::new(),
            start: 0,
            length,
        };
        rdn.normalize();
        rdn
    }

    /// Parses a single RDN such as `cn=a+sn=b`.
    pub fn parse(text: &str) -> Result<Self, DnError> {
        parser::parse_rdn(text)
    }

    /// Builds an RDN from parsed parts; the caller supplies the source span.
    pub(crate) fn from_parts(avas: Vec<Ava>, up_name: String, start: usize) -> Self {
        let length = up_name.len();
        let mut rdn = Rdn {
            avas,
            up_name,
            norm_name: String::new(),
            start,
            length,
        };
        rdn.normalize();
        rdn
    }

    /// Appends an AVA; the user provided name grows by `+ava` and the
    /// normalized name is re-derived.
    pub fn add_ava(&mut self, ava: Ava) {
        self.up_name.push('+');
        self.up_name.push_str(ava.up_name());
        self.length = self.up_name.len();
        self.avas.push(ava);
        self.normalize();
    }

    /// Recomputes the normalized name from the member AVAs.
    pub fn normalize(&mut self) {
        self.norm_name = self.avas.iter().map(Ava::norm_name).join("+");
    }

    /// A copy whose AVAs went through `normalizer`. The user provided name
    /// and the source span are kept.
    pub fn normalized_with<N>(&self, normalizer: &N) -> Result<Self, DnError>
    where
        N: NameNormalizer + ?Sized,
    {
        let avas = self
            .avas
            .iter()
            .map(|ava| normalizer.normalize_ava(ava))
            .collect::<Result<Vec<_>, _>>()?;

        let mut rdn = Rdn {
            avas,
            up_name: self.up_name.clone(),
            norm_name: String::new(),
            start: self.start,
            length: self.length,
        };
        rdn.normalize();
        Ok(rdn)
    }

    pub fn up_name(&self) -> &str {
        &self.up_name
    }

    pub fn norm_name(&self) -> &str {
        &self.norm_name
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn len(&self) -> usize {
        self.avas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.avas.is_empty()
    }

    pub fn is_multi_valued(&self) -> bool {
        self.avas.len() > 1
    }

    pub fn avas(&self) -> &[Ava] {
        &self.avas
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Ava> {
        self.avas.iter()
    }

    /// The first AVA, in insertion order.
    pub fn ava(&self) -> Option<&Ava> {
        self.avas.first()
    }

    pub fn up_type(&self) -> Option<&str> {
        self.ava().map(Ava::up_type)
    }

    pub fn norm_type(&self) -> Option<&str> {
        self.ava().map(Ava::norm_type)
    }

    pub fn up_value(&self) -> Option<&Value> {
        self.ava().map(Ava::up_value)
    }

    pub fn norm_value(&self) -> Option<&Value> {
        self.ava().map(Ava::norm_value)
    }

    /// First AVA whose normalized type matches `ty` (trimmed, case
    /// insensitive).
    pub fn ava_for_type(&self, ty: &str) -> Option<&Ava> {
        let ty = ty.trim().to_ascii_lowercase();
        self.avas.iter().find(|ava| ava.norm_type() == ty)
    }

    /// Normalized values of every AVA of type `ty`, joined with `,`.
    /// `None` when no AVA has that type.
    pub fn get_value(&self, ty: &str) -> Option<String> {
        let ty = ty.trim().to_ascii_lowercase();
        let values = self
            .avas
            .iter()
            .filter(|ava| ava.norm_type() == ty)
            .map(|ava| ava.norm_value().to_string())
            .collect::<Vec<_>>();

        if values.is_empty() {
            None
        } else {
            Some(values.join(","))
        }
    }

    fn sorted_avas(&self) -> Vec<&Ava> {
        self.avas.iter().sorted().collect()
    }
}

impl PartialEq for Rdn {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Rdn {}

impl Hash for Rdn {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for ava in self.sorted_avas() {
            ava.hash(state);
        }
    }
}

impl PartialOrd for Rdn {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rdn {
    /// More AVAs sorts later; equal counts compare the sorted AVA lists.
    fn cmp(&self, other: &Self) -> Ordering {
        match self.avas.len().cmp(&other.avas.len()) {
            Ordering::Equal => {}
            res => return res,
        }
        if self.avas.len() == 1 {
            return self.avas[0].cmp(&other.avas[0]);
        }
        self.sorted_avas().cmp(&other.sorted_avas())
    }
}

impl Display for Rdn {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.up_name)
    }
}

impl FromStr for Rdn {
    type Err = DnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rdn::parse(s)
    }
}

impl<'a> IntoIterator for &'a Rdn {
    type Item = &'a Ava;
    type IntoIter = std::slice::Iter<'a, Ava>;

    fn into_iter(self) -> Self::IntoIter {
        self.avas.iter()
    }
}
