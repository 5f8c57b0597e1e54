//! Schema table mapping attribute type names to OIDs and value normalizers.

use std::collections::HashMap;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::DnError;
use crate::types::{is_descr, is_numeric_oid, strip_oid_prefix};

use super::value::{BuiltinNormalizer, ValueNormalizer};

/// Canonical OID of an attribute type and the normalizer for its values.
#[derive(Clone)]
pub struct OidNormalizer {
    oid: String,
    normalizer: Arc<dyn ValueNormalizer>,
}

impl OidNormalizer {
    pub fn new(oid: impl Into<String>, normalizer: Arc<dyn ValueNormalizer>) -> Self {
        OidNormalizer {
            oid: oid.into(),
            normalizer,
        }
    }

    pub fn oid(&self) -> &str {
        &self.oid
    }

    pub fn normalizer(&self) -> &dyn ValueNormalizer {
        self.normalizer.as_ref()
    }
}

impl Debug for OidNormalizer {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("OidNormalizer")
            .field("oid", &self.oid)
            .finish_non_exhaustive()
    }
}

/// One attribute type in a schema configuration file.
///
/// ```json
/// { "oid": "2.5.4.3", "names": ["cn", "commonName"], "normalizer": "deepTrimToLower" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeTypeConfig {
    pub oid: String,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub normalizer: BuiltinNormalizer,
}

/// Attribute types of RFC 4519 and RFC 2307 that commonly appear in DNs.
const STANDARD_ATTRIBUTES: &[(&str, &[&str], BuiltinNormalizer)] = &[
    ("2.5.4.0", &["objectClass"], BuiltinNormalizer::DeepTrimToLower),
    ("2.5.4.3", &["cn", "commonName"], BuiltinNormalizer::DeepTrimToLower),
    ("2.5.4.4", &["sn", "surname"], BuiltinNormalizer::DeepTrimToLower),
    ("2.5.4.5", &["serialNumber"], BuiltinNormalizer::DeepTrimToLower),
    ("2.5.4.6", &["c", "countryName"], BuiltinNormalizer::DeepTrimToLower),
    ("2.5.4.7", &["l", "localityName"], BuiltinNormalizer::DeepTrimToLower),
    ("2.5.4.8", &["st", "stateOrProvinceName"], BuiltinNormalizer::DeepTrimToLower),
    ("2.5.4.9", &["street", "streetAddress"], BuiltinNormalizer::DeepTrimToLower),
    ("2.5.4.10", &["o", "organizationName"], BuiltinNormalizer::DeepTrimToLower),
    ("2.5.4.11", &["ou", "organizationalUnitName"], BuiltinNormalizer::DeepTrimToLower),
    ("2.5.4.12", &["title"], BuiltinNormalizer::DeepTrimToLower),
    ("2.5.4.20", &["telephoneNumber"], BuiltinNormalizer::DeepTrim),
    ("0.9.2342.19200300.100.1.1", &["uid", "userid"], BuiltinNormalizer::DeepTrimToLower),
    ("0.9.2342.19200300.100.1.3", &["mail", "rfc822Mailbox"], BuiltinNormalizer::DeepTrimToLower),
    ("0.9.2342.19200300.100.1.25", &["dc", "domainComponent"], BuiltinNormalizer::DeepTrimToLower),
    ("1.3.6.1.1.1.1.0", &["uidNumber"], BuiltinNormalizer::NumericString),
    ("1.3.6.1.1.1.1.1", &["gidNumber"], BuiltinNormalizer::NumericString),
];

static STANDARD: Lazy<OidMap> = Lazy::new(|| {
    let mut map = OidMap::new();
    for (oid, names, normalizer) in STANDARD_ATTRIBUTES {
        map.register(oid, *names, Arc::new(*normalizer));
    }
    map
});

/// Lookup table from attribute type names and OIDs (case insensitive) to
/// their [`OidNormalizer`].
#[derive(Clone, Default)]
pub struct OidMap {
    entries: HashMap<String, OidNormalizer>,
}

impl OidMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in table of common attribute types (`cn`, `dc`, `ou`,
    /// `uid`, ...).
    pub fn standard() -> Self {
        STANDARD.clone()
    }

    pub fn from_config(configs: &[AttributeTypeConfig]) -> Result<Self, DnError> {
        let mut map = OidMap::new();
        for config in configs {
            map.insert_aliases(config.names.as_slice(), &config.oid, config.normalizer)?;
        }
        Ok(map)
    }

    /// Reads a JSON array of [`AttributeTypeConfig`].
    pub fn from_json(json: &str) -> Result<Self, DnError> {
        let configs: Vec<AttributeTypeConfig> = serde_json::from_str(json)?;
        Self::from_config(&configs)
    }

    /// Registers `name` (and `oid` itself) for `oid`.
    pub fn insert(
        &mut self,
        name: &str,
        oid: &str,
        normalizer: impl ValueNormalizer + 'static,
    ) -> Result<&mut Self, DnError> {
        self.insert_aliases(&[name], oid, normalizer)
    }

    /// Registers every alias in `names`, and `oid` itself, for `oid`.
    pub fn insert_aliases<S: AsRef<str>>(
        &mut self,
        names: &[S],
        oid: &str,
        normalizer: impl ValueNormalizer + 'static,
    ) -> Result<&mut Self, DnError> {
        if !is_numeric_oid(oid) {
            return Err(DnError::InvalidOid(oid.to_string()));
        }
        if let Some(bad) = names.iter().find(|name| !is_descr(name.as_ref())) {
            return Err(DnError::Config(format!(
                "'{}' is not a valid attribute type name",
                bad.as_ref()
            )));
        }

        self.register(oid, names, Arc::new(normalizer));
        Ok(self)
    }

    fn register<S: AsRef<str>>(
        &mut self,
        oid: &str,
        names: &[S],
        normalizer: Arc<dyn ValueNormalizer>,
    ) {
        let entry = OidNormalizer::new(oid, normalizer);
        for name in names {
            self.entries
                .insert(name.as_ref().to_ascii_lowercase(), entry.clone());
        }
        self.entries.insert(oid.to_string(), entry);
    }

    /// Looks up an attribute type by name or OID. Surrounding spaces and an
    /// `oid.` prefix are ignored.
    pub fn get(&self, name: &str) -> Option<&OidNormalizer> {
        let key = strip_oid_prefix(name.trim()).to_ascii_lowercase();
        self.entries.get(&key)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of registered keys, aliases and OIDs alike.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Debug for OidMap {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut keys: Vec<&String> = self.entries.keys().collect();
        keys.sort();
        f.debug_struct("OidMap").field("keys", &keys).finish()
    }
}
