use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::attribute::Attribute;

/// An ordered collection of [`Attribute`]s keyed by attribute id.
///
/// Every attribute occupies a fixed slot. Compiled rules and the per-evaluation
/// state table address attributes by slot, so lookups never depend on object
/// identity and the catalog order is the order results are reported in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Attribute>", into = "Vec<Attribute>")]
pub struct Catalog {
    attributes: Vec<Attribute>,
    slots: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog from attributes in display order.
    ///
    /// Ids must be unique. A repeated id keeps its first declaration; later
    /// ones are dropped with a warning.
    #[must_use]
    pub fn new(attributes: impl IntoIterator<Item = Attribute>) -> Self {
        let mut catalog = Self::default();
        for attribute in attributes {
            catalog.push(attribute);
        }
        catalog
    }

    /// Parse a catalog from its JSON array form.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] if the input is not a valid attribute array.
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }

    fn push(&mut self, attribute: Attribute) {
        if self.slots.contains_key(&attribute.id) {
            tracing::warn!(attribute = %attribute.id, "duplicate attribute id in catalog, keeping first");
            return;
        }
        self.slots.insert(attribute.id.clone(), self.attributes.len());
        self.attributes.push(attribute);
    }

    /// Look up an attribute by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Attribute> {
        self.slot(id).map(|slot| &self.attributes[slot])
    }

    /// The slot of an attribute id, if the catalog declares it.
    #[must_use]
    pub fn slot(&self, id: &str) -> Option<usize> {
        self.slots.get(id).copied()
    }

    pub(crate) fn at(&self, slot: usize) -> &Attribute {
        &self.attributes[slot]
    }

    /// The number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Iterate over attributes in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter()
    }
}

impl From<Vec<Attribute>> for Catalog {
    fn from(attributes: Vec<Attribute>) -> Self {
        Catalog::new(attributes)
    }
}

impl From<Catalog> for Vec<Attribute> {
    fn from(catalog: Catalog) -> Self {
        catalog.attributes
    }
}

impl FromIterator<Attribute> for Catalog {
    fn from_iter<T: IntoIterator<Item = Attribute>>(iter: T) -> Self {
        Catalog::new(iter)
    }
}
