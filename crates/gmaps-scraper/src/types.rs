//! Field candidates and per-field value sets shared by the extractors.

use serde::Serialize;

/// One of the four reconciled record fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Name,
    Address,
    Phone,
    Category,
}

impl FieldKind {
    pub const ALL: [FieldKind; 4] = [
        FieldKind::Name,
        FieldKind::Address,
        FieldKind::Phone,
        FieldKind::Category,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Name => "name",
            FieldKind::Address => "address",
            FieldKind::Phone => "phone",
            FieldKind::Category => "category",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a candidate came from. `Dom` always outranks `Scan`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Dom,
    Scan,
}

/// A classified text token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCandidate {
    pub kind: FieldKind,
    pub source: Source,
    pub text: String,
}

/// Candidates for every field from a single source, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    names: Vec<FieldCandidate>,
    addresses: Vec<FieldCandidate>,
    phones: Vec<FieldCandidate>,
    categories: Vec<FieldCandidate>,
}

impl CandidateSet {
    pub fn push(&mut self, candidate: FieldCandidate) {
        self.slot_mut(candidate.kind).push(candidate);
    }

    #[must_use]
    pub fn get(&self, kind: FieldKind) -> &[FieldCandidate] {
        match kind {
            FieldKind::Name => &self.names,
            FieldKind::Address => &self.addresses,
            FieldKind::Phone => &self.phones,
            FieldKind::Category => &self.categories,
        }
    }

    #[must_use]
    pub fn first(&self, kind: FieldKind) -> Option<&FieldCandidate> {
        self.get(kind).first()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        FieldKind::ALL.iter().all(|k| self.get(*k).is_empty())
    }

    /// The first candidate of each kind, or empty strings where none exist.
    #[must_use]
    pub fn provisional(&self) -> FieldValues {
        let mut values = FieldValues::default();
        for kind in FieldKind::ALL {
            if let Some(c) = self.first(kind) {
                values.set(kind, c.text.clone());
            }
        }
        values
    }

    fn slot_mut(&mut self, kind: FieldKind) -> &mut Vec<FieldCandidate> {
        match kind {
            FieldKind::Name => &mut self.names,
            FieldKind::Address => &mut self.addresses,
            FieldKind::Phone => &mut self.phones,
            FieldKind::Category => &mut self.categories,
        }
    }
}

/// One value per field. Empty string means "not found".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldValues {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub category: String,
}

impl FieldValues {
    #[must_use]
    pub fn get(&self, kind: FieldKind) -> &str {
        match kind {
            FieldKind::Name => &self.name,
            FieldKind::Address => &self.address,
            FieldKind::Phone => &self.phone,
            FieldKind::Category => &self.category,
        }
    }

    pub fn set(&mut self, kind: FieldKind, value: String) {
        match kind {
            FieldKind::Name => self.name = value,
            FieldKind::Address => self.address = value,
            FieldKind::Phone => self.phone = value,
            FieldKind::Category => self.category = value,
        }
    }
}
