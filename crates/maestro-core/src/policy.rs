//! Per-label entity policies.
//!
//! The table below is the only place where entity kinds differ in behavior:
//! it decides which timestamps the graph layer stamps on create and whether
//! `updated_at` is refreshed on every update. Every node gets an `id`
//! regardless of label. Labels missing from the table get [`EntityPolicy::PLAIN`].

pub const ID_FIELD: &str = "id";
pub const CREATED_AT_FIELD: &str = "created_at";
pub const UPDATED_AT_FIELD: &str = "updated_at";

/// Which fields the graph layer manages for one label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityPolicy {
    /// Stamp `created_at` when the node is created.
    pub created_at_on_create: bool,
    /// Stamp `updated_at` when the node is created.
    pub updated_at_on_create: bool,
    /// Overwrite `updated_at` on every non-empty update.
    pub refresh_updated_at: bool,
}

impl EntityPolicy {
    /// Id only, no timestamps.
    pub const PLAIN: Self = Self {
        created_at_on_create: false,
        updated_at_on_create: false,
        refresh_updated_at: false,
    };

    /// Whether listings for this label can be ordered by creation time.
    pub fn orders_by_created_at(&self) -> bool {
        self.created_at_on_create
    }
}

impl Default for EntityPolicy {
    fn default() -> Self {
        Self::PLAIN
    }
}

const POLICIES: &[(&str, EntityPolicy)] = &[
    (
        "Album",
        EntityPolicy {
            created_at_on_create: true,
            updated_at_on_create: true,
            refresh_updated_at: true,
        },
    ),
    (
        "Artist",
        EntityPolicy {
            created_at_on_create: true,
            updated_at_on_create: false,
            refresh_updated_at: false,
        },
    ),
    ("Genre", EntityPolicy::PLAIN),
];

/// Look up the policy for a label. Unknown labels get [`EntityPolicy::PLAIN`].
pub fn policy_for(label: &str) -> EntityPolicy {
    POLICIES
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, policy)| *policy)
        .unwrap_or_default()
}

/// Labels with an explicit policy row.
pub fn known_labels() -> impl Iterator<Item = &'static str> {
    POLICIES.iter().map(|(name, _)| *name)
}
