//! Option vocabularies: four immutable id-to-label lists fetched once at
//! startup and used for label resolution and dropdown population.

use crate::service::HierarchyService;
use stacks_protocol::VocabEntry;
use stacks_protocol::VocabKind;

#[derive(Clone, Debug, Default)]
pub struct Vocabularies {
    statuses: Vec<VocabEntry>,
    users: Vec<VocabEntry>,
    collections: Vec<VocabEntry>,
    collection_groups: Vec<VocabEntry>,
}

impl Vocabularies {
    /// Fetch all four lists concurrently. A list that fails to load degrades
    /// to empty (ids render raw, dropdowns stay empty) rather than blocking
    /// startup.
    pub async fn load(service: &dyn HierarchyService) -> Self {
        let (statuses, users, collections, collection_groups) = tokio::join!(
            fetch(service, VocabKind::MigrationStatus),
            fetch(service, VocabKind::User),
            fetch(service, VocabKind::Collection),
            fetch(service, VocabKind::CollectionGroup),
        );
        Self {
            statuses,
            users,
            collections,
            collection_groups,
        }
    }

    pub fn entries(&self, kind: VocabKind) -> &[VocabEntry] {
        match kind {
            VocabKind::MigrationStatus => &self.statuses,
            VocabKind::User => &self.users,
            VocabKind::Collection => &self.collections,
            VocabKind::CollectionGroup => &self.collection_groups,
        }
    }

    pub fn label_for(&self, kind: VocabKind, value: &str) -> Option<&str> {
        self.entries(kind)
            .iter()
            .find(|entry| entry.value == value)
            .map(|entry| entry.label.as_str())
    }

    #[cfg(test)]
    pub(crate) fn for_tests(statuses: Vec<VocabEntry>, users: Vec<VocabEntry>) -> Self {
        Self {
            statuses,
            users,
            collections: Vec::new(),
            collection_groups: Vec::new(),
        }
    }
}

async fn fetch(service: &dyn HierarchyService, kind: VocabKind) -> Vec<VocabEntry> {
    match service.vocabulary(kind).await {
        Ok(map) => {
            let mut entries: Vec<VocabEntry> = map
                .into_iter()
                .map(|(value, label)| VocabEntry { value, label })
                .collect();
            entries.sort_by(|a, b| a.label.to_lowercase().cmp(&b.label.to_lowercase()));
            entries
        }
        Err(error) => {
            tracing::warn!(kind = %kind, %error, "vocabulary fetch failed; list stays empty");
            Vec::new()
        }
    }
}
