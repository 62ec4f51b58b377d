//! The requirement index: every requirement grouped by the first character of
//! its identifier.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::Requirement;

/// An alphabetically grouped listing of requirements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Index {
    /// Groups in ascending order of their key.
    pub groups: Vec<IndexGroup>,
}

/// All index entries sharing a first character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexGroup {
    /// The first character of every identifier in the group.
    pub key: char,
    /// Entries sorted by identifier.
    pub entries: Vec<IndexEntry>,
}

/// One requirement in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    /// The requirement identifier, as displayed.
    pub name: String,
    /// The document the requirement is defined in.
    pub docname: String,
    /// The anchor of the requirement within its document.
    pub anchor: String,
    /// The fully qualified object name, such as `req.REQ-1`.
    pub object_name: String,
}

impl Index {
    /// Whether the index has no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The total number of entries across all groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.iter().map(|group| group.entries.len()).sum()
    }
}

/// Builds the index for `records`.
///
/// Records are sorted by identifier (stably, so duplicates keep their relative
/// order) and grouped by the first character of the identifier.
#[must_use]
pub fn build_index<'a, I>(records: I) -> Index
where
    I: IntoIterator<Item = &'a Requirement>,
{
    let mut sorted: Vec<&Requirement> = records.into_iter().collect();
    sorted.sort_by(|a, b| a.id().cmp(b.id()));

    let mut groups: BTreeMap<char, Vec<IndexEntry>> = BTreeMap::new();
    for requirement in sorted {
        groups
            .entry(requirement.id().group_key())
            .or_default()
            .push(IndexEntry {
                name: requirement.id().to_string(),
                docname: requirement.location().docname.clone(),
                anchor: requirement.anchor(),
                object_name: requirement.id().object_name(),
            });
    }

    Index {
        groups: groups
            .into_iter()
            .map(|(key, entries)| IndexGroup { key, entries })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Fields, Location, RequirementId};

    fn make_requirement(name: &str, docname: &str) -> Requirement {
        Requirement::new(
            RequirementId::try_from(name).unwrap(),
            Fields::new(format!("{name} description")),
            Location::new(docname, 1),
        )
    }

    #[test]
    fn empty_records_give_empty_index() {
        let records: [Requirement; 0] = [];
        let index = build_index(&records);
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
    }

    #[test]
    fn groups_by_first_character_in_ascending_order() {
        let records = [
            make_requirement("SYS-2", "system"),
            make_requirement("REQ-1", "index"),
            make_requirement("SYS-1", "system"),
            make_requirement("ARCH-1", "arch"),
        ];

        let index = build_index(&records);

        let keys: Vec<_> = index.groups.iter().map(|g| g.key).collect();
        assert_eq!(keys, ['A', 'R', 'S']);

        let s_group: Vec<_> = index.groups[2]
            .entries
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(s_group, ["SYS-1", "SYS-2"]);
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn every_entry_is_in_the_group_of_its_first_character() {
        let records: Vec<_> = ["b-1", "B-1", "REQ-1", "R", "1-X", "RX-2"]
            .into_iter()
            .map(|name| make_requirement(name, "index"))
            .collect();

        let index = build_index(&records);

        for group in &index.groups {
            for entry in &group.entries {
                assert!(entry.name.starts_with(group.key));
            }
        }
        assert_eq!(index.len(), records.len());

        let keys: Vec<_> = index.groups.iter().map(|g| g.key).collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn entries_carry_location_and_anchor() {
        let records = [make_requirement("REQ-1", "design/core")];

        let index = build_index(&records);

        assert_eq!(
            index.groups,
            [IndexGroup {
                key: 'R',
                entries: vec![IndexEntry {
                    name: "REQ-1".to_string(),
                    docname: "design/core".to_string(),
                    anchor: "req-REQ-1".to_string(),
                    object_name: "req.REQ-1".to_string(),
                }],
            }]
        );
    }

    #[test]
    fn duplicates_keep_registration_order() {
        let records = [
            make_requirement("REQ-1", "first"),
            make_requirement("REQ-0", "other"),
            make_requirement("REQ-1", "second"),
        ];

        let index = build_index(&records);

        let docs: Vec<_> = index.groups[0]
            .entries
            .iter()
            .map(|e| e.docname.as_str())
            .collect();
        assert_eq!(docs, ["other", "first", "second"]);
    }
}
