//! Family-level validators comparing one key across every locale.
//!
//! Each validator derives a property per file (presence, value, parameter
//! list, tag shape), clusters files by equal property and reports the
//! files outside the majority cluster.

pub mod identical;
pub mod missing;
pub mod parameters;
pub mod tags;

use std::collections::BTreeMap;

use crate::types::ResourceFile;

pub use identical::IdenticalTranslationValidator;
pub use missing::MissingTranslationValidator;
pub use parameters::ParametricCoherenceValidator;
pub use tags::HtmlTagCoherenceValidator;

/// Files sharing one derived property.
#[derive(Debug, Clone)]
pub struct Group<'a, K> {
    pub key: K,
    pub files: Vec<&'a ResourceFile>,
}

/// Clusters files by `key`. The largest group comes first; equal sizes are
/// ordered by key, and files inside a group by name, so the result does not
/// depend on the order files were given in.
pub fn group_files<'a, K: Ord>(
    items: impl IntoIterator<Item = (&'a ResourceFile, K)>,
) -> Vec<Group<'a, K>> {
    let mut clusters: BTreeMap<K, Vec<&'a ResourceFile>> = BTreeMap::new();
    for (file, key) in items {
        clusters.entry(key).or_default().push(file);
    }
    let mut groups: Vec<Group<'a, K>> = clusters
        .into_iter()
        .map(|(key, mut files)| {
            files.sort_by(|a, b| a.file_name().cmp(b.file_name()));
            Group { key, files }
        })
        .collect();
    // Stable sort keeps key order among groups of equal size
    groups.sort_by(|a, b| b.files.len().cmp(&a.files.len()));
    groups
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_files_is_order_independent() {
        let a = ResourceFile::from_content("m_de.properties", "k = 1\n").unwrap();
        let b = ResourceFile::from_content("m_fr.properties", "k = 1\n").unwrap();
        let c = ResourceFile::from_content("m_it.properties", "k = 2\n").unwrap();

        let forward = group_files([(&a, "x"), (&b, "x"), (&c, "y")]);
        let backward = group_files([(&c, "y"), (&b, "x"), (&a, "x")]);
        assert_eq!(forward.len(), 2);
        assert_eq!(forward[0].key, "x");
        assert_eq!(backward[0].key, "x");
        assert_eq!(
            forward[0].files.iter().map(|f| f.file_name()).collect::<Vec<_>>(),
            backward[0].files.iter().map(|f| f.file_name()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_group_files_ties_ordered_by_key() {
        let a = ResourceFile::from_content("m_de.properties", "k = 1\n").unwrap();
        let b = ResourceFile::from_content("m_fr.properties", "k = 2\n").unwrap();
        let groups = group_files([(&b, 2), (&a, 1)]);
        assert_eq!(groups[0].key, 1);
        assert_eq!(groups[1].key, 2);
    }
}
