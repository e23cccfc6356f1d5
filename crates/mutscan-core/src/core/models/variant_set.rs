use super::variant::Variant;
use std::collections::HashSet;

/// Insertion-ordered collection of distinct variants with constant-time membership.
#[derive(Debug, Clone, Default)]
pub struct VariantSet {
    seen: HashSet<Variant>,
    ordered: Vec<Variant>,
}

impl VariantSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            seen: HashSet::with_capacity(capacity),
            ordered: Vec::with_capacity(capacity),
        }
    }

    /// Appends `variant` unless it is already present. Returns whether it was added.
    pub fn insert(&mut self, variant: Variant) -> bool {
        if self.seen.contains(&variant) {
            return false;
        }
        self.seen.insert(variant.clone());
        self.ordered.push(variant);
        true
    }

    pub fn contains(&self, variant: &Variant) -> bool {
        self.seen.contains(variant)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Variant> {
        self.ordered.iter()
    }

    pub fn into_vec(self) -> Vec<Variant> {
        self.ordered
    }
}

impl<'a> IntoIterator for &'a VariantSet {
    type Item = &'a Variant;
    type IntoIter = std::slice::Iter<'a, Variant>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Variant {
        s.parse().unwrap()
    }

    #[test]
    fn insert_keeps_first_occurrence_order() {
        let mut set = VariantSet::new();
        assert!(set.insert(v("K4R")));
        assert!(set.insert(v("A1G")));
        assert!(!set.insert(v("K4R")));
        let keys: Vec<String> = set.iter().map(Variant::key).collect();
        assert_eq!(keys, vec!["K4R", "A1G"]);
    }

    #[test]
    fn contains_reflects_inserted_variants() {
        let mut set = VariantSet::with_capacity(2);
        set.insert(v("A1G,K4R"));
        assert!(set.contains(&v("K4R,A1G")));
        assert!(!set.contains(&v("A1G")));
        assert_eq!(set.len(), 1);
    }
}
