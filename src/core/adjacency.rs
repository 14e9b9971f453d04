use crate::domain::model::{Flat, FlatNumber};
use std::collections::BTreeMap;

/// Flat number -> flats it links to directly, in stored order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjacencyModel {
    lists: BTreeMap<FlatNumber, Vec<FlatNumber>>,
}

impl AdjacencyModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_flats<'a>(flats: impl IntoIterator<Item = &'a Flat>) -> Self {
        let lists = flats
            .into_iter()
            .map(|flat| (flat.flat_number.clone(), flat.connected_flats.clone()))
            .collect();
        Self { lists }
    }

    /// Registers a flat with the links it stores, replacing any previous list.
    pub fn insert_flat(&mut self, flat_number: FlatNumber, connected_flats: Vec<FlatNumber>) {
        self.lists.insert(flat_number, connected_flats);
    }

    pub fn contains(&self, flat_number: &str) -> bool {
        self.lists.contains_key(flat_number)
    }

    /// Known flats in ascending flat number order.
    pub fn flats(&self) -> impl Iterator<Item = &FlatNumber> {
        self.lists.keys()
    }

    /// Stored links of a flat. Unknown flats have none.
    pub fn neighbors(&self, flat_number: &str) -> &[FlatNumber] {
        self.lists
            .get(flat_number)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Appends a directed link `from -> to` unless it is already stored.
    /// Returns whether the list changed.
    pub fn add_link(&mut self, from: &FlatNumber, to: &FlatNumber) -> bool {
        let list = self.lists.entry(from.clone()).or_default();
        if list.contains(to) {
            return false;
        }
        list.push(to.clone());
        true
    }

    /// Links two flats in both directions. Returns whether either list changed.
    pub fn connect(&mut self, a: &FlatNumber, b: &FlatNumber) -> bool {
        let forward = self.add_link(a, b);
        let backward = self.add_link(b, a);
        forward || backward
    }

    pub fn connections_of(&self, flat_number: &str) -> Vec<FlatNumber> {
        self.neighbors(flat_number).to_vec()
    }

    /// Every stored directed link, grouped by source flat.
    pub fn links(&self) -> impl Iterator<Item = (&FlatNumber, &FlatNumber)> {
        self.lists
            .iter()
            .flat_map(|(from, targets)| targets.iter().map(move |to| (from, to)))
    }

    pub fn has_link(&self, from: &str, to: &str) -> bool {
        self.neighbors(from).iter().any(|n| n.as_str() == to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(label: &str) -> FlatNumber {
        label.parse().unwrap()
    }

    #[test]
    fn test_unknown_flat_has_no_neighbors() {
        let model = AdjacencyModel::new();
        assert!(model.neighbors("999").is_empty());
        assert!(!model.contains("999"));
    }

    #[test]
    fn test_neighbors_keep_stored_order() {
        let flats = vec![
            Flat::new(n("101"), vec![n("103"), n("102")]),
            Flat::new(n("102"), vec![]),
        ];
        let model = AdjacencyModel::from_flats(&flats);

        assert_eq!(model.neighbors("101"), &[n("103"), n("102")]);
        assert!(model.neighbors("102").is_empty());
        assert_eq!(model.flats().count(), 2);
    }

    #[test]
    fn test_add_link_is_idempotent_and_directed() {
        let mut model = AdjacencyModel::new();
        model.insert_flat(n("101"), vec![]);
        model.insert_flat(n("102"), vec![]);

        assert!(model.add_link(&n("101"), &n("102")));
        assert!(!model.add_link(&n("101"), &n("102")));
        assert_eq!(model.neighbors("101"), &[n("102")]);
        assert!(model.neighbors("102").is_empty());
    }

    #[test]
    fn test_connect_writes_both_directions() {
        let mut model = AdjacencyModel::new();
        model.insert_flat(n("101"), vec![n("102")]);
        model.insert_flat(n("102"), vec![]);

        // forward link already present, only the reverse one is added
        assert!(model.connect(&n("101"), &n("102")));
        assert!(model.has_link("102", "101"));
        assert!(!model.connect(&n("102"), &n("101")));
        assert_eq!(model.links().count(), 2);
    }

    #[test]
    fn test_flats_iterate_in_ascending_order() {
        let mut model = AdjacencyModel::new();
        for label in ["201", "101", "102"] {
            model.insert_flat(n(label), vec![]);
        }
        let order: Vec<&str> = model.flats().map(|f| f.as_str()).collect();
        assert_eq!(order, vec!["101", "102", "201"]);
    }
}
