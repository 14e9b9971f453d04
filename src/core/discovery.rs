use crate::core::adjacency::AdjacencyModel;
use crate::domain::model::FlatNumber;
use std::collections::HashSet;

/// Depth-first walk from `start` over stored links.
///
/// The result always starts with `start`, even when it is not a known flat,
/// and lists every reachable flat once in the order it was first visited.
/// Links are followed only in the direction they are stored.
pub fn find_group(model: &AdjacencyModel, start: &FlatNumber) -> Vec<FlatNumber> {
    let mut visited: HashSet<FlatNumber> = HashSet::new();
    let mut group = Vec::new();
    let mut stack = vec![start.clone()];

    while let Some(flat) = stack.pop() {
        if !visited.insert(flat.clone()) {
            continue;
        }
        // reversed so the first stored neighbor is explored first
        stack.extend(
            model
                .neighbors(flat.as_str())
                .iter()
                .rev()
                .filter(|n| !visited.contains(*n))
                .cloned(),
        );
        group.push(flat);
    }

    group
}

/// Splits every known flat into groups, walking from each flat of `order`
/// that no earlier group has claimed. Flats reached only through a dangling
/// link are left out.
pub fn partition<'a>(
    model: &AdjacencyModel,
    order: impl IntoIterator<Item = &'a FlatNumber>,
) -> Vec<Vec<FlatNumber>> {
    let mut assigned: HashSet<FlatNumber> = HashSet::new();
    let mut groups = Vec::new();

    for flat in order {
        if assigned.contains(flat) || !model.contains(flat.as_str()) {
            continue;
        }
        let group: Vec<FlatNumber> = find_group(model, flat)
            .into_iter()
            .filter(|member| model.contains(member.as_str()) && !assigned.contains(member))
            .collect();
        assigned.extend(group.iter().cloned());
        groups.push(group);
    }

    groups
}

/// Fixed-size groups of consecutive flats, the way the dashboard grouped
/// flats before links were stored.
pub fn sequential_groups(flats: &[FlatNumber], size: usize) -> Vec<Vec<FlatNumber>> {
    let mut sorted = flats.to_vec();
    sorted.sort_by(|a, b| a.numeric_cmp(b));
    sorted.chunks(size.max(1)).map(<[FlatNumber]>::to_vec).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(label: &str) -> FlatNumber {
        label.parse().unwrap()
    }

    fn model(lists: &[(&str, &[&str])]) -> AdjacencyModel {
        let mut model = AdjacencyModel::new();
        for (flat, links) in lists {
            model.insert_flat(n(flat), links.iter().map(|l| n(l)).collect());
        }
        model
    }

    fn labels(group: &[FlatNumber]) -> Vec<&str> {
        group.iter().map(|f| f.as_str()).collect()
    }

    #[test]
    fn test_pair_and_singleton() {
        let model = model(&[("101", &["102"]), ("102", &["101"]), ("103", &[])]);

        assert_eq!(labels(&find_group(&model, &n("101"))), vec!["101", "102"]);
        assert_eq!(labels(&find_group(&model, &n("103"))), vec!["103"]);
    }

    #[test]
    fn test_unknown_start_is_its_own_group() {
        let model = model(&[("101", &[])]);
        assert_eq!(labels(&find_group(&model, &n("999"))), vec!["999"]);
    }

    #[test]
    fn test_cycle_terminates_without_repeats() {
        let model = model(&[
            ("101", &["102", "103"]),
            ("102", &["103", "101"]),
            ("103", &["101", "102"]),
        ]);
        let group = find_group(&model, &n("102"));

        assert_eq!(labels(&group), vec!["102", "103", "101"]);
        let unique: HashSet<_> = group.iter().collect();
        assert_eq!(unique.len(), group.len());
    }

    #[test]
    fn test_visitation_order_is_depth_first() {
        let model = model(&[
            ("1", &["2", "4"]),
            ("2", &["3"]),
            ("3", &[]),
            ("4", &["5"]),
            ("5", &[]),
        ]);
        assert_eq!(
            labels(&find_group(&model, &n("1"))),
            vec!["1", "2", "3", "4", "5"]
        );
    }

    #[test]
    fn test_symmetric_links_give_the_same_set() {
        let model = model(&[
            ("101", &["102"]),
            ("102", &["101", "103"]),
            ("103", &["102"]),
        ]);
        let mut from_a = find_group(&model, &n("101"));
        let mut from_c = find_group(&model, &n("103"));
        from_a.sort();
        from_c.sort();
        assert_eq!(from_a, from_c);
    }

    #[test]
    fn test_asymmetric_link_is_one_way() {
        let model = model(&[("101", &["102"]), ("102", &[])]);

        assert_eq!(labels(&find_group(&model, &n("101"))), vec!["101", "102"]);
        assert_eq!(labels(&find_group(&model, &n("102"))), vec!["102"]);
    }

    #[test]
    fn test_dangling_link_is_followed() {
        let model = model(&[("101", &["999"])]);
        assert_eq!(labels(&find_group(&model, &n("101"))), vec!["101", "999"]);
    }

    #[test]
    fn test_partition_covers_every_flat_once() {
        let model = model(&[
            ("101", &["102"]),
            ("102", &["101"]),
            ("103", &["999"]),
            ("201", &["202"]),
            ("202", &["201"]),
        ]);
        let groups = partition(&model, model.flats());
        let groups: Vec<Vec<&str>> = groups.iter().map(|g| labels(g)).collect();

        assert_eq!(
            groups,
            vec![vec!["101", "102"], vec!["103"], vec!["201", "202"]]
        );
    }

    #[test]
    fn test_partition_with_one_way_link_claims_first_reach() {
        // 102 stores no links; the walk from 101 reaches it first
        let model = model(&[("101", &["102"]), ("102", &[]), ("103", &["102"])]);
        let groups = partition(&model, model.flats());
        let groups: Vec<Vec<&str>> = groups.iter().map(|g| labels(g)).collect();

        assert_eq!(groups, vec![vec!["101", "102"], vec!["103"]]);
    }

    #[test]
    fn test_sequential_groups_sort_numerically() {
        let flats: Vec<FlatNumber> = ["1001", "101", "201", "102", "99"]
            .iter()
            .map(|s| n(s))
            .collect();
        let groups = sequential_groups(&flats, 3);
        let groups: Vec<Vec<&str>> = groups.iter().map(|g| labels(g)).collect();

        assert_eq!(groups, vec![vec!["99", "101", "102"], vec!["201", "1001"]]);
    }
}
