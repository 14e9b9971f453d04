//! Joining a newly created flat to an existing group that still has room.
//!
//! Groups are guided towards `target_size` members, not capped: the size of a
//! candidate group is estimated from two hops of links rather than a full
//! walk, and an administrator may connect flats past the target later.

use crate::core::adjacency::AdjacencyModel;
use crate::domain::model::FlatNumber;

pub const DEFAULT_TARGET_SIZE: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub flat_number: FlatNumber,
    /// Existing flats the new flat was linked to. Empty when it starts its own group.
    pub joined: Vec<FlatNumber>,
}

impl Placement {
    pub fn is_alone(&self) -> bool {
        self.joined.is_empty()
    }
}

/// `flat`, its direct links, and their direct links, in that order. Links to
/// flats the model does not know are skipped.
pub fn extended_group(model: &AdjacencyModel, flat: &FlatNumber) -> Vec<FlatNumber> {
    let mut group = vec![flat.clone()];
    let direct: Vec<&FlatNumber> = model
        .neighbors(flat.as_str())
        .iter()
        .filter(|first| model.contains(first.as_str()))
        .collect();

    for first in &direct {
        if !group.contains(*first) {
            group.push((*first).clone());
        }
    }
    for first in &direct {
        for second in model.neighbors(first.as_str()) {
            if model.contains(second.as_str()) && !group.contains(second) {
                group.push(second.clone());
            }
        }
    }

    group
}

/// First group, scanning flats in ascending order, whose estimated size is
/// below `target_size`. Only flats with fewer than `target_size - 1` links
/// are considered as a starting point.
pub fn find_target_group(
    model: &AdjacencyModel,
    new_flat: &FlatNumber,
    target_size: usize,
) -> Option<Vec<FlatNumber>> {
    let max_links = target_size.saturating_sub(1);

    model
        .flats()
        .filter(|flat| *flat != new_flat)
        .filter(|flat| model.neighbors(flat.as_str()).len() < max_links)
        .map(|flat| {
            let mut group = extended_group(model, flat);
            group.retain(|member| member != new_flat);
            group
        })
        .find(|group| group.len() < target_size)
}

/// Registers `new_flat` in the model and links it both ways to every member
/// of the chosen group.
pub fn place_new_flat(
    model: &mut AdjacencyModel,
    new_flat: &FlatNumber,
    target_size: usize,
) -> Placement {
    let target = find_target_group(model, new_flat, target_size);

    if !model.contains(new_flat.as_str()) {
        model.insert_flat(new_flat.clone(), Vec::new());
    }

    let joined = match target {
        Some(group) if group.len() < target_size => {
            for member in &group {
                model.connect(member, new_flat);
            }
            group
        }
        _ => Vec::new(),
    };

    Placement {
        flat_number: new_flat.clone(),
        joined,
    }
}
