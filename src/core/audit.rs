use crate::core::adjacency::AdjacencyModel;
use crate::core::discovery::partition;
use crate::domain::model::FlatNumber;
use serde::Serialize;
use std::fmt;

/// Data-quality problems in stored links. Nothing here is fixed automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AdjacencyIssue {
    Asymmetric { from: FlatNumber, to: FlatNumber },
    Dangling { from: FlatNumber, to: FlatNumber },
    SelfLink { flat: FlatNumber },
    Oversized { members: Vec<FlatNumber> },
}

impl fmt::Display for AdjacencyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdjacencyIssue::Asymmetric { from, to } => {
                write!(f, "{} links to {} but {} does not link back", from, to, to)
            }
            AdjacencyIssue::Dangling { from, to } => {
                write!(f, "{} links to unknown flat {}", from, to)
            }
            AdjacencyIssue::SelfLink { flat } => write!(f, "{} links to itself", flat),
            AdjacencyIssue::Oversized { members } => {
                let labels: Vec<&str> = members.iter().map(|m| m.as_str()).collect();
                write!(
                    f,
                    "group of {} exceeds the target size: {}",
                    members.len(),
                    labels.join(", ")
                )
            }
        }
    }
}

pub fn audit(model: &AdjacencyModel, target_size: usize) -> Vec<AdjacencyIssue> {
    let mut issues = Vec::new();

    for (from, to) in model.links() {
        if from == to {
            issues.push(AdjacencyIssue::SelfLink { flat: from.clone() });
        } else if !model.contains(to.as_str()) {
            issues.push(AdjacencyIssue::Dangling {
                from: from.clone(),
                to: to.clone(),
            });
        } else if !model.has_link(to.as_str(), from.as_str()) {
            issues.push(AdjacencyIssue::Asymmetric {
                from: from.clone(),
                to: to.clone(),
            });
        }
    }

    issues.extend(
        partition(model, model.flats())
            .into_iter()
            .filter(|group| group.len() > target_size)
            .map(|members| AdjacencyIssue::Oversized { members }),
    );

    issues
}
