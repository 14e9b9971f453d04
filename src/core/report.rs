use crate::domain::model::Overview;
use crate::utils::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct GroupRow {
    group: usize,
    flats: String,
    total: usize,
    paid: usize,
    due: usize,
}

/// One CSV row per group: `group,flats,total,paid,due`, flats joined by `;`.
pub fn write_group_report<W: Write>(writer: W, overview: &Overview) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);

    for group in &overview.groups {
        let flats: Vec<&str> = group.members.iter().map(|m| m.as_str()).collect();
        csv.serialize(GroupRow {
            group: group.index,
            flats: flats.join(";"),
            total: group.stats.total,
            paid: group.stats.paid,
            due: group.stats.due,
        })?;
    }

    csv.flush()?;
    Ok(())
}
