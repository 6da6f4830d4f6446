//! Group a lorry's jobs by delivery location for display

use serde::{Deserialize, Serialize};

use crate::model::{DeliveryLocation, PlannedJob};

/// Group key used when a job carries no location information at all
pub const UNKNOWN_LOCATION: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationGroup {
    pub location_id: String,
    pub location_name: String,
    pub jobs: Vec<PlannedJob>,
}

/// Group jobs by resolved location, in order of first appearance.
///
/// Key: explicit delivery location id, else destination key, else
/// [`UNKNOWN_LOCATION`]. Name: registry name for the key, else the raw
/// destination of the first job in the group, else the key itself.
pub fn group_by_location(jobs: &[PlannedJob], registry: &[DeliveryLocation]) -> Vec<LocationGroup> {
    let mut groups: Vec<LocationGroup> = Vec::new();

    for job in jobs {
        let key = location_key(job);
        match groups.iter_mut().find(|g| g.location_id == key) {
            Some(group) => group.jobs.push(job.clone()),
            None => {
                let location_name = display_name(&key, job, registry);
                groups.push(LocationGroup {
                    location_id: key,
                    location_name,
                    jobs: vec![job.clone()],
                });
            }
        }
    }

    groups
}

fn location_key(job: &PlannedJob) -> String {
    let Some(consignment) = job.consignment.as_ref() else {
        return UNKNOWN_LOCATION.to_string();
    };
    non_blank(consignment.delivery_location_id.as_deref())
        .or_else(|| non_blank(consignment.destination_key.as_deref()))
        .unwrap_or(UNKNOWN_LOCATION)
        .to_string()
}

fn display_name(key: &str, job: &PlannedJob, registry: &[DeliveryLocation]) -> String {
    let registered = registry
        .iter()
        .find(|l| l.id == key)
        .or_else(|| {
            registry
                .iter()
                .find(|l| l.destination_key.as_deref() == Some(key))
        })
        .map(|l| l.display_name.clone());

    registered
        .or_else(|| {
            job.consignment
                .as_ref()
                .and_then(|c| non_blank(Some(c.destination.as_str())))
                .map(str::to_string)
        })
        .unwrap_or_else(|| key.to_string())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Assignment, Consignment};

    fn job(id: &str, location: Option<&str>, dest_key: Option<&str>, dest: &str) -> PlannedJob {
        let mut c = Consignment::new(id, "Acme", dest);
        c.delivery_location_id = location.map(str::to_string);
        c.destination_key = dest_key.map(str::to_string);
        PlannedJob {
            assignment: Assignment {
                id: format!("A-{}", id),
                lorry_id: "L1".to_string(),
                consignment_id: id.to_string(),
                effective_pallets: 1,
                effective_weight: 0.0,
                is_reload: false,
                sort_order: 0,
            },
            consignment: Some(c),
        }
    }

    fn registry() -> Vec<DeliveryLocation> {
        vec![
            DeliveryLocation {
                id: "LOC-1".to_string(),
                display_name: "Trafford Park DC".to_string(),
                destination_key: Some("TRAFFORD PARK".to_string()),
            },
            DeliveryLocation {
                id: "LOC-2".to_string(),
                display_name: "Leeds Hub".to_string(),
                destination_key: None,
            },
        ]
    }

    #[test]
    fn test_groups_in_first_seen_order() {
        let jobs = vec![
            job("C1", None, Some("ZETLAND"), "Zetland Road"),
            job("C2", Some("LOC-2"), Some("LEEDS"), "Leeds"),
            job("C3", None, Some("ZETLAND"), "Zetland Rd"),
        ];
        let groups = group_by_location(&jobs, &registry());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].location_id, "ZETLAND");
        assert_eq!(groups[0].location_name, "Zetland Road");
        assert_eq!(groups[0].jobs.len(), 2);
        assert_eq!(groups[1].location_id, "LOC-2");
        assert_eq!(groups[1].location_name, "Leeds Hub");
    }

    #[test]
    fn test_destination_key_matches_registry() {
        let jobs = vec![job("C1", None, Some("TRAFFORD PARK"), "trafford park")];
        let groups = group_by_location(&jobs, &registry());
        assert_eq!(groups[0].location_id, "TRAFFORD PARK");
        assert_eq!(groups[0].location_name, "Trafford Park DC");
    }

    #[test]
    fn test_unknown_group() {
        let mut orphan = job("C1", None, None, "");
        orphan.consignment = None;
        let jobs = vec![job("C2", None, None, ""), orphan];
        let groups = group_by_location(&jobs, &[]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].location_id, UNKNOWN_LOCATION);
        assert_eq!(groups[0].location_name, UNKNOWN_LOCATION);
        assert_eq!(groups[0].jobs.len(), 2);
    }
}
