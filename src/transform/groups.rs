//! Group creation payloads.

use serde::Serialize;

use crate::models::GroupRecord;

/// Body for `POST /v2/usergroups`.
///
/// The roster's `GroupId` rides along as a custom attribute under
/// `attributes.property.group_id` so later audits can trace a platform group
/// back to its roster row.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GroupPayload {
    pub name: String,
    pub email: String,
    pub description: String,
    pub attributes: GroupAttributes,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GroupAttributes {
    pub property: GroupProperty,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GroupProperty {
    pub group_id: String,
}

/// One payload per roster row, in file order.
pub fn build_group_payloads(groups: &[GroupRecord]) -> Vec<GroupPayload> {
    groups
        .iter()
        .map(|group| GroupPayload {
            name: group.group_name.clone(),
            email: group.email.clone(),
            description: group.description.clone(),
            attributes: GroupAttributes {
                property: GroupProperty {
                    group_id: group.group_id.clone(),
                },
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn group(name: &str, id: &str) -> GroupRecord {
        GroupRecord {
            group_name: name.into(),
            email: format!("{}@x.com", name.to_lowercase()),
            description: format!("{name} group"),
            group_id: id.into(),
        }
    }

    #[test]
    fn test_one_payload_per_row() {
        let rows = vec![group("Eng", "1"), group("Sales", "2"), group("HR", "3")];
        let payloads = build_group_payloads(&rows);

        assert_eq!(payloads.len(), 3);
        for (row, payload) in rows.iter().zip(&payloads) {
            assert_eq!(payload.name, row.group_name);
            assert_eq!(payload.attributes.property.group_id, row.group_id);
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(build_group_payloads(&[]).is_empty());
    }

    #[test]
    fn test_payload_wire_shape() {
        let rows = vec![GroupRecord {
            group_name: "Eng".into(),
            email: "eng@x.com".into(),
            description: "Engineering".into(),
            group_id: "1".into(),
        }];
        let payloads = build_group_payloads(&rows);

        let wire = serde_json::to_value(&payloads[0]).unwrap();
        assert_eq!(
            wire,
            json!({
                "name": "Eng",
                "email": "eng@x.com",
                "description": "Engineering",
                "attributes": { "property": { "group_id": "1" } }
            })
        );
    }
}
