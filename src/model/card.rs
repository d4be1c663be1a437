use serde::{Deserialize, Serialize};

/// A card as LeanKit returns it. Only the fields the mapper reads are modelled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub title: String,
    pub card_type: CardTypeRef,
    pub lane_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub external_links: Vec<ExternalLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<CustomId>,
    #[serde(default)]
    pub assigned_users: Vec<AssignedUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardTypeRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalLink {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomId {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedUser {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Read-only overview of the source board, used by `info --board`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSummary {
    pub card_types: Vec<NamedRef>,
    pub lanes: Vec<LaneSummary>,
    pub users: Vec<NamedRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NamedRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaneSummary {
    pub id: String,
    pub name: String,
    pub card_count: u32,
}

impl Card {
    pub fn card_type_id(&self) -> &str {
        &self.card_type.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_deserializes_with_optional_fields_missing() {
        let json = r#"{
            "id": "C1",
            "title": "Fix login",
            "cardType": { "id": "bug" },
            "laneId": "L1"
        }"#;
        let card: Card = serde_json::from_str(json).unwrap();
        assert_eq!(card.id, "C1");
        assert_eq!(card.card_type_id(), "bug");
        assert!(card.description.is_none());
        assert!(card.external_links.is_empty());
        assert!(card.custom_id.is_none());
        assert!(card.assigned_users.is_empty());
    }

    #[test]
    fn card_reads_leankit_field_names() {
        let json = r#"{
            "id": "943206826",
            "title": "Payment page times out",
            "description": "<p>Seen in prod</p>",
            "cardType": { "id": "943187745", "title": "Defect" },
            "laneId": "943188382",
            "externalLinks": [{ "label": "Ticket", "url": "https://tracker/T-1" }],
            "customId": { "value": "T-1", "prefix": "", "url": null },
            "assignedUsers": [{ "id": "25012", "fullName": "Sam Doe", "emailAddress": "sam@x" }]
        }"#;
        let card: Card = serde_json::from_str(json).unwrap();
        assert_eq!(card.card_type.title.as_deref(), Some("Defect"));
        assert_eq!(card.external_links[0].url.as_deref(), Some("https://tracker/T-1"));
        assert_eq!(card.custom_id.unwrap().value.as_deref(), Some("T-1"));
        assert_eq!(card.assigned_users[0].id, "25012");
    }

    #[test]
    fn card_tolerates_null_link_and_custom_id_values() {
        let json = r#"{
            "id": "943206827",
            "title": "Untracked defect",
            "cardType": { "id": "943187745" },
            "laneId": "943188382",
            "externalLinks": [{ "label": "Ticket", "url": null }],
            "customId": { "value": null, "prefix": null }
        }"#;
        let card: Card = serde_json::from_str(json).unwrap();
        assert_eq!(card.external_links[0].url, None);
        assert_eq!(card.custom_id.unwrap().value, None);
    }
}
