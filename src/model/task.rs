use serde::{Deserialize, Serialize};

/// A card translated into the shape of an Asana task, not yet reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDescriptor {
    pub name: String,
    pub external_id: String,
    pub url: String,
    pub notes: String,
    /// Source card id; the idempotency key stored in the card-id custom field.
    pub card_id: String,
    pub task_type: String,
    pub section_id: String,
    pub assignee: Option<String>,
    /// Set once the task has been created or found remotely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
}

/// Which section a remote task currently sits in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRef {
    pub gid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTask {
    pub gid: String,
    pub name: String,
    /// `None` when the listing endpoint does not report membership.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<SectionRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectMetadata {
    pub gid: String,
    pub name: String,
    pub followers: Vec<Follower>,
    #[serde(rename = "customFields")]
    pub custom_fields: Vec<CustomFieldInfo>,
    pub sections: Vec<SectionRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Follower {
    pub gid: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomFieldInfo {
    pub gid: String,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub options: Vec<EnumOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumOption {
    pub gid: String,
    pub name: String,
}

impl RemoteTask {
    pub fn is_in_section(&self, section_id: &str) -> bool {
        self.section.as_ref().is_some_and(|s| s.gid == section_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(section: Option<&str>) -> RemoteTask {
        RemoteTask {
            gid: "1".into(),
            name: "Task".into(),
            section: section.map(|gid| SectionRef {
                gid: gid.into(),
                name: None,
            }),
        }
    }

    #[test]
    fn section_comparison_by_gid() {
        assert!(remote(Some("S1")).is_in_section("S1"));
        assert!(!remote(Some("S2")).is_in_section("S1"));
        assert!(!remote(None).is_in_section("S1"));
    }

    #[test]
    fn descriptor_serializes_camel_case_and_omits_missing_remote_id() {
        let task = TaskDescriptor {
            name: "Fix login".into(),
            external_id: String::new(),
            url: String::new(),
            notes: String::new(),
            card_id: "C1".into(),
            task_type: "T1".into(),
            section_id: "S1".into(),
            assignee: None,
            remote_id: None,
        };
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["cardId"], "C1");
        assert_eq!(json["sectionId"], "S1");
        assert!(json["assignee"].is_null());
        assert!(json.get("remoteId").is_none());
    }
}
