use std::fmt;

use tracing::warn;

use crate::mapping::MappingConfig;
use crate::model::card::Card;
use crate::model::task::TaskDescriptor;

/// A card whose lane has no section rule. It is dropped from the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unmappable {
    pub card_title: String,
    pub lane_id: String,
}

impl fmt::Display for Unmappable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no mapping found for lane [{}], [{}] will not be mapped",
            self.lane_id, self.card_title
        )
    }
}

/// Translate one card into a task descriptor. Pure apart from the warning
/// logged for unmappable cards.
pub fn map_card_to_task(
    card: &Card,
    mapping: &MappingConfig,
) -> Result<TaskDescriptor, Unmappable> {
    let task_type = mapping.task_type_for(card.card_type_id()).to_string();

    let Some(section_id) = mapping.section_for(&card.lane_id) else {
        let unmappable = Unmappable {
            card_title: card.title.clone(),
            lane_id: card.lane_id.clone(),
        };
        warn!("{unmappable}");
        return Err(unmappable);
    };

    // Only the first assignee carries over.
    let assignee = card
        .assigned_users
        .first()
        .and_then(|u| mapping.user_for(&u.id))
        .map(String::from);

    Ok(TaskDescriptor {
        name: card.title.clone(),
        external_id: card
            .custom_id
            .as_ref()
            .and_then(|c| c.value.clone())
            .unwrap_or_default(),
        url: card
            .external_links
            .first()
            .and_then(|l| l.url.clone())
            .unwrap_or_default(),
        notes: card.description.clone().unwrap_or_default(),
        card_id: card.id.clone(),
        task_type,
        section_id: section_id.to_string(),
        assignee,
        remote_id: None,
    })
}

/// Drop cards whose type is excluded. Runs before any mapping.
pub fn filter_excluded(cards: Vec<Card>, mapping: &MappingConfig) -> Vec<Card> {
    cards
        .into_iter()
        .filter(|card| !mapping.is_excluded(card.card_type_id()))
        .collect()
}

/// Map every card, keeping list order and discarding the unmappable ones.
pub fn map_cards(cards: &[Card], mapping: &MappingConfig) -> Vec<TaskDescriptor> {
    cards
        .iter()
        .filter_map(|card| map_card_to_task(card, mapping).ok())
        .collect()
}
