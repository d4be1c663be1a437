pub mod card;
pub mod task;
