//! Membership and read-state rules shared by the resolvers

use crate::dtos::{CreateParticipantDTO, MAX_MESSAGE_LENGTH};
use crate::entities::ParticipantPopulated;
use std::collections::HashSet;

pub fn is_participant(participants: &[ParticipantPopulated], user_id: &str) -> bool {
    participants.iter().any(|p| p.participant.user_id == user_id)
}

/// Deduplicates `ids` keeping first occurrence, drops blank ids and makes sure
/// the creator is part of the conversation.
pub fn normalize_participants(creator_id: &str, ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(ids.len() + 1);
    for id in ids.iter().map(|id| id.trim()) {
        if !id.is_empty() && seen.insert(id.to_string()) {
            normalized.push(id.to_string());
        }
    }
    if seen.insert(creator_id.to_string()) {
        normalized.insert(0, creator_id.to_string());
    }
    normalized
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParticipantDiff {
    pub to_add: Vec<String>,
    pub to_remove: Vec<String>,
}

impl ParticipantDiff {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// What has to change to go from `existing` to `requested` participant ids.
pub fn diff_participants(existing: &[String], requested: &[String]) -> ParticipantDiff {
    let existing_set: HashSet<&str> = existing.iter().map(String::as_str).collect();
    let requested_set: HashSet<&str> = requested.iter().map(String::as_str).collect();

    let mut to_add = Vec::new();
    let mut added = HashSet::new();
    for id in requested {
        if !existing_set.contains(id.as_str()) && added.insert(id.as_str()) {
            to_add.push(id.clone());
        }
    }

    let to_remove = existing
        .iter()
        .filter(|id| !requested_set.contains(id.as_str()))
        .cloned()
        .collect();

    ParticipantDiff { to_add, to_remove }
}

pub fn initial_read_state(creator_id: &str, user_id: &str) -> bool {
    creator_id == user_id
}

pub fn participant_rows(creator_id: &str, ids: &[String]) -> Vec<CreateParticipantDTO> {
    ids.iter()
        .map(|id| CreateParticipantDTO {
            user_id: id.clone(),
            has_seen_latest_message: initial_read_state(creator_id, id),
        })
        .collect()
}

/// Rejects bodies that are blank once leading whitespace is removed, or longer
/// than [`MAX_MESSAGE_LENGTH`] characters.
pub fn validate_message_body(body: &str) -> Result<(), &'static str> {
    if body.trim_start().is_empty() {
        return Err("Message body cannot be empty");
    }
    if body.chars().count() > MAX_MESSAGE_LENGTH {
        return Err("Message body is too long");
    }
    Ok(())
}
