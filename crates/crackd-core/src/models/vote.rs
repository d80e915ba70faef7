//! Row shapes for the caption listing and voting store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A stored caption row. The store keeps the text under `content`; the
/// rendered field is `text`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionRow {
    pub id: Uuid,
    #[serde(rename = "content")]
    pub text: String,
    pub created_datetime_utc: DateTime<Utc>,
}

/// One user's vote on one caption. At most one row per (caption, profile);
/// repeat votes update the row in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionVoteRow {
    pub id: Uuid,
    pub caption_id: Uuid,
    pub profile_id: Uuid,
    pub vote_value: i32,
}

/// Sum vote values per caption.
pub fn vote_totals(votes: &[CaptionVoteRow]) -> HashMap<Uuid, i64> {
    let mut totals = HashMap::new();
    for vote in votes {
        *totals.entry(vote.caption_id).or_insert(0) += i64::from(vote.vote_value);
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote(caption_id: Uuid, value: i32) -> CaptionVoteRow {
        CaptionVoteRow {
            id: Uuid::new_v4(),
            caption_id,
            profile_id: Uuid::new_v4(),
            vote_value: value,
        }
    }

    #[test]
    fn totals_sum_per_caption() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let votes = vec![vote(a, 1), vote(a, 1), vote(a, -1), vote(b, -1)];
        let totals = vote_totals(&votes);
        assert_eq!(totals.get(&a), Some(&1));
        assert_eq!(totals.get(&b), Some(&-1));
        assert_eq!(totals.get(&Uuid::new_v4()), None);
    }
}
