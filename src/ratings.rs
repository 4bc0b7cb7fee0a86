// SPDX-License-Identifier: EUPL-1.2

//! Review validation and rating aggregation.
//!
//! A tool's `rating` is the mean of its visible review ratings rounded to one
//! decimal, and `rating_count` the number of those reviews. Both are
//! recomputed from scratch whenever a review is added or hidden.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{error::CatalogError, identity::Identity, models::Comment};

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;
pub const MIN_TEXT_CHARS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingSummary {
    pub rating: f64,
    pub count: u32,
}

impl RatingSummary {
    pub const EMPTY: RatingSummary = RatingSummary { rating: 0.0, count: 0 };
}

/// Check a review before anything is written.
pub fn validate_submission(rating: i64, text: &str) -> Result<i32, CatalogError> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(CatalogError::Validation(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }
    if text.trim().chars().count() < MIN_TEXT_CHARS {
        return Err(CatalogError::Validation(format!(
            "Comment too short: please write at least {MIN_TEXT_CHARS} characters"
        )));
    }
    // Range checked above.
    Ok(rating as i32)
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Mean and count over the visible comments of `tool_id`.
pub fn aggregate<'a>(comments: impl IntoIterator<Item = &'a Comment>, tool_id: Uuid) -> RatingSummary {
    let (sum, count) = comments
        .into_iter()
        .filter(|c| c.tool_id == tool_id && !c.hidden)
        .fold((0i64, 0u32), |(sum, n), c| (sum + i64::from(c.rating), n + 1));

    if count == 0 {
        return RatingSummary::EMPTY;
    }

    RatingSummary {
        rating: round_one_decimal(sum as f64 / f64::from(count)),
        count,
    }
}

/// Build a visible review authored by `author`. Input must already be validated.
pub fn new_comment(
    tool_id: Uuid,
    author: &Identity,
    rating: i32,
    text: &str,
    now: DateTime<Utc>,
) -> Comment {
    Comment {
        id: Uuid::new_v4(),
        tool_id,
        user_id: author.user_id,
        user_name: author.name.clone(),
        user_avatar: author.avatar.clone(),
        rating,
        text: text.trim().to_string(),
        hidden: false,
        hidden_by: None,
        hidden_at: None,
        created_at: now,
    }
}

/// Mark `comment` hidden. Returns `false` when it already was; the first
/// hider's stamp is kept.
pub fn hide(comment: &mut Comment, hider: Uuid, at: DateTime<Utc>) -> bool {
    if comment.hidden {
        return false;
    }
    comment.hidden = true;
    comment.hidden_by = Some(hider);
    comment.hidden_at = Some(at);
    true
}

/// Visible reviews for display, newest first.
pub fn visible_newest_first(comments: Vec<Comment>) -> Vec<Comment> {
    let mut visible: Vec<Comment> = comments.into_iter().filter(|c| !c.hidden).collect();
    visible.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[test]
    fn short_text_is_rejected_four_chars_accepted() {
        assert!(matches!(
            validate_submission(5, "  ok  "),
            Err(CatalogError::Validation(_))
        ));
        assert_eq!(validate_submission(5, "nice").unwrap(), 5);
    }

    #[test]
    fn rating_outside_one_to_five_is_rejected() {
        assert!(validate_submission(0, "great tool").is_err());
        assert!(validate_submission(6, "great tool").is_err());
        assert!(validate_submission(1, "great tool").is_ok());
    }

    #[test]
    fn adding_then_hiding_a_review_recomputes_the_mean() {
        let tool_id = uuid::Uuid::new_v4();
        let mut comments = vec![comment(tool_id, 5), comment(tool_id, 4)];
        assert_eq!(aggregate(&comments, tool_id), RatingSummary { rating: 4.5, count: 2 });

        comments.push(comment(tool_id, 3));
        assert_eq!(aggregate(&comments, tool_id), RatingSummary { rating: 4.0, count: 3 });

        let admin = uuid::Uuid::new_v4();
        assert!(hide(&mut comments[2], admin, day(3)));
        assert_eq!(comments[2].hidden_by, Some(admin));
        assert_eq!(aggregate(&comments, tool_id), RatingSummary { rating: 4.5, count: 2 });
    }

    #[test]
    fn other_tools_and_empty_sets_do_not_leak_into_the_mean() {
        let tool_id = uuid::Uuid::new_v4();
        let other = uuid::Uuid::new_v4();
        let comments = vec![comment(other, 1), comment(tool_id, 4), comment(tool_id, 4), comment(tool_id, 5)];
        assert_eq!(aggregate(&comments, tool_id), RatingSummary { rating: 4.3, count: 3 });
        assert_eq!(aggregate(&comments[..1], tool_id), RatingSummary::EMPTY);
    }

    #[test]
    fn hiding_twice_keeps_first_stamp() {
        let mut c = comment(uuid::Uuid::new_v4(), 2);
        let first = uuid::Uuid::new_v4();
        assert!(hide(&mut c, first, day(4)));
        assert!(!hide(&mut c, uuid::Uuid::new_v4(), day(5)));
        assert_eq!(c.hidden_by, Some(first));
        assert_eq!(c.hidden_at, Some(day(4)));
    }
}
