//! Shows - an artist playing a venue at a point in time

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::FromRow;

use super::validation::{validate, FieldRule, ValidationError};

/// Accepted fields of the show form
pub const SHOW_FIELDS: &[FieldRule] = &[
    FieldRule::integer("artist_id", 1, i32::MAX as i64),
    FieldRule::integer("venue_id", 1, i32::MAX as i64),
    FieldRule::timestamp("start_time"),
];

/// A show joined with the names and images of both sides
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ShowDetail {
    pub id: i32,
    pub venue_id: i32,
    pub venue_name: String,
    pub venue_image_link: Option<String>,
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: DateTime<Utc>,
}

/// Validated show submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShow {
    pub artist_id: i32,
    pub venue_id: i32,
    pub start_time: DateTime<Utc>,
}

impl NewShow {
    pub fn parse(input: &Map<String, Value>) -> Result<Self, ValidationError> {
        let mut fields = validate(input, SHOW_FIELDS)?;
        Ok(Self {
            artist_id: fields.id("artist_id")?,
            venue_id: fields.id("venue_id")?,
            start_time: fields.timestamp("start_time")?,
        })
    }
}

/// Shows on either side of `now`, each in start-time order
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ShowSplit {
    pub past_shows: Vec<ShowDetail>,
    pub upcoming_shows: Vec<ShowDetail>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

impl ShowSplit {
    /// A show starting exactly at `now` counts as upcoming.
    pub fn at(mut shows: Vec<ShowDetail>, now: DateTime<Utc>) -> Self {
        shows.sort_by_key(|s| (s.start_time, s.id));
        let (past_shows, upcoming_shows): (Vec<_>, Vec<_>) =
            shows.into_iter().partition(|s| s.start_time < now);

        Self {
            past_shows_count: past_shows.len(),
            upcoming_shows_count: upcoming_shows.len(),
            past_shows,
            upcoming_shows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn show(id: i32, start_time: DateTime<Utc>) -> ShowDetail {
        ShowDetail {
            id,
            venue_id: 1,
            venue_name: "The Musical Hop".into(),
            venue_image_link: None,
            artist_id: 1,
            artist_name: "Guns N Petals".into(),
            artist_image_link: None,
            start_time,
        }
    }

    #[test]
    fn splits_around_now() {
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap();
        let shows = vec![
            show(1, now + Duration::days(2)),
            show(2, now - Duration::days(3)),
            show(3, now),
            show(4, now - Duration::hours(1)),
        ];

        let split = ShowSplit::at(shows, now);
        let past: Vec<i32> = split.past_shows.iter().map(|s| s.id).collect();
        let upcoming: Vec<i32> = split.upcoming_shows.iter().map(|s| s.id).collect();

        assert_eq!(past, vec![2, 4]);
        assert_eq!(upcoming, vec![3, 1]);
        assert_eq!(split.past_shows_count, 2);
        assert_eq!(split.upcoming_shows_count, 2);
    }

    #[test]
    fn parses_submission() {
        let input = json!({"artist_id": "4", "venue_id": 1, "start_time": "2035-04-01 20:00:00"});
        let show = NewShow::parse(input.as_object().unwrap()).unwrap();
        assert_eq!(show.artist_id, 4);
        assert_eq!(show.venue_id, 1);
    }

    #[test]
    fn rejects_zero_ids() {
        let input = json!({"artist_id": 0, "venue_id": 1, "start_time": "2035-04-01 20:00:00"});
        let err = NewShow::parse(input.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { field: "artist_id", .. }));
    }
}
