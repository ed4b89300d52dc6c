//! Venues and the city/state grouping of the venue list

use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::FromRow;

use super::listing::Listing;
use super::validation::{validate, FieldRule, ValidationError};

/// Accepted fields of the venue form, in validation order
pub const VENUE_FIELDS: &[FieldRule] = &[
    FieldRule::text("name", 120),
    FieldRule::text("city", 120),
    FieldRule::state("state"),
    FieldRule::text("address", 120),
    FieldRule::phone("phone", 120).optional(),
    FieldRule::text_list("genres", 50),
    FieldRule::flag("seeking_talent"),
    FieldRule::text("seeking_description", 500).optional(),
    FieldRule::url("website", 500).optional(),
    FieldRule::url("image_link", 500).optional(),
    FieldRule::url("facebook_link", 120).optional(),
];

/// A stored venue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Venue {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: Option<String>,
    pub genres: Vec<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
    pub website: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
}

/// Validated venue submission, also the edit form's pre-filled values
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueInput {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: Option<String>,
    pub genres: Vec<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
    pub website: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
}

impl VenueInput {
    pub fn parse(input: &Map<String, Value>) -> Result<Self, ValidationError> {
        let mut fields = validate(input, VENUE_FIELDS)?;
        Ok(Self {
            name: fields.text("name")?,
            city: fields.text("city")?,
            state: fields.text("state")?,
            address: fields.text("address")?,
            phone: fields.opt_text("phone"),
            genres: fields.list("genres"),
            seeking_talent: fields.flag("seeking_talent"),
            seeking_description: fields.opt_text("seeking_description"),
            website: fields.opt_text("website"),
            image_link: fields.opt_text("image_link"),
            facebook_link: fields.opt_text("facebook_link"),
        })
    }

    pub fn into_venue(self, id: i32) -> Venue {
        Venue {
            id,
            name: self.name,
            city: self.city,
            state: self.state,
            address: self.address,
            phone: self.phone,
            genres: self.genres,
            seeking_talent: self.seeking_talent,
            seeking_description: self.seeking_description,
            website: self.website,
            image_link: self.image_link,
            facebook_link: self.facebook_link,
        }
    }
}

impl From<Venue> for VenueInput {
    fn from(v: Venue) -> Self {
        Self {
            name: v.name,
            city: v.city,
            state: v.state,
            address: v.address,
            phone: v.phone,
            genres: v.genres,
            seeking_talent: v.seeking_talent,
            seeking_description: v.seeking_description,
            website: v.website,
            image_link: v.image_link,
            facebook_link: v.facebook_link,
        }
    }
}

/// A venue listing tagged with its location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedListing {
    pub city: String,
    pub state: String,
    pub listing: Listing,
}

/// Venues sharing a city and state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Area {
    pub city: String,
    pub state: String,
    pub venues: Vec<Listing>,
}

/// Group consecutive listings with equal (city, state).
///
/// Input must already be ordered by (city, state, id).
pub fn group_by_area(listings: Vec<LocatedListing>) -> Vec<Area> {
    let mut areas: Vec<Area> = Vec::new();

    for located in listings {
        match areas.last_mut() {
            Some(area) if area.city == located.city && area.state == located.state => {
                area.venues.push(located.listing);
            }
            _ => areas.push(Area {
                city: located.city,
                state: located.state,
                venues: vec![located.listing],
            }),
        }
    }

    areas
}
