//! Artists

use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::FromRow;

use super::validation::{validate, FieldRule, ValidationError};

/// Accepted fields of the artist form, in validation order
pub const ARTIST_FIELDS: &[FieldRule] = &[
    FieldRule::text("name", 120),
    FieldRule::text("city", 120),
    FieldRule::state("state"),
    FieldRule::phone("phone", 120).optional(),
    FieldRule::text_list("genres", 50),
    FieldRule::flag("seeking_venue"),
    FieldRule::text("seeking_description", 500).optional(),
    FieldRule::url("website", 500).optional(),
    FieldRule::url("image_link", 500).optional(),
    FieldRule::url("facebook_link", 120).optional(),
];

/// A stored artist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Artist {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub genres: Vec<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
    pub website: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
}

/// Validated artist submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistInput {
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub genres: Vec<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
    pub website: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
}

impl ArtistInput {
    pub fn parse(input: &Map<String, Value>) -> Result<Self, ValidationError> {
        let mut fields = validate(input, ARTIST_FIELDS)?;
        Ok(Self {
            name: fields.text("name")?,
            city: fields.text("city")?,
            state: fields.text("state")?,
            phone: fields.opt_text("phone"),
            genres: fields.list("genres"),
            seeking_venue: fields.flag("seeking_venue"),
            seeking_description: fields.opt_text("seeking_description"),
            website: fields.opt_text("website"),
            image_link: fields.opt_text("image_link"),
            facebook_link: fields.opt_text("facebook_link"),
        })
    }

    pub fn into_artist(self, id: i32) -> Artist {
        Artist {
            id,
            name: self.name,
            city: self.city,
            state: self.state,
            phone: self.phone,
            genres: self.genres,
            seeking_venue: self.seeking_venue,
            seeking_description: self.seeking_description,
            website: self.website,
            image_link: self.image_link,
            facebook_link: self.facebook_link,
        }
    }
}

impl From<Artist> for ArtistInput {
    fn from(a: Artist) -> Self {
        Self {
            name: a.name,
            city: a.city,
            state: a.state,
            phone: a.phone,
            genres: a.genres,
            seeking_venue: a.seeking_venue,
            seeking_description: a.seeking_description,
            website: a.website,
            image_link: a.image_link,
            facebook_link: a.facebook_link,
        }
    }
}
