//! Domain models with validation at construction
//!
//! Submitted records are checked against declarative field rules before
//! they reach the store. Invalid input returns ValidationError, not panic.

pub mod artist;
pub mod category;
pub mod drink;
pub mod listing;
pub mod pagination;
pub mod question;
pub mod search;
pub mod show;
pub mod validation;
pub mod venue;

pub use artist::{Artist, ArtistInput, ARTIST_FIELDS};
pub use category::{Category, CategoryLabel};
pub use drink::{Drink, DrinkPatch, Ingredient, LongDrink, NewDrink, Recipe, ShortDrink};
pub use listing::{Listing, SearchResults};
pub use pagination::{Page, PageParams, Paginated, PAGE_SIZE};
pub use question::{NewQuestion, Question, QuizRequest};
pub use show::{NewShow, ShowDetail, ShowSplit, SHOW_FIELDS};
pub use validation::{FieldRule, ValidationError};
pub use venue::{Area, LocatedListing, Venue, VenueInput, VENUE_FIELDS};
