//! In-memory store
//!
//! Backs the `--in-memory` serve mode and the router tests. Every
//! operation holds the table lock for its whole duration, so each call is
//! atomic the way a single transaction is.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::store::{CoffeeStore, FyyurStore, StoreError, StoreResult, TriviaStore};
use crate::models::search::contains_ignore_case;
use crate::models::{
    Artist, ArtistInput, Category, Drink, DrinkPatch, Listing, LocatedListing, NewDrink,
    NewQuestion, NewShow, Page, Paginated, Question, ShowDetail, Venue, VenueInput,
};

#[derive(Debug, Clone)]
struct ShowRecord {
    id: i32,
    artist_id: i32,
    venue_id: i32,
    start_time: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    venues: BTreeMap<i32, Venue>,
    artists: BTreeMap<i32, Artist>,
    shows: BTreeMap<i32, ShowRecord>,
    categories: BTreeMap<i32, Category>,
    questions: BTreeMap<i32, Question>,
    drinks: BTreeMap<i32, Drink>,
    sequences: Sequences,
}

/// Per-table id counters; ids are never reused
#[derive(Debug, Default)]
struct Sequences {
    venue: i32,
    artist: i32,
    show: i32,
    category: i32,
    question: i32,
    drink: i32,
}

fn next_id(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

impl Tables {
    fn upcoming_at_venue(&self, venue_id: i32, now: DateTime<Utc>) -> i64 {
        self.shows
            .values()
            .filter(|s| s.venue_id == venue_id && s.start_time >= now)
            .count() as i64
    }

    fn upcoming_for_artist(&self, artist_id: i32, now: DateTime<Utc>) -> i64 {
        self.shows
            .values()
            .filter(|s| s.artist_id == artist_id && s.start_time >= now)
            .count() as i64
    }

    fn venue_listing(&self, venue: &Venue, now: DateTime<Utc>) -> Listing {
        Listing {
            id: venue.id,
            name: venue.name.clone(),
            num_upcoming_shows: self.upcoming_at_venue(venue.id, now),
        }
    }

    fn artist_listing(&self, artist: &Artist, now: DateTime<Utc>) -> Listing {
        Listing {
            id: artist.id,
            name: artist.name.clone(),
            num_upcoming_shows: self.upcoming_for_artist(artist.id, now),
        }
    }

    fn show_detail(&self, show: &ShowRecord) -> Option<ShowDetail> {
        let venue = self.venues.get(&show.venue_id)?;
        let artist = self.artists.get(&show.artist_id)?;
        Some(ShowDetail {
            id: show.id,
            venue_id: venue.id,
            venue_name: venue.name.clone(),
            venue_image_link: venue.image_link.clone(),
            artist_id: artist.id,
            artist_name: artist.name.clone(),
            artist_image_link: artist.image_link.clone(),
            start_time: show.start_time,
        })
    }

    fn show_details<F>(&self, keep: F) -> Vec<ShowDetail>
    where
        F: Fn(&ShowRecord) -> bool,
    {
        let mut shows: Vec<ShowDetail> = self
            .shows
            .values()
            .filter(|s| keep(s))
            .filter_map(|s| self.show_detail(s))
            .collect();
        shows.sort_by_key(|s| (s.start_time, s.id));
        shows
    }
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FyyurStore for MemoryStore {
    async fn venue_listings(&self, now: DateTime<Utc>) -> StoreResult<Vec<LocatedListing>> {
        let tables = self.tables.read().await;
        let mut venues: Vec<&Venue> = tables.venues.values().collect();
        venues.sort_by(|a, b| (&a.city, &a.state, a.id).cmp(&(&b.city, &b.state, b.id)));

        Ok(venues
            .into_iter()
            .map(|v| LocatedListing {
                city: v.city.clone(),
                state: v.state.clone(),
                listing: tables.venue_listing(v, now),
            })
            .collect())
    }

    async fn search_venues(&self, term: &str, now: DateTime<Utc>) -> StoreResult<Vec<Listing>> {
        let tables = self.tables.read().await;
        Ok(tables
            .venues
            .values()
            .filter(|v| contains_ignore_case(&v.name, term))
            .map(|v| tables.venue_listing(v, now))
            .collect())
    }

    async fn recent_venues(&self, limit: u32, now: DateTime<Utc>) -> StoreResult<Vec<Listing>> {
        let tables = self.tables.read().await;
        Ok(tables
            .venues
            .values()
            .rev()
            .take(limit as usize)
            .map(|v| tables.venue_listing(v, now))
            .collect())
    }

    async fn venue(&self, id: i32) -> StoreResult<Venue> {
        let tables = self.tables.read().await;
        tables
            .venues
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("venue", id))
    }

    async fn venue_shows(&self, id: i32) -> StoreResult<Vec<ShowDetail>> {
        let tables = self.tables.read().await;
        if !tables.venues.contains_key(&id) {
            return Err(StoreError::not_found("venue", id));
        }
        Ok(tables.show_details(|s| s.venue_id == id))
    }

    async fn create_venue(&self, input: VenueInput) -> StoreResult<Venue> {
        let mut tables = self.tables.write().await;
        let id = next_id(&mut tables.sequences.venue);
        let venue = input.into_venue(id);
        tables.venues.insert(id, venue.clone());
        Ok(venue)
    }

    async fn update_venue(&self, id: i32, input: VenueInput) -> StoreResult<Venue> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .venues
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("venue", id))?;
        *slot = input.into_venue(id);
        Ok(slot.clone())
    }

    async fn delete_venue(&self, id: i32) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .venues
            .remove(&id)
            .ok_or_else(|| StoreError::not_found("venue", id))?;
        tables.shows.retain(|_, s| s.venue_id != id);
        Ok(())
    }

    async fn artist_listings(&self, now: DateTime<Utc>) -> StoreResult<Vec<Listing>> {
        let tables = self.tables.read().await;
        Ok(tables
            .artists
            .values()
            .map(|a| tables.artist_listing(a, now))
            .collect())
    }

    async fn search_artists(&self, term: &str, now: DateTime<Utc>) -> StoreResult<Vec<Listing>> {
        let tables = self.tables.read().await;
        Ok(tables
            .artists
            .values()
            .filter(|a| contains_ignore_case(&a.name, term))
            .map(|a| tables.artist_listing(a, now))
            .collect())
    }

    async fn recent_artists(&self, limit: u32, now: DateTime<Utc>) -> StoreResult<Vec<Listing>> {
        let tables = self.tables.read().await;
        Ok(tables
            .artists
            .values()
            .rev()
            .take(limit as usize)
            .map(|a| tables.artist_listing(a, now))
            .collect())
    }

    async fn artist(&self, id: i32) -> StoreResult<Artist> {
        let tables = self.tables.read().await;
        tables
            .artists
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("artist", id))
    }

    async fn artist_shows(&self, id: i32) -> StoreResult<Vec<ShowDetail>> {
        let tables = self.tables.read().await;
        if !tables.artists.contains_key(&id) {
            return Err(StoreError::not_found("artist", id));
        }
        Ok(tables.show_details(|s| s.artist_id == id))
    }

    async fn create_artist(&self, input: ArtistInput) -> StoreResult<Artist> {
        let mut tables = self.tables.write().await;
        let id = next_id(&mut tables.sequences.artist);
        let artist = input.into_artist(id);
        tables.artists.insert(id, artist.clone());
        Ok(artist)
    }

    async fn update_artist(&self, id: i32, input: ArtistInput) -> StoreResult<Artist> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .artists
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("artist", id))?;
        *slot = input.into_artist(id);
        Ok(slot.clone())
    }

    async fn delete_artist(&self, id: i32) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .artists
            .remove(&id)
            .ok_or_else(|| StoreError::not_found("artist", id))?;
        tables.shows.retain(|_, s| s.artist_id != id);
        Ok(())
    }

    async fn shows(&self) -> StoreResult<Vec<ShowDetail>> {
        let tables = self.tables.read().await;
        Ok(tables.show_details(|_| true))
    }

    async fn create_show(&self, show: NewShow) -> StoreResult<ShowDetail> {
        let mut tables = self.tables.write().await;
        if !tables.artists.contains_key(&show.artist_id) {
            return Err(StoreError::unknown_reference("artist_id", show.artist_id));
        }
        if !tables.venues.contains_key(&show.venue_id) {
            return Err(StoreError::unknown_reference("venue_id", show.venue_id));
        }

        let id = next_id(&mut tables.sequences.show);
        let record = ShowRecord {
            id,
            artist_id: show.artist_id,
            venue_id: show.venue_id,
            start_time: show.start_time,
        };
        let detail = tables
            .show_detail(&record)
            .ok_or_else(|| StoreError::not_found("show", id))?;
        tables.shows.insert(id, record);
        Ok(detail)
    }
}

#[async_trait]
impl TriviaStore for MemoryStore {
    async fn categories(&self) -> StoreResult<Vec<Category>> {
        let tables = self.tables.read().await;
        Ok(tables.categories.values().cloned().collect())
    }

    async fn category(&self, id: i32) -> StoreResult<Category> {
        let tables = self.tables.read().await;
        tables
            .categories
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("category", id))
    }

    async fn create_category(&self, kind: String) -> StoreResult<Category> {
        let mut tables = self.tables.write().await;
        let id = next_id(&mut tables.sequences.category);
        let category = Category { id, kind };
        tables.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn delete_category(&self, id: i32) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .categories
            .remove(&id)
            .ok_or_else(|| StoreError::not_found("category", id))?;
        tables.questions.retain(|_, q| q.category_id() != id);
        Ok(())
    }

    async fn questions_page(&self, page: Page) -> StoreResult<Paginated<Question>> {
        let tables = self.tables.read().await;
        let all: Vec<Question> = tables.questions.values().cloned().collect();
        Ok(Paginated {
            items: page.slice(&all).to_vec(),
            total: all.len() as i64,
            page: page.number(),
        })
    }

    async fn questions_in_category(&self, id: i32) -> StoreResult<Vec<Question>> {
        let tables = self.tables.read().await;
        Ok(tables
            .questions
            .values()
            .filter(|q| q.category_id() == id)
            .cloned()
            .collect())
    }

    async fn search_questions(&self, term: &str) -> StoreResult<Vec<Question>> {
        let tables = self.tables.read().await;
        Ok(tables
            .questions
            .values()
            .filter(|q| contains_ignore_case(&q.question, term))
            .cloned()
            .collect())
    }

    async fn create_question(&self, question: NewQuestion) -> StoreResult<Question> {
        let mut tables = self.tables.write().await;
        let category = tables
            .categories
            .get(&question.category_id)
            .cloned()
            .ok_or_else(|| StoreError::unknown_reference("category", question.category_id))?;
        let id = next_id(&mut tables.sequences.question);
        let question = question.into_question(id, category);
        tables.questions.insert(id, question.clone());
        Ok(question)
    }

    async fn delete_question(&self, id: i32) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .questions
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("question", id))
    }

    async fn quiz_candidates(
        &self,
        category: Option<i32>,
        exclude: &[i32],
    ) -> StoreResult<Vec<Question>> {
        let tables = self.tables.read().await;
        Ok(tables
            .questions
            .values()
            .filter(|q| category.map_or(true, |c| q.category_id() == c))
            .filter(|q| !exclude.contains(&q.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CoffeeStore for MemoryStore {
    async fn drinks(&self) -> StoreResult<Vec<Drink>> {
        let tables = self.tables.read().await;
        Ok(tables.drinks.values().cloned().collect())
    }

    async fn create_drink(&self, drink: NewDrink) -> StoreResult<Drink> {
        let mut tables = self.tables.write().await;
        if tables.drinks.values().any(|d| d.title == drink.title) {
            return Err(StoreError::Duplicate {
                field: "title",
                value: drink.title,
            });
        }
        let id = next_id(&mut tables.sequences.drink);
        let drink = Drink {
            id,
            title: drink.title,
            recipe: drink.recipe,
        };
        tables.drinks.insert(id, drink.clone());
        Ok(drink)
    }

    async fn update_drink(&self, id: i32, patch: DrinkPatch) -> StoreResult<Drink> {
        let mut tables = self.tables.write().await;
        if !tables.drinks.contains_key(&id) {
            return Err(StoreError::not_found("drink", id));
        }
        if let Some(title) = &patch.title {
            if tables.drinks.values().any(|d| d.id != id && &d.title == title) {
                return Err(StoreError::Duplicate {
                    field: "title",
                    value: title.clone(),
                });
            }
        }

        let drink = tables
            .drinks
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("drink", id))?;
        drink.apply(patch);
        Ok(drink.clone())
    }

    async fn delete_drink(&self, id: i32) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .drinks
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("drink", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn question(text: &str, category_id: i32) -> NewQuestion {
        NewQuestion {
            question: text.into(),
            answer: "answer".into(),
            difficulty: 1,
            category_id,
        }
    }

    fn venue(name: &str, city: &str, state: &str) -> VenueInput {
        VenueInput {
            name: name.into(),
            city: city.into(),
            state: state.into(),
            address: "1 Main St".into(),
            phone: None,
            genres: vec!["Jazz".into()],
            seeking_talent: false,
            seeking_description: None,
            website: None,
            image_link: None,
            facebook_link: None,
        }
    }

    fn artist(name: &str) -> ArtistInput {
        ArtistInput {
            name: name.into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            phone: None,
            genres: vec!["Rock".into()],
            seeking_venue: false,
            seeking_description: None,
            website: None,
            image_link: None,
            facebook_link: None,
        }
    }

    #[tokio::test]
    async fn category_delete_cascades() {
        let store = MemoryStore::new();
        let science = store.create_category("Science".into()).await.unwrap();
        let art = store.create_category("Art".into()).await.unwrap();

        store.create_question(question("a", science.id)).await.unwrap();
        store.create_question(question("b", science.id)).await.unwrap();
        let kept = store.create_question(question("c", art.id)).await.unwrap();

        store.delete_category(science.id).await.unwrap();

        let remaining = store.quiz_candidates(None, &[]).await.unwrap();
        assert_eq!(remaining, vec![kept.clone()]);
        assert_eq!(kept.category, art);
        assert!(matches!(
            store.category(science.id).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn question_requires_existing_category() {
        let store = MemoryStore::new();
        let err = store.create_question(question("a", 9)).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::UnknownReference {
                field: "category",
                id: 9
            }
        ));
    }

    #[tokio::test]
    async fn ids_are_not_reused() {
        let store = MemoryStore::new();
        let cat = store.create_category("Science".into()).await.unwrap();
        let first = store.create_question(question("a", cat.id)).await.unwrap();
        store.delete_question(first.id).await.unwrap();
        let second = store.create_question(question("b", cat.id)).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn venue_listings_order_by_location() {
        let store = MemoryStore::new();
        store.create_venue(venue("B", "San Francisco", "CA")).await.unwrap();
        store.create_venue(venue("A", "New York", "NY")).await.unwrap();
        store.create_venue(venue("C", "San Francisco", "CA")).await.unwrap();

        let listings = store.venue_listings(Utc::now()).await.unwrap();
        let names: Vec<&str> = listings.iter().map(|l| l.listing.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn deleting_venue_removes_its_shows() {
        let store = MemoryStore::new();
        let hop = store.create_venue(venue("Hop", "San Francisco", "CA")).await.unwrap();
        let band = store.create_artist(artist("Band")).await.unwrap();
        store
            .create_show(NewShow {
                artist_id: band.id,
                venue_id: hop.id,
                start_time: Utc::now() + Duration::days(1),
            })
            .await
            .unwrap();

        assert_eq!(store.artist_listings(Utc::now()).await.unwrap()[0].num_upcoming_shows, 1);

        store.delete_venue(hop.id).await.unwrap();
        assert!(store.shows().await.unwrap().is_empty());
        assert!(store.artist_shows(band.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn show_requires_existing_artist_and_venue() {
        let store = MemoryStore::new();
        let hop = store.create_venue(venue("Hop", "San Francisco", "CA")).await.unwrap();
        let err = store
            .create_show(NewShow {
                artist_id: 42,
                venue_id: hop.id,
                start_time: Utc::now(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::UnknownReference {
                field: "artist_id",
                ..
            }
        ));
    }
}
