use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::{like_pattern, PgStore};
use crate::db::store::{FyyurStore, StoreError, StoreResult};
use crate::models::{
    Artist, ArtistInput, Listing, LocatedListing, NewShow, ShowDetail, Venue, VenueInput,
};

const VENUE_COLUMNS: &str = "id, name, city, state, address, phone, genres, seeking_talent, \
     seeking_description, website, image_link, facebook_link";

const ARTIST_COLUMNS: &str = "id, name, city, state, phone, genres, seeking_venue, \
     seeking_description, website, image_link, facebook_link";

const SHOW_DETAIL_SELECT: &str = r#"
    SELECT
        s.id,
        v.id AS venue_id,
        v.name AS venue_name,
        v.image_link AS venue_image_link,
        a.id AS artist_id,
        a.name AS artist_name,
        a.image_link AS artist_image_link,
        s.start_time
    FROM shows s
    JOIN venues v ON v.id = s.venue_id
    JOIN artists a ON a.id = s.artist_id
"#;

#[derive(FromRow)]
struct LocatedRow {
    id: i32,
    name: String,
    city: String,
    state: String,
    num_upcoming_shows: i64,
}

impl From<LocatedRow> for LocatedListing {
    fn from(row: LocatedRow) -> Self {
        Self {
            city: row.city,
            state: row.state,
            listing: Listing {
                id: row.id,
                name: row.name,
                num_upcoming_shows: row.num_upcoming_shows,
            },
        }
    }
}

impl PgStore {
    async fn exists(&self, table: &'static str, id: i32) -> StoreResult<bool> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)", table);
        let (exists,): (bool,) = sqlx::query_as(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn show_details_where(&self, column: &'static str, id: i32) -> StoreResult<Vec<ShowDetail>> {
        let sql = format!(
            "{} WHERE s.{} = $1 ORDER BY s.start_time, s.id",
            SHOW_DETAIL_SELECT, column
        );
        let shows = sqlx::query_as::<_, ShowDetail>(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        Ok(shows)
    }
}

#[async_trait]
impl FyyurStore for PgStore {
    async fn venue_listings(&self, now: DateTime<Utc>) -> StoreResult<Vec<LocatedListing>> {
        let rows = sqlx::query_as::<_, LocatedRow>(
            r#"
            SELECT
                v.id,
                v.name,
                v.city,
                v.state,
                COUNT(s.id) FILTER (WHERE s.start_time >= $1) AS num_upcoming_shows
            FROM venues v
            LEFT JOIN shows s ON s.venue_id = v.id
            GROUP BY v.id
            ORDER BY v.city, v.state, v.id
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(LocatedListing::from).collect())
    }

    async fn search_venues(&self, term: &str, now: DateTime<Utc>) -> StoreResult<Vec<Listing>> {
        let listings = sqlx::query_as::<_, Listing>(
            r#"
            SELECT
                v.id,
                v.name,
                COUNT(s.id) FILTER (WHERE s.start_time >= $2) AS num_upcoming_shows
            FROM venues v
            LEFT JOIN shows s ON s.venue_id = v.id
            WHERE v.name ILIKE $1
            GROUP BY v.id
            ORDER BY v.id
            "#,
        )
        .bind(like_pattern(term))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(listings)
    }

    async fn recent_venues(&self, limit: u32, now: DateTime<Utc>) -> StoreResult<Vec<Listing>> {
        let listings = sqlx::query_as::<_, Listing>(
            r#"
            SELECT
                v.id,
                v.name,
                COUNT(s.id) FILTER (WHERE s.start_time >= $2) AS num_upcoming_shows
            FROM venues v
            LEFT JOIN shows s ON s.venue_id = v.id
            GROUP BY v.id
            ORDER BY v.id DESC
            LIMIT $1
            "#,
        )
        .bind(i64::from(limit))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(listings)
    }

    async fn venue(&self, id: i32) -> StoreResult<Venue> {
        let sql = format!("SELECT {} FROM venues WHERE id = $1", VENUE_COLUMNS);
        sqlx::query_as::<_, Venue>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("venue", id))
    }

    async fn venue_shows(&self, id: i32) -> StoreResult<Vec<ShowDetail>> {
        if !self.exists("venues", id).await? {
            return Err(StoreError::not_found("venue", id));
        }
        self.show_details_where("venue_id", id).await
    }

    async fn create_venue(&self, input: VenueInput) -> StoreResult<Venue> {
        let sql = format!(
            r#"
            INSERT INTO venues (name, city, state, address, phone, genres, seeking_talent,
                                seeking_description, website, image_link, facebook_link)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            VENUE_COLUMNS
        );
        let venue = sqlx::query_as::<_, Venue>(&sql)
            .bind(&input.name)
            .bind(&input.city)
            .bind(&input.state)
            .bind(&input.address)
            .bind(&input.phone)
            .bind(&input.genres)
            .bind(input.seeking_talent)
            .bind(&input.seeking_description)
            .bind(&input.website)
            .bind(&input.image_link)
            .bind(&input.facebook_link)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!(venue_id = venue.id, "venue created");
        Ok(venue)
    }

    async fn update_venue(&self, id: i32, input: VenueInput) -> StoreResult<Venue> {
        let sql = format!(
            r#"
            UPDATE venues
            SET name = $2, city = $3, state = $4, address = $5, phone = $6, genres = $7,
                seeking_talent = $8, seeking_description = $9, website = $10,
                image_link = $11, facebook_link = $12
            WHERE id = $1
            RETURNING {}
            "#,
            VENUE_COLUMNS
        );
        sqlx::query_as::<_, Venue>(&sql)
            .bind(id)
            .bind(&input.name)
            .bind(&input.city)
            .bind(&input.state)
            .bind(&input.address)
            .bind(&input.phone)
            .bind(&input.genres)
            .bind(input.seeking_talent)
            .bind(&input.seeking_description)
            .bind(&input.website)
            .bind(&input.image_link)
            .bind(&input.facebook_link)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("venue", id))
    }

    async fn delete_venue(&self, id: i32) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM venues WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("venue", id));
        }
        Ok(())
    }

    async fn artist_listings(&self, now: DateTime<Utc>) -> StoreResult<Vec<Listing>> {
        let listings = sqlx::query_as::<_, Listing>(
            r#"
            SELECT
                a.id,
                a.name,
                COUNT(s.id) FILTER (WHERE s.start_time >= $1) AS num_upcoming_shows
            FROM artists a
            LEFT JOIN shows s ON s.artist_id = a.id
            GROUP BY a.id
            ORDER BY a.id
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(listings)
    }

    async fn search_artists(&self, term: &str, now: DateTime<Utc>) -> StoreResult<Vec<Listing>> {
        let listings = sqlx::query_as::<_, Listing>(
            r#"
            SELECT
                a.id,
                a.name,
                COUNT(s.id) FILTER (WHERE s.start_time >= $2) AS num_upcoming_shows
            FROM artists a
            LEFT JOIN shows s ON s.artist_id = a.id
            WHERE a.name ILIKE $1
            GROUP BY a.id
            ORDER BY a.id
            "#,
        )
        .bind(like_pattern(term))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(listings)
    }

    async fn recent_artists(&self, limit: u32, now: DateTime<Utc>) -> StoreResult<Vec<Listing>> {
        let listings = sqlx::query_as::<_, Listing>(
            r#"
            SELECT
                a.id,
                a.name,
                COUNT(s.id) FILTER (WHERE s.start_time >= $2) AS num_upcoming_shows
            FROM artists a
            LEFT JOIN shows s ON s.artist_id = a.id
            GROUP BY a.id
            ORDER BY a.id DESC
            LIMIT $1
            "#,
        )
        .bind(i64::from(limit))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(listings)
    }

    async fn artist(&self, id: i32) -> StoreResult<Artist> {
        let sql = format!("SELECT {} FROM artists WHERE id = $1", ARTIST_COLUMNS);
        sqlx::query_as::<_, Artist>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("artist", id))
    }

    async fn artist_shows(&self, id: i32) -> StoreResult<Vec<ShowDetail>> {
        if !self.exists("artists", id).await? {
            return Err(StoreError::not_found("artist", id));
        }
        self.show_details_where("artist_id", id).await
    }

    async fn create_artist(&self, input: ArtistInput) -> StoreResult<Artist> {
        let sql = format!(
            r#"
            INSERT INTO artists (name, city, state, phone, genres, seeking_venue,
                                 seeking_description, website, image_link, facebook_link)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            ARTIST_COLUMNS
        );
        let artist = sqlx::query_as::<_, Artist>(&sql)
            .bind(&input.name)
            .bind(&input.city)
            .bind(&input.state)
            .bind(&input.phone)
            .bind(&input.genres)
            .bind(input.seeking_venue)
            .bind(&input.seeking_description)
            .bind(&input.website)
            .bind(&input.image_link)
            .bind(&input.facebook_link)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!(artist_id = artist.id, "artist created");
        Ok(artist)
    }

    async fn update_artist(&self, id: i32, input: ArtistInput) -> StoreResult<Artist> {
        let sql = format!(
            r#"
            UPDATE artists
            SET name = $2, city = $3, state = $4, phone = $5, genres = $6,
                seeking_venue = $7, seeking_description = $8, website = $9,
                image_link = $10, facebook_link = $11
            WHERE id = $1
            RETURNING {}
            "#,
            ARTIST_COLUMNS
        );
        sqlx::query_as::<_, Artist>(&sql)
            .bind(id)
            .bind(&input.name)
            .bind(&input.city)
            .bind(&input.state)
            .bind(&input.phone)
            .bind(&input.genres)
            .bind(input.seeking_venue)
            .bind(&input.seeking_description)
            .bind(&input.website)
            .bind(&input.image_link)
            .bind(&input.facebook_link)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("artist", id))
    }

    async fn delete_artist(&self, id: i32) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM artists WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("artist", id));
        }
        Ok(())
    }

    async fn shows(&self) -> StoreResult<Vec<ShowDetail>> {
        let sql = format!("{} ORDER BY s.start_time, s.id", SHOW_DETAIL_SELECT);
        let shows = sqlx::query_as::<_, ShowDetail>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(shows)
    }

    /// Both references are checked inside the insert's transaction.
    async fn create_show(&self, show: NewShow) -> StoreResult<ShowDetail> {
        let mut tx = self.pool.begin().await?;

        let (artist_exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM artists WHERE id = $1)")
                .bind(show.artist_id)
                .fetch_one(&mut *tx)
                .await?;
        if !artist_exists {
            return Err(StoreError::unknown_reference("artist_id", show.artist_id));
        }

        let (venue_exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM venues WHERE id = $1)")
                .bind(show.venue_id)
                .fetch_one(&mut *tx)
                .await?;
        if !venue_exists {
            return Err(StoreError::unknown_reference("venue_id", show.venue_id));
        }

        let (id,): (i32,) = sqlx::query_as(
            "INSERT INTO shows (artist_id, venue_id, start_time) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(show.artist_id)
        .bind(show.venue_id)
        .bind(show.start_time)
        .fetch_one(&mut *tx)
        .await?;

        let sql = format!("{} WHERE s.id = $1", SHOW_DETAIL_SELECT);
        let detail = sqlx::query_as::<_, ShowDetail>(&sql)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(show_id = id, "show created");
        Ok(detail)
    }
}
