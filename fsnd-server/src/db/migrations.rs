//! Schema for the venue, trivia and coffee tables
//!
//! Every statement is idempotent, so `run` is safe at each startup.

use sqlx::PgPool;

const SCHEMA: &[(&str, &str)] = &[
    (
        "venues",
        r#"
        CREATE TABLE IF NOT EXISTS venues (
            id SERIAL PRIMARY KEY,
            name VARCHAR(120) NOT NULL,
            city VARCHAR(120) NOT NULL,
            state VARCHAR(120) NOT NULL,
            address VARCHAR(120) NOT NULL,
            phone VARCHAR(120),
            genres TEXT[] NOT NULL DEFAULT '{}',
            seeking_talent BOOLEAN NOT NULL DEFAULT FALSE,
            seeking_description VARCHAR(500),
            website VARCHAR(500),
            image_link VARCHAR(500),
            facebook_link VARCHAR(120)
        )
        "#,
    ),
    (
        "artists",
        r#"
        CREATE TABLE IF NOT EXISTS artists (
            id SERIAL PRIMARY KEY,
            name VARCHAR(120) NOT NULL,
            city VARCHAR(120) NOT NULL,
            state VARCHAR(120) NOT NULL,
            phone VARCHAR(120),
            genres TEXT[] NOT NULL DEFAULT '{}',
            seeking_venue BOOLEAN NOT NULL DEFAULT FALSE,
            seeking_description VARCHAR(500),
            website VARCHAR(500),
            image_link VARCHAR(500),
            facebook_link VARCHAR(120)
        )
        "#,
    ),
    (
        "shows",
        r#"
        CREATE TABLE IF NOT EXISTS shows (
            id SERIAL PRIMARY KEY,
            artist_id INTEGER NOT NULL REFERENCES artists(id) ON DELETE CASCADE,
            venue_id INTEGER NOT NULL REFERENCES venues(id) ON DELETE CASCADE,
            start_time TIMESTAMPTZ NOT NULL
        )
        "#,
    ),
    (
        "categories",
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id SERIAL PRIMARY KEY,
            type VARCHAR(120) NOT NULL
        )
        "#,
    ),
    (
        "questions",
        r#"
        CREATE TABLE IF NOT EXISTS questions (
            id SERIAL PRIMARY KEY,
            question VARCHAR(300) NOT NULL,
            answer VARCHAR(300) NOT NULL,
            difficulty INTEGER NOT NULL CHECK (difficulty BETWEEN 1 AND 5),
            category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE
        )
        "#,
    ),
    (
        "drinks",
        r#"
        CREATE TABLE IF NOT EXISTS drinks (
            id SERIAL PRIMARY KEY,
            title VARCHAR(80) NOT NULL UNIQUE,
            recipe VARCHAR(180) NOT NULL
        )
        "#,
    ),
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_shows_venue ON shows(venue_id, start_time)",
    "CREATE INDEX IF NOT EXISTS idx_shows_artist ON shows(artist_id, start_time)",
    "CREATE INDEX IF NOT EXISTS idx_venues_location ON venues(city, state)",
    "CREATE INDEX IF NOT EXISTS idx_questions_category ON questions(category_id)",
];

/// Create any missing tables and indexes.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("running migrations");

    for (table, ddl) in SCHEMA {
        tracing::debug!(table, "ensuring table");
        sqlx::query(ddl).execute(pool).await?;
    }

    for ddl in INDEXES {
        sqlx::query(ddl).execute(pool).await?;
    }

    tracing::info!(tables = SCHEMA.len(), "migrations complete");
    Ok(())
}
