use async_trait::async_trait;
use sqlx::FromRow;

use super::{is_unique_violation, PgStore};
use crate::db::store::{CoffeeStore, StoreError, StoreResult};
use crate::models::{Drink, DrinkPatch, NewDrink, Recipe};

/// Drink row with the recipe still in its stored text form
#[derive(FromRow)]
struct DrinkRow {
    id: i32,
    title: String,
    recipe: String,
}

impl TryFrom<DrinkRow> for Drink {
    type Error = StoreError;

    fn try_from(row: DrinkRow) -> Result<Self, Self::Error> {
        let recipe = Recipe::from_text(&row.recipe).map_err(|e| StoreError::Corrupt {
            resource: "drink",
            id: i64::from(row.id),
            reason: e.to_string(),
        })?;
        Ok(Drink {
            id: row.id,
            title: row.title,
            recipe,
        })
    }
}

fn duplicate_title(err: sqlx::Error, title: &str) -> StoreError {
    if is_unique_violation(&err) {
        StoreError::Duplicate {
            field: "title",
            value: title.to_owned(),
        }
    } else {
        StoreError::Sqlx(err)
    }
}

#[async_trait]
impl CoffeeStore for PgStore {
    async fn drinks(&self) -> StoreResult<Vec<Drink>> {
        let rows = sqlx::query_as::<_, DrinkRow>("SELECT id, title, recipe FROM drinks ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Drink::try_from).collect()
    }

    async fn create_drink(&self, drink: NewDrink) -> StoreResult<Drink> {
        let row = sqlx::query_as::<_, DrinkRow>(
            "INSERT INTO drinks (title, recipe) VALUES ($1, $2) RETURNING id, title, recipe",
        )
        .bind(&drink.title)
        .bind(drink.recipe.to_text())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| duplicate_title(e, &drink.title))?;

        tracing::debug!(drink_id = row.id, "drink created");
        Drink::try_from(row)
    }

    /// Absent patch fields keep their stored values via COALESCE.
    async fn update_drink(&self, id: i32, patch: DrinkPatch) -> StoreResult<Drink> {
        let title = patch.title.clone().unwrap_or_default();
        let row = sqlx::query_as::<_, DrinkRow>(
            r#"
            UPDATE drinks
            SET title = COALESCE($2, title), recipe = COALESCE($3, recipe)
            WHERE id = $1
            RETURNING id, title, recipe
            "#,
        )
        .bind(id)
        .bind(patch.title.as_deref())
        .bind(patch.recipe.as_ref().map(Recipe::to_text))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| duplicate_title(e, &title))?
        .ok_or_else(|| StoreError::not_found("drink", id))?;

        Drink::try_from(row)
    }

    async fn delete_drink(&self, id: i32) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM drinks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("drink", id));
        }
        Ok(())
    }
}
