use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use foodgram_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{
    ImageStore, IngredientRepository, RecipeRepository, TagRepository,
};
use crate::domain::types::{
    IngredientAmount, NAME_MAX_LEN, NewRecipe, RecipeChanges, RecipeDetail, RecipeFilter,
    first_duplicate, small_positive,
};
use crate::error::ApiError;

/// Ingredient line as submitted by the client, before range checks.
#[derive(Debug, Clone, Copy)]
pub struct IngredientAmountInput {
    pub id: i32,
    pub amount: i64,
}

fn recipe_name(value: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("name", "must not be blank"));
    }
    if trimmed.chars().count() > NAME_MAX_LEN {
        return Err(ApiError::validation("name", "must be at most 200 characters"));
    }
    Ok(trimmed.to_owned())
}

fn recipe_text(value: &str) -> Result<String, ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::validation("text", "must not be blank"));
    }
    Ok(value.to_owned())
}

fn cooking_time(value: i64) -> Result<i16, ApiError> {
    small_positive(value)
        .ok_or_else(|| ApiError::validation("cooking_time", "must be between 1 and 32767"))
}

fn tag_ids(ids: Vec<i32>) -> Result<Vec<i32>, ApiError> {
    if ids.is_empty() {
        return Err(ApiError::validation("tags", "at least one tag is required"));
    }
    if let Some(dup) = first_duplicate(ids.iter().copied()) {
        return Err(ApiError::validation("tags", format!("tag {dup} is listed twice")));
    }
    Ok(ids)
}

fn ingredient_amounts(
    entries: Vec<IngredientAmountInput>,
) -> Result<Vec<IngredientAmount>, ApiError> {
    if entries.is_empty() {
        return Err(ApiError::validation(
            "ingredients",
            "at least one ingredient is required",
        ));
    }
    if let Some(dup) = first_duplicate(entries.iter().map(|e| e.id)) {
        return Err(ApiError::validation(
            "ingredients",
            format!("ingredient {dup} is listed twice"),
        ));
    }
    entries
        .into_iter()
        .map(|entry| {
            let amount = small_positive(entry.amount).ok_or_else(|| {
                ApiError::validation("ingredients", "amount must be between 1 and 32767")
            })?;
            Ok(IngredientAmount {
                ingredient_id: entry.id,
                amount,
            })
        })
        .collect()
}

/// Reject links to tags or ingredients that do not exist.
async fn ensure_links_exist<T: TagRepository, I: IngredientRepository>(
    tags: &T,
    ingredients: &I,
    tag_ids: &[i32],
    amounts: &[IngredientAmount],
) -> Result<(), ApiError> {
    let known = tags.existing_ids(tag_ids).await?;
    if let Some(missing) = tag_ids.iter().find(|id| !known.contains(id)) {
        return Err(ApiError::validation(
            "tags",
            format!("tag {missing} does not exist"),
        ));
    }
    let ingredient_ids: Vec<i32> = amounts.iter().map(|a| a.ingredient_id).collect();
    let known = ingredients.existing_ids(&ingredient_ids).await?;
    if let Some(missing) = ingredient_ids.iter().find(|id| !known.contains(id)) {
        return Err(ApiError::validation(
            "ingredients",
            format!("ingredient {missing} does not exist"),
        ));
    }
    Ok(())
}

async fn load_detail<R: RecipeRepository>(
    recipes: &R,
    id: i32,
    viewer: Option<Uuid>,
) -> Result<RecipeDetail, ApiError> {
    recipes
        .load_details(&[id], viewer)
        .await?
        .into_iter()
        .next()
        .ok_or(ApiError::RecipeNotFound)
}

/// Drop an image no recipe row points at. Failures are logged and swallowed.
async fn discard_image<S: ImageStore>(images: &S, reference: &str) {
    if let Err(e) = images.remove(reference).await {
        warn!(image = reference, error = ?e, "failed to remove image");
    }
}

// ── CreateRecipe ─────────────────────────────────────────────────────────────

pub struct CreateRecipeInput {
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i64,
    pub tags: Vec<i32>,
    pub ingredients: Vec<IngredientAmountInput>,
}

pub struct CreateRecipeUseCase<R, T, I, S>
where
    R: RecipeRepository,
    T: TagRepository,
    I: IngredientRepository,
    S: ImageStore,
{
    pub recipes: R,
    pub tags: T,
    pub ingredients: I,
    pub images: S,
}

impl<R, T, I, S> CreateRecipeUseCase<R, T, I, S>
where
    R: RecipeRepository,
    T: TagRepository,
    I: IngredientRepository,
    S: ImageStore,
{
    pub async fn execute(
        &self,
        author_id: Uuid,
        input: CreateRecipeInput,
    ) -> Result<RecipeDetail, ApiError> {
        let name = recipe_name(&input.name)?;
        let text = recipe_text(&input.text)?;
        let cooking_time = cooking_time(input.cooking_time)?;
        let tag_ids = tag_ids(input.tags)?;
        let ingredients = ingredient_amounts(input.ingredients)?;
        ensure_links_exist(&self.tags, &self.ingredients, &tag_ids, &ingredients).await?;
        let image = self.images.save(&input.image).await?;

        let recipe = NewRecipe {
            author_id,
            name,
            image,
            text,
            cooking_time,
            tag_ids,
            ingredients,
            pub_date: Utc::now(),
        };
        let id = match self.recipes.create(&recipe).await {
            Ok(id) => id,
            Err(e) => {
                discard_image(&self.images, &recipe.image).await;
                return Err(e);
            }
        };
        info!(recipe_id = id, author_id = %author_id, "recipe created");
        load_detail(&self.recipes, id, Some(author_id)).await
    }
}

// ── UpdateRecipe ─────────────────────────────────────────────────────────────

pub struct UpdateRecipeInput {
    pub name: Option<String>,
    pub image: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i64>,
    pub tags: Option<Vec<i32>>,
    pub ingredients: Option<Vec<IngredientAmountInput>>,
}

pub struct UpdateRecipeUseCase<R, T, I, S>
where
    R: RecipeRepository,
    T: TagRepository,
    I: IngredientRepository,
    S: ImageStore,
{
    pub recipes: R,
    pub tags: T,
    pub ingredients: I,
    pub images: S,
}

impl<R, T, I, S> UpdateRecipeUseCase<R, T, I, S>
where
    R: RecipeRepository,
    T: TagRepository,
    I: IngredientRepository,
    S: ImageStore,
{
    pub async fn execute(
        &self,
        recipe_id: i32,
        requester: Uuid,
        input: UpdateRecipeInput,
    ) -> Result<RecipeDetail, ApiError> {
        let recipe = self
            .recipes
            .find_by_id(recipe_id)
            .await?
            .ok_or(ApiError::RecipeNotFound)?;
        if recipe.author_id != requester {
            return Err(ApiError::Forbidden);
        }

        let name = input.name.as_deref().map(recipe_name).transpose()?;
        let text = input.text.as_deref().map(recipe_text).transpose()?;
        let cooking_time = input.cooking_time.map(cooking_time).transpose()?;
        let tag_ids = tag_ids(
            input
                .tags
                .ok_or_else(|| ApiError::validation("tags", "field is required"))?,
        )?;
        let ingredients = ingredient_amounts(
            input
                .ingredients
                .ok_or_else(|| ApiError::validation("ingredients", "field is required"))?,
        )?;
        ensure_links_exist(&self.tags, &self.ingredients, &tag_ids, &ingredients).await?;
        let image = match input.image.as_deref() {
            Some(data_uri) => Some(self.images.save(data_uri).await?),
            None => None,
        };

        let changes = RecipeChanges {
            name,
            image,
            text,
            cooking_time,
            tag_ids,
            ingredients,
        };
        if let Err(e) = self.recipes.update(recipe_id, &changes).await {
            if let Some(image) = &changes.image {
                discard_image(&self.images, image).await;
            }
            return Err(e);
        }
        if changes.image.is_some() {
            discard_image(&self.images, &recipe.image).await;
        }
        info!(recipe_id, "recipe updated");
        load_detail(&self.recipes, recipe_id, Some(requester)).await
    }
}

// ── DeleteRecipe ─────────────────────────────────────────────────────────────

pub struct DeleteRecipeUseCase<R: RecipeRepository, S: ImageStore> {
    pub recipes: R,
    pub images: S,
}

impl<R: RecipeRepository, S: ImageStore> DeleteRecipeUseCase<R, S> {
    pub async fn execute(&self, recipe_id: i32, requester: Uuid) -> Result<(), ApiError> {
        let recipe = self
            .recipes
            .find_by_id(recipe_id)
            .await?
            .ok_or(ApiError::RecipeNotFound)?;
        if recipe.author_id != requester {
            return Err(ApiError::Forbidden);
        }
        if !self.recipes.delete(recipe_id).await? {
            return Err(ApiError::RecipeNotFound);
        }
        discard_image(&self.images, &recipe.image).await;
        info!(recipe_id, "recipe deleted");
        Ok(())
    }
}

// ── GetRecipe ────────────────────────────────────────────────────────────────

pub struct GetRecipeUseCase<R: RecipeRepository> {
    pub recipes: R,
}

impl<R: RecipeRepository> GetRecipeUseCase<R> {
    pub async fn execute(
        &self,
        recipe_id: i32,
        viewer: Option<Uuid>,
    ) -> Result<RecipeDetail, ApiError> {
        load_detail(&self.recipes, recipe_id, viewer).await
    }
}

// ── ListRecipes ──────────────────────────────────────────────────────────────

pub struct ListRecipesUseCase<R: RecipeRepository> {
    pub recipes: R,
}

impl<R: RecipeRepository> ListRecipesUseCase<R> {
    pub async fn execute(
        &self,
        mut filter: RecipeFilter,
        viewer: Option<Uuid>,
        page: PageRequest,
    ) -> Result<Page<RecipeDetail>, ApiError> {
        if viewer.is_none() {
            // Anonymous relations are empty: `true` matches nothing, `false` everything.
            if filter.is_favorited == Some(true) || filter.is_in_shopping_cart == Some(true) {
                return Ok(Page::empty());
            }
            filter.is_favorited = None;
            filter.is_in_shopping_cart = None;
        }
        let ids = self.recipes.list_ids(&filter, viewer, page).await?;
        let results = self.recipes.load_details(&ids.results, viewer).await?;
        Ok(Page {
            count: ids.count,
            results,
        })
    }
}
