use tracing::info;

use crate::domain::repository::{IngredientRepository, TagRepository};
use crate::domain::types::{
    Ingredient, NAME_MAX_LEN, NewIngredient, NewTag, Tag, normalize_color, slugify,
};
use crate::error::ApiError;

fn catalog_name(field: &'static str, value: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation(field, "must not be blank"));
    }
    if trimmed.chars().count() > NAME_MAX_LEN {
        return Err(ApiError::validation(field, "must be at most 200 characters"));
    }
    Ok(trimmed.to_owned())
}

// ── ListTags ─────────────────────────────────────────────────────────────────

pub struct ListTagsUseCase<R: TagRepository> {
    pub repo: R,
}

impl<R: TagRepository> ListTagsUseCase<R> {
    pub async fn execute(&self) -> Result<Vec<Tag>, ApiError> {
        self.repo.list().await
    }
}

// ── GetTag ───────────────────────────────────────────────────────────────────

pub struct GetTagUseCase<R: TagRepository> {
    pub repo: R,
}

impl<R: TagRepository> GetTagUseCase<R> {
    pub async fn execute(&self, id: i32) -> Result<Tag, ApiError> {
        self.repo.find_by_id(id).await?.ok_or(ApiError::TagNotFound)
    }
}

// ── CreateTag ────────────────────────────────────────────────────────────────

pub struct CreateTagInput {
    pub name: String,
    pub color: String,
}

pub struct CreateTagUseCase<R: TagRepository> {
    pub repo: R,
}

impl<R: TagRepository> CreateTagUseCase<R> {
    pub async fn execute(&self, input: CreateTagInput) -> Result<Tag, ApiError> {
        let name = catalog_name("name", &input.name)?;
        let color = normalize_color(input.color.trim())
            .ok_or_else(|| ApiError::validation("color", "must be a #RRGGBB hex color"))?;
        let slug = slugify(&name);
        if slug.is_empty() {
            return Err(ApiError::validation(
                "name",
                "must contain at least one letter or digit",
            ));
        }
        let tag = self
            .repo
            .create(&NewTag { name, color, slug })
            .await?
            .ok_or(ApiError::TagAlreadyExists)?;
        info!(tag_id = tag.id, slug = %tag.slug, "tag created");
        Ok(tag)
    }
}

// ── ListIngredients ──────────────────────────────────────────────────────────

pub struct ListIngredientsUseCase<R: IngredientRepository> {
    pub repo: R,
}

impl<R: IngredientRepository> ListIngredientsUseCase<R> {
    pub async fn execute(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>, ApiError> {
        let name_prefix = name_prefix.map(str::trim).filter(|p| !p.is_empty());
        self.repo.list(name_prefix).await
    }
}

// ── GetIngredient ────────────────────────────────────────────────────────────

pub struct GetIngredientUseCase<R: IngredientRepository> {
    pub repo: R,
}

impl<R: IngredientRepository> GetIngredientUseCase<R> {
    pub async fn execute(&self, id: i32) -> Result<Ingredient, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::IngredientNotFound)
    }
}

// ── CreateIngredient ─────────────────────────────────────────────────────────

pub struct CreateIngredientInput {
    pub name: String,
    pub measurement_unit: String,
}

pub struct CreateIngredientUseCase<R: IngredientRepository> {
    pub repo: R,
}

impl<R: IngredientRepository> CreateIngredientUseCase<R> {
    pub async fn execute(&self, input: CreateIngredientInput) -> Result<Ingredient, ApiError> {
        let ingredient = NewIngredient {
            name: catalog_name("name", &input.name)?,
            measurement_unit: catalog_name("measurement_unit", &input.measurement_unit)?,
        };
        let ingredient = self
            .repo
            .create(&ingredient)
            .await?
            .ok_or(ApiError::IngredientAlreadyExists)?;
        info!(ingredient_id = ingredient.id, name = %ingredient.name, "ingredient created");
        Ok(ingredient)
    }
}
