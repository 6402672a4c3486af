use std::collections::{HashMap, HashSet};

use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, FromQueryResult, JoinType, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, TransactionTrait,
    sea_query::{Expr, OnConflict, Query, SelectStatement},
};
use uuid::Uuid;

use foodgram_api_schema::{
    favorites, ingredients, purchases, recipe_ingredients, recipe_tags, recipes, subscriptions,
    tags, users,
};
use foodgram_core::sea_ext::{has_prefix_ci, starts_with_ci};
use foodgram_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{
    EngagementRepository, IngredientRepository, RecipeRepository, SubscriptionRepository,
    TagRepository, UserRepository,
};
use crate::domain::types::{
    CartRow, Ingredient, IngredientAmount, NewIngredient, NewRecipe, NewTag, Recipe,
    RecipeChanges, RecipeDetail, RecipeFilter, RecipeIngredient, RecipePreview, Tag, ToggleKind,
    User, UserProfile,
};
use crate::error::ApiError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn create(&self, user: &User) -> Result<bool, ApiError> {
        let inserted = users::Entity::insert(users::ActiveModel {
            id: Set(user.id),
            email: Set(user.email.clone()),
            username: Set(user.username.clone()),
            first_name: Set(user.first_name.clone()),
            last_name: Set(user.last_name.clone()),
            password_hash: Set(user.password_hash.clone()),
            created_at: Set(user.created_at),
        })
        // email and username are both unique; either collision skips the insert
        .on_conflict(OnConflict::new().do_nothing().to_owned())
        .exec_without_returning(&self.db)
        .await
        .context("create user")?;
        Ok(inserted > 0)
    }

    async fn list(&self, page: PageRequest) -> Result<Page<User>, ApiError> {
        let query = users::Entity::find().order_by_asc(users::Column::Id);
        let count = query.clone().count(&self.db).await.context("count users")?;
        let models = query
            .offset(page.offset())
            .limit(u64::from(page.clamped().limit))
            .all(&self.db)
            .await
            .context("list users")?;
        Ok(Page {
            count,
            results: models.into_iter().map(user_from_model).collect(),
        })
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), ApiError> {
        users::ActiveModel {
            id: Set(id),
            password_hash: Set(password_hash.to_owned()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update password hash")?;
        Ok(())
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        email: model.email,
        username: model.username,
        first_name: model.first_name,
        last_name: model.last_name,
        password_hash: model.password_hash,
        created_at: model.created_at,
    }
}

// ── Subscription repository ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSubscriptionRepository {
    pub db: DatabaseConnection,
}

impl SubscriptionRepository for DbSubscriptionRepository {
    async fn add(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, ApiError> {
        let inserted = subscriptions::Entity::insert(subscriptions::ActiveModel {
            user_id: Set(user_id),
            author_id: Set(author_id),
            created_at: Set(Utc::now()),
        })
        .on_conflict(
            OnConflict::columns([
                subscriptions::Column::UserId,
                subscriptions::Column::AuthorId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await
        .context("insert subscription")?;
        Ok(inserted > 0)
    }

    async fn remove(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, ApiError> {
        let result = subscriptions::Entity::delete_many()
            .filter(subscriptions::Column::UserId.eq(user_id))
            .filter(subscriptions::Column::AuthorId.eq(author_id))
            .exec(&self.db)
            .await
            .context("delete subscription")?;
        Ok(result.rows_affected > 0)
    }

    async fn subscribed_among(
        &self,
        user_id: Uuid,
        author_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, ApiError> {
        if author_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let ids: Vec<Uuid> = subscriptions::Entity::find()
            .select_only()
            .column(subscriptions::Column::AuthorId)
            .filter(subscriptions::Column::UserId.eq(user_id))
            .filter(subscriptions::Column::AuthorId.is_in(author_ids.iter().copied()))
            .into_tuple()
            .all(&self.db)
            .await
            .context("find subscribed authors")?;
        Ok(ids.into_iter().collect())
    }

    async fn list_authors(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<User>, ApiError> {
        let query = users::Entity::find()
            .filter(
                users::Column::Id.in_subquery(
                    Query::select()
                        .column(subscriptions::Column::AuthorId)
                        .from(subscriptions::Entity)
                        .and_where(subscriptions::Column::UserId.eq(user_id))
                        .to_owned(),
                ),
            )
            .order_by_asc(users::Column::Id);
        let count = query
            .clone()
            .count(&self.db)
            .await
            .context("count subscribed authors")?;
        let models = query
            .offset(page.offset())
            .limit(u64::from(page.clamped().limit))
            .all(&self.db)
            .await
            .context("list subscribed authors")?;
        Ok(Page {
            count,
            results: models.into_iter().map(user_from_model).collect(),
        })
    }
}

// ── Tag repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTagRepository {
    pub db: DatabaseConnection,
}

impl TagRepository for DbTagRepository {
    async fn list(&self) -> Result<Vec<Tag>, ApiError> {
        let models = tags::Entity::find()
            .order_by_asc(tags::Column::Id)
            .all(&self.db)
            .await
            .context("list tags")?;
        Ok(models.into_iter().map(tag_from_model).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Tag>, ApiError> {
        let model = tags::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find tag by id")?;
        Ok(model.map(tag_from_model))
    }

    async fn existing_ids(&self, ids: &[i32]) -> Result<HashSet<i32>, ApiError> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }
        let found: Vec<i32> = tags::Entity::find()
            .select_only()
            .column(tags::Column::Id)
            .filter(tags::Column::Id.is_in(ids.iter().copied()))
            .into_tuple()
            .all(&self.db)
            .await
            .context("find existing tag ids")?;
        Ok(found.into_iter().collect())
    }

    async fn create(&self, tag: &NewTag) -> Result<Option<Tag>, ApiError> {
        let inserted = tags::Entity::insert(tags::ActiveModel {
            name: Set(tag.name.clone()),
            color: Set(tag.color.clone()),
            slug: Set(tag.slug.clone()),
            ..Default::default()
        })
        .on_conflict(OnConflict::new().do_nothing().to_owned())
        .exec_without_returning(&self.db)
        .await
        .context("insert tag")?;
        if inserted == 0 {
            return Ok(None);
        }
        let model = tags::Entity::find()
            .filter(tags::Column::Slug.eq(tag.slug.as_str()))
            .one(&self.db)
            .await
            .context("reload inserted tag")?;
        Ok(model.map(tag_from_model))
    }
}

fn tag_from_model(model: tags::Model) -> Tag {
    Tag {
        id: model.id,
        name: model.name,
        color: model.color,
        slug: model.slug,
    }
}

// ── Ingredient repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbIngredientRepository {
    pub db: DatabaseConnection,
}

impl IngredientRepository for DbIngredientRepository {
    async fn list(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>, ApiError> {
        let mut query = ingredients::Entity::find();
        // SQL LOWER is only trusted for ASCII; other terms are folded here
        let folded_prefix = match name_prefix {
            Some(prefix) if prefix.is_ascii() => {
                query = query.filter(starts_with_ci(
                    (ingredients::Entity, ingredients::Column::Name),
                    prefix,
                ));
                None
            }
            other => other,
        };
        let models = query
            .order_by_asc(ingredients::Column::Name)
            .order_by_asc(ingredients::Column::Id)
            .all(&self.db)
            .await
            .context("list ingredients")?;
        Ok(models
            .into_iter()
            .filter(|m| folded_prefix.is_none_or(|prefix| has_prefix_ci(&m.name, prefix)))
            .map(ingredient_from_model)
            .collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Ingredient>, ApiError> {
        let model = ingredients::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find ingredient by id")?;
        Ok(model.map(ingredient_from_model))
    }

    async fn existing_ids(&self, ids: &[i32]) -> Result<HashSet<i32>, ApiError> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }
        let found: Vec<i32> = ingredients::Entity::find()
            .select_only()
            .column(ingredients::Column::Id)
            .filter(ingredients::Column::Id.is_in(ids.iter().copied()))
            .into_tuple()
            .all(&self.db)
            .await
            .context("find existing ingredient ids")?;
        Ok(found.into_iter().collect())
    }

    async fn create(&self, ingredient: &NewIngredient) -> Result<Option<Ingredient>, ApiError> {
        let inserted = ingredients::Entity::insert(ingredients::ActiveModel {
            name: Set(ingredient.name.clone()),
            measurement_unit: Set(ingredient.measurement_unit.clone()),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::columns([
                ingredients::Column::Name,
                ingredients::Column::MeasurementUnit,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await
        .context("insert ingredient")?;
        if inserted == 0 {
            return Ok(None);
        }
        let model = ingredients::Entity::find()
            .filter(ingredients::Column::Name.eq(ingredient.name.as_str()))
            .filter(ingredients::Column::MeasurementUnit.eq(ingredient.measurement_unit.as_str()))
            .one(&self.db)
            .await
            .context("reload inserted ingredient")?;
        Ok(model.map(ingredient_from_model))
    }
}

fn ingredient_from_model(model: ingredients::Model) -> Ingredient {
    Ingredient {
        id: model.id,
        name: model.name,
        measurement_unit: model.measurement_unit,
    }
}

// ── Recipe repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRecipeRepository {
    pub db: DatabaseConnection,
}

#[derive(Debug, FromQueryResult)]
struct TagLinkRow {
    recipe_id: i32,
    id: i32,
    name: String,
    color: String,
    slug: String,
}

#[derive(Debug, FromQueryResult)]
struct IngredientLinkRow {
    recipe_id: i32,
    id: i32,
    name: String,
    measurement_unit: String,
    amount: i16,
}

impl RecipeRepository for DbRecipeRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Recipe>, ApiError> {
        let model = recipes::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find recipe by id")?;
        Ok(model.map(recipe_from_model))
    }

    async fn create(&self, recipe: &NewRecipe) -> Result<i32, ApiError> {
        let id = self
            .db
            .transaction::<_, i32, DbErr>(|txn| {
                let recipe = recipe.clone();
                Box::pin(async move {
                    let model = recipes::ActiveModel {
                        author_id: Set(recipe.author_id),
                        name: Set(recipe.name),
                        image: Set(recipe.image),
                        text: Set(recipe.text),
                        cooking_time: Set(recipe.cooking_time),
                        pub_date: Set(recipe.pub_date),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;
                    insert_links(txn, model.id, &recipe.tag_ids, &recipe.ingredients).await?;
                    Ok(model.id)
                })
            })
            .await
            .context("create recipe")?;
        Ok(id)
    }

    async fn update(&self, id: i32, changes: &RecipeChanges) -> Result<(), ApiError> {
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                let changes = changes.clone();
                Box::pin(async move {
                    let mut recipe = recipes::ActiveModel {
                        id: Set(id),
                        ..Default::default()
                    };
                    let mut dirty = false;
                    if let Some(name) = changes.name {
                        recipe.name = Set(name);
                        dirty = true;
                    }
                    if let Some(image) = changes.image {
                        recipe.image = Set(image);
                        dirty = true;
                    }
                    if let Some(text) = changes.text {
                        recipe.text = Set(text);
                        dirty = true;
                    }
                    if let Some(cooking_time) = changes.cooking_time {
                        recipe.cooking_time = Set(cooking_time);
                        dirty = true;
                    }
                    if dirty {
                        recipe.update(txn).await?;
                    }

                    // links are replaced wholesale, never merged
                    recipe_tags::Entity::delete_many()
                        .filter(recipe_tags::Column::RecipeId.eq(id))
                        .exec(txn)
                        .await?;
                    recipe_ingredients::Entity::delete_many()
                        .filter(recipe_ingredients::Column::RecipeId.eq(id))
                        .exec(txn)
                        .await?;
                    insert_links(txn, id, &changes.tag_ids, &changes.ingredients).await?;
                    Ok(())
                })
            })
            .await
            .context("update recipe")?;
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<bool, ApiError> {
        // links, favorites and purchases go with it via ON DELETE CASCADE
        let result = recipes::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete recipe")?;
        Ok(result.rows_affected > 0)
    }

    async fn list_ids(
        &self,
        filter: &RecipeFilter,
        viewer: Option<Uuid>,
        page: PageRequest,
    ) -> Result<Page<i32>, ApiError> {
        let mut query = recipes::Entity::find()
            .select_only()
            .column(recipes::Column::Id);

        if !filter.tag_slugs.is_empty() {
            query = query.filter(
                recipes::Column::Id.in_subquery(
                    Query::select()
                        .column((recipe_tags::Entity, recipe_tags::Column::RecipeId))
                        .from(recipe_tags::Entity)
                        .inner_join(
                            tags::Entity,
                            Expr::col((tags::Entity, tags::Column::Id))
                                .equals((recipe_tags::Entity, recipe_tags::Column::TagId)),
                        )
                        .and_where(
                            Expr::col((tags::Entity, tags::Column::Slug))
                                .is_in(filter.tag_slugs.iter().cloned()),
                        )
                        .to_owned(),
                ),
            );
        }
        if let Some(author_id) = filter.author_id {
            query = query.filter(recipes::Column::AuthorId.eq(author_id));
        }
        if let Some(viewer) = viewer {
            for (kind, flag) in [
                (ToggleKind::Favorite, filter.is_favorited),
                (ToggleKind::ShoppingCart, filter.is_in_shopping_cart),
            ] {
                let Some(flag) = flag else { continue };
                let members = toggle_subquery(kind, viewer);
                query = query.filter(if flag {
                    recipes::Column::Id.in_subquery(members)
                } else {
                    recipes::Column::Id.not_in_subquery(members)
                });
            }
        }

        let count = query
            .clone()
            .count(&self.db)
            .await
            .context("count recipes")?;
        let ids: Vec<i32> = query
            .order_by_desc(recipes::Column::PubDate)
            .order_by_desc(recipes::Column::Id)
            .offset(page.offset())
            .limit(u64::from(page.clamped().limit))
            .into_tuple()
            .all(&self.db)
            .await
            .context("list recipe ids")?;
        Ok(Page {
            count,
            results: ids,
        })
    }

    async fn load_details(
        &self,
        ids: &[i32],
        viewer: Option<Uuid>,
    ) -> Result<Vec<RecipeDetail>, ApiError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let recipe_models: HashMap<i32, recipes::Model> = recipes::Entity::find()
            .filter(recipes::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .context("load recipes")?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        let author_ids: Vec<Uuid> = recipe_models
            .values()
            .map(|m| m.author_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let authors: HashMap<Uuid, users::Model> = users::Entity::find()
            .filter(users::Column::Id.is_in(author_ids.iter().copied()))
            .all(&self.db)
            .await
            .context("load recipe authors")?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        let mut tags_by_recipe: HashMap<i32, Vec<Tag>> = HashMap::new();
        let tag_rows = tags::Entity::find()
            .select_only()
            .column(recipe_tags::Column::RecipeId)
            .column(tags::Column::Id)
            .column(tags::Column::Name)
            .column(tags::Column::Color)
            .column(tags::Column::Slug)
            .join(JoinType::InnerJoin, tags::Relation::RecipeTags.def())
            .filter(recipe_tags::Column::RecipeId.is_in(ids.iter().copied()))
            .order_by_asc(tags::Column::Id)
            .into_model::<TagLinkRow>()
            .all(&self.db)
            .await
            .context("load recipe tags")?;
        for row in tag_rows {
            tags_by_recipe.entry(row.recipe_id).or_default().push(Tag {
                id: row.id,
                name: row.name,
                color: row.color,
                slug: row.slug,
            });
        }

        let mut ingredients_by_recipe: HashMap<i32, Vec<RecipeIngredient>> = HashMap::new();
        let ingredient_rows = recipe_ingredients::Entity::find()
            .select_only()
            .column(recipe_ingredients::Column::RecipeId)
            .column(ingredients::Column::Id)
            .column(ingredients::Column::Name)
            .column(ingredients::Column::MeasurementUnit)
            .column(recipe_ingredients::Column::Amount)
            .join(
                JoinType::InnerJoin,
                recipe_ingredients::Relation::Ingredient.def(),
            )
            .filter(recipe_ingredients::Column::RecipeId.is_in(ids.iter().copied()))
            .order_by_asc(ingredients::Column::Name)
            .into_model::<IngredientLinkRow>()
            .all(&self.db)
            .await
            .context("load recipe ingredients")?;
        for row in ingredient_rows {
            ingredients_by_recipe
                .entry(row.recipe_id)
                .or_default()
                .push(RecipeIngredient {
                    id: row.id,
                    name: row.name,
                    measurement_unit: row.measurement_unit,
                    amount: row.amount,
                });
        }

        let (favorited, in_cart, subscribed) = match viewer {
            Some(viewer) => (
                self.member_recipe_ids(ToggleKind::Favorite, viewer, ids)
                    .await?,
                self.member_recipe_ids(ToggleKind::ShoppingCart, viewer, ids)
                    .await?,
                DbSubscriptionRepository {
                    db: self.db.clone(),
                }
                .subscribed_among(viewer, &author_ids)
                .await?,
            ),
            None => Default::default(),
        };

        let mut details = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(recipe) = recipe_models.get(id) else {
                continue;
            };
            let Some(author) = authors.get(&recipe.author_id) else {
                continue;
            };
            let is_subscribed =
                viewer != Some(author.id) && subscribed.contains(&recipe.author_id);
            details.push(RecipeDetail {
                id: recipe.id,
                tags: tags_by_recipe.remove(id).unwrap_or_default(),
                author: UserProfile::of(&user_from_model(author.clone()), is_subscribed),
                ingredients: ingredients_by_recipe.remove(id).unwrap_or_default(),
                name: recipe.name.clone(),
                image: recipe.image.clone(),
                text: recipe.text.clone(),
                cooking_time: recipe.cooking_time,
                is_favorited: favorited.contains(id),
                is_in_shopping_cart: in_cart.contains(id),
            });
        }
        Ok(details)
    }

    async fn previews_by_author(
        &self,
        author_id: Uuid,
        limit: Option<u64>,
    ) -> Result<Vec<RecipePreview>, ApiError> {
        let mut query = recipes::Entity::find()
            .filter(recipes::Column::AuthorId.eq(author_id))
            .order_by_desc(recipes::Column::PubDate)
            .order_by_desc(recipes::Column::Id);
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        let models = query
            .all(&self.db)
            .await
            .context("list author recipe previews")?;
        Ok(models
            .into_iter()
            .map(|m| RecipePreview::from(&recipe_from_model(m)))
            .collect())
    }

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, ApiError> {
        let count = recipes::Entity::find()
            .filter(recipes::Column::AuthorId.eq(author_id))
            .count(&self.db)
            .await
            .context("count author recipes")?;
        Ok(count)
    }
}

impl DbRecipeRepository {
    async fn member_recipe_ids(
        &self,
        kind: ToggleKind,
        user_id: Uuid,
        recipe_ids: &[i32],
    ) -> Result<HashSet<i32>, ApiError> {
        let found: Vec<i32> = match kind {
            ToggleKind::Favorite => favorites::Entity::find()
                .select_only()
                .column(favorites::Column::RecipeId)
                .filter(favorites::Column::UserId.eq(user_id))
                .filter(favorites::Column::RecipeId.is_in(recipe_ids.iter().copied()))
                .into_tuple()
                .all(&self.db)
                .await
                .context("load favorite flags")?,
            ToggleKind::ShoppingCart => purchases::Entity::find()
                .select_only()
                .column(purchases::Column::RecipeId)
                .filter(purchases::Column::UserId.eq(user_id))
                .filter(purchases::Column::RecipeId.is_in(recipe_ids.iter().copied()))
                .into_tuple()
                .all(&self.db)
                .await
                .context("load shopping cart flags")?,
        };
        Ok(found.into_iter().collect())
    }
}

/// `SELECT recipe_id FROM favorites|purchases WHERE user_id = $1`
fn toggle_subquery(kind: ToggleKind, user_id: Uuid) -> SelectStatement {
    match kind {
        ToggleKind::Favorite => Query::select()
            .column(favorites::Column::RecipeId)
            .from(favorites::Entity)
            .and_where(favorites::Column::UserId.eq(user_id))
            .to_owned(),
        ToggleKind::ShoppingCart => Query::select()
            .column(purchases::Column::RecipeId)
            .from(purchases::Entity)
            .and_where(purchases::Column::UserId.eq(user_id))
            .to_owned(),
    }
}

async fn insert_links(
    txn: &DatabaseTransaction,
    recipe_id: i32,
    tag_ids: &[i32],
    amounts: &[IngredientAmount],
) -> Result<(), DbErr> {
    if !tag_ids.is_empty() {
        recipe_tags::Entity::insert_many(tag_ids.iter().map(|tag_id| recipe_tags::ActiveModel {
            recipe_id: Set(recipe_id),
            tag_id: Set(*tag_id),
        }))
        .exec_without_returning(txn)
        .await?;
    }
    if !amounts.is_empty() {
        recipe_ingredients::Entity::insert_many(amounts.iter().map(|line| {
            recipe_ingredients::ActiveModel {
                recipe_id: Set(recipe_id),
                ingredient_id: Set(line.ingredient_id),
                amount: Set(line.amount),
            }
        }))
        .exec_without_returning(txn)
        .await?;
    }
    Ok(())
}

fn recipe_from_model(model: recipes::Model) -> Recipe {
    Recipe {
        id: model.id,
        author_id: model.author_id,
        name: model.name,
        image: model.image,
        text: model.text,
        cooking_time: model.cooking_time,
        pub_date: model.pub_date,
    }
}

// ── Engagement repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbEngagementRepository {
    pub db: DatabaseConnection,
}

#[derive(Debug, FromQueryResult)]
struct CartQueryRow {
    name: String,
    measurement_unit: String,
    amount: i64,
}

impl EngagementRepository for DbEngagementRepository {
    async fn add(&self, kind: ToggleKind, user_id: Uuid, recipe_id: i32) -> Result<bool, ApiError> {
        let now = Utc::now();
        let inserted = match kind {
            ToggleKind::Favorite => favorites::Entity::insert(favorites::ActiveModel {
                user_id: Set(user_id),
                recipe_id: Set(recipe_id),
                created_at: Set(now),
            })
            .on_conflict(
                OnConflict::columns([favorites::Column::UserId, favorites::Column::RecipeId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("insert favorite")?,
            ToggleKind::ShoppingCart => purchases::Entity::insert(purchases::ActiveModel {
                user_id: Set(user_id),
                recipe_id: Set(recipe_id),
                created_at: Set(now),
            })
            .on_conflict(
                OnConflict::columns([purchases::Column::UserId, purchases::Column::RecipeId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("insert purchase")?,
        };
        Ok(inserted > 0)
    }

    async fn remove(
        &self,
        kind: ToggleKind,
        user_id: Uuid,
        recipe_id: i32,
    ) -> Result<bool, ApiError> {
        let result = match kind {
            ToggleKind::Favorite => favorites::Entity::delete_many()
                .filter(favorites::Column::UserId.eq(user_id))
                .filter(favorites::Column::RecipeId.eq(recipe_id))
                .exec(&self.db)
                .await
                .context("delete favorite")?,
            ToggleKind::ShoppingCart => purchases::Entity::delete_many()
                .filter(purchases::Column::UserId.eq(user_id))
                .filter(purchases::Column::RecipeId.eq(recipe_id))
                .exec(&self.db)
                .await
                .context("delete purchase")?,
        };
        Ok(result.rows_affected > 0)
    }

    async fn aggregate_cart(&self, user_id: Uuid) -> Result<Vec<CartRow>, ApiError> {
        let rows = recipe_ingredients::Entity::find()
            .select_only()
            .column(ingredients::Column::Name)
            .column(ingredients::Column::MeasurementUnit)
            .column_as(
                Expr::col((
                    recipe_ingredients::Entity,
                    recipe_ingredients::Column::Amount,
                ))
                .sum(),
                "amount",
            )
            .join(
                JoinType::InnerJoin,
                recipe_ingredients::Relation::Ingredient.def(),
            )
            .filter(
                recipe_ingredients::Column::RecipeId
                    .in_subquery(toggle_subquery(ToggleKind::ShoppingCart, user_id)),
            )
            .group_by(ingredients::Column::Name)
            .group_by(ingredients::Column::MeasurementUnit)
            .order_by_asc(ingredients::Column::Name)
            .order_by_asc(ingredients::Column::MeasurementUnit)
            .into_model::<CartQueryRow>()
            .all(&self.db)
            .await
            .context("aggregate shopping cart")?;
        Ok(rows
            .into_iter()
            .map(|row| CartRow {
                name: row.name,
                measurement_unit: row.measurement_unit,
                amount: row.amount,
            })
            .collect())
    }
}
