use chrono::{Duration, Utc};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, EntityTrait, PaginatorTrait};
use sea_orm_migration::MigratorTrait;

use foodgram_api::domain::repository::{
    EngagementRepository, IngredientRepository, RecipeRepository, TagRepository, UserRepository,
};
use foodgram_api::domain::types::{
    CartRow, Ingredient, IngredientAmount, NewIngredient, NewRecipe, NewTag, RecipeChanges,
    RecipeFilter, Tag, ToggleKind, User,
};
use foodgram_api::error::ApiError;
use foodgram_api::infra::db::{
    DbEngagementRepository, DbIngredientRepository, DbRecipeRepository, DbTagRepository,
    DbUserRepository,
};
use foodgram_api_migration::Migrator;
use foodgram_api_schema::{favorites, purchases, recipe_ingredients, recipe_tags, recipes};
use foodgram_domain::pagination::PageRequest;

use crate::helpers::test_user;

/// Fresh in-memory SQLite database with every migration applied.
///
/// One pooled connection: each SQLite `:memory:` connection is a separate database.
async fn migrated_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

struct Kitchen {
    db: DatabaseConnection,
    chef: User,
    fan: User,
    lunch: Tag,
    dinner: Tag,
    breakfast: Tag,
    salt: Ingredient,
    sugar: Ingredient,
}

impl Kitchen {
    async fn new() -> Self {
        let db = migrated_db().await;

        let users = DbUserRepository { db: db.clone() };
        let chef = test_user("chef");
        let fan = test_user("fan");
        assert!(users.create(&chef).await.unwrap());
        assert!(users.create(&fan).await.unwrap());

        let tags = DbTagRepository { db: db.clone() };
        let tag = |name: &str, color: &str, slug: &str| NewTag {
            name: name.to_owned(),
            color: color.to_owned(),
            slug: slug.to_owned(),
        };
        let lunch = tags.create(&tag("Lunch", "#49B64E", "lunch")).await.unwrap().unwrap();
        let dinner = tags.create(&tag("Dinner", "#8775D2", "dinner")).await.unwrap().unwrap();
        let breakfast = tags
            .create(&tag("Breakfast", "#E26C2D", "breakfast"))
            .await
            .unwrap()
            .unwrap();

        let ingredients = DbIngredientRepository { db: db.clone() };
        let ingredient = |name: &str| NewIngredient {
            name: name.to_owned(),
            measurement_unit: "g".to_owned(),
        };
        let salt = ingredients.create(&ingredient("Salt")).await.unwrap().unwrap();
        let sugar = ingredients.create(&ingredient("Sugar")).await.unwrap().unwrap();

        Self {
            db,
            chef,
            fan,
            lunch,
            dinner,
            breakfast,
            salt,
            sugar,
        }
    }

    fn recipes(&self) -> DbRecipeRepository {
        DbRecipeRepository {
            db: self.db.clone(),
        }
    }

    fn engagement(&self) -> DbEngagementRepository {
        DbEngagementRepository {
            db: self.db.clone(),
        }
    }

    /// Insert a recipe by `chef`, published `minutes_ago` minutes before now.
    async fn recipe(
        &self,
        name: &str,
        tags: &[&Tag],
        lines: &[(&Ingredient, i16)],
        minutes_ago: i64,
    ) -> i32 {
        self.recipes()
            .create(&NewRecipe {
                author_id: self.chef.id,
                name: name.to_owned(),
                image: format!("/media/recipes/{name}.png"),
                text: format!("How to cook {name}"),
                cooking_time: 10,
                tag_ids: tags.iter().map(|tag| tag.id).collect(),
                ingredients: lines
                    .iter()
                    .map(|(ingredient, amount)| IngredientAmount {
                        ingredient_id: ingredient.id,
                        amount: *amount,
                    })
                    .collect(),
                pub_date: Utc::now() - Duration::minutes(minutes_ago),
            })
            .await
            .unwrap()
    }

    async fn list(&self, filter: RecipeFilter) -> (u64, Vec<i32>) {
        let page = self
            .recipes()
            .list_ids(&filter, Some(self.fan.id), PageRequest::default())
            .await
            .unwrap();
        (page.count, page.results)
    }
}

fn slugs(tags: &[&str]) -> RecipeFilter {
    RecipeFilter {
        tag_slugs: tags.iter().map(|slug| (*slug).to_owned()).collect(),
        ..Default::default()
    }
}

#[tokio::test]
async fn should_cascade_recipe_delete_to_links_and_toggles() {
    let k = Kitchen::new().await;
    let soup = k
        .recipe("Soup", &[&k.lunch, &k.dinner], &[(&k.salt, 5), (&k.sugar, 1)], 0)
        .await;
    let engagement = k.engagement();
    assert!(engagement.add(ToggleKind::Favorite, k.fan.id, soup).await.unwrap());
    assert!(engagement.add(ToggleKind::ShoppingCart, k.fan.id, soup).await.unwrap());

    assert!(k.recipes().delete(soup).await.unwrap());

    assert_eq!(recipes::Entity::find().count(&k.db).await.unwrap(), 0);
    assert_eq!(recipe_tags::Entity::find().count(&k.db).await.unwrap(), 0);
    assert_eq!(recipe_ingredients::Entity::find().count(&k.db).await.unwrap(), 0);
    assert_eq!(favorites::Entity::find().count(&k.db).await.unwrap(), 0);
    assert_eq!(purchases::Entity::find().count(&k.db).await.unwrap(), 0);
    assert!(!k.recipes().delete(soup).await.unwrap());
}

#[tokio::test]
async fn should_sum_cart_amounts_across_recipes() {
    let k = Kitchen::new().await;
    let soup = k
        .recipe("Soup", &[&k.lunch], &[(&k.salt, 5), (&k.sugar, 100)], 2)
        .await;
    let stew = k
        .recipe("Stew", &[&k.dinner], &[(&k.salt, 3), (&k.sugar, 20)], 1)
        .await;
    k.recipe("Brine", &[&k.dinner], &[(&k.salt, 50)], 0).await;
    let engagement = k.engagement();
    engagement.add(ToggleKind::ShoppingCart, k.fan.id, soup).await.unwrap();
    engagement.add(ToggleKind::ShoppingCart, k.fan.id, stew).await.unwrap();

    let cart = engagement.aggregate_cart(k.fan.id).await.unwrap();
    assert_eq!(
        cart,
        vec![
            CartRow {
                name: "Salt".into(),
                measurement_unit: "g".into(),
                amount: 8,
            },
            CartRow {
                name: "Sugar".into(),
                measurement_unit: "g".into(),
                amount: 120,
            },
        ]
    );
    assert!(engagement.aggregate_cart(k.chef.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn should_match_any_of_tag_slugs_once() {
    let k = Kitchen::new().await;
    let toast = k.recipe("Toast", &[&k.lunch], &[(&k.salt, 1)], 40).await;
    let roast = k.recipe("Roast", &[&k.dinner], &[(&k.salt, 1)], 30).await;
    k.recipe("Porridge", &[&k.breakfast], &[(&k.sugar, 1)], 20).await;
    let pie = k
        .recipe("Pie", &[&k.lunch, &k.dinner], &[(&k.sugar, 1)], 10)
        .await;

    let (count, ids) = k.list(slugs(&["lunch", "dinner"])).await;
    assert_eq!(count, 3);
    assert_eq!(ids, vec![pie, roast, toast]);

    let (count, ids) = k.list(slugs(&["lunch", "unknown"])).await;
    assert_eq!(count, 2);
    assert_eq!(ids, vec![pie, toast]);
}

#[tokio::test]
async fn should_split_recipes_by_favorite_flag() {
    let k = Kitchen::new().await;
    let liked = k.recipe("Liked", &[&k.lunch], &[(&k.salt, 1)], 1).await;
    let other = k.recipe("Other", &[&k.lunch], &[(&k.salt, 1)], 0).await;
    k.engagement()
        .add(ToggleKind::Favorite, k.fan.id, liked)
        .await
        .unwrap();

    let not_favorited = RecipeFilter {
        is_favorited: Some(false),
        ..Default::default()
    };
    assert_eq!(k.list(not_favorited).await, (1, vec![other]));

    let favorited = RecipeFilter {
        is_favorited: Some(true),
        ..Default::default()
    };
    assert_eq!(k.list(favorited).await, (1, vec![liked]));

    let not_in_cart = RecipeFilter {
        is_in_shopping_cart: Some(false),
        ..Default::default()
    };
    assert_eq!(k.list(not_in_cart).await, (2, vec![other, liked]));
}

#[tokio::test]
async fn should_replace_links_on_update() {
    let k = Kitchen::new().await;
    let soup = k
        .recipe("Soup", &[&k.lunch, &k.dinner], &[(&k.salt, 5), (&k.sugar, 10)], 0)
        .await;
    let recipes = k.recipes();

    recipes
        .update(
            soup,
            &RecipeChanges {
                name: Some("Porridge".into()),
                image: None,
                text: None,
                cooking_time: None,
                tag_ids: vec![k.breakfast.id],
                ingredients: vec![IngredientAmount {
                    ingredient_id: k.sugar.id,
                    amount: 9,
                }],
            },
        )
        .await
        .unwrap();

    let detail = recipes
        .load_details(&[soup], Some(k.fan.id))
        .await
        .unwrap()
        .remove(0);
    assert_eq!(detail.name, "Porridge");
    assert_eq!(detail.image, "/media/recipes/Soup.png");
    assert_eq!(detail.tags, vec![k.breakfast.clone()]);
    let lines: Vec<(&str, i16)> = detail
        .ingredients
        .iter()
        .map(|line| (line.name.as_str(), line.amount))
        .collect();
    assert_eq!(lines, vec![("Sugar", 9)]);
    assert_eq!(recipe_tags::Entity::find().count(&k.db).await.unwrap(), 1);
    assert_eq!(recipe_ingredients::Entity::find().count(&k.db).await.unwrap(), 1);
}

#[tokio::test]
async fn should_roll_back_recipe_when_links_fail() {
    let k = Kitchen::new().await;
    k.recipe("Soup", &[&k.lunch], &[(&k.salt, 5)], 0).await;

    let result = k
        .recipes()
        .create(&NewRecipe {
            author_id: k.chef.id,
            name: "Ghost".into(),
            image: "/media/recipes/ghost.png".into(),
            text: "Never stored".into(),
            cooking_time: 5,
            tag_ids: vec![k.lunch.id],
            ingredients: vec![IngredientAmount {
                ingredient_id: 9999,
                amount: 1,
            }],
            pub_date: Utc::now(),
        })
        .await;

    assert!(matches!(result, Err(ApiError::Internal(_))));
    assert_eq!(recipes::Entity::find().count(&k.db).await.unwrap(), 1);
    assert_eq!(recipe_tags::Entity::find().count(&k.db).await.unwrap(), 1);
}

#[tokio::test]
async fn should_toggle_each_relation_once() {
    let k = Kitchen::new().await;
    let soup = k.recipe("Soup", &[&k.lunch], &[(&k.salt, 5)], 0).await;
    let engagement = k.engagement();

    for kind in [ToggleKind::Favorite, ToggleKind::ShoppingCart] {
        assert!(engagement.add(kind, k.fan.id, soup).await.unwrap());
        assert!(!engagement.add(kind, k.fan.id, soup).await.unwrap());
        assert!(engagement.remove(kind, k.fan.id, soup).await.unwrap());
        assert!(!engagement.remove(kind, k.fan.id, soup).await.unwrap());
    }
}

#[tokio::test]
async fn should_search_ingredients_by_prefix_in_any_script() {
    let k = Kitchen::new().await;
    let ingredients = DbIngredientRepository { db: k.db.clone() };
    for name in ["Соль", "Сахар", "50% cream"] {
        ingredients
            .create(&NewIngredient {
                name: name.to_owned(),
                measurement_unit: "g".to_owned(),
            })
            .await
            .unwrap()
            .unwrap();
    }
    let names = |list: Vec<Ingredient>| list.into_iter().map(|i| i.name).collect::<Vec<_>>();

    assert_eq!(names(ingredients.list(Some("соль")).await.unwrap()), vec!["Соль"]);
    assert_eq!(names(ingredients.list(Some("СА")).await.unwrap()), vec!["Сахар"]);
    assert_eq!(names(ingredients.list(Some("sa")).await.unwrap()), vec!["Salt"]);
    assert_eq!(names(ingredients.list(Some("50%")).await.unwrap()), vec!["50% cream"]);
    assert!(ingredients.list(Some("5_")).await.unwrap().is_empty());
    assert_eq!(ingredients.list(None).await.unwrap().len(), 5);
}
