use foodgram_api::domain::types::RecipeFilter;
use foodgram_api::error::ApiError;
use foodgram_api::usecase::recipe::{
    DeleteRecipeUseCase, GetRecipeUseCase, ListRecipesUseCase, UpdateRecipeInput,
    UpdateRecipeUseCase,
};
use foodgram_domain::pagination::PageRequest;

use crate::helpers::{
    MemoryDb, MockImageStore, PIXEL, create_usecase, create_usecase_with, line, recipe_input,
    seed_recipe,
};

fn update_usecase(db: &MemoryDb) -> UpdateRecipeUseCase<MemoryDb, MemoryDb, MemoryDb, MockImageStore> {
    update_usecase_with(db, &MockImageStore::default())
}

fn update_usecase_with(
    db: &MemoryDb,
    images: &MockImageStore,
) -> UpdateRecipeUseCase<MemoryDb, MemoryDb, MemoryDb, MockImageStore> {
    UpdateRecipeUseCase {
        recipes: db.clone(),
        tags: db.clone(),
        ingredients: db.clone(),
        images: images.clone(),
    }
}

fn list_usecase(db: &MemoryDb) -> ListRecipesUseCase<MemoryDb> {
    ListRecipesUseCase {
        recipes: db.clone(),
    }
}

// ── CreateRecipeUseCase ──────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_recipe_with_links() {
    let db = MemoryDb::new();
    let author = db.seed_user("chef");
    let lunch = db.seed_tag("Lunch", "#49B64E", "lunch");
    let salt = db.seed_ingredient("Salt", "g");
    let beet = db.seed_ingredient("Beet", "pcs");

    let detail = create_usecase(&db)
        .execute(
            author.id,
            recipe_input("Borscht", &[&lunch], vec![line(&salt, 5), line(&beet, 2)]),
        )
        .await
        .unwrap();

    assert_eq!(detail.name, "Borscht");
    assert_eq!(detail.author.id, author.id);
    assert_eq!(detail.tags, vec![lunch]);
    let lines: Vec<(&str, i16)> = detail
        .ingredients
        .iter()
        .map(|i| (i.name.as_str(), i.amount))
        .collect();
    assert_eq!(lines, vec![("Beet", 2), ("Salt", 5)]);
    assert!(detail.image.starts_with("/media/recipes/"));
    assert!(!detail.is_favorited);
    assert!(!detail.is_in_shopping_cart);
}

#[tokio::test]
async fn should_accept_minimum_cooking_time_and_reject_zero() {
    let db = MemoryDb::new();
    let author = db.seed_user("chef");
    let lunch = db.seed_tag("Lunch", "#49B64E", "lunch");
    let salt = db.seed_ingredient("Salt", "g");
    let usecase = create_usecase(&db);

    let mut input = recipe_input("Toast", &[&lunch], vec![line(&salt, 1)]);
    input.cooking_time = 0;
    let result = usecase.execute(author.id, input).await;
    assert!(matches!(
        result,
        Err(ApiError::Validation {
            field: "cooking_time",
            ..
        })
    ));
    assert!(db.with(|t| t.recipes.is_empty()));

    let mut input = recipe_input("Toast", &[&lunch], vec![line(&salt, 1)]);
    input.cooking_time = 1;
    assert_eq!(usecase.execute(author.id, input).await.unwrap().cooking_time, 1);
}

#[tokio::test]
async fn should_reject_duplicate_ingredient_lines() {
    let db = MemoryDb::new();
    let author = db.seed_user("chef");
    let lunch = db.seed_tag("Lunch", "#49B64E", "lunch");
    let salt = db.seed_ingredient("Salt", "g");

    let result = create_usecase(&db)
        .execute(
            author.id,
            recipe_input("Salty", &[&lunch], vec![line(&salt, 1), line(&salt, 2)]),
        )
        .await;
    assert!(matches!(
        result,
        Err(ApiError::Validation {
            field: "ingredients",
            ..
        })
    ));
    assert!(db.with(|t| t.recipes.is_empty()));
}

#[tokio::test]
async fn should_reject_unknown_tag() {
    let db = MemoryDb::new();
    let author = db.seed_user("chef");
    let salt = db.seed_ingredient("Salt", "g");

    let mut input = recipe_input("Mystery", &[], vec![line(&salt, 1)]);
    input.tags = vec![404];
    let result = create_usecase(&db).execute(author.id, input).await;
    assert!(matches!(
        result,
        Err(ApiError::Validation { field: "tags", .. })
    ));
}

#[tokio::test]
async fn should_reject_malformed_image() {
    let db = MemoryDb::new();
    let author = db.seed_user("chef");
    let lunch = db.seed_tag("Lunch", "#49B64E", "lunch");
    let salt = db.seed_ingredient("Salt", "g");

    let mut input = recipe_input("Pic", &[&lunch], vec![line(&salt, 1)]);
    input.image = "not an image".to_owned();
    let result = create_usecase(&db).execute(author.id, input).await;
    assert!(matches!(
        result,
        Err(ApiError::Validation { field: "image", .. })
    ));
}

#[tokio::test]
async fn should_remove_image_when_insert_fails() {
    let db = MemoryDb::new();
    let author = db.seed_user("chef");
    let lunch = db.seed_tag("Lunch", "#49B64E", "lunch");
    let salt = db.seed_ingredient("Salt", "g");
    let images = MockImageStore::default();
    db.with(|t| t.fail_recipe_writes = true);

    let result = create_usecase_with(&db, &images)
        .execute(author.id, recipe_input("Soup", &[&lunch], vec![line(&salt, 5)]))
        .await;
    assert!(matches!(result, Err(ApiError::Internal(_))));
    assert!(images.stored().is_empty());
    assert!(db.with(|t| t.recipes.is_empty()));
}

// ── UpdateRecipeUseCase ──────────────────────────────────────────────────────

#[tokio::test]
async fn should_replace_links_and_keep_omitted_fields() {
    let db = MemoryDb::new();
    let author = db.seed_user("chef");
    let lunch = db.seed_tag("Lunch", "#49B64E", "lunch");
    let dinner = db.seed_tag("Dinner", "#8775D2", "dinner");
    let salt = db.seed_ingredient("Salt", "g");
    let sugar = db.seed_ingredient("Sugar", "g");
    let id = seed_recipe(&db, &author, "Soup", &[&lunch], vec![line(&salt, 5)]).await;
    let image_before = db.with(|t| t.recipes[0].image.clone());

    let detail = update_usecase(&db)
        .execute(
            id,
            author.id,
            UpdateRecipeInput {
                name: Some("Sweet soup".to_owned()),
                image: None,
                text: None,
                cooking_time: None,
                tags: Some(vec![dinner.id]),
                ingredients: Some(vec![line(&sugar, 7)]),
            },
        )
        .await
        .unwrap();

    assert_eq!(detail.name, "Sweet soup");
    assert_eq!(detail.text, "How to cook Soup");
    assert_eq!(detail.image, image_before);
    assert_eq!(detail.tags, vec![dinner]);
    assert_eq!(detail.ingredients.len(), 1);
    assert_eq!(detail.ingredients[0].name, "Sugar");
    assert_eq!(detail.ingredients[0].amount, 7);
}

#[tokio::test]
async fn should_require_link_sets_on_update() {
    let db = MemoryDb::new();
    let author = db.seed_user("chef");
    let lunch = db.seed_tag("Lunch", "#49B64E", "lunch");
    let salt = db.seed_ingredient("Salt", "g");
    let id = seed_recipe(&db, &author, "Soup", &[&lunch], vec![line(&salt, 5)]).await;

    let result = update_usecase(&db)
        .execute(
            id,
            author.id,
            UpdateRecipeInput {
                name: Some("Renamed".to_owned()),
                image: None,
                text: None,
                cooking_time: None,
                tags: None,
                ingredients: Some(vec![line(&salt, 1)]),
            },
        )
        .await;
    assert!(matches!(
        result,
        Err(ApiError::Validation { field: "tags", .. })
    ));
    assert_eq!(db.with(|t| t.recipes[0].name.clone()), "Soup");
}

#[tokio::test]
async fn should_forbid_update_by_non_author() {
    let db = MemoryDb::new();
    let author = db.seed_user("chef");
    let stranger = db.seed_user("stranger");
    let lunch = db.seed_tag("Lunch", "#49B64E", "lunch");
    let salt = db.seed_ingredient("Salt", "g");
    let id = seed_recipe(&db, &author, "Soup", &[&lunch], vec![line(&salt, 5)]).await;

    let result = update_usecase(&db)
        .execute(
            id,
            stranger.id,
            UpdateRecipeInput {
                name: Some("Mine now".to_owned()),
                image: None,
                text: None,
                cooking_time: None,
                tags: Some(vec![lunch.id]),
                ingredients: Some(vec![line(&salt, 1)]),
            },
        )
        .await;
    assert!(matches!(result, Err(ApiError::Forbidden)));
}

#[tokio::test]
async fn should_swap_image_and_drop_the_old_file() {
    let db = MemoryDb::new();
    let author = db.seed_user("chef");
    let lunch = db.seed_tag("Lunch", "#49B64E", "lunch");
    let salt = db.seed_ingredient("Salt", "g");
    let images = MockImageStore::default();
    let id = create_usecase_with(&db, &images)
        .execute(author.id, recipe_input("Soup", &[&lunch], vec![line(&salt, 5)]))
        .await
        .unwrap()
        .id;
    let old_image = db.with(|t| t.recipes[0].image.clone());

    let detail = update_usecase_with(&db, &images)
        .execute(
            id,
            author.id,
            UpdateRecipeInput {
                name: None,
                image: Some(PIXEL.to_owned()),
                text: None,
                cooking_time: None,
                tags: Some(vec![lunch.id]),
                ingredients: Some(vec![line(&salt, 5)]),
            },
        )
        .await
        .unwrap();

    assert_ne!(detail.image, old_image);
    assert_eq!(images.stored(), vec![detail.image]);
}

#[tokio::test]
async fn should_keep_old_image_when_update_fails() {
    let db = MemoryDb::new();
    let author = db.seed_user("chef");
    let lunch = db.seed_tag("Lunch", "#49B64E", "lunch");
    let salt = db.seed_ingredient("Salt", "g");
    let images = MockImageStore::default();
    let id = create_usecase_with(&db, &images)
        .execute(author.id, recipe_input("Soup", &[&lunch], vec![line(&salt, 5)]))
        .await
        .unwrap()
        .id;
    let old_image = db.with(|t| t.recipes[0].image.clone());
    db.with(|t| t.fail_recipe_writes = true);

    let result = update_usecase_with(&db, &images)
        .execute(
            id,
            author.id,
            UpdateRecipeInput {
                name: None,
                image: Some(PIXEL.to_owned()),
                text: None,
                cooking_time: None,
                tags: Some(vec![lunch.id]),
                ingredients: Some(vec![line(&salt, 5)]),
            },
        )
        .await;

    assert!(matches!(result, Err(ApiError::Internal(_))));
    assert_eq!(images.stored(), vec![old_image]);
}

// ── DeleteRecipeUseCase ──────────────────────────────────────────────────────

#[tokio::test]
async fn should_delete_recipe_with_dependent_rows() {
    let db = MemoryDb::new();
    let author = db.seed_user("chef");
    let fan = db.seed_user("fan");
    let lunch = db.seed_tag("Lunch", "#49B64E", "lunch");
    let salt = db.seed_ingredient("Salt", "g");
    let id = seed_recipe(&db, &author, "Soup", &[&lunch], vec![line(&salt, 5)]).await;
    db.with(|t| {
        t.favorites.push((fan.id, id));
        t.purchases.push((fan.id, id));
    });
    let usecase = DeleteRecipeUseCase {
        recipes: db.clone(),
        images: MockImageStore::default(),
    };

    let forbidden = usecase.execute(id, fan.id).await;
    assert!(matches!(forbidden, Err(ApiError::Forbidden)));

    usecase.execute(id, author.id).await.unwrap();
    db.with(|t| {
        assert!(t.recipes.is_empty());
        assert!(t.recipe_tags.is_empty());
        assert!(t.recipe_ingredients.is_empty());
        assert!(t.favorites.is_empty());
        assert!(t.purchases.is_empty());
    });

    let again = usecase.execute(id, author.id).await;
    assert!(matches!(again, Err(ApiError::RecipeNotFound)));
}

#[tokio::test]
async fn should_remove_image_of_deleted_recipe() {
    let db = MemoryDb::new();
    let author = db.seed_user("chef");
    let lunch = db.seed_tag("Lunch", "#49B64E", "lunch");
    let salt = db.seed_ingredient("Salt", "g");
    let images = MockImageStore::default();
    let id = create_usecase_with(&db, &images)
        .execute(author.id, recipe_input("Soup", &[&lunch], vec![line(&salt, 5)]))
        .await
        .unwrap()
        .id;
    assert_eq!(images.stored().len(), 1);

    DeleteRecipeUseCase {
        recipes: db.clone(),
        images: images.clone(),
    }
    .execute(id, author.id)
    .await
    .unwrap();
    assert!(images.stored().is_empty());
}

// ── GetRecipeUseCase ─────────────────────────────────────────────────────────

#[tokio::test]
async fn should_resolve_viewer_flags() {
    let db = MemoryDb::new();
    let author = db.seed_user("chef");
    let fan = db.seed_user("fan");
    let lunch = db.seed_tag("Lunch", "#49B64E", "lunch");
    let salt = db.seed_ingredient("Salt", "g");
    let id = seed_recipe(&db, &author, "Soup", &[&lunch], vec![line(&salt, 5)]).await;
    db.with(|t| {
        t.favorites.push((fan.id, id));
        t.subscriptions.push((fan.id, author.id));
    });
    let usecase = GetRecipeUseCase {
        recipes: db.clone(),
    };

    let as_fan = usecase.execute(id, Some(fan.id)).await.unwrap();
    assert!(as_fan.is_favorited);
    assert!(!as_fan.is_in_shopping_cart);
    assert!(as_fan.author.is_subscribed);

    let anonymous = usecase.execute(id, None).await.unwrap();
    assert!(!anonymous.is_favorited);
    assert!(!anonymous.author.is_subscribed);

    let missing = usecase.execute(id + 100, None).await;
    assert!(matches!(missing, Err(ApiError::RecipeNotFound)));
}

// ── ListRecipesUseCase ───────────────────────────────────────────────────────

#[tokio::test]
async fn should_filter_by_any_of_tags_and_author() {
    let db = MemoryDb::new();
    let chef = db.seed_user("chef");
    let cook = db.seed_user("cook");
    let lunch = db.seed_tag("Lunch", "#49B64E", "lunch");
    let dinner = db.seed_tag("Dinner", "#8775D2", "dinner");
    let brunch = db.seed_tag("Brunch", "#E26C2D", "brunch");
    let salt = db.seed_ingredient("Salt", "g");
    seed_recipe(&db, &chef, "A", &[&lunch], vec![line(&salt, 1)]).await;
    seed_recipe(&db, &chef, "B", &[&dinner], vec![line(&salt, 1)]).await;
    seed_recipe(&db, &cook, "C", &[&lunch, &dinner], vec![line(&salt, 1)]).await;
    seed_recipe(&db, &cook, "D", &[&brunch], vec![line(&salt, 1)]).await;

    let filter = RecipeFilter {
        tag_slugs: vec!["lunch".to_owned(), "dinner".to_owned()],
        ..Default::default()
    };
    let page = list_usecase(&db)
        .execute(filter, None, PageRequest::default())
        .await
        .unwrap();
    let names: Vec<&str> = page.results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(page.count, 3);
    assert_eq!(names, vec!["C", "B", "A"]);

    let filter = RecipeFilter {
        tag_slugs: vec!["lunch".to_owned()],
        author_id: Some(cook.id),
        ..Default::default()
    };
    let page = list_usecase(&db)
        .execute(filter, None, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.count, 1);
    assert_eq!(page.results[0].name, "C");
}

#[tokio::test]
async fn should_return_empty_page_for_anonymous_relation_filter() {
    let db = MemoryDb::new();
    let chef = db.seed_user("chef");
    let lunch = db.seed_tag("Lunch", "#49B64E", "lunch");
    let salt = db.seed_ingredient("Salt", "g");
    seed_recipe(&db, &chef, "A", &[&lunch], vec![line(&salt, 1)]).await;

    let favorited = RecipeFilter {
        is_favorited: Some(true),
        ..Default::default()
    };
    let page = list_usecase(&db)
        .execute(favorited, None, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.count, 0);
    assert!(page.results.is_empty());

    let not_in_cart = RecipeFilter {
        is_in_shopping_cart: Some(false),
        ..Default::default()
    };
    let page = list_usecase(&db)
        .execute(not_in_cart, None, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.count, 1);
}

#[tokio::test]
async fn should_filter_by_viewer_relations() {
    let db = MemoryDb::new();
    let chef = db.seed_user("chef");
    let fan = db.seed_user("fan");
    let lunch = db.seed_tag("Lunch", "#49B64E", "lunch");
    let salt = db.seed_ingredient("Salt", "g");
    let liked = seed_recipe(&db, &chef, "Liked", &[&lunch], vec![line(&salt, 1)]).await;
    seed_recipe(&db, &chef, "Ignored", &[&lunch], vec![line(&salt, 1)]).await;
    db.with(|t| t.favorites.push((fan.id, liked)));

    let filter = RecipeFilter {
        is_favorited: Some(true),
        ..Default::default()
    };
    let page = list_usecase(&db)
        .execute(filter, Some(fan.id), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.count, 1);
    assert_eq!(page.results[0].id, liked);
    assert!(page.results[0].is_favorited);

    let filter = RecipeFilter {
        is_favorited: Some(false),
        ..Default::default()
    };
    let page = list_usecase(&db)
        .execute(filter, Some(fan.id), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.count, 1);
    assert_eq!(page.results[0].name, "Ignored");
}

#[tokio::test]
async fn should_paginate_newest_first() {
    let db = MemoryDb::new();
    let chef = db.seed_user("chef");
    let lunch = db.seed_tag("Lunch", "#49B64E", "lunch");
    let salt = db.seed_ingredient("Salt", "g");
    for name in ["1", "2", "3", "4", "5"] {
        seed_recipe(&db, &chef, name, &[&lunch], vec![line(&salt, 1)]).await;
    }

    let page = list_usecase(&db)
        .execute(
            RecipeFilter::default(),
            None,
            PageRequest { limit: 2, page: 2 },
        )
        .await
        .unwrap();
    assert_eq!(page.count, 5);
    let names: Vec<&str> = page.results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["3", "2"]);
}
