use foodgram_api::usecase::cart::DownloadShoppingCartUseCase;

use crate::helpers::{MemoryDb, line, seed_recipe};

#[tokio::test]
async fn should_sum_amounts_across_recipes() {
    let db = MemoryDb::new();
    let chef = db.seed_user("chef");
    let shopper = db.seed_user("shopper");
    let lunch = db.seed_tag("Lunch", "#49B64E", "lunch");
    let salt = db.seed_ingredient("Salt", "g");
    let sugar = db.seed_ingredient("Sugar", "g");
    let first = seed_recipe(&db, &chef, "Soup", &[&lunch], vec![line(&salt, 5)]).await;
    let second = seed_recipe(
        &db,
        &chef,
        "Pie",
        &[&lunch],
        vec![line(&salt, 3), line(&sugar, 120)],
    )
    .await;
    let ignored = seed_recipe(&db, &chef, "Stew", &[&lunch], vec![line(&salt, 50)]).await;
    db.with(|t| {
        t.purchases.push((shopper.id, first));
        t.purchases.push((shopper.id, second));
        t.purchases.push((chef.id, ignored));
    });

    let csv = DownloadShoppingCartUseCase {
        engagements: db.clone(),
    }
    .execute(shopper.id)
    .await
    .unwrap();

    assert_eq!(
        csv,
        "ingredient;measurement_unit;amount\nSalt;g;8\nSugar;g;120\n"
    );
}

#[tokio::test]
async fn should_return_header_only_for_empty_cart() {
    let db = MemoryDb::new();
    let shopper = db.seed_user("shopper");

    let csv = DownloadShoppingCartUseCase {
        engagements: db.clone(),
    }
    .execute(shopper.id)
    .await
    .unwrap();

    assert_eq!(csv, "ingredient;measurement_unit;amount\n");
}
