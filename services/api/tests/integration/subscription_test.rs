use std::collections::HashSet;

use foodgram_api::error::ApiError;
use foodgram_api::usecase::subscription::{
    ListSubscriptionsUseCase, SubscribeUseCase, UnsubscribeUseCase,
};
use foodgram_domain::pagination::PageRequest;

use crate::helpers::{MemoryDb, line, seed_recipe};

fn subscribe_usecase(db: &MemoryDb) -> SubscribeUseCase<MemoryDb, MemoryDb, MemoryDb> {
    SubscribeUseCase {
        users: db.clone(),
        subscriptions: db.clone(),
        recipes: db.clone(),
    }
}

// ── SubscribeUseCase ─────────────────────────────────────────────────────────

#[tokio::test]
async fn should_truncate_recipes_but_count_all() {
    let db = MemoryDb::new();
    let reader = db.seed_user("reader");
    let author = db.seed_user("author");
    let tag = db.seed_tag("Lunch", "#49B64E", "lunch");
    let salt = db.seed_ingredient("Salt", "g");
    for i in 0..5 {
        seed_recipe(&db, &author, &format!("Dish {i}"), &[&tag], vec![line(&salt, 1)]).await;
    }

    let entry = subscribe_usecase(&db)
        .execute(reader.id, author.id, Some(2))
        .await
        .unwrap();

    assert_eq!(entry.profile.id, author.id);
    assert!(entry.profile.is_subscribed);
    assert_eq!(entry.recipes.len(), 2);
    assert_eq!(entry.recipes_count, 5);
    assert_eq!(entry.recipes[0].name, "Dish 4");
}

#[tokio::test]
async fn should_reject_self_subscription() {
    let db = MemoryDb::new();
    let user = db.seed_user("lonely");

    let result = subscribe_usecase(&db).execute(user.id, user.id, None).await;
    assert!(matches!(result, Err(ApiError::SelfSubscription)));
    assert!(db.with(|t| t.subscriptions.is_empty()));
}

#[tokio::test]
async fn should_reject_duplicate_subscription() {
    let db = MemoryDb::new();
    let reader = db.seed_user("reader");
    let author = db.seed_user("author");
    let usecase = subscribe_usecase(&db);

    usecase.execute(reader.id, author.id, None).await.unwrap();
    let again = usecase.execute(reader.id, author.id, None).await;
    assert!(matches!(again, Err(ApiError::AlreadySubscribed)));
    assert_eq!(db.with(|t| t.subscriptions.len()), 1);
}

#[tokio::test]
async fn should_reject_unknown_author() {
    let db = MemoryDb::new();
    let reader = db.seed_user("reader");

    let result = subscribe_usecase(&db)
        .execute(reader.id, uuid::Uuid::now_v7(), None)
        .await;
    assert!(matches!(result, Err(ApiError::UserNotFound)));
}

// ── UnsubscribeUseCase ───────────────────────────────────────────────────────

#[tokio::test]
async fn should_unsubscribe_once() {
    let db = MemoryDb::new();
    let reader = db.seed_user("reader");
    let author = db.seed_user("author");
    db.with(|t| t.subscriptions.push((reader.id, author.id)));
    let usecase = UnsubscribeUseCase {
        subscriptions: db.clone(),
    };

    usecase.execute(reader.id, author.id).await.unwrap();
    let again = usecase.execute(reader.id, author.id).await;
    assert!(matches!(again, Err(ApiError::NotSubscribed)));
}

// ── ListSubscriptionsUseCase ─────────────────────────────────────────────────

#[tokio::test]
async fn should_list_only_own_subscriptions() {
    let db = MemoryDb::new();
    let reader = db.seed_user("reader");
    let other = db.seed_user("other");
    let first = db.seed_user("first");
    let second = db.seed_user("second");
    db.with(|t| {
        t.subscriptions.push((reader.id, first.id));
        t.subscriptions.push((reader.id, second.id));
        t.subscriptions.push((other.id, first.id));
    });

    let usecase = ListSubscriptionsUseCase {
        subscriptions: db.clone(),
        recipes: db.clone(),
    };
    let page = usecase
        .execute(reader.id, None, PageRequest::default())
        .await
        .unwrap();

    assert_eq!(page.count, 2);
    let ids: HashSet<_> = page.results.iter().map(|a| a.profile.id).collect();
    assert_eq!(ids, HashSet::from([first.id, second.id]));
    assert!(page.results.iter().all(|a| a.profile.is_subscribed));
}
