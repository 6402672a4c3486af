use sea_orm_migration::prelude::*;

mod m20250401_000001_create_users;
mod m20250401_000002_create_subscriptions;
mod m20250401_000003_create_tags;
mod m20250401_000004_create_ingredients;
mod m20250401_000005_create_recipes;
mod m20250401_000006_create_recipe_tags;
mod m20250401_000007_create_recipe_ingredients;
mod m20250401_000008_create_favorites;
mod m20250401_000009_create_purchases;
mod m20250401_000010_add_filter_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250401_000001_create_users::Migration),
            Box::new(m20250401_000002_create_subscriptions::Migration),
            Box::new(m20250401_000003_create_tags::Migration),
            Box::new(m20250401_000004_create_ingredients::Migration),
            Box::new(m20250401_000005_create_recipes::Migration),
            Box::new(m20250401_000006_create_recipe_tags::Migration),
            Box::new(m20250401_000007_create_recipe_ingredients::Migration),
            Box::new(m20250401_000008_create_favorites::Migration),
            Box::new(m20250401_000009_create_purchases::Migration),
            Box::new(m20250401_000010_add_filter_indexes::Migration),
        ]
    }
}
