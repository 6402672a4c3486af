pub mod cart;
pub mod catalog;
pub mod engagement;
pub mod recipe;
pub mod subscription;
pub mod user;
