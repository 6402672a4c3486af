pub mod db;
pub mod image;
pub mod password;
