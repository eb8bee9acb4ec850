pub mod auth;
pub mod entries;
pub mod glossaries;
pub mod images;
