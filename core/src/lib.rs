pub mod bmi;
pub mod coach;
pub mod food;
pub mod gallery;
pub mod goals;
pub mod grid;
pub mod models;
pub mod photo;
pub mod service;
pub mod store;
