//! Route handlers organized by resource

pub mod artists;
pub mod categories;
pub mod drinks;
pub mod health;
pub mod home;
pub mod questions;
pub mod quizzes;
pub mod shows;
pub mod venues;
