//! Sea-ORM entity definitions
//!
//! These map the editorial models to database tables.

pub mod category;
pub mod content_repository;
pub mod localisation;
pub mod post;
pub mod post_tag;
pub mod publishing_target;
pub mod related_post;
