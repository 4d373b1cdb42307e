//! Infrastructure layer: relational store and git-backed document store

pub mod database;
pub mod gitstore;
