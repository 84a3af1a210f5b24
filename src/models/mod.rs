//! Data models for Bookshelf

pub mod book;
