//! Tubely Database Library
//!
//! Access to the video metadata store. The upload pipeline talks to it only
//! through the [`VideoRepository`] trait.

pub mod db;

pub use db::video::{PgVideoRepository, VideoRepository};
