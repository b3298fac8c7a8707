//! Data models for the application

mod video;

pub use video::{Video, VideoResponse};
