//! Vision model access.
//!
//! This module provides the Gemini client and the image encoding it needs.

pub mod client;
pub mod image;

pub use client::{VisionClient, VisionConfig};
pub use image::load_image_data_uri;
