pub mod image_utils;
pub mod token;
