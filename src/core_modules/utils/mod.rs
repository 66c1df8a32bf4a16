pub mod image_helper;
