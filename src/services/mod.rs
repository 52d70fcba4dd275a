pub mod image;
pub mod token;

pub use image::ImageService;
pub use token::{Claim, TokenService};
