pub mod html;
pub mod url;

pub use html::RecipeExtractor;
