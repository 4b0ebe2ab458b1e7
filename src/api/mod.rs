mod image;
mod layer;
mod reference;
mod repository;

pub use self::image::Image;
pub use self::layer::Layer;
pub use self::reference::Reference;
pub use self::repository::Repository;
