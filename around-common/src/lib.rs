pub mod model;
pub mod spam;
