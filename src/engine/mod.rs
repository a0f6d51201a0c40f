pub mod lifecycle;
pub mod routing;
