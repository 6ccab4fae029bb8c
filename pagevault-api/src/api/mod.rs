pub mod bookmark;
pub mod configs;
pub mod errors;
pub mod fairings;
pub mod guards;
pub mod tag;
