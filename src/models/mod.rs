pub mod overview;
pub mod rating;
pub mod session;
