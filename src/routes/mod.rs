pub mod health;
pub mod metrics;
pub mod ratings;
pub mod sessions;

#[cfg(test)]
mod tests;
