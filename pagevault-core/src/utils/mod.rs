#[cfg(test)]
pub mod rand;
