/// Random lowercase alphanumeric string, usable as a tag name.
pub fn rand_str(length: usize) -> String {
    use rand::distr::Alphanumeric;
    use rand::Rng;

    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rand_str() {
        let s1 = rand_str(10);
        assert_eq!(s1.len(), 10);
        assert_eq!(s1, s1.to_lowercase());
        let s2 = rand_str(10);
        assert_ne!(s1, s2)
    }
}
