pub fn rand_str(length: usize) -> String {
    use rand::distr::Alphanumeric;
    use rand::Rng;

    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}
