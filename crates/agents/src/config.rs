//! Environment-driven configuration helpers

pub fn env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_default() {
        assert_eq!(env_or_default("KGCHAT_TEST_UNSET_VAR", "fallback"), "fallback");
        assert_eq!(env_parse::<u64>("KGCHAT_TEST_UNSET_VAR", 7), 7);
    }
}
