pub mod config;
pub mod kill;
pub mod status;
pub mod watch;

/// Match a typed boss name against the configured ones, ignoring case.
///
/// Unknown names are passed through so the tracker reports them.
pub fn resolve_entity<'a>(entities: &'a [String], typed: &'a str) -> &'a str {
    entities
        .iter()
        .find(|name| name.eq_ignore_ascii_case(typed))
        .map(String::as_str)
        .unwrap_or(typed)
}

/// Convert a 1-based channel number from the user to an index.
pub fn channel_index(channel: usize) -> Result<usize, String> {
    channel
        .checked_sub(1)
        .ok_or_else(|| "channels are numbered from 1".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_lookup_ignores_case() {
        let entities = vec!["Subora".to_string(), "Nazrudin".to_string()];
        assert_eq!(resolve_entity(&entities, "subora"), "Subora");
        assert_eq!(resolve_entity(&entities, "NAZRUDIN"), "Nazrudin");
        assert_eq!(resolve_entity(&entities, "Kzarka"), "Kzarka");
    }

    #[test]
    fn channels_are_one_based() {
        assert_eq!(channel_index(1), Ok(0));
        assert_eq!(channel_index(8), Ok(7));
        assert!(channel_index(0).is_err());
    }
}
