/// Variable lookup used by configuration loading. Production reads the
/// process environment; tests pass a closure over a fixed map.
pub(crate) type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

#[must_use]
pub(super) fn read_non_empty_env(lookup: EnvLookup<'_>, name: &str) -> Option<String> {
    lookup(name)
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[must_use]
pub(super) fn read_env_usize(
    lookup: EnvLookup<'_>,
    name: &str,
    default_value: usize,
    min_value: usize,
) -> usize {
    lookup(name)
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|value| *value >= min_value)
        .unwrap_or(default_value)
}

#[must_use]
pub(super) fn read_env_u64(lookup: EnvLookup<'_>, name: &str) -> Option<u64> {
    lookup(name).and_then(|raw| raw.trim().parse::<u64>().ok())
}
