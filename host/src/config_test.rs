use super::*;

#[test]
fn default_config_values() {
    let config = HostConfig::default();
    assert_eq!(config.map_path, PathBuf::from("maps/session.json"));
    assert!(config.autosave);
}

#[test]
fn map_path_parses_and_trims() {
    assert_eq!(parse_map_path(Some(" maps/keep.json ")), PathBuf::from("maps/keep.json"));
    assert_eq!(parse_map_path(Some("")), PathBuf::from(DEFAULT_MAP_PATH));
    assert_eq!(parse_map_path(None), PathBuf::from(DEFAULT_MAP_PATH));
}

#[test]
fn bool_parsing_accepts_common_spellings() {
    assert!(parse_bool(Some("true"), false));
    assert!(parse_bool(Some("1"), false));
    assert!(parse_bool(Some("yes"), false));
    assert!(!parse_bool(Some("false"), true));
    assert!(!parse_bool(Some("0"), true));
    assert!(parse_bool(Some("maybe"), true));
    assert!(!parse_bool(None, false));
}
