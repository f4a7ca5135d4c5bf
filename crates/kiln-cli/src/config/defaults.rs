use std::path::PathBuf;

pub fn default_root() -> PathBuf {
    PathBuf::from("dist")
}

pub fn default_host() -> String {
    "127.0.0.1".to_string()
}

pub fn default_port_start() -> u16 {
    8080
}

pub fn default_port_end() -> u16 {
    9000
}

pub fn default_debounce_ms() -> u64 {
    100
}

pub fn default_watch_ignore() -> Vec<String> {
    vec![
        "node_modules".to_string(),
        ".git".to_string(),
        ".DS_Store".to_string(),
        "~".to_string(),
        ".swp".to_string(),
    ]
}
