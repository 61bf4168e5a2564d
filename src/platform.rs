// vidsearch platform paths
//
// - Linux and other Unix: $XDG_CONFIG_HOME/vidsearch, $XDG_DATA_HOME/vidsearch
//   (falling back to ~/.config and ~/.local/share)
// - macOS: ~/Library/Application Support/VidSearch for both
// - Windows: %APPDATA%/VidSearch for both

use std::env;
use std::path::PathBuf;

/// Returns the platform-specific configuration directory.
pub fn get_config_dir() -> PathBuf {
    config_dir_with(|name| env::var(name).ok())
}

/// Returns the platform-specific data directory.
pub fn get_data_dir() -> PathBuf {
    data_dir_with(|name| env::var(name).ok())
}

#[cfg_attr(windows, allow(dead_code))]
fn home(lookup: &impl Fn(&str) -> Option<String>) -> PathBuf {
    PathBuf::from(lookup("HOME").unwrap_or_else(|| String::from("/tmp")))
}

#[cfg(target_os = "macos")]
fn config_dir_with(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    home(&lookup)
        .join("Library")
        .join("Application Support")
        .join("VidSearch")
}

#[cfg(target_os = "macos")]
fn data_dir_with(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    config_dir_with(lookup)
}

#[cfg(windows)]
fn config_dir_with(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    let appdata = lookup("APPDATA")
        .unwrap_or_else(|| String::from("C:\\Users\\Default\\AppData\\Roaming"));
    PathBuf::from(appdata).join("VidSearch")
}

#[cfg(windows)]
fn data_dir_with(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    config_dir_with(lookup)
}

#[cfg(not(any(target_os = "macos", windows)))]
fn config_dir_with(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    match lookup("XDG_CONFIG_HOME") {
        Some(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("vidsearch"),
        _ => home(&lookup).join(".config").join("vidsearch"),
    }
}

#[cfg(not(any(target_os = "macos", windows)))]
fn data_dir_with(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    match lookup("XDG_DATA_HOME") {
        Some(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("vidsearch"),
        _ => home(&lookup).join(".local").join("share").join("vidsearch"),
    }
}
