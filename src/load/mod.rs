//! Locate, read and validate the configuration file

pub mod config;

use std::{
    env,
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

use crate::lib::error::Error;
use config::{Config, RawConfig};

/// Subfolder of the per-user configuration directory
const APP_DIR: &str = "invo";
/// Name of the configuration file inside `APP_DIR`
const CONFIG_FILE: &str = "config.yaml";

/// Load the configuration that applies to this run
///
/// A file in the per-user configuration directory takes precedence
/// over `fallback` (usually the `--config` flag).
pub fn read_config(fallback: &Path) -> Result<Config, Error> {
    read_file(&resolve_path(user_config_path(), fallback))
}

/// Load the configuration from exactly `path`
pub fn read_file(path: &Path) -> Result<Config, Error> {
    tracing::debug!(path = %path.display(), "reading configuration");
    let contents = fs::read_to_string(path).map_err(|e| {
        Error::new("Cannot read configuration")
            .with_text(format!("Configuration file is '{}'", path.display()))
            .with_text(e)
            .with_hint(format!(
                "pass --config or create ~/.config/{}/{}",
                APP_DIR, CONFIG_FILE
            ))
    })?;
    parse_config(&path.display().to_string(), &contents)
}

/// Deserialize and validate the contents of a configuration file
///
/// `name` only serves to locate problems in error reports.
pub fn parse_config(name: &str, contents: &str) -> Result<Config, Error> {
    let raw: RawConfig = serde_yaml::from_str(contents).map_err(|e| {
        let err = Error::new("Malformed configuration");
        let err = match e.location().and_then(|loc| span_at(contents, loc.index())) {
            Some(span) => err.with_span(&(name, span), "while reading this"),
            None => err.with_text(format!("in '{}'", name)),
        };
        err.with_text(e).with_hint("the configuration is a YAML document")
    })?;
    raw.validate().map_err(|errs| {
        errs.into_iter().fold(
            Error::new("Invalid configuration").with_text(format!("in '{}'", name)),
            |report, e| report.with_text(&e).with_hint(e.fix_hint()),
        )
    })
}

/// Single-character span at byte `idx`, if that is a character boundary
fn span_at(contents: &str, idx: usize) -> Option<pest::Span<'_>> {
    if !contents.is_char_boundary(idx) {
        return None;
    }
    let end = contents[idx..].chars().next().map_or(idx, |c| idx + c.len_utf8());
    pest::Span::new(contents, idx, end)
}

/// `$XDG_CONFIG_HOME/invo/config.yaml`, or `$HOME/.config/invo/config.yaml`
pub fn user_config_path() -> Option<PathBuf> {
    user_config_in(env::var_os("XDG_CONFIG_HOME"), env::var_os("HOME"))
}

fn user_config_in(xdg_config_home: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    let base = match xdg_config_home.filter(|dir| !dir.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from(home.filter(|dir| !dir.is_empty())?).join(".config"),
    };
    Some(base.join(APP_DIR).join(CONFIG_FILE))
}

/// Pick the per-user file if it exists and is not a directory
fn resolve_path(user: Option<PathBuf>, fallback: &Path) -> PathBuf {
    match user {
        Some(path) if path.is_file() => path,
        _ => fallback.to_path_buf(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const MINIMAL: &str = "sender: { name: Acme Services }\nbill_to: { name: Globex }\nitems:\n  - { description: Work, unit_price: 10 }\n";

    #[test]
    fn xdg_takes_precedence_over_home() {
        assert_eq!(
            user_config_in(Some("/xdg".into()), Some("/home/me".into())),
            Some(PathBuf::from("/xdg/invo/config.yaml"))
        );
        assert_eq!(
            user_config_in(Some("".into()), Some("/home/me".into())),
            Some(PathBuf::from("/home/me/.config/invo/config.yaml"))
        );
        assert_eq!(
            user_config_in(None, Some("/home/me".into())),
            Some(PathBuf::from("/home/me/.config/invo/config.yaml"))
        );
        assert_eq!(user_config_in(None, None), None);
    }

    #[test]
    fn user_file_overrides_flag() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = dir.path().join("config.yaml");
        let user = dir.path().join("invo").join("config.yaml");
        assert_eq!(resolve_path(Some(user.clone()), &fallback), fallback);
        fs::create_dir_all(&user).unwrap();
        // a directory does not count
        assert_eq!(resolve_path(Some(user.clone()), &fallback), fallback);
        fs::remove_dir(&user).unwrap();
        fs::write(&user, MINIMAL).unwrap();
        assert_eq!(resolve_path(Some(user.clone()), &fallback), user);
        assert_eq!(resolve_path(None, &fallback), fallback);
    }

    #[test]
    fn reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, MINIMAL).unwrap();
        let cfg = read_file(&path).unwrap();
        assert_eq!(cfg.sender.name, "Acme Services");
        assert_eq!(cfg.items.len(), 1);
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.yaml");
        let err = read_file(&path).unwrap_err();
        assert_eq!(err.label(), "Cannot read configuration");
        assert!(err.to_string().contains("nope.yaml"));
    }

    #[test]
    fn malformed_yaml() {
        let err = parse_config("bad.yaml", "sender: [unclosed\n").unwrap_err();
        assert_eq!(err.label(), "Malformed configuration");
        assert!(err.to_string().contains("bad.yaml"));
    }

    #[test]
    fn invalid_configuration_lists_fields() {
        let err = parse_config("empty.yaml", "project_name: x\n").unwrap_err();
        assert_eq!(err.label(), "Invalid configuration");
        let msg = err.to_string();
        assert!(msg.contains("sender name is required"));
        assert!(msg.contains("bill to name is required"));
        assert!(msg.contains("at least one item is required"));
    }
}
