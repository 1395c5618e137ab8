use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// The special section merged as an underlay beneath every other section.
/// Matched case-sensitively, as the uppercase literal.
pub const DEFAULT_SECTION: &str = "DEFAULT";

// Interpolation may chain (a references b references c), but cycles must not spin.
const MAX_INTERPOLATION_DEPTH: usize = 10;

/// A configuration file that is present but malformed.
/// Always fatal: malformed config must not be silently swallowed.
#[derive(Debug, Error, PartialEq, Eq)]
pub struct ConfigSyntaxError {
    pub path: PathBuf,
    pub line: Option<usize>,
    pub reason: String,
}

impl std::fmt::Display for ConfigSyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(
                f,
                "config syntax error in {} (line {line}): {reason}",
                self.path.display(),
                reason = self.reason
            ),
            None => write!(
                f,
                "config syntax error in {}: {reason}",
                self.path.display(),
                reason = self.reason
            ),
        }
    }
}

impl ConfigSyntaxError {
    fn new(path: &Path, line: Option<usize>, reason: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            line,
            reason: reason.into(),
        }
    }
}

/// One parsed configuration file: an ordered sequence of sections, each an
/// ordered mapping of key to raw (un-interpolated) string.
#[derive(Debug, PartialEq, Eq)]
pub struct ConfigSource {
    path: PathBuf,
    sections: Vec<(String, Vec<(String, String)>)>,
}

/// The view of one section with the `DEFAULT` underlay applied and all
/// `%(name)s` placeholders expanded.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct MergedSection {
    pub(crate) section: String,
    /// Interpolated key/value entries, in underlay-then-section order.
    pub(crate) entries: Vec<(String, String)>,
    /// Keys referenced by a placeholder somewhere in this merged section.
    /// Referenced-but-undeclared keys are substitution fodder, not settings.
    pub(crate) interpolation_keys: HashSet<String>,
}

impl MergedSection {
    pub(crate) fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl ConfigSource {
    /// Read and parse one configuration file.
    pub fn read(path: impl Into<PathBuf>) -> Result<Self, ConfigSyntaxError> {
        let path = path.into();
        let text = std::fs::read_to_string(&path)
            .map_err(|e| ConfigSyntaxError::new(&path, None, e.to_string()))?;
        Self::parse(path, &text)
    }

    /// Parse configuration file text.
    ///
    /// Syntax: `[section]` headers, `key = value` or `key: value` pairs,
    /// `#`/`;` comments, indented continuation lines extending the previous
    /// value. Section and key names are case-sensitive.
    pub fn parse(path: impl Into<PathBuf>, text: &str) -> Result<Self, ConfigSyntaxError> {
        let path = path.into();
        let mut sections: Vec<(String, Vec<(String, String)>)> = Vec::default();
        // Index of the section/key the next continuation line would extend.
        let mut open_key: Option<(usize, usize)> = None;

        for (index, raw_line) in text.lines().enumerate() {
            let number = index + 1;
            let line = raw_line.trim_end();
            let trimmed = line.trim_start();

            if trimmed.is_empty() {
                open_key = None;
                continue;
            }

            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            if line.starts_with(char::is_whitespace) {
                // Continuation of the previous value.
                match open_key {
                    Some((s, k)) => {
                        let value = &mut sections[s].1[k].1;
                        value.push(' ');
                        value.push_str(trimmed);
                        continue;
                    }
                    None => {
                        return Err(ConfigSyntaxError::new(
                            &path,
                            Some(number),
                            "continuation line without a preceding entry",
                        ));
                    }
                }
            }

            if let Some(rest) = line.strip_prefix('[') {
                match rest.split_once(']') {
                    Some((name, trailer)) if trailer.trim().is_empty() => {
                        sections.push((name.to_string(), Vec::default()));
                        open_key = None;
                        continue;
                    }
                    _ => {
                        return Err(ConfigSyntaxError::new(
                            &path,
                            Some(number),
                            "malformed section header",
                        ));
                    }
                }
            }

            let split = line
                .char_indices()
                .find(|(_, c)| *c == '=' || *c == ':')
                .map(|(i, _)| i);

            match split {
                Some(at) => {
                    let key = line[..at].trim().to_string();
                    let value = strip_inline_comment(&line[at + 1..]).trim().to_string();

                    if key.is_empty() {
                        return Err(ConfigSyntaxError::new(
                            &path,
                            Some(number),
                            "entry with an empty key",
                        ));
                    }

                    if sections.is_empty() {
                        return Err(ConfigSyntaxError::new(
                            &path,
                            Some(number),
                            "entry before any section header",
                        ));
                    }

                    let section = sections.len() - 1;
                    let entries = &mut sections[section].1;

                    // A repeated key within one section: the later value wins.
                    match entries.iter().position(|(k, _)| k == &key) {
                        Some(existing) => {
                            entries[existing].1 = value;
                            open_key = Some((section, existing));
                        }
                        None => {
                            entries.push((key, value));
                            open_key = Some((section, entries.len() - 1));
                        }
                    }
                }
                None => {
                    return Err(ConfigSyntaxError::new(
                        &path,
                        Some(number),
                        format!("unparseable line: '{line}'"),
                    ));
                }
            }
        }

        Ok(Self { path, sections })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.sections.iter().any(|(s, _)| s == name)
    }

    fn raw_merged(&self, section: &str) -> Vec<(String, String)> {
        let mut merged: Vec<(String, String)> = Vec::default();

        for name in [DEFAULT_SECTION, section] {
            for (s, entries) in &self.sections {
                if s != name {
                    continue;
                }

                for (key, value) in entries {
                    match merged.iter().position(|(k, _)| k == key) {
                        Some(existing) => merged[existing].1 = value.clone(),
                        None => merged.push((key.clone(), value.clone())),
                    }
                }
            }
        }

        merged
    }

    /// Merge the `DEFAULT` underlay beneath `section` and expand every
    /// `%(name)s` placeholder. An unresolvable reference is fatal.
    pub(crate) fn merged(&self, section: &str) -> Result<MergedSection, ConfigSyntaxError> {
        let raw = self.raw_merged(section);
        let mut entries = Vec::with_capacity(raw.len());
        let mut interpolation_keys = HashSet::default();

        for (key, value) in &raw {
            let expanded = self.expand(value, &raw, &mut interpolation_keys, 0)?;
            entries.push((key.clone(), expanded));
        }

        Ok(MergedSection {
            section: section.to_string(),
            entries,
            interpolation_keys,
        })
    }

    fn expand(
        &self,
        value: &str,
        raw: &[(String, String)],
        interpolation_keys: &mut HashSet<String>,
        depth: usize,
    ) -> Result<String, ConfigSyntaxError> {
        if depth > MAX_INTERPOLATION_DEPTH {
            return Err(ConfigSyntaxError::new(
                &self.path,
                None,
                "interpolation depth exceeded (circular reference?)",
            ));
        }

        let mut out = String::with_capacity(value.len());
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }

            match chars.next() {
                Some('%') => out.push('%'),
                Some('(') => {
                    let name: String = chars.by_ref().take_while(|c| *c != ')').collect();

                    if chars.next() != Some('s') {
                        return Err(ConfigSyntaxError::new(
                            &self.path,
                            None,
                            format!("bad interpolation placeholder for '{name}' (expected '%({name})s')"),
                        ));
                    }

                    let referenced = raw
                        .iter()
                        .find(|(k, _)| k == &name)
                        .map(|(_, v)| v.clone())
                        .ok_or_else(|| {
                            ConfigSyntaxError::new(
                                &self.path,
                                None,
                                format!("unresolvable interpolation reference '{name}'"),
                            )
                        })?;
                    interpolation_keys.insert(name);
                    out.push_str(&self.expand(&referenced, raw, interpolation_keys, depth + 1)?);
                }
                _ => {
                    return Err(ConfigSyntaxError::new(
                        &self.path,
                        None,
                        "stray '%' (use '%%' for a literal percent)",
                    ));
                }
            }
        }

        Ok(out)
    }
}

fn strip_inline_comment(value: &str) -> &str {
    let mut previous_whitespace = true;

    for (i, c) in value.char_indices() {
        if (c == '#' || c == ';') && previous_whitespace {
            return &value[..i];
        }

        previous_whitespace = c.is_whitespace();
    }

    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(text: &str) -> ConfigSource {
        ConfigSource::parse("test.conf", text).unwrap()
    }

    #[test]
    fn parse_sections_in_order() {
        let source = parse(
            "[DEFAULT]\n\
             server = liu.se\n\
             [myprog]\n\
             quiet: no\n\
             noise = 14\n",
        );

        assert!(source.has_section("DEFAULT"));
        assert!(source.has_section("myprog"));
        assert!(!source.has_section("myotherprog"));

        let merged = source.merged("myprog").unwrap();
        assert_eq!(
            merged.entries,
            vec![
                ("server".to_string(), "liu.se".to_string()),
                ("quiet".to_string(), "no".to_string()),
                ("noise".to_string(), "14".to_string()),
            ]
        );
    }

    #[test]
    fn parse_case_sensitive_sections() {
        let source = parse("[default]\nserver = liu.se\n");
        assert!(!source.has_section("DEFAULT"));
        assert!(source.has_section("default"));
    }

    #[test]
    fn parse_comments() {
        let source = parse(
            "# leading comment\n\
             [myprog]\n\
             ; another comment\n\
             quiet = no # trailing comment\n\
             tag = a#b\n",
        );

        let merged = source.merged("myprog").unwrap();
        assert_eq!(merged.get("quiet"), Some("no"));
        // A hash without preceding whitespace is part of the value.
        assert_eq!(merged.get("tag"), Some("a#b"));
    }

    #[test]
    fn parse_continuation() {
        let source = parse(
            "[myprog]\n\
             greeting = hello\n\
             \t there\n",
        );

        let merged = source.merged("myprog").unwrap();
        assert_eq!(merged.get("greeting"), Some("hello there"));
    }

    #[test]
    fn parse_repeated_key_later_wins() {
        let source = parse(
            "[myprog]\n\
             noise = 1\n\
             noise = 2\n",
        );

        let merged = source.merged("myprog").unwrap();
        assert_eq!(merged.get("noise"), Some("2"));
    }

    #[test]
    fn parse_continuation_after_repeated_key() {
        let source = parse(
            "[myprog]\n\
             greeting = hello\n\
             greeting = good\n\
             \t morning\n",
        );

        let merged = source.merged("myprog").unwrap();
        assert_eq!(merged.get("greeting"), Some("good morning"));
    }

    #[rstest]
    #[case("quiet = no\n", "before any section")]
    #[case("[myprog]\nnonsense\n", "unparseable")]
    #[case("[myprog\nquiet = no\n", "malformed section header")]
    #[case("[myprog]\n= empty\n", "empty key")]
    #[case("   indented = top\n", "continuation")]
    fn parse_syntax_errors(#[case] text: &str, #[case] fragment: &str) {
        let error = ConfigSource::parse("test.conf", text).unwrap_err();
        assert!(
            error.reason.contains(fragment),
            "'{}' does not contain '{}'",
            error.reason,
            fragment
        );
        assert!(error.line.is_some());
    }

    #[test]
    fn default_underlay() {
        let source = parse(
            "[DEFAULT]\n\
             server = liu.se\n\
             noise = 10\n\
             [myprog]\n\
             noise = 14\n",
        );

        let merged = source.merged("myprog").unwrap();
        // DEFAULT supplies keys absent from the section; same-named keys shadow.
        assert_eq!(merged.get("server"), Some("liu.se"));
        assert_eq!(merged.get("noise"), Some("14"));
    }

    #[test]
    fn default_underlay_without_section() {
        let source = parse(
            "[DEFAULT]\n\
             server = liu.se\n",
        );

        let merged = source.merged("myprog").unwrap();
        assert_eq!(merged.get("server"), Some("liu.se"));
        assert!(!source.has_section("myprog"));
    }

    #[test]
    fn interpolation() {
        let source = parse(
            "[DEFAULT]\n\
             server = liu.se\n\
             [myprog]\n\
             job-tag = %(server)s/index.html\n",
        );

        let merged = source.merged("myprog").unwrap();
        assert_eq!(merged.get("job-tag"), Some("liu.se/index.html"));
        assert!(merged.interpolation_keys.contains("server"));
    }

    #[test]
    fn interpolation_chained() {
        let source = parse(
            "[myprog]\n\
             host = liu.se\n\
             base = http://%(host)s\n\
             url = %(base)s/index.html\n",
        );

        let merged = source.merged("myprog").unwrap();
        assert_eq!(merged.get("url"), Some("http://liu.se/index.html"));
        assert!(merged.interpolation_keys.contains("host"));
        assert!(merged.interpolation_keys.contains("base"));
    }

    #[test]
    fn interpolation_literal_percent() {
        let source = parse(
            "[myprog]\n\
             rate = 5%%\n",
        );

        let merged = source.merged("myprog").unwrap();
        assert_eq!(merged.get("rate"), Some("5%"));
    }

    #[rstest]
    #[case("[myprog]\ntag = %(missing)s\n", "unresolvable")]
    #[case("[myprog]\ntag = %(server)x\n", "placeholder")]
    #[case("[myprog]\ntag = 50% off\n", "stray '%'")]
    #[case("[myprog]\na = %(b)s\nb = %(a)s\n", "depth")]
    fn interpolation_errors(#[case] text: &str, #[case] fragment: &str) {
        let source = ConfigSource::parse("test.conf", text).unwrap();
        let error = source.merged("myprog").unwrap_err();
        assert!(
            error.reason.contains(fragment),
            "'{}' does not contain '{}'",
            error.reason,
            fragment
        );
    }

    #[test]
    fn read_missing_file() {
        let error = ConfigSource::read("/no/such/config.conf").unwrap_err();
        assert_eq!(error.path, PathBuf::from("/no/such/config.conf"));
    }

    #[test]
    fn read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("myprog.conf");
        std::fs::write(&path, "[myprog]\nquiet = yes\n").unwrap();

        let source = ConfigSource::read(&path).unwrap();
        assert_eq!(source.merged("myprog").unwrap().get("quiet"), Some("yes"));
    }
}
