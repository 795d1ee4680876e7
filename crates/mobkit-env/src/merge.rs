//! Layering overrides on top of the inherited process environment.
//!
//! Entries are handled as raw [`OsStr`]s so inherited variables that are not
//! valid UTF-8 reach child processes byte-for-byte.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};

use mobkit_targets::HostOs;

/// Split `entry` at the first `=`, rejecting entries with an empty key.
fn split_entry(entry: &OsStr) -> Option<(&OsStr, &OsStr)> {
    let bytes = entry.as_encoded_bytes();
    let eq = bytes.iter().position(|&b| b == b'=')?;
    if eq == 0 {
        return None;
    }
    // SAFETY: `=` is ASCII, so both halves are valid encoded bytes.
    let (key, value) = unsafe {
        (
            OsStr::from_encoded_bytes_unchecked(&bytes[..eq]),
            OsStr::from_encoded_bytes_unchecked(&bytes[eq + 1..]),
        )
    };
    Some((key, value))
}

fn normalize_key(host: HostOs, key: &OsStr) -> OsString {
    if !host.case_insensitive_env() {
        return key.to_os_string();
    }
    match key.to_str() {
        Some(key) => key.to_uppercase().into(),
        None => key.to_ascii_uppercase(),
    }
}

fn join_entry(key: &OsStr, value: &OsStr) -> OsString {
    let mut entry = OsString::with_capacity(key.len() + value.len() + 1);
    entry.push(key);
    entry.push("=");
    entry.push(value);
    entry
}

/// Merge `overrides` into `inherited`, both as `KEY=VALUE` entries.
///
/// Inherited entries without a key (Windows has `=C:=C:\` style entries) are
/// passed through untouched. On hosts with case-insensitive variable names
/// every key is uppercased, so `path=x` and `PATH=y` collide. Overrides win
/// on collision. The order of the result is unspecified.
///
/// # Panics
///
/// Panics if an override lacks `=` or has an empty key.
pub fn merge_with<I, O>(host: HostOs, inherited: I, overrides: O) -> Vec<OsString>
where
    I: IntoIterator,
    I::Item: AsRef<OsStr>,
    O: IntoIterator,
    O::Item: AsRef<OsStr>,
{
    let mut merged = Vec::new();
    let mut vars = BTreeMap::new();

    for entry in inherited {
        let entry = entry.as_ref();
        match split_entry(entry) {
            Some((key, value)) => {
                vars.insert(normalize_key(host, key), value.to_os_string());
            }
            None => merged.push(entry.to_os_string()),
        }
    }

    for entry in overrides {
        let entry = entry.as_ref();
        let Some((key, value)) = split_entry(entry) else {
            panic!("malformed env var {entry:?} from input");
        };
        vars.insert(normalize_key(host, key), value.to_os_string());
    }

    merged.extend(vars.iter().map(|(k, v)| join_entry(k, v)));
    merged
}

/// The current process environment with `overrides` applied.
///
/// # Panics
///
/// Panics on a malformed override, as [`merge_with`] does.
pub fn environ<O>(overrides: O) -> Vec<OsString>
where
    O: IntoIterator,
    O::Item: AsRef<OsStr>,
{
    let inherited = std::env::vars_os().map(|(k, v)| join_entry(&k, &v));
    merge_with(HostOs::current(), inherited, overrides)
}

/// Value of the first `key=` entry in `env`, or `""` if there is none.
///
/// An absent key and a key set to the empty string look the same.
pub fn lookup<'a, S: AsRef<OsStr>>(env: &'a [S], key: &str) -> &'a OsStr {
    env.iter()
        .filter_map(|entry| split_entry(entry.as_ref()))
        .find_map(|(k, v)| (k == key).then_some(v))
        .unwrap_or_else(|| OsStr::new(""))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn as_set(env: &[OsString]) -> BTreeSet<&OsStr> {
        env.iter().map(OsString::as_os_str).collect()
    }

    fn set_of<'a>(entries: &[&'a str]) -> BTreeSet<&'a OsStr> {
        entries.iter().map(|entry| OsStr::new(*entry)).collect()
    }

    #[test]
    fn override_wins() {
        let merged = merge_with(HostOs::Linux, ["A=1", "B=2"], ["A=2"]);
        assert!(merged.contains(&OsString::from("A=2")));
        assert!(!merged.contains(&OsString::from("A=1")));
        assert_eq!(lookup(&merged, "B"), "2");
    }

    #[test]
    fn merge_is_idempotent() {
        let host = ["HOME=/home/dev", "PATH=/usr/bin", "CC=gcc"];
        let overrides = ["CC=clang", "TARGET_OS=ios", "CFLAGS=-arch arm64"];
        let once = merge_with(HostOs::Linux, host, overrides);
        let twice = merge_with(HostOs::Linux, &once, overrides);
        assert_eq!(as_set(&once), as_set(&twice));
    }

    #[test]
    fn windows_keys_fold_case() {
        let merged = merge_with(HostOs::Windows, ["path=x"], ["PATH=y"]);
        assert_eq!(as_set(&merged), set_of(&["PATH=y"]));

        let merged = merge_with(HostOs::Windows, ["PATH=x"], ["Path=y"]);
        assert_eq!(as_set(&merged), set_of(&["PATH=y"]));
    }

    #[test]
    fn unix_keys_keep_case() {
        let merged = merge_with(HostOs::Linux, ["path=x"], ["PATH=y"]);
        assert_eq!(as_set(&merged), set_of(&["path=x", "PATH=y"]));
    }

    #[test]
    fn unusual_inherited_entries_pass_through() {
        let merged = merge_with(HostOs::Windows, ["=C:=C:\\work", "NOEQUALS", "X=1"], ["Y=2"]);
        assert!(merged.contains(&OsString::from("=C:=C:\\work")));
        assert!(merged.contains(&OsString::from("NOEQUALS")));
        assert_eq!(lookup(&merged, "X"), "1");
        assert_eq!(lookup(&merged, "Y"), "2");
    }

    #[test]
    fn value_keeps_later_equals_signs() {
        let merged = merge_with(HostOs::Linux, Vec::<String>::new(), ["CFLAGS=-isysroot=iphoneos"]);
        assert_eq!(lookup(&merged, "CFLAGS"), "-isysroot=iphoneos");
    }

    #[test]
    #[should_panic(expected = "malformed env var")]
    fn override_without_equals_panics() {
        merge_with(HostOs::Linux, ["A=1"], ["BROKEN"]);
    }

    #[test]
    #[should_panic(expected = "malformed env var")]
    fn override_with_empty_key_panics() {
        merge_with(HostOs::Linux, ["A=1"], ["=value"]);
    }

    #[test]
    fn lookup_returns_merged_value() {
        let overrides = ["TARGET_OS=android", "TARGET_ARCH=arm", "TARGET_ARCH=arm64"];
        let merged = merge_with(HostOs::Linux, ["TARGET_ARCH=x86"], overrides);
        assert_eq!(lookup(&merged, "TARGET_ARCH"), "arm64");
        assert_eq!(lookup(&merged, "TARGET_OS"), "android");
    }

    #[test]
    fn lookup_matches_whole_key() {
        let env = ["CCACHE=1", "CC=clang"];
        assert_eq!(lookup(&env, "CC"), "clang");
        assert_eq!(lookup(&env, "MISSING"), "");
        assert_eq!(lookup(&["EMPTY="], "EMPTY"), "");
    }

    #[test]
    fn environ_inherits_process() {
        let merged = environ(["MOBKIT_TEST_OVERRIDE=on"]);
        assert_eq!(lookup(&merged, "MOBKIT_TEST_OVERRIDE"), "on");
        assert!(merged.len() > 1);
    }

    #[cfg(unix)]
    #[test]
    fn environ_keeps_non_utf8_bytes() {
        use std::os::unix::ffi::{OsStrExt, OsStringExt};

        let raw = OsString::from_vec(vec![b'a', 0xff, b'b']);
        std::env::set_var("MOBKIT_TEST_RAW_BYTES", &raw);
        let merged = environ(["MOBKIT_TEST_OVERRIDE=on"]);
        std::env::remove_var("MOBKIT_TEST_RAW_BYTES");

        assert_eq!(lookup(&merged, "MOBKIT_TEST_RAW_BYTES").as_bytes(), [b'a', 0xff, b'b']);
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_keys_stay_distinct() {
        use std::os::unix::ffi::OsStringExt;

        let first = OsString::from_vec(b"K\xfe=1".to_vec());
        let second = OsString::from_vec(b"K\xff=2".to_vec());
        let merged = merge_with(HostOs::Linux, [&first, &second], ["X=3"]);
        assert!(merged.contains(&first));
        assert!(merged.contains(&second));
        assert_eq!(merged.len(), 3);
    }
}
