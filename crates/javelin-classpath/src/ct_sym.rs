//! ct.sym release views.
//!
//! A ct.sym archive stores each API signature file under one or more
//! release-labelled directories: releases 5–9 are labelled by their digit,
//! 10 and up by the letters `A..Z`. An entry tagged for several releases
//! concatenates the labels (`89A/...`). Below the version directory sits a
//! module directory, then the class path with a `.sig` suffix.

/// The single-character label naming `release` in ct.sym directory names.
pub fn release_version_label(release: u16) -> Option<char> {
    match release {
        5..=9 => char::from_digit(release as u32, 10),
        10..=35 => Some((b'A' + (release - 10) as u8) as char),
        _ => None,
    }
}

/// Maps a ct.sym entry name to the binary class name it provides for the
/// release labelled `label`, or `None` when the entry is for other releases.
pub(crate) fn class_name_for_release(entry: &str, label: char) -> Option<String> {
    let (versions, rest) = entry.split_once('/')?;
    if !versions.contains(label) {
        return None;
    }
    let class_path = rest.split_once('/').map(|(_module, path)| path)?;
    class_path.strip_suffix(".sig").map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        assert_eq!(release_version_label(8), Some('8'));
        assert_eq!(release_version_label(9), Some('9'));
        assert_eq!(release_version_label(10), Some('A'));
        assert_eq!(release_version_label(17), Some('H'));
        assert_eq!(release_version_label(4), None);
        assert_eq!(release_version_label(40), None);
    }

    #[test]
    fn entry_selection() {
        assert_eq!(
            class_name_for_release("89A/java.base/java/lang/Object.sig", 'A'),
            Some("java/lang/Object".to_string())
        );
        assert_eq!(
            class_name_for_release("89A/java.base/java/lang/Object.sig", 'B'),
            None
        );
        assert_eq!(class_name_for_release("89A/module-info.sig", 'A'), None);
    }
}
