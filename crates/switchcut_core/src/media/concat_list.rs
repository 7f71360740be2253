//! ffmpeg concat demuxer list files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Build list contents: one `file '<path>'` line per clip, in order.
///
/// Single quotes inside a path are written as `'\''`, which the concat
/// demuxer reads back as a literal quote.
pub fn render_concat_list(clips: &[PathBuf]) -> String {
    let mut out = String::new();
    for clip in clips {
        let path = clip.to_string_lossy().replace('\'', r"'\''");
        out.push_str("file '");
        out.push_str(&path);
        out.push_str("'\n");
    }
    out
}

/// Write the list for `clips` to `list_path`.
///
/// Relative entries would be resolved against the list's own directory,
/// so every clip path is made absolute first.
pub fn write_concat_list(list_path: &Path, clips: &[PathBuf]) -> io::Result<()> {
    let absolute = clips
        .iter()
        .map(std::path::absolute)
        .collect::<io::Result<Vec<_>>>()?;
    fs::write(list_path, render_concat_list(&absolute))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn lists_clips_in_order() {
        let clips = vec![
            PathBuf::from("/tmp/run/seg_0000.mp4"),
            PathBuf::from("/tmp/run/seg_0001.mp4"),
            PathBuf::from("/tmp/run/seg_0002.mp4"),
        ];
        let list = render_concat_list(&clips);
        let lines: Vec<&str> = list.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "file '/tmp/run/seg_0000.mp4'");
        assert_eq!(lines[2], "file '/tmp/run/seg_0002.mp4'");
    }

    #[test]
    fn escapes_single_quotes() {
        let list = render_concat_list(&[PathBuf::from("/tmp/it's/seg.mp4")]);
        assert_eq!(list, "file '/tmp/it'\\''s/seg.mp4'\n");
    }

    #[test]
    fn empty_list_is_empty() {
        assert!(render_concat_list(&[]).is_empty());
    }

    #[test]
    fn written_paths_are_absolute() {
        let dir = tempdir().unwrap();
        let list_path = dir.path().join("concat.txt");
        write_concat_list(&list_path, &[PathBuf::from("relative/seg.mp4")]).unwrap();

        let content = fs::read_to_string(&list_path).unwrap();
        let path = content
            .trim()
            .strip_prefix("file '")
            .and_then(|s| s.strip_suffix('\''))
            .unwrap();
        assert!(Path::new(path).is_absolute());
    }
}
