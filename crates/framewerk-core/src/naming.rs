// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output object naming. Downstream consumers locate results by these keys, so
// the layout must not drift:
//
//   edit:   <dir>/<outputPath>/<stem>_<op1>_<op2>.jpg
//   resize: <outputPath>/<object-without-extension>_resize_w<width>.jpg

/// Extension of every encoded result.
pub const OUTPUT_EXTENSION: &str = "jpg";

/// Remove the extension from the last path component of `name`.
///
/// Dots in directory names are left alone: `v1.2/cat.png` → `v1.2/cat`.
pub fn strip_extension(name: &str) -> &str {
    let file_start = name.rfind('/').map_or(0, |pos| pos + 1);
    match name[file_start..].rfind('.') {
        Some(dot) => &name[..file_start + dot],
        None => name,
    }
}

/// Key for the result of an edit request.
///
/// `<dir>` is the parent directory of `object`, or `.` when the object sits at
/// the bucket root. Empty segments are skipped so an empty `output_path` does
/// not produce `//`.
pub fn edit_output_key<'a, I>(object: &str, output_path: &str, operations: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let stem_path = strip_extension(object);
    let (dir, stem) = match stem_path.rsplit_once('/') {
        Some((dir, stem)) => (dir, stem),
        None => (".", stem_path),
    };

    let mut file_name = String::from(stem);
    for op in operations {
        file_name.push('_');
        file_name.push_str(op);
    }
    file_name.push('.');
    file_name.push_str(OUTPUT_EXTENSION);

    join_segments(&[dir, output_path, &file_name])
}

/// Key for the result of a resize request.
pub fn resize_output_key(object: &str, output_path: &str, width: u32) -> String {
    let file_name = format!(
        "{}_resize_w{width}.{OUTPUT_EXTENSION}",
        strip_extension(object)
    );
    join_segments(&[output_path, &file_name])
}

fn join_segments(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|s| s.trim_matches('/'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
