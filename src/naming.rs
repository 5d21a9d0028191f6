/// Suggested file name for the sticker converted from `original`.
///
/// Replaces the last extension with `tgs`. Names without an extension, and dot-files such as
/// `.anim`, keep their full name and gain the suffix.
pub fn tgs_file_name(original: &str) -> String {
    let stem = match original.rfind('.') {
        Some(i) if i > 0 => &original[..i],
        _ => original,
    };
    format!("{stem}.tgs")
}
