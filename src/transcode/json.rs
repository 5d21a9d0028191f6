/// Remove insignificant whitespace from well-formed JSON text.
///
/// Pass-through blobs keep the formatting they were parsed with; this collapses them so the whole
/// document is compact. Every byte other than whitespace outside strings is kept, so numbers and
/// string escapes come out exactly as written. JSON whitespace is ASCII and never appears inside a
/// multi-byte UTF-8 sequence, so scanning bytes is safe.
pub(crate) fn compact(json: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(json.len());
    let mut in_string = false;
    let mut escaped = false;

    for &b in json {
        if in_string {
            out.push(b);
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
        } else if b == b'"' {
            in_string = true;
            out.push(b);
        } else if !matches!(b, b' ' | b'\t' | b'\n' | b'\r') {
            out.push(b);
        }
    }
    out
}
