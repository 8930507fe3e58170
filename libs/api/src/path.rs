pub const FRAME: &str = "/frame";
pub const ENCODE: &str = "/encode";

/// Multipart field that carries the frame image on [`FRAME`].
pub const FRAME_FIELD: &str = "file";

pub fn file(name: &str) -> String {
    format!("/{}", name.trim_start_matches('/'))
}
