//! Built-in placeholder image served when no snapshot exists yet.

/// A 16x16 blank baseline JPEG.
pub static PLACEHOLDER_JPEG: &[u8] = include_bytes!("../assets/placeholder.jpg");
