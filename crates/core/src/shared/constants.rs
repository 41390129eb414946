/// Incremental resolver: max cosine distance to a person's reference face.
pub const DEFAULT_TOLERANCE: f64 = 0.6;

/// Batch resolver: average-linkage cut for the initial clustering.
pub const DEFAULT_DISTANCE_THRESHOLD: f64 = 0.45;

/// Batch resolver: centroid distance below which clusters are consolidated.
pub const DEFAULT_MERGE_THRESHOLD: f64 = 0.4;

/// Faces reported with a lower detector confidence are dropped before clustering.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.9;

/// Pixels added around a face box before cropping the avatar.
pub const DEFAULT_AVATAR_PADDING: u32 = 40;

/// Well-known avatar file name inside each person's bucket.
pub const AVATAR_FILENAME: &str = "_avatar.jpg";

/// Bucket for photos without any accepted face.
pub const UNKNOWN_BUCKET: &str = "unknown";

/// Suffix of the per-photo JSON written by the embedding service.
pub const SIDECAR_SUFFIX: &str = ".faces.json";

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
