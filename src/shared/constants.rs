/// Multipart form field carrying the uploaded file
pub const UPLOAD_FIELD_NAME: &str = "file";

/// Longest file name accepted (common filesystem limit)
pub const MAX_FILE_NAME_BYTES: usize = 255;

/// Extra body allowance on top of the upload limit for multipart framing
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;
