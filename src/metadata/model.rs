use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Bytes per encoding step. Must stay a multiple of 3 so only the final
/// chunk can produce padding.
const DATA_URI_CHUNK: usize = 3 * 4096;

/// Tag fields read from one audio source. Built once, never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub year: Option<u32>,
    pub genres: Vec<String>,
    pub track_number: Option<u32>,
    pub track_total: Option<u32>,
    pub cover: Option<CoverImage>,
}

/// First embedded picture of a track.
#[derive(Clone, PartialEq, Eq)]
pub struct CoverImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl CoverImage {
    /// `data:` URI for the picture, encoded chunk by chunk.
    pub fn data_uri(&self) -> String {
        let prefix = format!("data:{};base64,", self.mime_type);
        let mut out = String::with_capacity(prefix.len() + self.data.len().div_ceil(3) * 4);
        out.push_str(&prefix);
        for chunk in self.data.chunks(DATA_URI_CHUNK) {
            STANDARD.encode_string(chunk, &mut out);
        }
        out
    }
}

impl std::fmt::Debug for CoverImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoverImage")
            .field("mime_type", &self.mime_type)
            .field("len", &self.data.len())
            .finish()
    }
}
