use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bincode::{Decode, Encode};
use thiserror::Error;

pub const SNAPSHOT_MAGIC: [u8; 4] = *b"DASS";
pub const SNAPSHOT_VERSION: u32 = 1;
const SNAPSHOT_HEADER_LEN: usize = SNAPSHOT_MAGIC.len() + std::mem::size_of::<u32>();
const MAX_SNAPSHOT_BYTES: usize = 1 << 30;

/// Raw RGBA8 pixels, row-major, `width * height * 4` bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Bitmap {
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    fn expected_len(width: u32, height: u32) -> u64 {
        width as u64 * height as u64 * 4
    }

    fn is_consistent(&self) -> bool {
        self.pixels.len() as u64 == Self::expected_len(self.width, self.height)
    }
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
    #[error("snapshot data is malformed")]
    InvalidData,
    #[error("snapshot is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("snapshot could not be encoded: {0}")]
    Encode(#[from] bincode::error::EncodeError),
}

pub fn encode_snapshot(bitmap: &Bitmap) -> Result<String, SnapshotError> {
    let mut payload = Vec::with_capacity(SNAPSHOT_HEADER_LEN + bitmap.pixels.len());
    payload.extend_from_slice(&SNAPSHOT_MAGIC);
    payload.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());
    let body = bincode::encode_to_vec(bitmap, bincode::config::standard())?;
    payload.extend_from_slice(&body);
    Ok(STANDARD.encode(payload))
}

pub fn decode_snapshot(text: &str) -> Result<Bitmap, SnapshotError> {
    let payload = STANDARD.decode(text.trim())?;
    if !(payload.len() >= SNAPSHOT_HEADER_LEN && payload.starts_with(&SNAPSHOT_MAGIC)) {
        return Err(SnapshotError::InvalidData);
    }
    let version = u32::from_le_bytes(
        payload[SNAPSHOT_MAGIC.len()..SNAPSHOT_HEADER_LEN]
            .try_into()
            .map_err(|_| SnapshotError::InvalidData)?,
    );
    let body = &payload[SNAPSHOT_HEADER_LEN..];
    let bitmap: Bitmap = match version {
        1 => decode_bitmap(body)?,
        _ => return Err(SnapshotError::UnsupportedVersion(version)),
    };
    if !bitmap.is_consistent() {
        return Err(SnapshotError::InvalidData);
    }
    Ok(bitmap)
}

// The pixel length prefix is checked against the bytes actually present
// before bincode is allowed to allocate for it.
fn decode_bitmap(body: &[u8]) -> Result<Bitmap, SnapshotError> {
    let config = bincode::config::standard().with_limit::<MAX_SNAPSHOT_BYTES>();
    let ((width, height, declared), prefix_len): ((u32, u32, u64), usize) =
        bincode::decode_from_slice(body, config).map_err(|_| SnapshotError::InvalidData)?;
    let remaining = (body.len() - prefix_len) as u64;
    if declared != remaining || declared != Bitmap::expected_len(width, height) {
        return Err(SnapshotError::InvalidData);
    }
    bincode::decode_from_slice(body, config)
        .map(|(bitmap, _)| bitmap)
        .map_err(|_| SnapshotError::InvalidData)
}
