use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::errors::{MythError, Result};

/// Reads files referenced by a document, relative to the document's
/// directory.
pub struct FileAssetReader {
    root_path: PathBuf,
}

impl FileAssetReader {
    /// `path` may be the document itself or the directory holding it.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let root_path = if path.is_file() {
            path.parent().unwrap_or(Path::new(".")).to_path_buf()
        } else {
            path.to_path_buf()
        };
        Self { root_path }
    }

    #[inline]
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Reads `uri`. Data URIs are decoded in place; anything else is a path
    /// relative to the root.
    pub fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        if let Some(data) = decode_data_uri(uri) {
            return data;
        }
        let path = self.root_path.join(uri);
        std::fs::read(&path).map_err(|e| {
            MythError::Decode(format!("Failed to read {}: {e}", path.display()))
        })
    }
}

/// Decodes a `data:<mime>;base64,<payload>` URI.
///
/// Returns `None` when `uri` is not a data URI at all.
fn decode_data_uri(uri: &str) -> Option<Result<Vec<u8>>> {
    let rest = uri.strip_prefix("data:")?;
    let Some((header, payload)) = rest.split_once(',') else {
        return Some(Err(MythError::decode("Malformed data URI")));
    };
    if !header.ends_with(";base64") {
        return Some(Err(MythError::decode(format!(
            "Unsupported data URI encoding: {header}"
        ))));
    }
    Some(STANDARD.decode(payload).map_err(MythError::from))
}

/// Loads the bytes of every buffer of `gltf`, in buffer index order.
///
/// A buffer shorter than its declared `byteLength` is a decode error.
pub fn load_buffers(gltf: &gltf::Gltf, reader: &FileAssetReader) -> Result<Vec<Vec<u8>>> {
    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        let data = match buffer.source() {
            gltf::buffer::Source::Bin => gltf
                .blob
                .clone()
                .ok_or_else(|| MythError::decode("Missing GLB binary chunk"))?,
            gltf::buffer::Source::Uri(uri) => reader.read_bytes(uri)?,
        };

        if data.len() < buffer.length() {
            return Err(MythError::decode(format!(
                "Buffer {} holds {} bytes but declares {}",
                buffer.index(),
                data.len(),
                buffer.length()
            )));
        }
        buffer_data.push(data);
    }
    Ok(buffer_data)
}

/// Checks that every accessor's bytes lie inside its buffer view, and every
/// view inside its buffer, so later reads never run past the data.
pub fn validate_accessors(gltf: &gltf::Gltf, buffers: &[Vec<u8>]) -> Result<()> {
    for view in gltf.views() {
        let available = buffers.get(view.buffer().index()).map_or(0, Vec::len);
        if view.offset() + view.length() > available {
            return Err(MythError::decode(format!(
                "Buffer view {} runs past the end of buffer {}",
                view.index(),
                view.buffer().index()
            )));
        }
    }

    for accessor in gltf.accessors() {
        let Some(view) = accessor.view() else {
            continue;
        };
        if accessor.count() == 0 {
            continue;
        }
        let element = accessor.size();
        let stride = view.stride().unwrap_or(element);
        let end = accessor.offset() + stride * (accessor.count() - 1) + element;
        if end > view.length() {
            return Err(MythError::decode(format!(
                "Accessor {} reads {} bytes from a {}-byte buffer view",
                accessor.index(),
                end,
                view.length()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_round_trip() {
        let uri = format!("data:application/octet-stream;base64,{}", STANDARD.encode([1u8, 2, 3]));
        let reader = FileAssetReader::new(".");
        assert_eq!(reader.read_bytes(&uri).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn non_base64_data_uri_is_rejected() {
        let reader = FileAssetReader::new(".");
        let err = reader.read_bytes("data:text/plain,hello").unwrap_err();
        assert!(err.is_decode_failure());
    }
}
