/// SPIR-V shader loading

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Vertex shader of the skinned pipeline
pub const SKINNED_VERTEX_SHADER: &str = "skinned.vert.spv";
/// Fragment shader of the skinned pipeline
pub const SKINNED_FRAGMENT_SHADER: &str = "skinned.frag.spv";

const SPIRV_MAGIC: u32 = 0x0723_0203;

/// Convert SPIR-V bytes to words, checking size and magic number
pub fn spirv_words(bytes: &[u8]) -> Result<Vec<u32>> {
    if bytes.is_empty() || bytes.len() % 4 != 0 {
        return Err(Error::LoadFailed(format!(
            "SPIR-V size {} is not a non-zero multiple of 4",
            bytes.len()
        )));
    }
    let words: Vec<u32> = bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();
    if words[0] != SPIRV_MAGIC {
        return Err(Error::LoadFailed(format!(
            "bad SPIR-V magic number {:#010x}",
            words[0]
        )));
    }
    Ok(words)
}

/// Read a compiled SPIR-V module from disk
pub fn load_spirv(path: impl AsRef<Path>) -> Result<Vec<u32>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .map_err(|e| Error::LoadFailed(format!("{}: {}", path.display(), e)))?;
    spirv_words(&bytes).map_err(|error| match error {
        Error::LoadFailed(message) => Error::LoadFailed(format!("{}: {}", path.display(), message)),
        other => other,
    })
}

/// Paths of the skinned pipeline's shaders inside `dir`
pub fn skinned_shader_paths(dir: &Path) -> (PathBuf, PathBuf) {
    (dir.join(SKINNED_VERTEX_SHADER), dir.join(SKINNED_FRAGMENT_SHADER))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spirv_words_little_endian() {
        let bytes = [0x03, 0x02, 0x23, 0x07, 0x00, 0x00, 0x01, 0x00];
        assert_eq!(spirv_words(&bytes).unwrap(), vec![SPIRV_MAGIC, 0x0001_0000]);
    }

    #[test]
    fn test_spirv_words_rejects_bad_length() {
        assert!(matches!(spirv_words(&[]), Err(Error::LoadFailed(_))));
        assert!(matches!(spirv_words(&[0x03, 0x02, 0x23, 0x07, 0x00]), Err(Error::LoadFailed(_))));
    }

    #[test]
    fn test_spirv_words_rejects_bad_magic() {
        assert!(matches!(spirv_words(&[0, 0, 0, 0]), Err(Error::LoadFailed(_))));
    }

    #[test]
    fn test_load_spirv_missing_file() {
        let result = load_spirv("no/such/shader.spv");
        assert!(matches!(result, Err(Error::LoadFailed(message)) if message.contains("shader.spv")));
    }

    #[test]
    fn test_skinned_shader_paths() {
        let (vertex, fragment) = skinned_shader_paths(Path::new("assets/shaders"));
        assert_eq!(vertex, Path::new("assets/shaders/skinned.vert.spv"));
        assert_eq!(fragment, Path::new("assets/shaders/skinned.frag.spv"));
    }
}
