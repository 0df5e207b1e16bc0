use super::CompiledIf;
use crate::error::ArtifactError;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use std::fs;

impl CompiledIf {
    pub fn to_bytes(&self) -> Result<Vec<u8>, ArtifactError> {
        Ok(encode_to_vec(self, standard())?)
    }

    /// Deserializes a compiled block from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArtifactError> {
        // bincode 2 returns a tuple (data, bytes_read)
        let (compiled, _) = decode_from_slice(bytes, standard())?;
        Ok(compiled)
    }

    /// Saves the compiled block to a file using the bincode format.
    pub fn save(&self, path: &str) -> Result<(), ArtifactError> {
        let bytes = self.to_bytes()?;
        fs::write(path, bytes).map_err(|source| ArtifactError::Io {
            path: path.to_string(),
            source,
        })?;
        log::debug!("Saved compiled condition artifact to '{}'", path);
        Ok(())
    }

    pub fn from_file(path: &str) -> Result<Self, ArtifactError> {
        let bytes = fs::read(path).map_err(|source| ArtifactError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_bytes(&bytes)
    }
}
