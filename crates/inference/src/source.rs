use {
    crate::InferError,
    memmap2::Mmap,
    std::{fs::File, ops::Deref, path::PathBuf},
};

pub enum ModelSource {
    File(PathBuf),
    Memory(Vec<u8>),
}

impl ModelSource {
    /// Artifact name used in logs.
    pub fn name(&self) -> String {
        match self {
            ModelSource::File(path) => path.display().to_string(),
            ModelSource::Memory(bytes) => format!("<memory:{} bytes>", bytes.len()),
        }
    }

    /// Make the model bytes available, memory-mapping files.
    pub fn open(self) -> Result<ModelBytes, InferError> {
        match self {
            ModelSource::File(path) => {
                let file = File::open(&path)
                    .map_err(|e| InferError::Io(format!("{}: {e}", path.display())))?;
                // SAFETY: the model file is treated as read-only for the lifetime of the map
                let map = unsafe { Mmap::map(&file) }
                    .map_err(|e| InferError::Io(format!("{}: {e}", path.display())))?;
                if map.is_empty() {
                    return Err(InferError::ModelLoad(format!(
                        "{} is empty",
                        path.display()
                    )));
                }
                Ok(ModelBytes::Mapped(map))
            }
            ModelSource::Memory(bytes) => {
                if bytes.is_empty() {
                    return Err(InferError::ModelLoad("model buffer is empty".to_string()));
                }
                Ok(ModelBytes::Owned(bytes))
            }
        }
    }
}

pub enum ModelBytes {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl Deref for ModelBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            ModelBytes::Mapped(map) => map,
            ModelBytes::Owned(bytes) => bytes,
        }
    }
}
