use {
    crate::HistoryError,
    std::{
        collections::HashMap,
        fs::{self, File},
        io::{ErrorKind, Write},
        path::{Path, PathBuf},
    },
};

/// Small string key-value storage.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, HistoryError>;
    fn put(&mut self, key: &str, value: &str) -> Result<(), HistoryError>;
}

/// One file per key under `<root>/<namespace>/<key>.json`.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(root: impl AsRef<Path>, namespace: &str) -> Result<Self, HistoryError> {
        check_name(namespace)?;
        let dir = root.as_ref().join(namespace);
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> Result<PathBuf, HistoryError> {
        check_name(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn check_name(name: &str) -> Result<(), HistoryError> {
    if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
        return Err(HistoryError::Io(format!("invalid storage name '{name}'")));
    }
    Ok(())
}

fn sync_dir(dir: &Path) -> Result<(), HistoryError> {
    #[cfg(unix)]
    File::open(dir)?.sync_all()?;
    #[cfg(not(unix))]
    let _ = dir;
    Ok(())
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, HistoryError> {
        match fs::read_to_string(self.path(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), HistoryError> {
        let path = self.path(key)?;
        let tmp_path = self.dir.join(format!(".{key}.json.tmp"));
        let mut file = File::create(&tmp_path)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp_path, &path)?;
        sync_dir(&self.dir)
    }
}

/// Process-local storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, HistoryError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), HistoryError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
