use {
    crate::*,
    inference::ClassificationResult,
};

pub const HISTORY_CAPACITY: usize = 20;

/// Bounded, newest-first log of past classifications.
///
/// Storage is read on the first `load` and cached afterwards; every `append` and `clear`
/// writes the whole sequence back before returning. Callers serialize mutation.
pub struct HistoryStore {
    storage: Box<dyn KeyValueStore>,
    key: String,
    capacity: usize,
    cache: Option<Vec<HistoryRecord>>,
}

impl HistoryStore {
    pub fn new(storage: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            capacity: HISTORY_CAPACITY,
            cache: None,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Read the persisted sequence, bypassing the cache and reporting corrupt data.
    pub fn try_load(&self) -> Result<Vec<HistoryRecord>, HistoryError> {
        let Some(text) = self.storage.get(&self.key)? else {
            return Ok(Vec::new());
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        let mut records: Vec<HistoryRecord> = serde_json::from_str(&text)?;
        records.truncate(self.capacity);
        Ok(records)
    }

    /// Stored records, newest first. Missing or unreadable data counts as empty.
    pub fn records(&mut self) -> Vec<HistoryRecord> {
        if let Some(records) = &self.cache {
            return records.clone();
        }
        let records = match self.try_load() {
            Ok(records) => records,
            Err(error) => {
                base::log_warn!("treating history '{}' as empty: {}", self.key, error);
                Vec::new()
            }
        };
        self.cache = Some(records.clone());
        records
    }

    pub fn load(&mut self) -> Vec<ClassificationResult> {
        self.records().into_iter().map(Into::into).collect()
    }

    pub fn append(&mut self, result: &ClassificationResult) -> Result<(), HistoryError> {
        let mut records = self.records();
        records.insert(0, HistoryRecord::from(result));
        records.truncate(self.capacity);
        self.persist(records)
    }

    pub fn clear(&mut self) -> Result<(), HistoryError> {
        self.persist(Vec::new())
    }

    fn persist(&mut self, records: Vec<HistoryRecord>) -> Result<(), HistoryError> {
        let text = serde_json::to_string(&records).map_err(|e| HistoryError::Io(e.to_string()))?;
        self.storage.put(&self.key, &text)?;
        self.cache = Some(records);
        Ok(())
    }
}
