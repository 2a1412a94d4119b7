use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use arrow::array::BooleanArray;
use arrow::compute::filter_record_batch;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use log::{debug, info};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use tempfile::NamedTempFile;

use crate::model::{Event, Provenance, RoastId, TemperatureSample};

use super::schema::{
    batch_to_events, batch_to_samples, events_to_batch, samples_to_batch, string_column,
};
use super::{
    sort_by_time, DeletedRows, EventFilter, ImportAuditEntry, RoastSummary, StoreConfig,
    StoreError, TelemetryStore,
};

const ROASTS_DIR: &str = "roasts";
const SAMPLES_DIR: &str = "samples";
const EVENTS_DIR: &str = "events";
const SUMMARY_FILE: &str = "summary.json";
const AUDIT_FILE: &str = "imports.jsonl";
const PART_PREFIX: &str = "part-";
const PART_SUFFIX: &str = ".parquet";
const PROVENANCE_COLUMN: &str = "provenance";

/// Directory-bundle store of immutable Parquet part files.
///
/// Inserts append to the newest part of a roast's table until it holds
/// `row_group_size` rows, then start a new part, so frequent small live
/// appends do not accumulate as tiny files. A provenance delete rewrites only
/// the parts that contain matching rows and removes parts left empty. Files
/// are written to a temporary name and renamed into place, so readers never
/// observe a partial part.
#[derive(Debug)]
pub struct ParquetStore {
    root: PathBuf,
    config: StoreConfig,
    write_lock: Mutex<()>,
}

impl ParquetStore {
    /// Open (creating if needed) a store rooted at `root`
    pub fn open<P: AsRef<Path>>(root: P, config: StoreConfig) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join(ROASTS_DIR))?;
        info!("Opened Parquet store at {}", root.display());
        Ok(Self {
            root,
            config,
            write_lock: Mutex::new(()),
        })
    }

    /// Store root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn roast_dir(&self, roast_id: &RoastId) -> PathBuf {
        self.root.join(ROASTS_DIR).join(roast_id.as_str())
    }

    fn write_part(&self, dir: &Path, batch: &RecordBatch) -> Result<PathBuf, StoreError> {
        fs::create_dir_all(dir)?;
        let parts = list_parts(dir)?;

        let limit = self.config.row_group_size.max(1);
        if let Some(last) = parts.last() {
            let rows = part_rows(last)?;
            if rows < limit && rows + batch.num_rows() <= limit {
                let mut batches = read_part(last)?;
                batches.push(batch.clone());
                let merged = concat(&batch.schema(), &batches)?;
                self.write_atomic(last, &merged)?;
                return Ok(last.clone());
            }
        }

        let next = parts
            .iter()
            .filter_map(|path| part_number(path))
            .max()
            .map_or(1, |n| n + 1);
        let path = dir.join(format!("{}{:06}{}", PART_PREFIX, next, PART_SUFFIX));
        self.write_atomic(&path, batch)?;
        Ok(path)
    }

    fn write_atomic(&self, path: &Path, batch: &RecordBatch) -> Result<(), StoreError> {
        let dir = path
            .parent()
            .ok_or_else(|| StoreError::InvalidFormat(format!("{} has no parent", path.display())))?;
        let tmp = NamedTempFile::new_in(dir)?;
        let mut writer = ArrowWriter::try_new(
            tmp.as_file().try_clone()?,
            batch.schema(),
            Some(self.config.to_writer_properties()),
        )?;
        writer.write(batch)?;
        writer.close()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn insert<T>(
        &self,
        records: &[T],
        table: &str,
        roast_of: impl Fn(&T) -> &RoastId,
        to_batch: impl Fn(&[T]) -> Result<RecordBatch, StoreError>,
    ) -> Result<usize, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }
        let _guard = self.write_lock.lock()?;

        let mut start = 0;
        while start < records.len() {
            let roast_id = roast_of(&records[start]);
            let end = records[start..]
                .iter()
                .position(|r| roast_of(r) != roast_id)
                .map_or(records.len(), |offset| start + offset);

            let batch = to_batch(&records[start..end])?;
            let path = self.write_part(&self.roast_dir(roast_id).join(table), &batch)?;
            debug!("Wrote {} {} rows to {}", end - start, table, path.display());
            start = end;
        }
        Ok(records.len())
    }

    fn delete_from(&self, dir: &Path, provenance: Provenance) -> Result<usize, StoreError> {
        let mut removed = 0;
        for part in list_parts(dir)? {
            let batches = read_part(&part)?;
            let Some(schema) = batches.first().map(RecordBatch::schema) else {
                continue;
            };

            let mut kept = Vec::with_capacity(batches.len());
            let mut part_removed = 0;
            for batch in &batches {
                let tags = string_column(batch, PROVENANCE_COLUMN)?;
                let mask: BooleanArray = (0..batch.num_rows())
                    .map(|i| Some(tags.value(i) != provenance.as_str()))
                    .collect();
                let filtered = filter_record_batch(batch, &mask)?;
                part_removed += batch.num_rows() - filtered.num_rows();
                kept.push(filtered);
            }

            if part_removed == 0 {
                continue;
            }
            removed += part_removed;
            let remaining = concat(&schema, &kept)?;
            if remaining.num_rows() == 0 {
                fs::remove_file(&part)?;
                debug!("Removed {}", part.display());
            } else {
                self.write_atomic(&part, &remaining)?;
                debug!("Rewrote {} ({} rows removed)", part.display(), part_removed);
            }
        }
        Ok(removed)
    }

    fn read_table<T>(
        &self,
        roast_id: &RoastId,
        table: &str,
        from_batch: impl Fn(&RecordBatch) -> Result<Vec<T>, StoreError>,
    ) -> Result<Vec<T>, StoreError> {
        let dir = self.roast_dir(roast_id).join(table);
        let mut records = Vec::new();
        for part in list_parts(&dir)? {
            for batch in read_part(&part)? {
                records.extend(from_batch(&batch)?);
            }
        }
        Ok(records)
    }
}

impl TelemetryStore for ParquetStore {
    fn insert_samples(&self, samples: &[TemperatureSample]) -> Result<usize, StoreError> {
        self.insert(samples, SAMPLES_DIR, |s| &s.roast_id, samples_to_batch)
    }

    fn insert_events(&self, events: &[Event]) -> Result<usize, StoreError> {
        self.insert(events, EVENTS_DIR, |e| &e.roast_id, events_to_batch)
    }

    fn delete_by_provenance(
        &self,
        roast_id: &RoastId,
        provenance: Provenance,
    ) -> Result<DeletedRows, StoreError> {
        let _guard = self.write_lock.lock()?;
        let dir = self.roast_dir(roast_id);
        let deleted = DeletedRows {
            samples: self.delete_from(&dir.join(SAMPLES_DIR), provenance)?,
            events: self.delete_from(&dir.join(EVENTS_DIR), provenance)?,
        };
        debug!(
            "Deleted {} samples and {} events of {} with provenance {}",
            deleted.samples, deleted.events, roast_id, provenance
        );
        Ok(deleted)
    }

    fn samples(&self, roast_id: &RoastId) -> Result<Vec<TemperatureSample>, StoreError> {
        let mut samples = self.read_table(roast_id, SAMPLES_DIR, batch_to_samples)?;
        sort_by_time(&mut samples, |s| s.time_s);
        Ok(samples)
    }

    fn events(&self, roast_id: &RoastId, filter: EventFilter) -> Result<Vec<Event>, StoreError> {
        let mut events = self.read_table(roast_id, EVENTS_DIR, batch_to_events)?;
        events.retain(|e| filter.matches(e));
        sort_by_time(&mut events, |e| e.time_s);
        Ok(events)
    }

    fn upsert_summary(&self, summary: &RoastSummary) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock()?;
        let dir = self.roast_dir(&summary.roast_id);
        fs::create_dir_all(&dir)?;
        let mut tmp = NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(&mut tmp, summary)?;
        tmp.flush()?;
        tmp.persist(dir.join(SUMMARY_FILE)).map_err(|e| e.error)?;
        Ok(())
    }

    fn summary(&self, roast_id: &RoastId) -> Result<Option<RoastSummary>, StoreError> {
        let path = self.roast_dir(roast_id).join(SUMMARY_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let file = File::open(path)?;
        Ok(Some(serde_json::from_reader(BufReader::new(file))?))
    }

    fn append_audit(&self, entry: &ImportAuditEntry) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.root.join(AUDIT_FILE))?;
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    fn audit_log(&self, roast_id: Option<&RoastId>) -> Result<Vec<ImportAuditEntry>, StoreError> {
        let path = self.root.join(AUDIT_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for line in BufReader::new(File::open(path)?).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry: ImportAuditEntry = serde_json::from_str(&line)?;
            if roast_id.map_or(true, |id| &entry.roast_id == id) {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    fn roast_ids(&self) -> Result<Vec<RoastId>, StoreError> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(self.root.join(ROASTS_DIR))? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let Ok(id) = RoastId::new(name) else {
                continue;
            };
            let has_rows = [SAMPLES_DIR, EVENTS_DIR]
                .iter()
                .map(|table| list_parts(&entry.path().join(table)))
                .collect::<Result<Vec<_>, _>>()?
                .iter()
                .any(|parts| !parts.is_empty());
            if has_rows {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }
}

/// Part files of a table directory in part-number order
fn list_parts(dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut parts: Vec<(u64, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if let Some(n) = part_number(&path) {
            parts.push((n, path));
        }
    }
    parts.sort_by_key(|(n, _)| *n);
    Ok(parts.into_iter().map(|(_, path)| path).collect())
}

fn part_number(path: &Path) -> Option<u64> {
    path.file_name()?
        .to_str()?
        .strip_prefix(PART_PREFIX)?
        .strip_suffix(PART_SUFFIX)?
        .parse()
        .ok()
}

fn read_part(path: &Path) -> Result<Vec<RecordBatch>, StoreError> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(path)?)?.build()?;
    Ok(reader.collect::<Result<Vec<_>, _>>()?)
}

fn part_rows(path: &Path) -> Result<usize, StoreError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(path)?)?;
    let rows = builder.metadata().file_metadata().num_rows();
    Ok(usize::try_from(rows).unwrap_or(usize::MAX))
}

fn concat(schema: &SchemaRef, batches: &[RecordBatch]) -> Result<RecordBatch, StoreError> {
    Ok(arrow::compute::concat_batches(schema, batches)?)
}
