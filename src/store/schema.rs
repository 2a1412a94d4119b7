//! Arrow schemas of the sample and event part files, and conversion between
//! record batches and model records.
//!
//! | Table | Column | Type |
//! |-------|--------|------|
//! | samples | roast_id | Utf8 |
//! | samples | time_s | Float64 |
//! | samples | primary_temp | Float64 (nullable) |
//! | samples | secondary_temp | Float64 (nullable) |
//! | samples | ambient_temp | Float64 (nullable) |
//! | samples | provenance | Utf8 |
//! | samples | quality | Utf8 |
//! | events | roast_id | Utf8 |
//! | events | time_s | Float64 |
//! | events | type_code | Int32 |
//! | events | value | Utf8 (nullable) |
//! | events | channel | Utf8 |
//! | events | category | Utf8 |
//! | events | subcategory | Utf8 (nullable) |
//! | events | user_generated | Boolean |
//! | events | automatic | Boolean |
//! | events | provenance | Utf8 |

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BooleanArray, BooleanBuilder, Float64Array, Float64Builder, Int32Array,
    Int32Builder, StringArray, StringBuilder,
};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;

use crate::model::{Event, RoastId, TemperatureSample};

use super::StoreError;

/// Column names of the samples table
pub mod sample_columns {
    pub const ROAST_ID: &str = "roast_id";
    pub const TIME_S: &str = "time_s";
    pub const PRIMARY: &str = "primary_temp";
    pub const SECONDARY: &str = "secondary_temp";
    pub const AMBIENT: &str = "ambient_temp";
    pub const PROVENANCE: &str = "provenance";
    pub const QUALITY: &str = "quality";
}

/// Column names of the events table
pub mod event_columns {
    pub const ROAST_ID: &str = "roast_id";
    pub const TIME_S: &str = "time_s";
    pub const TYPE_CODE: &str = "type_code";
    pub const VALUE: &str = "value";
    pub const CHANNEL: &str = "channel";
    pub const CATEGORY: &str = "category";
    pub const SUBCATEGORY: &str = "subcategory";
    pub const USER_GENERATED: &str = "user_generated";
    pub const AUTOMATIC: &str = "automatic";
    pub const PROVENANCE: &str = "provenance";
}

/// Schema of the samples table
pub fn sample_schema() -> SchemaRef {
    use sample_columns::*;
    Arc::new(Schema::new(vec![
        Field::new(ROAST_ID, DataType::Utf8, false),
        Field::new(TIME_S, DataType::Float64, false),
        Field::new(PRIMARY, DataType::Float64, true),
        Field::new(SECONDARY, DataType::Float64, true),
        Field::new(AMBIENT, DataType::Float64, true),
        Field::new(PROVENANCE, DataType::Utf8, false),
        Field::new(QUALITY, DataType::Utf8, false),
    ]))
}

/// Schema of the events table
pub fn event_schema() -> SchemaRef {
    use event_columns::*;
    Arc::new(Schema::new(vec![
        Field::new(ROAST_ID, DataType::Utf8, false),
        Field::new(TIME_S, DataType::Float64, false),
        Field::new(TYPE_CODE, DataType::Int32, false),
        Field::new(VALUE, DataType::Utf8, true),
        Field::new(CHANNEL, DataType::Utf8, false),
        Field::new(CATEGORY, DataType::Utf8, false),
        Field::new(SUBCATEGORY, DataType::Utf8, true),
        Field::new(USER_GENERATED, DataType::Boolean, false),
        Field::new(AUTOMATIC, DataType::Boolean, false),
        Field::new(PROVENANCE, DataType::Utf8, false),
    ]))
}

/// Build a record batch from samples
pub fn samples_to_batch(samples: &[TemperatureSample]) -> Result<RecordBatch, StoreError> {
    let n = samples.len();
    let mut roast_id = StringBuilder::with_capacity(n, n * 16);
    let mut time = Float64Builder::with_capacity(n);
    let mut primary = Float64Builder::with_capacity(n);
    let mut secondary = Float64Builder::with_capacity(n);
    let mut ambient = Float64Builder::with_capacity(n);
    let mut provenance = StringBuilder::with_capacity(n, n * 8);
    let mut quality = StringBuilder::with_capacity(n, n * 8);

    for sample in samples {
        roast_id.append_value(sample.roast_id.as_str());
        time.append_value(sample.time_s);
        primary.append_option(sample.primary);
        secondary.append_option(sample.secondary);
        ambient.append_option(sample.ambient);
        provenance.append_value(sample.provenance.as_str());
        quality.append_value(sample.quality.as_str());
    }

    let arrays: Vec<ArrayRef> = vec![
        Arc::new(roast_id.finish()),
        Arc::new(time.finish()),
        Arc::new(primary.finish()),
        Arc::new(secondary.finish()),
        Arc::new(ambient.finish()),
        Arc::new(provenance.finish()),
        Arc::new(quality.finish()),
    ];
    Ok(RecordBatch::try_new(sample_schema(), arrays)?)
}

/// Build a record batch from events
pub fn events_to_batch(events: &[Event]) -> Result<RecordBatch, StoreError> {
    let n = events.len();
    let mut roast_id = StringBuilder::with_capacity(n, n * 16);
    let mut time = Float64Builder::with_capacity(n);
    let mut type_code = Int32Builder::with_capacity(n);
    let mut value = StringBuilder::with_capacity(n, n * 4);
    let mut channel = StringBuilder::with_capacity(n, n * 8);
    let mut category = StringBuilder::with_capacity(n, n * 8);
    let mut subcategory = StringBuilder::with_capacity(n, n * 8);
    let mut user_generated = BooleanBuilder::with_capacity(n);
    let mut automatic = BooleanBuilder::with_capacity(n);
    let mut provenance = StringBuilder::with_capacity(n, n * 8);

    for event in events {
        roast_id.append_value(event.roast_id.as_str());
        time.append_value(event.time_s);
        type_code.append_value(event.type_code);
        value.append_option(event.value.as_deref());
        channel.append_value(&event.channel);
        category.append_value(event.category.as_str());
        subcategory.append_option(event.subcategory.as_deref());
        user_generated.append_value(event.user_generated);
        automatic.append_value(event.automatic);
        provenance.append_value(event.provenance.as_str());
    }

    let arrays: Vec<ArrayRef> = vec![
        Arc::new(roast_id.finish()),
        Arc::new(time.finish()),
        Arc::new(type_code.finish()),
        Arc::new(value.finish()),
        Arc::new(channel.finish()),
        Arc::new(category.finish()),
        Arc::new(subcategory.finish()),
        Arc::new(user_generated.finish()),
        Arc::new(automatic.finish()),
        Arc::new(provenance.finish()),
    ];
    Ok(RecordBatch::try_new(event_schema(), arrays)?)
}

/// Read samples back out of a record batch
pub fn batch_to_samples(batch: &RecordBatch) -> Result<Vec<TemperatureSample>, StoreError> {
    use sample_columns::*;
    let roast_id = string_column(batch, ROAST_ID)?;
    let time = float64_column(batch, TIME_S)?;
    let primary = float64_column(batch, PRIMARY)?;
    let secondary = float64_column(batch, SECONDARY)?;
    let ambient = float64_column(batch, AMBIENT)?;
    let provenance = string_column(batch, PROVENANCE)?;
    let quality = string_column(batch, QUALITY)?;

    (0..batch.num_rows())
        .map(|i| {
            Ok(TemperatureSample {
                roast_id: RoastId::new(roast_id.value(i))?,
                time_s: time.value(i),
                primary: optional_f64(primary, i),
                secondary: optional_f64(secondary, i),
                ambient: optional_f64(ambient, i),
                provenance: provenance.value(i).parse()?,
                quality: quality.value(i).parse()?,
            })
        })
        .collect()
}

/// Read events back out of a record batch
pub fn batch_to_events(batch: &RecordBatch) -> Result<Vec<Event>, StoreError> {
    use event_columns::*;
    let roast_id = string_column(batch, ROAST_ID)?;
    let time = float64_column(batch, TIME_S)?;
    let type_code = int32_column(batch, TYPE_CODE)?;
    let value = string_column(batch, VALUE)?;
    let channel = string_column(batch, CHANNEL)?;
    let category = string_column(batch, CATEGORY)?;
    let subcategory = string_column(batch, SUBCATEGORY)?;
    let user_generated = boolean_column(batch, USER_GENERATED)?;
    let automatic = boolean_column(batch, AUTOMATIC)?;
    let provenance = string_column(batch, PROVENANCE)?;

    (0..batch.num_rows())
        .map(|i| {
            Ok(Event {
                roast_id: RoastId::new(roast_id.value(i))?,
                time_s: time.value(i),
                type_code: type_code.value(i),
                value: optional_string(value, i),
                channel: channel.value(i).to_string(),
                category: category.value(i).parse()?,
                subcategory: optional_string(subcategory, i),
                user_generated: user_generated.value(i),
                automatic: automatic.value(i),
                provenance: provenance.value(i).parse()?,
            })
        })
        .collect()
}

fn column<'a, T: 'static>(batch: &'a RecordBatch, name: &str, type_name: &str) -> Result<&'a T, StoreError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| StoreError::ColumnNotFound(name.to_string()))?
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| StoreError::InvalidFormat(format!("{} is not {}", name, type_name)))
}

/// Get a required String column by name.
pub(super) fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray, StoreError> {
    column(batch, name, "Utf8")
}

/// Get a required Float64 column by name.
pub(super) fn float64_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Float64Array, StoreError> {
    column(batch, name, "Float64")
}

fn int32_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Int32Array, StoreError> {
    column(batch, name, "Int32")
}

fn boolean_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a BooleanArray, StoreError> {
    column(batch, name, "Boolean")
}

fn optional_f64(array: &Float64Array, idx: usize) -> Option<f64> {
    if array.is_null(idx) {
        None
    } else {
        Some(array.value(idx))
    }
}

fn optional_string(array: &StringArray, idx: usize) -> Option<String> {
    if array.is_null(idx) {
        None
    } else {
        Some(array.value(idx).to_string())
    }
}
