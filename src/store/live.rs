use log::debug;

use crate::model::{Event, RoastId, TemperatureSample};

use super::{EventFilter, StoreError, TelemetryStore};

/// Append-only writer for one roast's live stream.
///
/// Samples must arrive with strictly increasing time, events with
/// non-decreasing time (several events may share an instant). A call whose
/// records break that order is rejected whole and nothing is written.
pub struct LiveCapture<'a, S: TelemetryStore + ?Sized> {
    store: &'a S,
    roast_id: RoastId,
    last_sample_s: Option<f64>,
    last_event_s: Option<f64>,
    samples_written: usize,
    events_written: usize,
}

impl<'a, S: TelemetryStore + ?Sized> LiveCapture<'a, S> {
    /// Start or resume capture, continuing after the latest stored records
    pub fn open(store: &'a S, roast_id: RoastId) -> Result<Self, StoreError> {
        let last_sample_s = store.samples(&roast_id)?.last().map(|s| s.time_s);
        let last_event_s = store.events(&roast_id, EventFilter::all())?.last().map(|e| e.time_s);
        debug!(
            "Live capture for {} resumes after sample {:?}s, event {:?}s",
            roast_id, last_sample_s, last_event_s
        );
        Ok(Self {
            store,
            roast_id,
            last_sample_s,
            last_event_s,
            samples_written: 0,
            events_written: 0,
        })
    }

    /// Roast being captured
    pub fn roast_id(&self) -> &RoastId {
        &self.roast_id
    }

    /// Append samples
    pub fn append_samples(&mut self, samples: &[TemperatureSample]) -> Result<usize, StoreError> {
        let mut last = self.last_sample_s;
        for sample in samples {
            self.check_roast(&sample.roast_id)?;
            check_time("sample", &self.roast_id, sample.time_s, last, |t, prev| t > prev)?;
            last = Some(sample.time_s);
        }

        let written = self.store.insert_samples(samples)?;
        self.last_sample_s = last;
        self.samples_written += written;
        Ok(written)
    }

    /// Append events
    pub fn append_events(&mut self, events: &[Event]) -> Result<usize, StoreError> {
        let mut last = self.last_event_s;
        for event in events {
            self.check_roast(&event.roast_id)?;
            check_time("event", &self.roast_id, event.time_s, last, |t, prev| t >= prev)?;
            last = Some(event.time_s);
        }

        let written = self.store.insert_events(events)?;
        self.last_event_s = last;
        self.events_written += written;
        Ok(written)
    }

    /// Samples and events written through this writer
    pub fn written(&self) -> (usize, usize) {
        (self.samples_written, self.events_written)
    }

    fn check_roast(&self, found: &RoastId) -> Result<(), StoreError> {
        if found == &self.roast_id {
            Ok(())
        } else {
            Err(StoreError::RoastMismatch {
                expected: self.roast_id.to_string(),
                found: found.to_string(),
            })
        }
    }
}

fn check_time(
    kind: &'static str,
    roast_id: &RoastId,
    time_s: f64,
    last: Option<f64>,
    in_order: impl Fn(f64, f64) -> bool,
) -> Result<(), StoreError> {
    let ok = time_s.is_finite() && time_s >= 0.0 && last.map_or(true, |prev| in_order(time_s, prev));
    if ok {
        Ok(())
    } else {
        Err(StoreError::NonMonotonic {
            kind,
            roast_id: roast_id.to_string(),
            time_s,
            last_s: last.unwrap_or(0.0),
        })
    }
}
