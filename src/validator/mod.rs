//! # Import Document Validation
//!
//! Structural and semantic checks over a parsed import document, run before
//! any record is transformed or written.
//!
//! ## Validation Checklist
//!
//! 1. **Required arrays**: `timex`, `temp2` and `temp1` present, arrays, non-empty
//! 2. **Consistency**: equal lengths (else truncated), numeric and finite values
//! 3. **Time axis**: non-negative and non-decreasing
//! 4. **Milestones**: 8 slots, indices inside the sample range, chronological
//! 5. **Metadata**: unit indicator, weight triple, auxiliary and special event arrays
//!
//! Failed checks make the document unimportable and each contributes its own
//! reason. Warnings never block an import.
//!
//! ## Usage
//!
//! ```rust
//! use roastline::literal::parse_document;
//! use roastline::validator::validate_document;
//!
//! let doc = parse_document("{'timex': [0, 1], 'temp2': [150, 151], 'temp1': [200]}")?;
//! let report = validate_document(&doc.value, "batch-7.alog");
//! assert!(report.is_valid());
//! assert_eq!(report.warning_count(), 1);
//! # Ok::<(), roastline::literal::FormatError>(())
//! ```

use log::{debug, warn};
use serde_json::Value;

pub use report::{CheckStatus, ValidationCheck, ValidationReport};

mod metadata;
mod milestones;
mod report;
mod structure;
mod timeline;

/// Main validation entry point
pub fn validate_document(doc: &Value, source: impl Into<String>) -> ValidationReport {
    let mut report = ValidationReport::new(source);

    let Some(fields) = doc.as_object() else {
        report.add_check(ValidationCheck::failed(
            "Document root",
            format!("expected an object, found {}", crate::document::type_name(doc)),
        ));
        return report;
    };

    // 1. Required arrays
    let all_present = structure::check_required_arrays(fields, &mut report);

    // 2. Consistency; element checks cover whichever arrays are present
    structure::check_numeric(fields, &mut report);
    if all_present {
        structure::check_lengths(fields, &mut report);
    }

    // 3. Time axis
    timeline::check_time_axis(fields, &mut report);

    // 4. Milestones need the sample range of all three arrays
    if all_present {
        milestones::check_milestones(fields, &mut report);
    }

    // 5. Metadata
    metadata::check_unit(fields, &mut report);
    metadata::check_weight(fields, &mut report);
    metadata::check_auxiliary_channels(fields, &mut report);
    metadata::check_special_events(fields, &mut report);

    for warning in report.warnings() {
        warn!("{}: {}", report.source, warning);
    }
    debug!(
        "Validated {}: {} passed, {} warnings, {} failed",
        report.source,
        report.success_count(),
        report.warning_count(),
        report.failure_count()
    );

    report
}
