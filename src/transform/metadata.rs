use serde_json::{Map, Value};

use crate::document::{
    self, AMBIENT, BEANS, CUPPING_NOTES, ROASTER_TYPE, ROASTING_NOTES, TITLE, WEIGHT,
};
use crate::model::{RoastMetadata, TemperatureUnit, WeightTriple};

use super::samples::normalize;

/// Descriptive fields of the document; malformed fields are left unset.
pub(crate) fn extract_metadata(
    doc: &Map<String, Value>,
    unit: TemperatureUnit,
    precision: u32,
) -> RoastMetadata {
    RoastMetadata {
        title: document::text(doc, TITLE),
        device: document::text(doc, ROASTER_TYPE),
        source_unit: unit,
        weight: weight(doc),
        beans: document::text(doc, BEANS),
        roasting_notes: document::text(doc, ROASTING_NOTES),
        cupping_notes: document::text(doc, CUPPING_NOTES),
        ambient_temperature: doc
            .get(AMBIENT)
            .and_then(document::finite)
            .map(|t| normalize(t, unit, precision)),
    }
}

fn weight(doc: &Map<String, Value>) -> Option<WeightTriple> {
    match document::array(doc, WEIGHT)?.as_slice() {
        [weight_in, weight_out, unit] => Some(WeightTriple {
            weight_in: document::finite(weight_in)?,
            weight_out: document::finite(weight_out)?,
            unit: unit.as_str()?.trim().to_string(),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_metadata() {
        let doc = json!({
            "title": " Kenya AA ",
            "roastertype": "Aillio Bullet R1",
            "weight": [250.0, 212.5, "g"],
            "beans": "Kenya Nyeri AA",
            "roastingnotes": "",
            "cuppingnotes": "blackcurrant",
            "ambientTemp": 68.0,
        });
        let meta = extract_metadata(doc.as_object().unwrap(), TemperatureUnit::Fahrenheit, 1);
        assert_eq!(meta.title.as_deref(), Some("Kenya AA"));
        assert_eq!(meta.device.as_deref(), Some("Aillio Bullet R1"));
        assert_eq!(meta.roasting_notes, None);
        assert_eq!(meta.ambient_temperature, Some(20.0));
        assert_eq!(meta.source_unit, TemperatureUnit::Fahrenheit);
        let w = meta.weight.unwrap();
        assert_eq!(w.unit, "g");
        assert!((w.loss_pct().unwrap() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_weight_ignored() {
        let doc = json!({"weight": [250.0, "g"]});
        assert_eq!(extract_metadata(doc.as_object().unwrap(), TemperatureUnit::Celsius, 1).weight, None);
    }
}
