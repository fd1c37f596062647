//! Document to JSON conversion
//!
//! Stored documents carry BSON types the JSON clients never see as such:
//! object ids are rendered as their hex string and dates as ISO 8601 UTC
//! timestamps with millisecond precision.

use bson::{Bson, Document};
use chrono::SecondsFormat;
use serde_json::{Map, Number, Value};

pub fn document_to_json(document: Document) -> Value {
    let mut map = Map::with_capacity(document.len());
    for (key, value) in document {
        map.insert(key, bson_to_json(value));
    }
    Value::Object(map)
}

pub fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Bool(b),
        Bson::Int32(i) => Value::from(i),
        Bson::Int64(i) => Value::from(i),
        Bson::Double(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        Bson::String(s) => Value::String(s),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => {
            Value::String(dt.to_chrono().to_rfc3339_opts(SecondsFormat::Millis, true))
        }
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        Bson::Document(doc) => document_to_json(doc),
        other => other.into_relaxed_extjson(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use bson::oid::ObjectId;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_object_ids_become_hex_strings() {
        let id = ObjectId::parse_str("65f1c0ffee0000000000ac3e").unwrap();
        let value = document_to_json(doc! { "_id": id, "tags": [id] });

        assert_eq!(
            value,
            json!({ "_id": "65f1c0ffee0000000000ac3e", "tags": ["65f1c0ffee0000000000ac3e"] })
        );
    }

    #[test]
    fn test_dates_become_iso_strings() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let value = document_to_json(doc! { "createdAt": bson::DateTime::from_chrono(at) });

        assert_eq!(value, json!({ "createdAt": "2024-03-01T09:30:00.000Z" }));
    }

    #[test]
    fn test_scalars_and_nesting() {
        let value = document_to_json(doc! {
            "name": "Ada",
            "age": 36,
            "score": 4.5,
            "active": true,
            "manager": null,
            "address": { "city": "Pune", "zip": 411001_i64 },
        });

        assert_eq!(
            value,
            json!({
                "name": "Ada",
                "age": 36,
                "score": 4.5,
                "active": true,
                "manager": null,
                "address": { "city": "Pune", "zip": 411001 },
            })
        );
    }

    #[test]
    fn test_nan_becomes_null() {
        assert_eq!(bson_to_json(Bson::Double(f64::NAN)), Value::Null);
    }
}
