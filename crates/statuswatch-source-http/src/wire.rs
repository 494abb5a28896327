//! Wire types for the resource-graph query response.
//!
//! The feed nests everything under `properties` with PascalCase keys and
//! omits fields freely, so every field defaults; one sparse row must not
//! sink the whole batch.

use serde::Deserialize;

use statuswatch_core::event::{HealthEvent, ServiceImpact};

#[derive(Debug, Deserialize)]
pub struct QueryResponse {
  #[serde(default)]
  pub data: Vec<EventRow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EventRow {
  pub id:         String,
  pub properties: RowProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RowProperties {
  pub tracking_id:      Option<String>,
  pub event_type:       String,
  pub status:           String,
  pub title:            String,
  pub summary:          String,
  pub level:            String,
  pub last_update_time: String,
  pub impact:           Vec<RawImpact>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RawImpact {
  pub impacted_service: String,
  pub impacted_regions: Vec<RawRegion>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RawRegion {
  pub impacted_region: String,
}

impl From<EventRow> for HealthEvent {
  fn from(row: EventRow) -> Self {
    let properties = row.properties;
    HealthEvent {
      id:                row.id,
      tracking_id:       properties.tracking_id,
      event_type:        properties.event_type.as_str().into(),
      status:            properties.status.as_str().into(),
      title:             properties.title,
      summary:           properties.summary,
      level:             properties.level,
      impacted_services: properties.impact.into_iter().map(Into::into).collect(),
      last_update_time:  properties.last_update_time,
    }
  }
}

impl From<RawImpact> for ServiceImpact {
  fn from(raw: RawImpact) -> Self {
    ServiceImpact {
      service: raw.impacted_service,
      regions: raw
        .impacted_regions
        .into_iter()
        .map(|region| region.impacted_region)
        .collect(),
    }
  }
}

#[cfg(test)]
mod tests {
  use statuswatch_core::event::{EventStatus, EventType};

  use super::*;

  #[test]
  fn rows_map_to_events() {
    let response: QueryResponse = serde_json::from_str(
      r#"{
        "totalRecords": 1,
        "data": [
          {
            "id": "/subscriptions/s/providers/Microsoft.ResourceHealth/events/E1",
            "properties": {
              "TrackingId": "E1",
              "EventType": "ServiceIssue",
              "Status": "Active",
              "Title": "Storage latency in West Europe",
              "Summary": "Customers may see elevated latency.",
              "Level": "Warning",
              "LastUpdateTime": "2024-05-01T10:00:00Z",
              "Impact": [
                {
                  "ImpactedService": "Storage",
                  "ImpactedRegions": [
                    { "ImpactedRegion": "West Europe" },
                    { "ImpactedRegion": "North Europe" }
                  ]
                }
              ]
            }
          }
        ]
      }"#,
    )
    .unwrap();

    let events: Vec<HealthEvent> =
      response.data.into_iter().map(Into::into).collect();
    assert_eq!(events.len(), 1);

    let event = &events[0];
    assert_eq!(event.identity_key(), Some("E1"));
    assert_eq!(event.event_type, EventType::ServiceIssue);
    assert_eq!(event.status, EventStatus::Active);
    assert_eq!(event.level, "Warning");
    assert_eq!(event.impacted_services[0].service, "Storage");
    assert_eq!(event.impacted_services[0].regions, vec![
      "West Europe",
      "North Europe"
    ]);
    assert_eq!(event.last_update_time, "2024-05-01T10:00:00Z");
  }

  #[test]
  fn unknown_values_survive_the_mapping() {
    let row: EventRow = serde_json::from_str(
      r#"{
        "id": "/events/E2",
        "properties": {
          "EventType": "HealthAdvisory",
          "Status": "Mitigated",
          "LastUpdateTime": "2024-05-01T10:00:00Z"
        }
      }"#,
    )
    .unwrap();

    let event = HealthEvent::from(row);
    assert_eq!(event.event_type, EventType::Other("HealthAdvisory".to_owned()));
    assert_eq!(event.status, EventStatus::Other("Mitigated".to_owned()));
    assert!(!event.is_active());
  }

  #[test]
  fn sparse_rows_fall_back_to_defaults() {
    let response: QueryResponse =
      serde_json::from_str(r#"{ "data": [ { "id": "/events/E3" }, {} ] }"#).unwrap();

    let events: Vec<HealthEvent> =
      response.data.into_iter().map(Into::into).collect();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].identity_key(), Some("/events/E3"));
    // A fully empty row has no key at all and carries defaults everywhere.
    assert_eq!(events[1].identity_key(), None);
    assert_eq!(events[1].last_update_time, "");

    let empty: QueryResponse = serde_json::from_str("{}").unwrap();
    assert!(empty.data.is_empty());
  }
}
