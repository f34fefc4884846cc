use crate::core::models::criteria::FilterCriteria;
use serde::{Deserialize, Serialize};

/// Worker-local request identifier, echoed back by the owner.
pub type RequestId = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub id: RequestId,
    pub criteria: FilterCriteria,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub id: RequestId,
    pub ligands: u64,
}

/// Messages a worker writes to its stdout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum WorkerMessage {
    /// Sent once the worker is accepting external requests.
    Ready { slot: usize, pid: u32 },
    Query(QueryRequest),
}

/// Messages the owner writes to a worker's stdin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum OwnerMessage {
    Ligands(QueryResponse),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_message_is_tagged_and_flattened() {
        let message = WorkerMessage::Query(QueryRequest {
            id: 7,
            criteria: FilterCriteria::docking_domain(),
        });
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["type"], "query");
        assert_eq!(value["id"], 7);
        assert_eq!(value["criteria"]["hbd"]["ub"], 20);
    }

    #[test]
    fn ligands_message_decodes_from_wire_form() {
        let message: OwnerMessage =
            serde_json::from_value(json!({"type": "ligands", "id": 3, "ligands": 1234})).unwrap();
        assert_eq!(
            message,
            OwnerMessage::Ligands(QueryResponse {
                id: 3,
                ligands: 1234
            })
        );
    }

    #[test]
    fn ready_message_round_trips() {
        let message = WorkerMessage::Ready { slot: 2, pid: 4242 };
        let text = serde_json::to_string(&message).unwrap();
        assert_eq!(text, r#"{"type":"ready","slot":2,"pid":4242}"#);
        assert_eq!(serde_json::from_str::<WorkerMessage>(&text).unwrap(), message);
    }
}
