use ligfilter::core::models::criteria::{CriteriaError, DOCKING_DOMAIN, FilterCriteria};
use ligfilter::core::models::property::Property;
use ligfilter::relay::codec::{FrameReader, FrameWriter};
use ligfilter::relay::error::RelayError;
use ligfilter::relay::worker::RelayClient;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

/// A request line: flat `<property>_lb` / `<property>_ub` keys, each optional.
pub type FlatRequest = BTreeMap<String, f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub field: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply {
    Ligands { ligands: u64 },
    Error { error: ErrorBody },
}

impl Reply {
    fn error(field: Option<String>, message: impl Into<String>) -> Self {
        Reply::Error {
            error: ErrorBody {
                field,
                message: message.into(),
            },
        }
    }
}

impl From<CriteriaError> for Reply {
    fn from(e: CriteriaError) -> Self {
        Reply::error(Some(e.field()), e.to_string())
    }
}

/// Builds validated criteria from a flat request.
///
/// Absent bounds take the docking library domain, so an empty request selects the whole
/// library. Every bound must lie inside the domain and no range may be inverted.
pub fn criteria_from_request(request: &FlatRequest) -> Result<FilterCriteria, Reply> {
    for key in request.keys() {
        let known = key
            .rsplit_once('_')
            .is_some_and(|(name, side)| {
                Property::from_key(name).is_some() && (side == "lb" || side == "ub")
            });
        if !known {
            return Err(Reply::error(Some(key.clone()), "unknown field"));
        }
    }

    let mut criteria = DOCKING_DOMAIN;
    for property in Property::ALL {
        let (min, max) = DOCKING_DOMAIN.bounds(property);
        let lb = request
            .get(&format!("{}_lb", property.key()))
            .copied()
            .unwrap_or(min);
        let ub = request
            .get(&format!("{}_ub", property.key()))
            .copied()
            .unwrap_or(max);
        criteria.set_bounds(property, lb, ub)?;
    }
    criteria.check_within(&DOCKING_DOMAIN)?;
    Ok(criteria)
}

/// Answers one request line through the owner.
pub async fn answer(line: Result<FlatRequest, RelayError>, client: &RelayClient) -> Reply {
    let request = match line {
        Ok(request) => request,
        Err(e) => return Reply::error(None, e.to_string()),
    };
    let criteria = match criteria_from_request(&request) {
        Ok(criteria) => criteria,
        Err(reply) => return reply,
    };
    match client.count(criteria).await {
        Ok(ligands) => Reply::Ligands { ligands },
        Err(e) => Reply::error(None, e.to_string()),
    }
}

pub async fn handle_connection<S>(stream: S, client: RelayClient) -> Result<(), RelayError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, writer) = tokio::io::split(stream);
    let mut requests = FrameReader::new(BufReader::new(reader));
    let mut replies = FrameWriter::new(writer);

    loop {
        let line = match requests.next::<FlatRequest>().await {
            Ok(Some(request)) => Ok(request),
            Ok(None) => return Ok(()),
            Err(e @ RelayError::Malformed { .. }) => Err(e),
            Err(e) => return Err(e),
        };
        let reply = answer(line, &client).await;
        replies.send(&reply).await?;
    }
}

/// Accepts connections until the listener fails, serving each on its own task.
pub async fn serve(listener: TcpListener, client: RelayClient) -> std::io::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        debug!("Accepted connection from {}", peer);
        let client = client.clone();
        tokio::spawn(async move {
            match handle_connection(stream, client).await {
                Ok(()) => debug!("Connection from {} closed", peer),
                Err(e) => warn!("Connection from {} failed: {}", peer, e),
            }
        });
    }
}

pub async fn bind(addr: std::net::SocketAddr) -> std::io::Result<TcpListener> {
    let listener = TcpListener::bind(addr).await?;
    info!(
        "Worker {} listening on port {}",
        std::process::id(),
        addr.port()
    );
    Ok(listener)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ligfilter::core::models::property::LigandRecord;
    use ligfilter::engine::store::LigandStore;
    use ligfilter::relay::owner::{Owner, attach};
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt};

    fn request(pairs: &[(&str, f64)]) -> FlatRequest {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn client() -> RelayClient {
        let store = LigandStore::from_records([100.0, 200.0, 300.0, 400.0, 500.0].map(|mwt| {
            LigandRecord {
                mwt,
                ..LigandRecord::default()
            }
        }));
        let (owner, _thread) = Owner::spawn(store).unwrap();
        let (worker_end, owner_end) = tokio::io::duplex(1 << 16);
        let (owner_read, owner_write) = tokio::io::split(owner_end);
        attach(0, owner_read, owner_write, owner);
        let (worker_read, worker_write) = tokio::io::split(worker_end);
        RelayClient::connect(worker_read, worker_write, None).0
    }

    #[test]
    fn empty_request_selects_the_whole_domain() {
        assert_eq!(criteria_from_request(&FlatRequest::new()).unwrap(), DOCKING_DOMAIN);
    }

    #[test]
    fn given_bounds_replace_the_domain_defaults() {
        let criteria =
            criteria_from_request(&request(&[("mwt_lb", 200.0), ("hbd_ub", 5.0)])).unwrap();
        assert_eq!(criteria.bounds(Property::MolecularWeight), (200.0, 567.0));
        assert_eq!(criteria.bounds(Property::HydrogenBondDonors), (0.0, 5.0));
    }

    #[test]
    fn out_of_domain_bound_names_its_field() {
        let reply = criteria_from_request(&request(&[("mwt_ub", 600.0)])).unwrap_err();
        match reply {
            Reply::Error { error } => assert_eq!(error.field.as_deref(), Some("mwt_ub")),
            other => panic!("unexpected reply {:?}", other),
        }
    }

    #[test]
    fn inverted_range_is_rejected() {
        let reply =
            criteria_from_request(&request(&[("psa_lb", 100.0), ("psa_ub", 50.0)])).unwrap_err();
        assert!(matches!(reply, Reply::Error { error } if error.field.as_deref() == Some("psa_lb")));
    }

    #[test]
    fn fractional_integer_bound_is_rejected() {
        let reply = criteria_from_request(&request(&[("nrb_ub", 4.5)])).unwrap_err();
        assert!(matches!(reply, Reply::Error { error } if error.field.as_deref() == Some("nrb_ub")));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let reply = criteria_from_request(&request(&[("mass_lb", 1.0)])).unwrap_err();
        assert!(matches!(reply, Reply::Error { error } if error.field.as_deref() == Some("mass_lb")));
    }

    #[test]
    fn replies_serialize_to_the_line_format() {
        assert_eq!(
            serde_json::to_string(&Reply::Ligands { ligands: 3 }).unwrap(),
            r#"{"ligands":3}"#
        );
        assert_eq!(
            serde_json::to_string(&Reply::error(None, "bad")).unwrap(),
            r#"{"error":{"message":"bad"}}"#
        );
    }

    #[tokio::test]
    async fn connection_answers_each_line_in_order() {
        let (mut peer, stream) = tokio::io::duplex(4096);
        tokio::spawn(handle_connection(stream, client()));

        peer.write_all(b"{\"mwt_lb\":200,\"mwt_ub\":400}\nnot json\n{\"mwt_ub\":600}\n{}\n")
            .await
            .unwrap();

        let mut lines = BufReader::new(peer).lines();
        let mut replies = Vec::new();
        for _ in 0..4 {
            let line = lines.next_line().await.unwrap().unwrap();
            replies.push(serde_json::from_str::<Reply>(&line).unwrap());
        }

        assert_eq!(replies[0], Reply::Ligands { ligands: 3 });
        assert!(matches!(&replies[1], Reply::Error { error } if error.field.is_none()));
        assert!(matches!(&replies[2], Reply::Error { error } if error.field.as_deref() == Some("mwt_ub")));
        assert_eq!(replies[3], Reply::Ligands { ligands: 5 });
    }
}
