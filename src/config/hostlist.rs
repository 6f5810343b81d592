//! Host-list payload parsing.
//!
//! The directory service hands the SDK its current proxy fleet as a JSON
//! document. Fetching and refreshing that document is the embedding
//! application's job; only the payload shape is this crate's concern.

use serde::Deserialize;

use crate::net::{dedup_hosts, HostAddress};

#[derive(Debug, Deserialize)]
struct HostListDoc {
    hosts: Vec<HostAddress>,
}

#[derive(Debug, thiserror::Error)]
pub enum HostListError {
    #[error("malformed host list document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("host list document contains no hosts")]
    Empty,
}

/// Parse `{"hosts": [{"host": ..., "port": ...}, ...]}` into a deduplicated
/// host list, preserving document order.
pub fn parse_host_list(payload: &str) -> Result<Vec<HostAddress>, HostListError> {
    let doc: HostListDoc = serde_json::from_str(payload)?;
    let hosts = dedup_hosts(doc.hosts);
    if hosts.is_empty() {
        return Err(HostListError::Empty);
    }
    Ok(hosts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_fleet_document() {
        let payload = r#"{"hosts": [
            {"host": "10.1.0.1", "port": 46801},
            {"host": "10.1.0.2", "port": 46801}
        ]}"#;
        let hosts = parse_host_list(payload).unwrap();
        assert_eq!(hosts.len(), 2);
        assert_eq!(hosts[0], HostAddress::new("10.1.0.1", 46801));
    }

    #[test]
    fn duplicate_entries_are_collapsed() {
        let payload = r#"{"hosts": [
            {"host": "a", "port": 1},
            {"host": "a", "port": 1},
            {"host": "b", "port": 2}
        ]}"#;
        assert_eq!(parse_host_list(payload).unwrap().len(), 2);
    }

    #[test]
    fn empty_and_malformed_documents_are_rejected() {
        assert!(matches!(
            parse_host_list(r#"{"hosts": []}"#),
            Err(HostListError::Empty)
        ));
        assert!(matches!(
            parse_host_list("not json"),
            Err(HostListError::Parse(_))
        ));
    }
}
