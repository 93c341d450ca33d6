//! Per-host OSPF declarations.
//!
//! One YAML file per host, keyed by hostname, holds the declared
//! parameters under an `OSPF` key:
//!
//! ```yaml
//! OSPF:
//!   process: 10
//!   area: 0
//!   networks:
//!     - 10.0.0.0/24
//!     - net: 192.168.1.0/30
//!       area: 1
//! ```

use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DesiredError, Result};

/// Declared OSPF parameters for one host.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OspfDeclaration {
    /// OSPF process id.
    pub process: u32,

    /// Default area for networks without their own.
    #[serde(default)]
    pub area: u32,

    /// Declared networks, CIDR notation.
    pub networks: Vec<NetworkDecl>,

    /// Optional explicit router id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router_id: Option<Ipv4Addr>,
}

/// A declared network: a bare CIDR string, or a mapping carrying an
/// area override.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum NetworkDecl {
    Cidr(String),
    Detailed { net: String, area: u32 },
}

#[derive(Debug, Deserialize)]
struct DefinitionFile {
    #[serde(rename = "OSPF")]
    ospf: Option<OspfDeclaration>,
}

/// Load the declaration for `host` from `<host_vars_dir>/<host>.yaml`.
///
/// A missing file is fatal for the host; no defaults are substituted.
pub fn load_declaration(host_vars_dir: &Path, host: &str) -> Result<OspfDeclaration> {
    let path = host_vars_dir.join(format!("{host}.yaml"));
    if !path.exists() {
        return Err(DesiredError::MissingDefinition {
            host: host.to_string(),
            path,
        }
        .into());
    }
    let content = fs::read_to_string(&path).map_err(|source| DesiredError::Read {
        path: path.clone(),
        source,
    })?;
    let file: DefinitionFile =
        serde_yaml::from_str(&content).map_err(|source| DesiredError::Parse {
            path: path.clone(),
            source,
        })?;
    file.ospf
        .ok_or_else(|| DesiredError::MissingDeclaration { path }.into())
}

/// A network expanded to the textual form the template binds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedNetwork {
    /// Network address with host bits cleared.
    pub address: String,

    /// Wildcard mask matching the prefix length.
    pub wildcard: String,

    /// Area the network is placed in.
    pub area: u32,
}

/// Expand every declared network to address + wildcard form.
pub fn expand_networks(decl: &OspfDeclaration) -> Result<Vec<RenderedNetwork>> {
    decl.networks
        .iter()
        .map(|network| expand(network, decl.area))
        .collect()
}

fn expand(decl: &NetworkDecl, default_area: u32) -> Result<RenderedNetwork> {
    let (cidr, area) = match decl {
        NetworkDecl::Cidr(cidr) => (cidr.as_str(), default_area),
        NetworkDecl::Detailed { net, area } => (net.as_str(), *area),
    };
    let invalid = |reason: &str| DesiredError::InvalidNetwork {
        network: cidr.to_string(),
        reason: reason.to_string(),
    };

    let (address, prefix) = cidr
        .split_once('/')
        .ok_or_else(|| invalid("expected address/prefix"))?;
    let address: Ipv4Addr = address
        .trim()
        .parse()
        .map_err(|_| invalid("not an IPv4 address"))?;
    let prefix: u32 = prefix
        .trim()
        .parse()
        .ok()
        .filter(|p| *p <= 32)
        .ok_or_else(|| invalid("prefix must be 0-32"))?;

    let mask: u32 = if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - prefix)
    };
    let network = Ipv4Addr::from(u32::from(address) & mask);
    let wildcard = Ipv4Addr::from(!mask);

    Ok(RenderedNetwork {
        address: network.to_string(),
        wildcard: wildcard.to_string(),
        area,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(yaml: &str) -> OspfDeclaration {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn parses_bare_and_detailed_networks() {
        let decl = decl(
            r"
process: 10
area: 0
networks:
  - 10.0.0.0/24
  - net: 192.168.1.0/30
    area: 1
",
        );
        assert_eq!(decl.process, 10);
        assert_eq!(decl.networks.len(), 2);
        assert_eq!(decl.networks[0], NetworkDecl::Cidr("10.0.0.0/24".into()));
        assert_eq!(
            decl.networks[1],
            NetworkDecl::Detailed {
                net: "192.168.1.0/30".into(),
                area: 1
            }
        );
    }

    #[test]
    fn area_defaults_to_zero() {
        let decl = decl("process: 1\nnetworks: [10.0.0.0/8]");
        assert_eq!(decl.area, 0);
        assert!(decl.router_id.is_none());
    }

    #[test]
    fn expands_wildcards_and_area_overrides() {
        let decl = decl(
            r"
process: 10
area: 0
networks:
  - 10.0.0.0/24
  - net: 192.168.1.0/30
    area: 1
",
        );
        let networks = expand_networks(&decl).unwrap();
        assert_eq!(
            networks[0],
            RenderedNetwork {
                address: "10.0.0.0".into(),
                wildcard: "0.0.0.255".into(),
                area: 0
            }
        );
        assert_eq!(
            networks[1],
            RenderedNetwork {
                address: "192.168.1.0".into(),
                wildcard: "0.0.0.3".into(),
                area: 1
            }
        );
    }

    #[test]
    fn host_bits_are_cleared() {
        let decl = decl("process: 1\nnetworks: [10.0.0.57/24]");
        let networks = expand_networks(&decl).unwrap();
        assert_eq!(networks[0].address, "10.0.0.0");
    }

    #[test]
    fn default_route_prefix_is_handled() {
        let decl = decl("process: 1\nnetworks: [0.0.0.0/0]");
        let networks = expand_networks(&decl).unwrap();
        assert_eq!(networks[0].address, "0.0.0.0");
        assert_eq!(networks[0].wildcard, "255.255.255.255");
    }

    #[test]
    fn host_route_prefix_is_handled() {
        let decl = decl("process: 1\nnetworks: [10.1.1.1/32]");
        let networks = expand_networks(&decl).unwrap();
        assert_eq!(networks[0].wildcard, "0.0.0.0");
    }

    #[test]
    fn rejects_malformed_networks() {
        for bad in ["10.0.0.0", "10.0.0.0/33", "not-an-ip/24", "10.0.0.0/x"] {
            let decl = decl(&format!("process: 1\nnetworks: ['{bad}']"));
            assert!(expand_networks(&decl).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn missing_definition_file_is_fatal() {
        let err = load_declaration(Path::new("definitely/not/here"), "r9").unwrap_err();
        assert!(err.to_string().contains("No definition file"));
    }
}
