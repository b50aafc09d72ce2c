use super::{new_krb_channel, KrbChannel, TransportProtocol};
use crate::core::Krb5Conf;
use crate::error::{Error, Result};
use log::{debug, warn};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use trust_dns_resolver::Resolver;

pub const DEFAULT_KDC_PORT: u16 = 88;

/// Finds the KDCs of a realm. Explicit addresses go first, then the kdc
/// entries of the krb5 configuration and, as last resort, the realm name
/// resolved through DNS.
#[derive(Debug, Clone)]
pub struct KdcLocator {
    kdcs: HashMap<String, String>,
    krb5_conf: Option<Krb5Conf>,
    protocol: TransportProtocol,
}

impl KdcLocator {
    pub fn new(protocol: TransportProtocol) -> Self {
        return Self {
            kdcs: HashMap::new(),
            krb5_conf: None,
            protocol,
        };
    }

    pub fn krb5_conf(mut self, krb5_conf: Option<Krb5Conf>) -> Self {
        self.krb5_conf = krb5_conf;
        self
    }

    pub fn insert(&mut self, realm: &str, address: String) {
        self.kdcs.insert(realm.to_uppercase(), address);
    }

    pub fn protocol(&self) -> TransportProtocol {
        return self.protocol;
    }

    /// Address strings (host[:port]) known for the realm, explicit first.
    pub fn candidates(&self, realm: &str) -> Vec<String> {
        let mut candidates = Vec::new();
        if let Some(address) = self.kdcs.get(&realm.to_uppercase()) {
            candidates.push(address.clone());
        }

        if let Some(krb5_conf) = &self.krb5_conf {
            candidates.extend(krb5_conf.kdcs(realm).iter().cloned());
        }

        return candidates;
    }

    /// Sends a request to the KDCs of the realm in order. A KDC that cannot
    /// be resolved or reached is skipped; any other outcome, including a
    /// KRB-ERROR, is final. The realm name resolved through DNS is the last
    /// KDC tried.
    pub fn send_to_kdcs<T, F>(&self, realm: &str, mut request: F) -> Result<T>
    where
        F: FnMut(&dyn KrbChannel) -> Result<T>,
    {
        let mut addresses = self.candidates(realm);
        addresses.push(realm.to_string());
        let mut last_error = None;

        for address in addresses.iter() {
            let socket_addr = match kdc_socket_addr(address) {
                Ok(socket_addr) => socket_addr,
                Err(err) => {
                    warn!("Skipping KDC {} of {}: {}", address, realm, err);
                    last_error = Some(err);
                    continue;
                }
            };

            debug!("Using KDC {} for {}", socket_addr, realm);
            let channel = new_krb_channel(socket_addr, self.protocol);
            match request(&*channel) {
                Err(err) if err.is_io_error() => {
                    warn!("KDC {} of {} unreachable: {}", address, realm, err);
                    last_error = Some(err);
                }
                result => return result,
            }
        }

        return Err(last_error.unwrap_or_else(|| {
            Error::String(format!("No KDC found for {}", realm))
        }));
    }
}

fn kdc_socket_addr(address: &str) -> Result<SocketAddr> {
    let (host, port) = parse_kdc_address(address)?;
    let ip = resolve_host(&host)?;
    return Ok(SocketAddr::new(ip, port));
}

/// Splits host[:port], [ipv6]:port or a bare ipv6 address.
pub fn parse_kdc_address(address: &str) -> Result<(String, u16)> {
    let address = address.trim();
    if address.is_empty() {
        return Err("Empty KDC address")?;
    }

    if let Ok(ip) = address.parse::<IpAddr>() {
        return Ok((ip.to_string(), DEFAULT_KDC_PORT));
    }

    if let Ok(socket_addr) = address.parse::<SocketAddr>() {
        return Ok((socket_addr.ip().to_string(), socket_addr.port()));
    }

    let host = address.trim_start_matches('[');
    match host.rsplitn(2, ':').collect::<Vec<&str>>().as_slice() {
        [port, host] => {
            let port = port.parse::<u16>().map_err(|_| {
                format!("Invalid port in KDC address '{}'", address)
            })?;
            return Ok((host.trim_end_matches(']').to_string(), port));
        }
        _ => return Ok((address.to_string(), DEFAULT_KDC_PORT)),
    }
}

pub fn resolve_host(host: &str) -> Result<IpAddr> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }

    let resolver = Resolver::from_system_conf().map_err(|err| {
        format!("Unable to use dns system configuration: {}", err)
    })?;

    let ips = resolver
        .lookup_ip(host)
        .map_err(|err| format!("Error resolving '{}' : '{}'", host, err))?;

    let ip = ips
        .iter()
        .next()
        .ok_or(format!("Error resolving '{}': No entries found", host))?;

    return Ok(ip);
}
