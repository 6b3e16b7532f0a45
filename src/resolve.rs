//! DNS resolution fan-out and unique-address extraction.

use anyhow::Result;
use futures::stream::{self, StreamExt};
use hickory_resolver::config::{LookupIpStrategy, ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::config::ResolveConfig;

/// A normalized host together with the addresses it resolved to.
/// Only hosts with at least one address are ever represented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedHost {
    pub host: String,
    pub addresses: Vec<String>,
}

impl ResolvedHost {
    /// Render as the `host,ip ip ...` record used by the resolved artifact.
    pub fn to_record(&self) -> (String, String) {
        (self.host.clone(), self.addresses.join(" "))
    }

    /// Parse a `host,ip ip ...` record. Returns `None` for records with no
    /// host or no addresses.
    pub fn parse_record(line: &str) -> Option<Self> {
        let (host, addrs) = line.split_once(',')?;
        let host = host.trim();
        if host.is_empty() {
            return None;
        }
        let addresses: Vec<String> = addrs
            .split_whitespace()
            .map(|a| a.to_string())
            .collect();
        if addresses.is_empty() {
            return None;
        }
        Some(Self {
            host: host.to_string(),
            addresses,
        })
    }
}

pub struct HostResolver {
    resolver: TokioAsyncResolver,
    jobs: usize,
}

impl HostResolver {
    /// Build a resolver from the system configuration, falling back to a
    /// public resolver with tuned options when no system config is usable.
    pub fn new(config: &ResolveConfig) -> Result<Self> {
        let resolver = match TokioAsyncResolver::tokio_from_system_conf() {
            Ok(r) => r,
            Err(e) => {
                warn!("System resolver config unusable ({}), falling back to Cloudflare", e);
                let mut opts = ResolverOpts::default();
                opts.timeout = std::time::Duration::from_secs(config.timeout_secs);
                opts.attempts = 1;
                opts.ip_strategy = LookupIpStrategy::Ipv4thenIpv6;
                TokioAsyncResolver::tokio(ResolverConfig::cloudflare(), opts)
            }
        };

        Ok(Self {
            resolver,
            jobs: config.jobs.max(1),
        })
    }

    /// Resolve every host concurrently (bounded by `jobs`), keeping only
    /// hosts with at least one address. Results are re-sorted by host so the
    /// output is deterministic regardless of completion order, and one
    /// host's failure never affects its siblings.
    pub async fn resolve_all(&self, hosts: &[String]) -> Vec<ResolvedHost> {
        let pb = ProgressBar::new(hosts.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("{spinner} resolving {pos}/{len} {wide_bar}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let mut resolved: Vec<ResolvedHost> = stream::iter(hosts.iter())
            .map(|host| {
                let pb = pb.clone();
                async move {
                    let result = self.resolve_one(host).await;
                    pb.inc(1);
                    result
                }
            })
            .buffer_unordered(self.jobs)
            .filter_map(|r| async move { r })
            .collect()
            .await;

        pb.finish_and_clear();
        resolved.sort_by(|a, b| a.host.cmp(&b.host));
        resolved
    }

    /// A records first; AAAA only when no A record exists. A host with no
    /// records of either type yields `None` and is dropped from the
    /// resolved set (it stays in the normalized host list).
    async fn resolve_one(&self, host: &str) -> Option<ResolvedHost> {
        // Blank entries should not survive normalization; skip defensively.
        if host.trim().is_empty() {
            return None;
        }

        let mut addresses: Vec<String> = match self.resolver.ipv4_lookup(host).await {
            Ok(lookup) => lookup.iter().map(|a| a.0.to_string()).collect(),
            Err(e) => {
                debug!("A lookup failed for {}: {}", host, e);
                Vec::new()
            }
        };

        if addresses.is_empty() {
            addresses = match self.resolver.ipv6_lookup(host).await {
                Ok(lookup) => lookup.iter().map(|a| a.0.to_string()).collect(),
                Err(e) => {
                    debug!("AAAA lookup failed for {}: {}", host, e);
                    Vec::new()
                }
            };
        }

        if addresses.is_empty() {
            debug!("No A or AAAA records for {}", host);
            return None;
        }

        Some(ResolvedHost {
            host: host.to_string(),
            addresses,
        })
    }
}

/// Flatten all resolved addresses into a deduplicated, sorted set.
pub fn extract_unique_addresses(resolved: &[ResolvedHost]) -> Vec<String> {
    let set: BTreeSet<String> = resolved
        .iter()
        .flat_map(|r| r.addresses.iter())
        .filter(|a| !a.is_empty())
        .cloned()
        .collect();
    set.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(host: &str, addrs: &[&str]) -> ResolvedHost {
        ResolvedHost {
            host: host.to_string(),
            addresses: addrs.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn test_unique_addresses_flatten_and_dedupe() {
        let input = vec![
            resolved("a.example.com", &["1.1.1.1", "2.2.2.2"]),
            resolved("b.example.com", &["1.1.1.1"]),
        ];
        assert_eq!(extract_unique_addresses(&input), vec!["1.1.1.1", "2.2.2.2"]);
    }

    #[test]
    fn test_unique_addresses_is_subset_of_union() {
        let input = vec![
            resolved("a.example.com", &["10.0.0.1", "10.0.0.2"]),
            resolved("b.example.com", &["10.0.0.2", "10.0.0.3"]),
        ];
        let unique = extract_unique_addresses(&input);
        let union: Vec<&str> = vec!["10.0.0.1", "10.0.0.2", "10.0.0.3"];
        assert!(unique.iter().all(|a| union.contains(&a.as_str())));
        let mut deduped = unique.clone();
        deduped.dedup();
        assert_eq!(unique, deduped);
    }

    #[test]
    fn test_unique_addresses_empty_input() {
        assert!(extract_unique_addresses(&[]).is_empty());
    }

    #[test]
    fn test_parse_record_roundtrip() {
        let line = "a.example.com,1.1.1.1 2.2.2.2";
        let parsed = ResolvedHost::parse_record(line).unwrap();
        assert_eq!(parsed.host, "a.example.com");
        assert_eq!(parsed.addresses, vec!["1.1.1.1", "2.2.2.2"]);
        let (host, addrs) = parsed.to_record();
        assert_eq!(host, "a.example.com");
        assert_eq!(addrs, "1.1.1.1 2.2.2.2");
    }

    #[test]
    fn test_parse_record_rejects_empty_hosts_and_addresses() {
        assert!(ResolvedHost::parse_record("host-without-comma").is_none());
        assert!(ResolvedHost::parse_record(",1.1.1.1").is_none());
        assert!(ResolvedHost::parse_record("a.example.com,").is_none());
        assert!(ResolvedHost::parse_record("a.example.com,   ").is_none());
    }

    #[test]
    fn test_unique_addresses_from_record_lines() {
        let records = ["a.example.com,1.1.1.1 2.2.2.2", "b.example.com,1.1.1.1"];
        let resolved: Vec<ResolvedHost> = records
            .iter()
            .filter_map(|l| ResolvedHost::parse_record(l))
            .collect();
        assert_eq!(
            extract_unique_addresses(&resolved),
            vec!["1.1.1.1", "2.2.2.2"]
        );
    }
}
