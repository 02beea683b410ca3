//! Cache model value objects.
//!
//! A model describes *where* and *how* a cached value is stored or
//! invalidated, independent of the provider that ultimately holds the data:
//!
//! - [`CachingModel`] — configuration for storing and retrieving a single
//!   method's return value: target region, optional group within the region,
//!   optional time-to-live.
//!
//! - [`FlushingModel`] — configuration for invalidation: one or more
//!   [`CacheRegion`] descriptors plus the flush timing (before or after the
//!   wrapped operation executes).
//!
//! Models are built once during application wiring and never mutated
//! afterwards. Equality is structural, so the same configuration loaded
//! twice compares equal regardless of where the instances came from.
//!
//! # Flat-string forms
//!
//! Both model types parse from the compact `key=value` strings accepted by
//! the provider facade's model editor, so declarative method-to-model maps
//! can be written as plain properties:
//!
//! ```rust
//! use muninn::{CachingModel, FlushingModel};
//!
//! let caching: CachingModel = "cache=books;group=fiction;ttl=300".parse().unwrap();
//! assert_eq!(caching.cache_name(), "books");
//!
//! let flushing: FlushingModel = "cache=books;groups=g1,g2;when=before".parse().unwrap();
//! assert!(flushing.flush_before());
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Configuration for storing and retrieving a cached method result.
///
/// The region name is the only required part; `group` narrows storage to a
/// named partition within the region (for providers that support partial
/// invalidation), and `ttl` requests entry expiry where the region allows
/// it. Validation of the combination is the provider's job, performed once
/// at interceptor construction.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CachingModel {
    cache_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ttl_secs: Option<u64>,
}

impl CachingModel {
    /// Create a model targeting the named cache region.
    pub fn new(cache_name: impl Into<String>) -> Self {
        Self {
            cache_name: cache_name.into(),
            group: None,
            ttl_secs: None,
        }
    }

    /// Narrow storage to a group within the region.
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Request a time-to-live for stored entries, in seconds.
    pub fn ttl_secs(mut self, secs: u64) -> Self {
        self.ttl_secs = Some(secs);
        self
    }

    /// Name of the target cache region.
    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    /// Group within the region, if configured.
    pub fn group_name(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Requested entry time-to-live, if configured.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }
}

impl FromStr for CachingModel {
    type Err = CacheError;

    /// Parse the flat form `cache=NAME[;group=NAME][;ttl=SECS]`.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut cache_name = None;
        let mut group = None;
        let mut ttl_secs = None;

        for (key, value) in properties(text)? {
            match key {
                "cache" => cache_name = Some(value.to_string()),
                "group" => group = Some(value.to_string()),
                "ttl" => {
                    let secs = value
                        .parse::<u64>()
                        .map_err(|_| parse_err(text, "ttl is not a number"))?;
                    ttl_secs = Some(secs);
                }
                other => return Err(parse_err(text, &format!("unknown property '{other}'"))),
            }
        }

        let cache_name = cache_name.ok_or_else(|| parse_err(text, "missing 'cache' property"))?;
        if cache_name.is_empty() {
            return Err(parse_err(text, "empty cache name"));
        }
        Ok(Self {
            cache_name,
            group,
            ttl_secs,
        })
    }
}

impl fmt::Display for CachingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cache={}", self.cache_name)?;
        if let Some(ref group) = self.group {
            write!(f, ";group={group}")?;
        }
        if let Some(secs) = self.ttl_secs {
            write!(f, ";ttl={secs}")?;
        }
        Ok(())
    }
}

/// A named cache region plus an optional list of groups within it.
///
/// With no groups, a flush targets the entire region; with groups, only
/// entries tagged with one of the named groups are invalidated.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheRegion {
    name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    groups: Vec<String>,
}

impl CacheRegion {
    /// Descriptor for flushing the whole named region.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            groups: Vec::new(),
        }
    }

    /// Restrict the flush to the given groups.
    pub fn groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict the flush to groups parsed from a comma-delimited string
    /// (`"g1,g2"`). Empty segments are dropped.
    pub fn groups_csv(self, csv: &str) -> Self {
        let groups: Vec<String> = csv
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        self.groups(groups)
    }

    /// Region name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Groups to flush; empty means the entire region.
    pub fn group_names(&self) -> &[String] {
        &self.groups
    }
}

/// Configuration for cache invalidation around a method.
///
/// Carries the region descriptors to flush and whether the flush happens
/// before or after the wrapped operation runs. Defaults to after.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlushingModel {
    regions: Vec<CacheRegion>,
    #[serde(default)]
    flush_before: bool,
}

impl FlushingModel {
    /// Flush the entire named region (after execution).
    pub fn new(cache_name: impl Into<String>) -> Self {
        Self {
            regions: vec![CacheRegion::new(cache_name)],
            flush_before: false,
        }
    }

    /// Build from explicit region descriptors.
    pub fn with_regions<I>(regions: I) -> Self
    where
        I: IntoIterator<Item = CacheRegion>,
    {
        Self {
            regions: regions.into_iter().collect(),
            flush_before: false,
        }
    }

    /// Flush before the wrapped operation instead of after it.
    pub fn flush_before_execution(mut self, before: bool) -> Self {
        self.flush_before = before;
        self
    }

    /// The region descriptors to flush.
    pub fn regions(&self) -> &[CacheRegion] {
        &self.regions
    }

    /// `true` when the flush happens before the wrapped operation.
    pub fn flush_before(&self) -> bool {
        self.flush_before
    }
}

impl FromStr for FlushingModel {
    type Err = CacheError;

    /// Parse the flat form `cache=NAME[;groups=G1,G2][;when=before|after]`,
    /// with multiple regions separated by `|`. The `when` property may
    /// appear in any segment and applies to the whole model.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut regions = Vec::new();
        let mut flush_before = false;

        for segment in text.split('|') {
            let mut name = None;
            let mut groups_csv = None;

            for (key, value) in properties(segment)? {
                match key {
                    "cache" => name = Some(value.to_string()),
                    "groups" => groups_csv = Some(value.to_string()),
                    "when" => match value {
                        "before" => flush_before = true,
                        "after" => flush_before = false,
                        other => {
                            return Err(parse_err(
                                text,
                                &format!("unknown flush timing '{other}'"),
                            ));
                        }
                    },
                    other => return Err(parse_err(text, &format!("unknown property '{other}'"))),
                }
            }

            let name = name.ok_or_else(|| parse_err(text, "missing 'cache' property"))?;
            if name.is_empty() {
                return Err(parse_err(text, "empty cache name"));
            }
            let mut region = CacheRegion::new(name);
            if let Some(csv) = groups_csv {
                region = region.groups_csv(&csv);
            }
            regions.push(region);
        }

        Ok(Self {
            regions,
            flush_before,
        })
    }
}

/// Split a `key=value;key=value` segment into pairs.
fn properties(segment: &str) -> Result<Vec<(&str, &str)>, CacheError> {
    segment
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.split_once('=')
                .map(|(k, v)| (k.trim(), v.trim()))
                .ok_or_else(|| parse_err(segment, &format!("expected key=value, got '{part}'")))
        })
        .collect()
}

fn parse_err(text: &str, reason: &str) -> CacheError {
    CacheError::ModelParse {
        text: text.to_string(),
        reason: reason.to_string(),
    }
}
