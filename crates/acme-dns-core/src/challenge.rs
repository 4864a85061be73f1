//! Challenge descriptor
//!
//! The already-decoded DNS-01 challenge handed to the reconciler, plus the
//! two derivations every reconciliation starts with: the provider domain
//! name (zone without trailing dot) and the record host (first FQDN label).

use crate::error::{Error, Result};

/// Separator between DNS labels
const LABEL_SEPARATOR: char = '.';

/// A DNS-01 challenge to present or clean up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeDescriptor {
    /// Zone the record lives in, trailing dot optional
    pub zone: String,
    /// Fully-qualified record name, trailing dot optional
    pub fqdn: String,
    /// Expected TXT value
    pub key: String,
}

impl ChallengeDescriptor {
    /// Create a new challenge descriptor
    pub fn new(zone: impl Into<String>, fqdn: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            zone: zone.into(),
            fqdn: fqdn.into(),
            key: key.into(),
        }
    }

    /// Zone name as the provider knows it (one trailing dot stripped)
    ///
    /// # Errors
    ///
    /// `Error::InvalidInput` if nothing is left after stripping.
    pub fn domain_name(&self) -> Result<&str> {
        let name = self
            .zone
            .strip_suffix(LABEL_SEPARATOR)
            .unwrap_or(&self.zone);

        if name.is_empty() {
            return Err(Error::invalid_input(format!(
                "Challenge zone is empty: '{}'",
                self.zone
            )));
        }

        Ok(name)
    }

    /// Record host: the first label of the FQDN
    ///
    /// The provider addresses records by host within the domain, so
    /// `_acme-challenge.example.com.` becomes `_acme-challenge`.
    ///
    /// # Errors
    ///
    /// `Error::InvalidInput` if the FQDN is empty or starts with a dot.
    pub fn host(&self) -> Result<&str> {
        match self.fqdn.split(LABEL_SEPARATOR).next() {
            Some(label) if !label.is_empty() => Ok(label),
            _ => Err(Error::invalid_input(format!(
                "Challenge FQDN has no leading label: '{}'",
                self.fqdn
            ))),
        }
    }
}
