//! Certificate-chain snapshots delivered by the fetch provider.
//!
//! The engine never inspects certificates itself; it keeps the chain the
//! provider reported for the in-flight fetch so a verification failure can be
//! turned into a prompt carrying a human-readable reason.

/// Why a single certificate in a chain failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertError {
    Expired,
    NotYetValid,
    SelfSigned,
    UntrustedRoot,
    HostnameMismatch,
    RevocationUnknown,
}

impl CertError {
    pub fn reason(self) -> &'static str {
        match self {
            CertError::Expired => "certificate has expired",
            CertError::NotYetValid => "certificate is not yet valid",
            CertError::SelfSigned => "certificate is self-signed",
            CertError::UntrustedRoot => "certificate chain ends in an untrusted root",
            CertError::HostnameMismatch => "certificate does not match the site name",
            CertError::RevocationUnknown => "certificate revocation status is unknown",
        }
    }
}

/// One certificate in a chain, leaf first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertInfo {
    pub subject: String,
    pub issuer: String,
    pub error: Option<CertError>,
}

/// A snapshot of the certificate chain presented by a site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertChain {
    pub certs: Vec<CertInfo>,
}

impl CertChain {
    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }

    /// Human-readable reason derived from the deepest failing certificate.
    pub fn failure_reason(&self) -> Option<&'static str> {
        self.certs
            .iter()
            .rev()
            .find_map(|cert| cert.error.map(CertError::reason))
    }

    /// Compact serialisation carried as a prompt form field so the prompt
    /// page can offer a chain viewer.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for (idx, cert) in self.certs.iter().enumerate() {
            if idx > 0 {
                out.push(';');
            }
            out.push_str(&cert.subject);
            if let Some(err) = cert.error {
                out.push('!');
                out.push_str(err.reason());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> CertChain {
        CertChain {
            certs: vec![
                CertInfo {
                    subject: "CN=example.com".to_string(),
                    issuer: "CN=Intermediate".to_string(),
                    error: Some(CertError::HostnameMismatch),
                },
                CertInfo {
                    subject: "CN=Intermediate".to_string(),
                    issuer: "CN=Root".to_string(),
                    error: Some(CertError::SelfSigned),
                },
                CertInfo {
                    subject: "CN=Root".to_string(),
                    issuer: "CN=Root".to_string(),
                    error: None,
                },
            ],
        }
    }

    #[test]
    fn failure_reason_uses_deepest_failing_cert() {
        assert_eq!(chain().failure_reason(), Some("certificate is self-signed"));
        assert_eq!(CertChain::default().failure_reason(), None);
    }

    #[test]
    fn serialize_keeps_chain_order() {
        let s = chain().serialize();
        assert!(s.starts_with("CN=example.com!"));
        assert!(s.ends_with(";CN=Root"));
        assert_eq!(s.matches(';').count(), 2);
    }
}
