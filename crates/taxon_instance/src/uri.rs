//! Relationship URIs: `resource:<fully-qualified type>#<percent-encoded id>`.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use taxon_foundation::{Error, ErrorKind, Result, fully_qualified_name, get_namespace};
use url::Url;

use crate::value::Relationship;

/// The only accepted URI scheme.
pub const RESOURCE_SCHEME: &str = "resource";

/// Characters left unescaped in identifiers (those of `encodeURIComponent`).
const IDENTIFIER: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn invalid(uri: &str, reason: impl Into<String>) -> Error {
    Error::new(ErrorKind::InvalidRelationshipUri {
        uri: uri.to_string(),
        reason: reason.into(),
    })
}

fn decode(uri: &str, encoded: &str) -> Result<String> {
    percent_decode_str(encoded)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|e| invalid(uri, format!("identifier is not UTF-8: {e}")))
}

impl Relationship {
    /// The `resource:` URI of this relationship.
    #[must_use]
    pub fn to_uri(&self) -> String {
        format!(
            "{RESOURCE_SCHEME}:{}#{}",
            self.class_name(),
            utf8_percent_encode(self.identifier(), IDENTIFIER)
        )
    }

    /// Parses a relationship URI.
    ///
    /// A bare identifier is accepted when `default_class` is given; a short
    /// type name is qualified with the namespace of `default_class`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRelationshipUri` for another scheme, credentials, a
    /// port, a query, or a missing type or identifier.
    pub fn from_uri(uri: &str, default_class: Option<&str>) -> Result<Self> {
        if !uri.contains(':') {
            let class = default_class.ok_or_else(|| invalid(uri, "no type given"))?;
            if uri.is_empty() {
                return Err(invalid(uri, "missing identifier"));
            }
            return Ok(Self::new(class, decode(uri, uri)?));
        }

        let url = Url::parse(uri).map_err(|e| invalid(uri, e.to_string()))?;
        if url.scheme() != RESOURCE_SCHEME {
            return Err(invalid(uri, format!("scheme must be {RESOURCE_SCHEME}")));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(invalid(uri, "credentials are not permitted"));
        }
        if url.port().is_some() {
            return Err(invalid(uri, "a port is not permitted"));
        }
        if url.query().is_some() {
            return Err(invalid(uri, "a query is not permitted"));
        }

        let path = if url.cannot_be_a_base() {
            url.path().to_string()
        } else {
            format!("{}{}", url.host_str().unwrap_or_default(), url.path())
                .trim_end_matches('/')
                .to_string()
        };
        let class = match (path.contains('.'), default_class) {
            (true, _) => path,
            (false, Some(default)) if path.is_empty() => default.to_string(),
            (false, Some(default)) => match get_namespace(default) {
                Ok(namespace) => fully_qualified_name(namespace, &path),
                Err(_) => path,
            },
            (false, None) if path.is_empty() => return Err(invalid(uri, "missing type")),
            (false, None) => path,
        };
        let identifier = match url.fragment() {
            Some(fragment) if !fragment.is_empty() => decode(uri, fragment)?,
            _ => return Err(invalid(uri, "missing identifier")),
        };
        Ok(Self::new(class, identifier))
    }
}
