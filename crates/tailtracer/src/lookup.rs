//! Translation of the short codes carried by catalog entries into the
//! values emitted on resources and spans.

use std::fmt;
use tailtracer_protocol::semconv;

/// Outcome of a code lookup; unknown codes are kept so the caller can decide
/// whether to log, default or reject.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Recognition<T> {
    Recognized(T),
    Unrecognized(String),
}

impl<T> Recognition<T> {
    pub fn recognized(self) -> Option<T> {
        match self {
            Self::Recognized(value) => Some(value),
            Self::Unrecognized(_) => None,
        }
    }

    pub fn is_recognized(&self) -> bool {
        matches!(self, Self::Recognized(_))
    }
}

/// Which lookup a code failed in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CodeField {
    CloudProvider,
    OsType,
    Endpoint,
}

impl fmt::Display for CodeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CloudProvider => "cloud provider",
            Self::OsType => "os type",
            Self::Endpoint => "endpoint",
        };
        f.write_str(name)
    }
}

/// A code that no lookup table knows about
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UnrecognizedCode {
    pub field: CodeField,
    pub code: String,
}

impl fmt::Display for UnrecognizedCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized {} code {:?}", self.field, self.code)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloudProvider {
    Aws,
    Azure,
    Gcp,
}

impl CloudProvider {
    pub fn lookup(code: &str) -> Recognition<Self> {
        match code {
            "amzn" => Recognition::Recognized(Self::Aws),
            "mcrsft" => Recognition::Recognized(Self::Azure),
            "gogl" => Recognition::Recognized(Self::Gcp),
            other => Recognition::Unrecognized(other.to_string()),
        }
    }

    /// `cloud.provider` attribute value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aws => semconv::CLOUD_PROVIDER_AWS,
            Self::Azure => semconv::CLOUD_PROVIDER_AZURE,
            Self::Gcp => semconv::CLOUD_PROVIDER_GCP,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OsType {
    Linux,
    Windows,
    Solaris,
}

impl OsType {
    pub fn lookup(code: &str) -> Recognition<Self> {
        match code {
            "lnx" => Recognition::Recognized(Self::Linux),
            "wndws" => Recognition::Recognized(Self::Windows),
            "slrs" => Recognition::Recognized(Self::Solaris),
            other => Recognition::Unrecognized(other.to_string()),
        }
    }

    /// `os.type` attribute value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linux => semconv::OS_TYPE_LINUX,
            Self::Windows => semconv::OS_TYPE_WINDOWS,
            Self::Solaris => semconv::OS_TYPE_SOLARIS,
        }
    }
}

/// The customer-facing operation an ATM performs for a backend endpoint
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    CheckBalance,
    MakeDeposit,
    FastCash,
}

impl Operation {
    /// Substring match on the endpoint path, first match wins
    pub fn from_endpoint(endpoint: &str) -> Recognition<Self> {
        if endpoint.contains("balance") {
            Recognition::Recognized(Self::CheckBalance)
        } else if endpoint.contains("deposit") {
            Recognition::Recognized(Self::MakeDeposit)
        } else if endpoint.contains("withdraw") {
            Recognition::Recognized(Self::FastCash)
        } else {
            Recognition::Unrecognized(endpoint.to_string())
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::CheckBalance => "Check Balance",
            Self::MakeDeposit => "Make Deposit",
            Self::FastCash => "Fast Cash",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cloud_provider_codes() {
        assert_eq!(CloudProvider::lookup("amzn").recognized().map(|p| p.as_str()), Some("aws"));
        assert_eq!(CloudProvider::lookup("mcrsft").recognized().map(|p| p.as_str()), Some("azure"));
        assert_eq!(CloudProvider::lookup("gogl").recognized().map(|p| p.as_str()), Some("gcp"));
        assert_eq!(
            CloudProvider::lookup("ibm"),
            Recognition::Unrecognized("ibm".to_string())
        );
    }

    #[test]
    fn os_type_codes() {
        assert_eq!(OsType::lookup("lnx").recognized().map(|o| o.as_str()), Some("linux"));
        assert_eq!(OsType::lookup("wndws").recognized().map(|o| o.as_str()), Some("windows"));
        assert_eq!(OsType::lookup("slrs").recognized().map(|o| o.as_str()), Some("solaris"));
        assert!(!OsType::lookup("Linux").is_recognized());
    }

    #[test]
    fn operation_names_from_endpoints() {
        let name = |endpoint: &str| Operation::from_endpoint(endpoint).recognized().map(|o| o.display_name());

        assert_eq!(name("api/v2.5/balance"), Some("Check Balance"));
        assert_eq!(name("api/v2.5/deposit"), Some("Make Deposit"));
        assert_eq!(name("api/v2.5/withdrawn"), Some("Fast Cash"));
        assert_eq!(name("api/v2.5/withdrawal"), Some("Fast Cash"));
        assert_eq!(name("api/v2.5/transfer"), None);
    }

    #[test]
    fn unrecognized_code_message() {
        let code = UnrecognizedCode {
            field: CodeField::OsType,
            code: "bsd".to_string(),
        };
        assert_eq!(code.to_string(), "unrecognized os type code \"bsd\"");
    }
}
