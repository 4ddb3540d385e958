//! Transport options read from the run configuration.

use std::time::Duration;

use apiflow_domain::{DomainError, DomainResult, ProxySettings, TransportOptions};

use crate::context::VariableContext;

/// Set to `true` to skip TLS certificate verification.
pub const DISABLE_TLS_VERIFY: &str = "APIFLOW_DISABLE_TLS_VERIFY";
/// Proxy host. Used only together with [`PROXY_PORT`].
pub const PROXY_HOST: &str = "APIFLOW_PROXY_HOST";
/// Proxy port.
pub const PROXY_PORT: &str = "APIFLOW_PROXY_PORT";
/// Proxy username; enables basic proxy authentication.
pub const PROXY_USERNAME: &str = "APIFLOW_PROXY_USERNAME";
/// Proxy password.
pub const PROXY_PASSWORD: &str = "APIFLOW_PROXY_PASSWORD";
/// Request timeout in milliseconds.
pub const TIMEOUT_MS: &str = "APIFLOW_TIMEOUT_MS";

/// Builds the transport options for the next request.
///
/// Settings are looked up through the context, so they may come from the
/// configuration, the active row or a capture, and may contain placeholders.
///
/// # Errors
///
/// Returns [`DomainError::InvalidValue`] for a non-numeric port or timeout.
pub fn transport_options(context: &VariableContext) -> DomainResult<TransportOptions> {
    let setting = |key: &str| {
        context
            .lookup(key)
            .map(|value| context.resolve(&value).trim().to_string())
            .filter(|value| !value.is_empty())
    };

    let accept_invalid_certs =
        setting(DISABLE_TLS_VERIFY).is_some_and(|value| value.eq_ignore_ascii_case("true"));

    let proxy = match (setting(PROXY_HOST), setting(PROXY_PORT)) {
        (Some(host), Some(port)) => {
            let port = port
                .parse::<u16>()
                .map_err(|_| DomainError::invalid_value(PROXY_PORT, format!("'{port}' is not a port")))?;
            let proxy = ProxySettings::new(host, port);
            Some(match setting(PROXY_USERNAME) {
                Some(username) => {
                    proxy.with_auth(username, setting(PROXY_PASSWORD).unwrap_or_default())
                }
                None => proxy,
            })
        }
        _ => None,
    };

    let timeout = setting(TIMEOUT_MS)
        .map(|value| {
            value.parse::<u64>().map(Duration::from_millis).map_err(|_| {
                DomainError::invalid_value(TIMEOUT_MS, format!("'{value}' is not a number"))
            })
        })
        .transpose()?;

    Ok(TransportOptions {
        accept_invalid_certs,
        proxy,
        timeout,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use apiflow_domain::{RunConfiguration, StringMap};
    use pretty_assertions::assert_eq;

    use super::*;

    fn context(pairs: &[(&str, &str)]) -> VariableContext {
        let values: StringMap = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        VariableContext::new(Arc::new(RunConfiguration::from_values(values)))
    }

    #[test]
    fn test_defaults() {
        assert_eq!(transport_options(&context(&[])).unwrap(), TransportOptions::default());
    }

    #[test]
    fn test_all_settings() {
        let ctx = context(&[
            (DISABLE_TLS_VERIFY, "TRUE"),
            ("proxy", "proxy.local"),
            (PROXY_HOST, "${proxy}"),
            (PROXY_PORT, "3128"),
            (PROXY_USERNAME, "bob"),
            (TIMEOUT_MS, "2500"),
        ]);
        let options = transport_options(&ctx).unwrap();
        assert!(options.accept_invalid_certs);
        assert_eq!(
            options.proxy,
            Some(ProxySettings::new("proxy.local", 3128).with_auth("bob", ""))
        );
        assert_eq!(options.timeout, Some(Duration::from_millis(2500)));
    }

    #[test]
    fn test_proxy_needs_host_and_port() {
        let ctx = context(&[(PROXY_HOST, "proxy.local")]);
        assert_eq!(transport_options(&ctx).unwrap().proxy, None);
    }

    #[test]
    fn test_invalid_port() {
        let ctx = context(&[(PROXY_HOST, "proxy.local"), (PROXY_PORT, "http")]);
        assert!(matches!(
            transport_options(&ctx),
            Err(DomainError::InvalidValue { field, .. }) if field == PROXY_PORT
        ));
    }
}
