//! 域名输入校验与规范化

use crate::error::{CoreError, CoreResult};

/// 域名总长度上限
const MAX_DOMAIN_LEN: usize = 253;
/// 单个标签长度上限
const MAX_LABEL_LEN: usize = 63;

fn invalid(domain: &str, reason: impl Into<String>) -> CoreError {
    CoreError::InvalidDomain {
        domain: domain.to_string(),
        reason: reason.into(),
    }
}

/// Validate and normalise a tenant-supplied domain name.
///
/// Trims whitespace and one trailing dot, lowercases, converts internationalised
/// names to ASCII via IDNA, then checks RFC 1035 label syntax. IP literals,
/// wildcards and single-label names are rejected.
pub fn validate_domain(raw: &str) -> CoreResult<String> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
    if trimmed.is_empty() {
        return Err(invalid(raw, "domain name is required"));
    }
    if trimmed.contains('*') {
        return Err(invalid(raw, "wildcard domains are not supported"));
    }
    if trimmed.parse::<std::net::IpAddr>().is_ok() {
        return Err(invalid(raw, "IP addresses are not domain names"));
    }

    let domain = idna::domain_to_ascii_strict(trimmed)
        .map_err(|_| invalid(raw, "not a valid domain name"))?
        .to_lowercase();

    if domain.len() > MAX_DOMAIN_LEN {
        return Err(invalid(
            raw,
            format!(
                "exceeds maximum length of {MAX_DOMAIN_LEN} characters (got {})",
                domain.len()
            ),
        ));
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return Err(invalid(raw, "at least two labels are required"));
    }
    for label in &labels {
        if label.is_empty() {
            return Err(invalid(raw, "empty label"));
        }
        if label.len() > MAX_LABEL_LEN {
            return Err(invalid(
                raw,
                format!("label '{label}' exceeds {MAX_LABEL_LEN} characters"),
            ));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(invalid(
                raw,
                format!("label '{label}' starts or ends with a hyphen"),
            ));
        }
        if !label
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(invalid(
                raw,
                format!("label '{label}' contains invalid characters"),
            ));
        }
    }

    // 全数字 TLD 只可能是 IP 地址的一部分
    if labels
        .last()
        .is_some_and(|tld| tld.chars().all(|c| c.is_ascii_digit()))
    {
        return Err(invalid(raw, "top-level domain cannot be numeric"));
    }

    Ok(domain)
}
