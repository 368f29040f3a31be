// Masking helpers for the sensitive fields of an alert. Every function here is
// total: missing values become a placeholder, odd shapes pass through.

pub const PLACEHOLDER: &str = "-";

const ACCESS_KEY_MASK: &str = "***";
const ACCOUNT_ID_MASK: &str = "***";
const ARN_ACCOUNT_MASK: &str = "************";
const IPV6_SENTINEL_GROUP: &str = "0000";
const ARN_ACCOUNT_SEGMENT: usize = 4;

/// Which categories of sensitive values get masked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedactionPolicy {
    pub mask_ip: bool,
    pub mask_access_key: bool,
    pub mask_account_id: bool,
}

impl Default for RedactionPolicy {
    fn default() -> Self {
        RedactionPolicy {
            mask_ip: true,
            mask_access_key: true,
            mask_account_id: true,
        }
    }
}

impl RedactionPolicy {
    pub fn disabled() -> Self {
        RedactionPolicy {
            mask_ip: false,
            mask_access_key: false,
            mask_account_id: false,
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

// Slices are taken by character and clamp to the string length, so a short
// value yields the whole value instead of panicking.
fn first_chars(value: &str, n: usize) -> &str {
    match value.char_indices().nth(n) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}

fn last_chars(value: &str, n: usize) -> &str {
    let count = value.chars().count();
    if count <= n {
        return value;
    }
    match value.char_indices().nth(count - n) {
        Some((idx, _)) => &value[idx..],
        None => value,
    }
}

fn is_dotted_quad(addr: &str) -> bool {
    let groups: Vec<&str> = addr.split('.').collect();
    groups.len() == 4
        && groups
            .iter()
            .all(|g| !g.is_empty() && g.chars().all(|c| c.is_ascii_digit()))
}

/// Collapses an address to its network: `/24` for IPv4, `/64` for IPv6.
pub fn mask_network_address(addr: Option<&str>, policy: &RedactionPolicy) -> String {
    let Some(addr) = present(addr) else {
        return PLACEHOLDER.to_string();
    };
    if !policy.mask_ip {
        return addr.to_string();
    }

    if is_dotted_quad(addr) {
        let network: Vec<&str> = addr.split('.').take(3).collect();
        return format!("{}.0/24", network.join("."));
    }

    if addr.contains(':') {
        let mut groups: Vec<&str> = addr.split(':').take(4).collect();
        groups.extend([IPV6_SENTINEL_GROUP; 4]);
        return format!("{}/64", groups.join(":"));
    }

    // hostnames such as "s3.amazonaws.com" or "AWS Internal"
    addr.to_string()
}

/// Keeps only the last four characters of an access key id.
pub fn mask_access_key(key: Option<&str>, policy: &RedactionPolicy) -> String {
    match present(key) {
        Some(key) if policy.mask_access_key => {
            format!("{}{}", ACCESS_KEY_MASK, last_chars(key, 4))
        }
        Some(key) => key.to_string(),
        None => PLACEHOLDER.to_string(),
    }
}

/// Blanks the account id segment (index 4) of a colon-delimited ARN.
pub fn mask_resource_account_segment(arn: Option<&str>, policy: &RedactionPolicy) -> String {
    let Some(arn) = present(arn) else {
        return PLACEHOLDER.to_string();
    };
    if !arn.contains(':') || !policy.mask_account_id {
        return arn.to_string();
    }

    let mut segments: Vec<&str> = arn.split(':').collect();
    if segments.len() > ARN_ACCOUNT_SEGMENT {
        segments[ARN_ACCOUNT_SEGMENT] = ARN_ACCOUNT_MASK;
    }
    segments.join(":")
}

/// Partially masks a bare account id, e.g. `123456784140` -> `12***4140`.
///
/// Returns an empty string for an empty id so the caller can drop the
/// account annotation altogether.
pub fn format_account_id(acct: &str, policy: &RedactionPolicy) -> String {
    if acct.is_empty() {
        return String::new();
    }
    if !policy.mask_account_id {
        return acct.to_string();
    }
    format!(
        "{}{}{}",
        first_chars(acct, 2),
        ACCOUNT_ID_MASK,
        last_chars(acct, 4)
    )
}
