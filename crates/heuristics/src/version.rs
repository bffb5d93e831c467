//! Dotted server version comparison ("6.2.14", "7.2.4-rc1", "255.255.255").

use std::cmp::Ordering;

fn components(v: &str) -> Option<Vec<u64>> {
    let core = v.trim().split(|c: char| c == '-' || c == '+').next()?;
    if core.is_empty() { return None; }
    core.split('.').map(|p| p.parse::<u64>().ok()).collect()
}

/// Compare two versions component-wise; missing components count as zero.
pub fn compare_versions(a: &str, b: &str) -> Option<Ordering> {
    let (a, b) = (components(a)?, components(b)?);
    let len = a.len().max(b.len());
    let at = |v: &[u64], i: usize| v.get(i).copied().unwrap_or(0);
    Some((0..len).map(|i| at(&a[..], i).cmp(&at(&b[..], i))).find(|o| o.is_ne()).unwrap_or(Ordering::Equal))
}

/// `Some(true)` when `version` is older than `min`; `None` if either is unparsable.
pub fn version_lt(version: &str, min: &str) -> Option<bool> {
    compare_versions(version, min).map(|o| o == Ordering::Less)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_versions() {
        assert_eq!(version_lt("5.0.0", "6.0.0"), Some(true));
        assert_eq!(version_lt("6", "6.0.0"), Some(false));
        assert_eq!(version_lt("6.0.0", "6.0.0"), Some(false));
        assert_eq!(version_lt("6.2.14", "6.10"), Some(true));
        assert_eq!(version_lt("7.2.4-rc1", "6.0.0"), Some(false));
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(version_lt("", "6.0.0"), None);
        assert_eq!(version_lt("six", "6.0.0"), None);
        assert_eq!(compare_versions("1.x", "1.0"), None);
    }
}
