//! Capability detection for the hosting environment.
//!
//! User-agent sniffing is not authoritative, but it is the accepted heuristic
//! for picking a completion-detection strategy in this domain. The profile is
//! computed once per engine and cached; see [`crate::LoaderEngine`].

use crate::page::Page;

/// Browser engine families with distinct resource-loading behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineFamily {
    Webkit,
    LegacyIe,
    Gecko,
    Opera,
    Unknown,
}

/// Cached classification of the hosting page's loading capabilities.
#[derive(Debug, Clone, Copy)]
pub struct CapabilityProfile {
    /// Dynamically created script nodes honor the ordering-preserving flag
    /// that disables asynchronous execution.
    pub ordered_async: bool,
    pub family: EngineFamily,
    /// Major version for [`EngineFamily::LegacyIe`] profiles.
    pub ie_version: Option<u16>,
    /// Scripts report progress through readiness transitions instead of load
    /// events.
    pub ready_state_scripts: bool,
}

impl CapabilityProfile {
    /// Classify `page`. Heuristics and precedence follow the user-agent
    /// conventions: a WebKit token wins over the "like Gecko" decoys carried
    /// by most modern agents.
    pub fn detect(page: &dyn Page) -> Self {
        let ua = page.user_agent();
        let family = classify(&ua);
        let ie_version = match family {
            EngineFamily::LegacyIe => ie_version(&ua),
            _ => None,
        };

        Self {
            ordered_async: page.supports_ordered_async(),
            family,
            ie_version,
            ready_state_scripts: family == EngineFamily::LegacyIe && page.script_ready_state(),
        }
    }

    /// True when scripts can load in parallel while still executing in
    /// insertion order.
    pub fn ordered_parallel_scripts(&self) -> bool {
        self.ordered_async || matches!(self.family, EngineFamily::Gecko | EngineFamily::Opera)
    }
}

fn classify(ua: &str) -> EngineFamily {
    if ua.contains("AppleWebKit/") {
        EngineFamily::Webkit
    } else if ua.contains("MSIE") || ua.contains("Trident") {
        EngineFamily::LegacyIe
    } else if ua.contains("Opera") {
        EngineFamily::Opera
    } else if ua.contains("Gecko/") {
        EngineFamily::Gecko
    } else {
        EngineFamily::Unknown
    }
}

/// Major version from an `MSIE 10.0` or Trident-era `rv:11.0` token.
fn ie_version(ua: &str) -> Option<u16> {
    for marker in ["MSIE ", "rv:"] {
        if let Some(pos) = ua.find(marker) {
            let digits: String = ua[pos + marker.len()..]
                .chars()
                .take_while(char::is_ascii_digit)
                .collect();
            if let Ok(version) = digits.parse() {
                return Some(version);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::in_memory::InMemoryPage;

    const SAFARI: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
        AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.1 Safari/605.1.15";
    const FIREFOX: &str =
        "Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/115.0";
    const IE9: &str = "Mozilla/4.0 (compatible; MSIE 9.0; Windows NT 6.1; Trident/5.0)";
    const IE10: &str = "Mozilla/5.0 (compatible; MSIE 10.0; Windows NT 6.1; Trident/6.0)";
    const IE11: &str = "Mozilla/5.0 (Windows NT 6.1; Trident/7.0; rv:11.0) like Gecko";
    const OPERA: &str = "Opera/9.80 (Windows NT 6.1) Presto/2.12.388 Version/12.16";

    #[test]
    fn classifies_common_agents() {
        assert_eq!(classify(SAFARI), EngineFamily::Webkit);
        assert_eq!(classify(FIREFOX), EngineFamily::Gecko);
        assert_eq!(classify(IE9), EngineFamily::LegacyIe);
        assert_eq!(classify(IE11), EngineFamily::LegacyIe);
        assert_eq!(classify(OPERA), EngineFamily::Opera);
        assert_eq!(classify("SomethingElse/1.0"), EngineFamily::Unknown);
    }

    #[test]
    fn webkit_wins_over_like_gecko_decoy() {
        // Safari carries both tokens; WebKit takes precedence.
        assert!(SAFARI.contains("Gecko"));
        assert_eq!(classify(SAFARI), EngineFamily::Webkit);
    }

    #[test]
    fn parses_legacy_ie_versions() {
        assert_eq!(ie_version(IE9), Some(9));
        assert_eq!(ie_version(IE10), Some(10));
        assert_eq!(ie_version(IE11), Some(11));
        assert_eq!(ie_version("no version here"), None);
    }

    #[test]
    fn detect_combines_feature_tests() {
        let page = InMemoryPage::new(IE10).with_script_ready_state(true);
        let profile = CapabilityProfile::detect(&page);

        assert_eq!(profile.family, EngineFamily::LegacyIe);
        assert_eq!(profile.ie_version, Some(10));
        assert!(profile.ready_state_scripts);
        assert!(!profile.ordered_async);
        assert!(!profile.ordered_parallel_scripts());
    }

    #[test]
    fn ready_state_only_applies_to_legacy_ie() {
        // The readiness feature test is ignored on other families.
        let page = InMemoryPage::new(SAFARI).with_script_ready_state(true);
        let profile = CapabilityProfile::detect(&page);
        assert!(!profile.ready_state_scripts);
    }

    #[test]
    fn ordered_parallel_scripts_by_flag_or_family() {
        let by_flag = CapabilityProfile::detect(
            &InMemoryPage::new("SomethingElse/1.0").with_ordered_async(true),
        );
        assert!(by_flag.ordered_parallel_scripts());

        let by_family = CapabilityProfile::detect(&InMemoryPage::new(FIREFOX));
        assert!(by_family.ordered_parallel_scripts());

        let neither = CapabilityProfile::detect(&InMemoryPage::new(SAFARI));
        assert!(!neither.ordered_parallel_scripts());
    }
}
