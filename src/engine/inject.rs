//! Node construction for injected resources.

use crate::engine::queue::ResourceKind;
use crate::env::{CapabilityProfile, EngineFamily};
use crate::page::{NodeKind, NodeSpec};

/// Prefix for the identity attribute of injected stylesheet nodes, so
/// embedders can locate them for later inspection or removal.
pub const CSS_ID_PREFIX: &str = "__css_";

/// Marker class carried by every injected node.
pub const NODE_CLASS: &str = "lazyload";

/// Build the node blueprint for one URL of a batch. Attributes are set
/// verbatim; the URL is not validated.
///
/// Gecko gets an inline style node importing the target URL, because that is
/// the only shape whose completion its rule list can answer for. Every other
/// family gets a plain stylesheet link. Scripts always request ordered
/// execution.
pub fn node_for_url(
    kind: ResourceKind,
    env: &CapabilityProfile,
    url: &str,
    css_id: Option<&str>,
) -> NodeSpec {
    let mut spec = match kind {
        ResourceKind::Style if env.family == EngineFamily::Gecko => NodeSpec {
            kind: NodeKind::Style,
            attrs: identity_attr(css_id),
            text: Some(format!("@import \"{url}\";")),
        },
        ResourceKind::Style => {
            let mut attrs = vec![
                ("href".to_string(), url.to_string()),
                ("rel".to_string(), "stylesheet".to_string()),
            ];
            attrs.extend(identity_attr(css_id));
            NodeSpec {
                kind: NodeKind::Link,
                attrs,
                text: None,
            }
        }
        ResourceKind::Script => NodeSpec {
            kind: NodeKind::Script,
            attrs: vec![
                ("src".to_string(), url.to_string()),
                ("async".to_string(), "false".to_string()),
            ],
            text: None,
        },
    };

    spec.attrs
        .push(("class".to_string(), NODE_CLASS.to_string()));
    spec.attrs
        .push(("charset".to_string(), "utf-8".to_string()));
    spec
}

fn identity_attr(css_id: Option<&str>) -> Vec<(String, String)> {
    match css_id {
        Some(id) => vec![("id".to_string(), format!("{CSS_ID_PREFIX}{id}"))],
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::EngineFamily;

    fn profile(family: EngineFamily) -> CapabilityProfile {
        CapabilityProfile {
            ordered_async: false,
            family,
            ie_version: None,
            ready_state_scripts: false,
        }
    }

    fn attr<'a>(spec: &'a NodeSpec, name: &str) -> Option<&'a str> {
        spec.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn gecko_styles_become_import_probes() {
        let spec = node_for_url(
            ResourceKind::Style,
            &profile(EngineFamily::Gecko),
            "a.css",
            Some("a1"),
        );

        assert_eq!(spec.kind, NodeKind::Style);
        assert_eq!(spec.text.as_deref(), Some("@import \"a.css\";"));
        assert_eq!(attr(&spec, "id"), Some("__css_a1"));
        assert_eq!(attr(&spec, "href"), None);
    }

    #[test]
    fn other_styles_become_links() {
        let spec = node_for_url(
            ResourceKind::Style,
            &profile(EngineFamily::Webkit),
            "a.css",
            Some("a1"),
        );

        assert_eq!(spec.kind, NodeKind::Link);
        assert_eq!(attr(&spec, "href"), Some("a.css"));
        assert_eq!(attr(&spec, "rel"), Some("stylesheet"));
        assert_eq!(attr(&spec, "id"), Some("__css_a1"));
        assert!(spec.text.is_none());
    }

    #[test]
    fn scripts_request_ordered_execution() {
        let spec = node_for_url(
            ResourceKind::Script,
            &profile(EngineFamily::Unknown),
            "x.js",
            None,
        );

        assert_eq!(spec.kind, NodeKind::Script);
        assert_eq!(attr(&spec, "src"), Some("x.js"));
        assert_eq!(attr(&spec, "async"), Some("false"));
    }

    #[test]
    fn every_node_carries_the_marker_class_and_charset() {
        for kind in [ResourceKind::Style, ResourceKind::Script] {
            let spec = node_for_url(kind, &profile(EngineFamily::Unknown), "u", Some("u"));
            assert_eq!(attr(&spec, "class"), Some(NODE_CLASS));
            assert_eq!(attr(&spec, "charset"), Some("utf-8"));
        }
    }
}
