//! Metadata propagation between the transport side-channel and responses
//!
//! Inbound, [`extract_incoming`] reads the bundle the transport attached to
//! the call. Outbound, [`collapse_multi_value`] reduces it to one value per
//! key and [`inject_outgoing`] writes that map into the response's own
//! metadata field. The echo is application-level: it does not touch
//! transport trailers.

use crate::context::CallContext;
use crate::metadata::MetadataBundle;
use std::collections::HashMap;

/// A response type with an application-level metadata field
pub trait MetadataCarrier {
    /// Mutable access to the response metadata
    fn metadata_mut(&mut self) -> &mut HashMap<String, String>;
}

/// Read the metadata attached to an inbound call.
///
/// `None` means the transport exposed no metadata facility at all. Callers
/// must treat that as an error, not as an empty bundle.
pub fn extract_incoming(ctx: &CallContext) -> Option<&MetadataBundle> {
    ctx.incoming()
}

/// Keep only the first value of every key.
///
/// Multi-valued keys are not merged or joined: `["a", "b"]` becomes `"a"`.
/// Keys without any value are dropped.
pub fn collapse_multi_value(bundle: &MetadataBundle) -> HashMap<String, String> {
    bundle
        .iter()
        .filter_map(|(key, values)| {
            values
                .first()
                .map(|first| (key.to_string(), first.clone()))
        })
        .collect()
}

/// Write a collapsed map into the response metadata, overwriting keys that
/// are already present.
pub fn inject_outgoing<R: MetadataCarrier + ?Sized>(
    response: &mut R,
    metadata: HashMap<String, String>,
) {
    response.metadata_mut().extend(metadata);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Default)]
    struct Carrier {
        metadata: HashMap<String, String>,
    }

    impl MetadataCarrier for Carrier {
        fn metadata_mut(&mut self) -> &mut HashMap<String, String> {
            &mut self.metadata
        }
    }

    #[test]
    fn test_collapse_keeps_first_value() {
        let bundle: MetadataBundle = [("x-req-id", "a"), ("x-req-id", "b")].into_iter().collect();
        let collapsed = collapse_multi_value(&bundle);
        assert_eq!(collapsed.len(), 1);
        assert_eq!(collapsed["x-req-id"], "a");
    }

    #[test]
    fn test_collapse_empty_bundle() {
        assert!(collapse_multi_value(&MetadataBundle::new()).is_empty());
    }

    #[test]
    fn test_extract_distinguishes_absent_from_empty() {
        let present = CallContext::with_metadata(MetadataBundle::new());
        assert_eq!(extract_incoming(&present), Some(&MetadataBundle::new()));
        assert_eq!(extract_incoming(&CallContext::without_metadata()), None);
    }

    #[test]
    fn test_inject_overwrites_existing_keys() {
        let mut carrier = Carrier::default();
        carrier.metadata.insert("k".into(), "old".into());
        carrier.metadata.insert("other".into(), "kept".into());

        inject_outgoing(&mut carrier, HashMap::from([("k".to_string(), "new".to_string())]));

        assert_eq!(carrier.metadata["k"], "new");
        assert_eq!(carrier.metadata["other"], "kept");
    }

    fn bundle_strategy() -> impl Strategy<Value = Vec<(String, Vec<String>)>> {
        prop::collection::vec(
            ("[a-z][a-z0-9-]{0,12}", prop::collection::vec("[ -~]{0,16}", 1..5)),
            0..10,
        )
    }

    fn build(entries: &[(String, Vec<String>)]) -> MetadataBundle {
        let mut bundle = MetadataBundle::new();
        for (key, values) in entries {
            bundle.remove(key);
            for value in values {
                bundle.append(key, value.clone());
            }
        }
        bundle
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        // Every key maps to exactly the first element of its sequence.
        #[test]
        fn prop_collapse_selects_first_value(entries in bundle_strategy()) {
            let bundle = build(&entries);
            let collapsed = collapse_multi_value(&bundle);

            prop_assert_eq!(collapsed.len(), bundle.len());
            for (key, values) in bundle.iter() {
                prop_assert_eq!(collapsed.get(key), values.first());
            }
        }

        #[test]
        fn prop_collapse_is_idempotent(entries in bundle_strategy()) {
            let bundle = build(&entries);
            let once = collapse_multi_value(&bundle);
            prop_assert_eq!(&once, &collapse_multi_value(&bundle));

            // Feeding the collapsed map back in changes nothing either.
            let reparsed: MetadataBundle = once.iter().map(|(k, v)| (k, v.clone())).collect();
            prop_assert_eq!(collapse_multi_value(&reparsed), once);
        }
    }
}
