use cnbind_types::Metadata;
use cnbind_types::layer::{LayerContentMetadata, LayerTypes};
use cnbind_types::wire::layer::{FlatLayer, TypedLayer};
use proptest::prelude::*;

fn arb_layer() -> impl Strategy<Value = LayerContentMetadata> {
    (
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        proptest::collection::btree_map("[a-z][a-z0-9_]{0,8}", "[ -~]{0,16}", 0..4),
    )
        .prop_map(|(build, cache, launch, entries)| {
            let mut metadata = Metadata::new();
            for (k, v) in entries {
                metadata.insert(k, toml::Value::String(v));
            }
            LayerContentMetadata {
                types: LayerTypes {
                    build,
                    cache,
                    launch,
                },
                metadata,
            }
        })
}

proptest! {
    #[test]
    fn flat_shape_reads_back(layer in arb_layer()) {
        let raw = toml::to_string(&FlatLayer::from(&layer)).unwrap();
        prop_assert_eq!(FlatLayer::decode(&raw).unwrap(), layer);
    }

    #[test]
    fn typed_shape_reads_back(layer in arb_layer()) {
        let raw = toml::to_string(&TypedLayer::from(&layer)).unwrap();
        prop_assert_eq!(TypedLayer::decode(&raw).unwrap(), layer);
    }

    #[test]
    fn typed_reader_accepts_flat_output(layer in arb_layer()) {
        let raw = toml::to_string(&FlatLayer::from(&layer)).unwrap();
        prop_assert_eq!(TypedLayer::decode(&raw).unwrap(), layer);
    }
}
