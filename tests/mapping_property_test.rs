//! Property tests for the field-mapping parser.

use proptest::prelude::*;
use relay_core::orchestration::{FieldMapping, MappingSource};

proptest! {
    /// The parser never panics, whatever the input.
    #[test]
    fn parse_never_panics(input in ".{0,200}") {
        let _ = FieldMapping::parse(&input);
    }

    /// Well-formed segments all survive parsing with their sides intact.
    #[test]
    fn well_formed_segments_round_trip(
        segments in prop::collection::vec(
            ("[A-Za-z][A-Za-z0-9_]{0,12}", "[A-Za-z][A-Za-z0-9_]{0,12}"),
            1..8,
        )
    ) {
        let joined = segments
            .iter()
            .map(|(source, target)| format!("{source}={target}"))
            .collect::<Vec<_>>()
            .join(";");

        let parsed = FieldMapping::parse(&joined).unwrap();
        prop_assert_eq!(parsed.entries.len(), segments.len());
        for (entry, (source, target)) in parsed.entries.iter().zip(&segments) {
            prop_assert_eq!(&entry.source, &MappingSource::Field(source.clone()));
            prop_assert_eq!(&entry.target_param, target);
        }
    }

    /// A `+` prefix always parses to a literal carrying the rest verbatim.
    #[test]
    fn plus_prefix_is_literal(
        literal in "[A-Za-z0-9_.-]{1,20}",
        target in "[A-Za-z][A-Za-z0-9_]{0,12}",
    ) {
        let mapping = FieldMapping::parse(&format!("+{literal}={target}")).unwrap();
        prop_assert_eq!(mapping.entries.len(), 1);
        match &mapping.entries[0].source {
            MappingSource::Literal(value) => prop_assert_eq!(value, &literal),
            other => prop_assert!(false, "expected literal, got {:?}", other),
        }
    }
}
