//! Property-based checks over generated data and documents.

use proptest::prelude::*;
use stencil::{Data, TemplateOptions};

use crate::common::{compile, compile_with, document, paragraph};

/// Text that contains no delimiters and nothing that needs escaping.
fn plain_text() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9 .,;:!?()-]{0,40}").expect("valid regex")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn parallel_loops_match_sequential(nums in prop::collection::vec(-1000i32..1000, 0..40)) {
        let xml = document(&paragraph("{for n in nums}{n * 2}:{n % 7},{end}"));
        let data = Data::new().with("nums", nums.clone());

        let sequential = compile(&xml).render(&data).unwrap();
        let parallel = compile_with(
            &xml,
            TemplateOptions::default()
                .with_parallel_loops(true)
                .with_worker_threads(4),
        )
        .render(&data)
        .unwrap();
        prop_assert_eq!(&parallel, &sequential);

        let expected: String = nums.iter().map(|n| format!("{}:{},", n * 2, n % 7)).collect();
        prop_assert_eq!(sequential, document(&paragraph(&expected)));
    }

    #[test]
    fn documents_without_groups_round_trip(paragraphs in prop::collection::vec(plain_text(), 0..8)) {
        let body: String = paragraphs.iter().map(|p| paragraph(p)).collect();
        let xml = document(&body);
        prop_assert_eq!(compile(&xml).render(&Data::new()).unwrap(), xml);
    }

    #[test]
    fn interpolated_text_is_escaped(value in "[ -~]{0,30}") {
        let xml = document(&paragraph("{v}"));
        let out = compile(&xml).render(&Data::new().with("v", value.clone())).unwrap();
        let escaped = value
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;");
        prop_assert_eq!(out, document(&paragraph(&escaped)));
    }
}
