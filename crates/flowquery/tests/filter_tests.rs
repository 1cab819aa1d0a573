//! filter(), is() and count() integration tests
//!
//! Every case runs through all three operations: `filter` keeps exactly the
//! expected objects, `is` reports whether any matched and `count` counts them.

mod common;

use common::fixtures::{objects, query};
use flowquery::{Invocation, Outcome};
use rstest::rstest;
use serde_json::{json, Value};

#[rstest]
#[case::property_existence(objects(&[1, 2]), "[myProperty]", objects(&[1]))]
#[case::attributes_are_anded(objects(&[1, 2, 3]), "[myProperty][myProperty2]", objects(&[1]))]
#[case::commas_are_ored(objects(&[1, 2, 3, 4]), "[myProperty2], [name]", objects(&[1, 4]))]
#[case::exact_match(objects(&[1, 2, 3, 4]), "[myProperty=asdf]", objects(&[1]))]
#[case::property_path(objects(&[1, 2, 3, 4, 8]), "[resource.fileExtension=pdf]", objects(&[8]))]
#[case::boolean_match(objects(&[1, 2, 3, 4, 5, 6]), "[isHidden=true]", objects(&[5]))]
#[case::integer_match(objects(&[1, 2, 3, 4, 5, 6]), "[aNumber = 42]", objects(&[6]))]
#[case::instanceof_unknown_class(objects(&[1]), "[instanceof foo]", vec![])]
#[case::instanceof_class(objects(&[1]), "[  instanceof \\stdClass  ]", objects(&[1]))]
#[case::instanceof_object(objects(&[1]), "[  instanceof object  ]", objects(&[1]))]
#[case::instanceof_string(vec![json!("myString")], "[  instanceof string  ]", vec![json!("myString")])]
#[case::instanceof_integer(
    vec![json!(42), json!("42"), json!(400), json!("foo")],
    "[  instanceof integer  ]",
    vec![json!(42), json!(400)]
)]
#[case::instanceof_int(
    vec![json!(42), json!("42"), json!(400), json!("foo")],
    "[  instanceof int  ]",
    vec![json!(42), json!(400)]
)]
#[case::instanceof_boolean(
    vec![json!(false), json!(""), json!(true)],
    "[  instanceof boolean  ]",
    vec![json!(false), json!(true)]
)]
#[case::instanceof_float(
    vec![json!(false), json!(42), json!(42.5), json!(true)],
    "[  instanceof float  ]",
    vec![json!(42.5)]
)]
#[case::instanceof_array(
    vec![json!(false), json!(42), json!(42.5), json!(true), json!(["foo"])],
    "[  instanceof array  ]",
    vec![json!(["foo"])]
)]
#[case::instanceof_on_attribute(objects(&[1, 2, 3, 4, 5, 6]), "[ isHidden instanceof boolean ]", objects(&[5]))]
#[case::not_instanceof_unknown_class(objects(&[1]), "[!instanceof foo]", objects(&[1]))]
#[case::not_instanceof_class(objects(&[1]), "[  !instanceof \\stdClass  ]", vec![])]
#[case::not_instanceof_object(objects(&[1]), "[  !instanceof object  ]", vec![])]
#[case::not_instanceof_string(vec![json!("myString")], "[  !instanceof string  ]", vec![])]
#[case::not_instanceof_integer(
    vec![json!(42), json!("42"), json!(400), json!("foo")],
    "[  !instanceof integer  ]",
    vec![json!("42"), json!("foo")]
)]
#[case::not_instanceof_int(
    vec![json!(42), json!("42"), json!(400), json!("foo")],
    "[  !instanceof int  ]",
    vec![json!("42"), json!("foo")]
)]
#[case::not_instanceof_boolean(
    vec![json!(false), json!(""), json!(true)],
    "[  !instanceof boolean  ]",
    vec![json!("")]
)]
#[case::not_instanceof_float(
    vec![json!(false), json!(42), json!(42.5), json!(true)],
    "[  !instanceof float  ]",
    vec![json!(false), json!(42), json!(true)]
)]
#[case::not_instanceof_array(
    vec![json!(false), json!(42), json!(42.5), json!(true), json!(["foo"])],
    "[  !instanceof array  ]",
    vec![json!(false), json!(42), json!(42.5), json!(true)]
)]
#[case::not_instanceof_on_attribute(
    objects(&[1, 2, 3, 4, 5, 6]),
    "[ isHidden !instanceof boolean ]",
    objects(&[1, 2, 3, 4, 6])
)]
#[case::begins_with(objects(&[1, 2, 3, 4]), "[ myProperty ^= as ]", objects(&[1]))]
#[case::ends_with(objects(&[1, 2, 3, 4]), "[ myProperty $= df ]", objects(&[1]))]
#[case::ends_with_single_char(objects(&[1, 2, 3, 4]), "[ myProperty $= a ]", objects(&[3]))]
#[case::contains(objects(&[1, 2, 3, 4]), "[ myProperty *= sd ]", objects(&[1]))]
#[case::identifier(objects(&[1, 2, 3, 4]), "#object-identifier-A1-B2", objects(&[2]))]
#[case::not_equals(objects(&[1, 2, 3, 4]), "[ myProperty != asdf ]", objects(&[2, 3, 4]))]
#[case::less_than(objects(&[6, 7]), "[ aNumber < 50 ]", objects(&[6]))]
#[case::less_than_or_equal(objects(&[6, 7]), "[ aNumber <= 42 ]", objects(&[6]))]
#[case::greater_than(objects(&[6, 7]), "[ aNumber > 50 ]", objects(&[7]))]
#[case::greater_than_or_equal(objects(&[6, 7]), "[ aNumber >= 42 ]", objects(&[6, 7]))]
fn test_filter_is_and_count(
    #[case] source: Vec<Value>,
    #[case] selector: &str,
    #[case] expected: Vec<Value>,
) {
    let query = query(source.clone());

    let filtered = query.filter(selector).unwrap();
    assert!(filtered.is_pending());
    assert_eq!(filtered.clone().into_vec().unwrap(), expected);

    assert_eq!(query.is(selector).unwrap(), !expected.is_empty());
    assert_eq!(filtered.count().unwrap(), expected.len());
    assert_eq!(query.count().unwrap(), source.len());

    // count(selector) queues the filter itself
    match query.invoke("count", vec![json!(selector)]).unwrap() {
        Invocation::Completed(Outcome::Count(count)) => assert_eq!(count, expected.len()),
        other => panic!("count returned {other:?}"),
    }
}

fn array_objects() -> Vec<Value> {
    vec![
        json!({"arrayProperty": ["foo", "bar", "baz"]}),
        json!({"arrayProperty": ["foo", "zang", "zong"]}),
        json!({"arrayProperty": ["zing", "zang", "zong"]}),
    ]
}

#[rstest]
#[case("[arrayProperty *= bar]", &[0])]
#[case("[arrayProperty *= foo]", &[0, 1])]
#[case("[arrayProperty *= ding]", &[])]
#[case("[arrayProperty *= fo]", &[])]
#[case("[arrayProperty *=~ bAr]", &[0])]
#[case("[arrayProperty *=~ fOo]", &[0, 1])]
#[case("[arrayProperty *=~ dIng]", &[])]
#[case("[arrayProperty *=~ fO]", &[])]
#[case("[arrayProperty ^= zing]", &[2])]
#[case("[arrayProperty ^= foo]", &[0, 1])]
#[case("[arrayProperty ^= ding]", &[])]
#[case("[arrayProperty ^= zi]", &[])]
#[case("[arrayProperty ^= bar]", &[])]
#[case("[arrayProperty ^=~ zIng]", &[2])]
#[case("[arrayProperty ^=~ fOo]", &[0, 1])]
#[case("[arrayProperty ^=~ dIng]", &[])]
#[case("[arrayProperty ^=~ zI]", &[])]
#[case("[arrayProperty ^=~ bAr]", &[])]
#[case("[arrayProperty $= baz]", &[0])]
#[case("[arrayProperty $= zong]", &[1, 2])]
#[case("[arrayProperty $= ding]", &[])]
#[case("[arrayProperty $= az]", &[])]
#[case("[arrayProperty $= bar]", &[])]
#[case("[arrayProperty $=~ bAz]", &[0])]
#[case("[arrayProperty $=~ zOng]", &[1, 2])]
#[case("[arrayProperty $=~ dIng]", &[])]
#[case("[arrayProperty $=~ aZ]", &[])]
#[case("[arrayProperty $=~ bAr]", &[])]
fn test_filter_on_list_properties(#[case] selector: &str, #[case] expected: &[usize]) {
    let source = array_objects();
    let expected: Vec<Value> = expected.iter().map(|&i| source[i].clone()).collect();

    let result = query(source).filter(selector).unwrap().into_vec().unwrap();
    assert_eq!(result, expected);
}

#[rstest]
#[case("[stringProperty $= 2]", &[0])]
#[case("[stringProperty *= 33]", &[2])]
#[case("[stringProperty *= \"n33g\"]", &[2])]
#[case("[stringProperty $= \"2\"]", &[0])]
#[case("[stringProperty *= 2]", &[0])]
fn test_numbers_match_as_text(#[case] selector: &str, #[case] expected: &[usize]) {
    let source = vec![
        json!({"stringProperty": "1foo bar baz2"}),
        json!({"stringProperty": "1zing zang zong"}),
        json!({"stringProperty": "fing', 'fan33g', 'fong"}),
    ];
    let expected: Vec<Value> = expected.iter().map(|&i| source[i].clone()).collect();

    let result = query(source).filter(selector).unwrap().into_vec().unwrap();
    assert_eq!(result, expected);
}

#[test]
fn test_empty_selector_keeps_everything() {
    let source = objects(&[1, 2, 3]);
    let result = query(source.clone()).filter("").unwrap().into_vec().unwrap();
    assert_eq!(result, source);
}

#[test]
fn test_filter_preserves_context_order() {
    let source = objects(&[7, 6, 5]);
    let result = query(source)
        .filter("[aNumber], [isHidden]")
        .unwrap()
        .into_vec()
        .unwrap();
    assert_eq!(result, objects(&[7, 6, 5]));
}

#[test]
fn test_selector_syntax_error_surfaces_on_evaluation() {
    let filtered = query(objects(&[1])).filter("[myProperty").unwrap();
    let err = filtered.into_vec().unwrap_err();
    assert!(matches!(
        err,
        flowquery::QueryError::Selector(fizzle::ParseError::Syntax { position: 1, .. })
    ));
}

#[test]
fn test_non_string_selector_is_invalid() {
    let query = query(objects(&[1]));
    let Invocation::Deferred(filtered) = query.invoke("filter", vec![json!(5)]).unwrap() else {
        panic!("filter is not final");
    };
    assert!(matches!(
        filtered.into_vec(),
        Err(flowquery::QueryError::InvalidArgument { .. })
    ));
}
