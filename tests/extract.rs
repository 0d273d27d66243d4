use json_get::{
    extract, ExtractError, Extraction, Flow, JsonSessionObserver, JsonSessionParser,
    ParseOutcome, ParseSession, Phase, ScalarValue, SHORT_STRING_LIMIT,
};
use json_session::{JsonPrimitiveValue, Location};
use serde_json::json;

fn found(doc: &[u8], key: &str) -> ScalarValue {
    match extract(doc, key.as_bytes()).unwrap() {
        Extraction::Found(value) => value,
        Extraction::NotFound => panic!("{key} not found"),
    }
}

fn found_string(doc: &[u8], key: &str) -> Vec<u8> {
    found(doc, key)
        .as_bytes()
        .expect("string value")
        .to_vec()
}

#[test]
fn flat_object() {
    let doc = json!({"a": 1, "b": "x", "c": true, "d": null, "e": 2.5}).to_string();
    let doc = doc.as_bytes();
    assert_eq!(found(doc, "a"), ScalarValue::Integer(1));
    assert_eq!(found_string(doc, "b"), b"x");
    assert_eq!(found(doc, "c"), ScalarValue::Bool(true));
    assert_eq!(found(doc, "d"), ScalarValue::Null);
    assert_eq!(found(doc, "e"), ScalarValue::Double(2.5));
}

#[test]
fn absent_keys_are_not_found() {
    let docs = [
        json!({}),
        json!([]),
        json!({"a": 1, "b": [1, 2, {"c": 3}]}),
        json!([{"a": 1}, {"b": {"d": 4}}]),
        json!("just a string"),
        json!(42),
    ];
    for doc in &docs {
        let doc = doc.to_string();
        for key in ["x", "A", "", "a "] {
            assert_eq!(
                extract(doc.as_bytes(), key.as_bytes()).unwrap(),
                Extraction::NotFound,
                "{key:?} in {doc}"
            );
        }
    }
}

#[test]
fn null_and_absent_look_the_same() {
    let doc = br#"{"d": null}"#;
    assert!(extract(doc, b"d").unwrap().is_null());
    assert!(extract(doc, b"z").unwrap().is_null());
}

#[test]
fn depth_rule() {
    assert_eq!(found(br#"{"outer": {"a": 1}}"#, "a"), ScalarValue::Integer(1));
    assert_eq!(found(br#"[{"a": 1}]"#, "a"), ScalarValue::Integer(1));
    assert_eq!(
        extract(br#"{"x": {"y": {"a": 1}}}"#, b"a").unwrap(),
        Extraction::NotFound
    );
    assert_eq!(
        extract(br#"{"x": [{"a": 1}]}"#, b"a").unwrap(),
        Extraction::NotFound
    );
    // Deep keys are skipped, a later shallow one still matches.
    assert_eq!(
        found(br#"{"x": {"y": {"a": 1}}, "a": 2}"#, "a"),
        ScalarValue::Integer(2)
    );
}

#[test]
fn first_match_wins() {
    assert_eq!(found(br#"{"a": 1, "a": 2}"#, "a"), ScalarValue::Integer(1));
    assert_eq!(
        found(br#"{"inner": {"b": 1}, "b": 2}"#, "b"),
        ScalarValue::Integer(1)
    );
}

#[test]
fn composite_values_are_not_returned() {
    let doc = br#"{"a": {"b": 1}, "c": [1, 2]}"#;
    assert_eq!(extract(doc, b"a").unwrap(), Extraction::NotFound);
    assert_eq!(extract(doc, b"c").unwrap(), Extraction::NotFound);
}

#[test]
fn idempotent() {
    let doc = json!({"k": "v".repeat(400), "n": -3}).to_string();
    for key in [&b"k"[..], &b"n"[..], &b"missing"[..]] {
        let first = extract(doc.as_bytes(), key).unwrap();
        let second = extract(doc.as_bytes(), key).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn string_length_boundary() {
    let inline = "s".repeat(SHORT_STRING_LIMIT - 1);
    let heap = "s".repeat(SHORT_STRING_LIMIT);
    let doc = json!({"inline": &inline, "heap": &heap}).to_string();

    match found(doc.as_bytes(), "inline") {
        ScalarValue::ShortString(s) => {
            assert!(!s.spilled());
            assert_eq!(&s[..], inline.as_bytes());
        }
        other => panic!("expected ShortString, got {other:?}"),
    }
    match found(doc.as_bytes(), "heap") {
        ScalarValue::LongString(s) => assert_eq!(s, heap.as_bytes()),
        other => panic!("expected LongString, got {other:?}"),
    }
}

#[test]
fn strings_pass_through_without_utf8_check() {
    assert_eq!(found_string(b"{\"a\": \"\xff\xfe\"}", "a"), b"\xff\xfe");
    assert_eq!(found_string(br#"{"a": "x\nyA"}"#, "a"), b"x\nyA");
}

#[test]
fn keys_with_escapes_match_decoded_form() {
    assert_eq!(found(br#"{"a\"b": 5}"#, "a\"b"), ScalarValue::Integer(5));
}

#[test]
fn malformed_input_is_a_hard_error() {
    for doc in [
        &br#"{"a": "#[..],
        &br#"{"a" 1}"#[..],
        &br#"{"b": 1,, "a": 2}"#[..],
        &br#"{"a": tru}"#[..],
        &b""[..],
    ] {
        match extract(doc, b"a") {
            Err(ExtractError::Malformed(_)) => {}
            other => panic!("expected a parse error for {doc:?}, got {other:?}"),
        }
    }

    // Truncated inside a long string value.
    let truncated = format!(r#"{{"a": "{}"#, "z".repeat(1000));
    assert!(extract(truncated.as_bytes(), b"a").is_err());
}

#[test]
fn garbage_after_the_answer_is_never_seen() {
    assert_eq!(found(br#"{"a": 1, this is not json"#, "a"), ScalarValue::Integer(1));
    assert_eq!(found(br#"{"a": "v"} trailing"#, "a").as_bytes(), Some(&b"v"[..]));
    // Without a match the whole document is validated.
    assert!(extract(br#"{"b": 1} trailing"#, b"a").is_err());
}

#[test]
fn numbers() {
    assert_eq!(
        found(br#"{"a": -9223372036854775808}"#, "a"),
        ScalarValue::Integer(i64::MIN)
    );
    assert_eq!(found(br#"{"a": 1e2}"#, "a"), ScalarValue::Double(100.0));
    assert!(extract(br#"{"a": 9223372036854775808}"#, b"a").is_err());
}

/// Wraps a session and counts what arrives once the answer is known.
struct Instrumented<'k> {
    session: ParseSession<'k>,
    events_after_done: usize,
    scalars_after_done: usize,
}

impl<'k> Instrumented<'k> {
    fn new(key: &'k [u8]) -> Self {
        Instrumented {
            session: ParseSession::new(key),
            events_after_done: 0,
            scalars_after_done: 0,
        }
    }

    fn note(&mut self) {
        if self.session.phase() == Phase::Done {
            self.events_after_done += 1;
        }
    }
}

impl<'a, 'k> JsonSessionObserver<'a> for Instrumented<'k> {
    fn begin_object(&mut self, location: Location) -> Flow {
        self.note();
        self.session.begin_object(location)
    }

    fn end_object(&mut self, location: Location) -> Flow {
        self.note();
        self.session.end_object(location)
    }

    fn begin_array(&mut self, location: Location) -> Flow {
        self.note();
        self.session.begin_array(location)
    }

    fn end_array(&mut self, location: Location) -> Flow {
        self.note();
        self.session.end_array(location)
    }

    fn object_property(&mut self, location: Location, property_key: &[u8]) -> Flow {
        self.note();
        self.session.object_property(location, property_key)
    }

    fn primitive_value(
        &mut self,
        value: JsonPrimitiveValue<'a>,
        start: Location,
        end: Location,
    ) -> Flow {
        if self.session.phase() == Phase::Done {
            self.scalars_after_done += 1;
        }
        self.note();
        self.session.primitive_value(value, start, end)
    }
}

#[test]
fn parsing_stops_at_the_answer() {
    let doc = br#"{"first": 1, "b": 2, "c": [3, 4, 5], "d": {"e": 6}}"#;
    let mut observer = Instrumented::new(b"first");
    let outcome = JsonSessionParser::new(doc)
        .parse(&mut observer)
        .unwrap();
    assert_eq!(outcome, ParseOutcome::Stopped);
    assert_eq!(observer.scalars_after_done, 0);
    assert_eq!(observer.events_after_done, 0);
    assert_eq!(
        observer.session.into_extraction(),
        Extraction::Found(ScalarValue::Integer(1))
    );
}

#[test]
fn parsing_runs_to_the_end_without_a_match() {
    let doc = json!({"a": 1, "b": [2, 3]}).to_string();
    let mut observer = Instrumented::new(b"zzz");
    let outcome = JsonSessionParser::new(doc.as_bytes())
        .parse(&mut observer)
        .unwrap();
    assert_eq!(outcome, ParseOutcome::Completed);
    assert_eq!(observer.session.phase(), Phase::Seeking);
}
