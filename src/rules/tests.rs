use crate::api::{Match, Span};
use crate::fact::{Fact, Value};
use crate::rules::address::AddressGrammar;
use crate::rules::date::DateGrammar;
use crate::rules::tokenizer::SimpleTokenizer;
use crate::token::{Token, Tokenizer};

fn run(extractor: &crate::Extractor, text: &str) -> (Vec<Token>, Vec<Match>) {
    let tokens = SimpleTokenizer.tokenize(text);
    let found = extractor.extract(&tokens);
    (tokens, found)
}

fn parts(address: &Fact) -> Vec<&Fact> {
    address.get_all("parts").iter().filter_map(Value::as_fact).collect()
}

fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

#[test]
fn metro_station_after_metro_word() {
    let grammar = AddressGrammar::new().unwrap();
    let (tokens, found) = run(&grammar.extractor().unwrap(), "пошли к метро Щукинская");

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].span, Span { start: 2, end: 4 });
    assert_eq!(found[0].text(&tokens), "метро Щукинская");

    let address = found[0].fact().unwrap();
    assert_eq!(address.name(), "Address");
    let metro = parts(address);
    assert_eq!(metro.len(), 1);
    assert_eq!(metro[0].name(), "Metro");
    assert_eq!(metro[0].get("type"), Some(&text("метро")));
    assert_eq!(metro[0].get("name"), Some(&text("щукинская")));
}

#[test]
fn address_examples() {
    let grammar = AddressGrammar::new().unwrap();
    let extractor = grammar.extractor().unwrap();

    // (input, expected part schemas in order)
    let cases: Vec<(&str, Vec<&str>)> = vec![
        ("живу в г. Москва, ул. Ленина, д. 7, кв. 15", vec!["Settlement", "Street", "Building", "Apartment"]),
        ("Тверская улица", vec!["Street"]),
        ("проспект Мира дом 12", vec!["Street", "Building"]),
        ("встретимся у м. Юго-Западная", vec!["Metro"]),
        ("Александровский сад метро", vec!["Metro"]),
        ("посёлок Южный, переулок Садовый", vec!["Settlement", "Street"]),
    ];

    for (input, expected) in cases {
        let (_, found) = run(&extractor, input);
        assert_eq!(found.len(), 1, "expected one address in {input:?}, got {found:?}");
        let address = found[0].fact().unwrap();
        let names: Vec<&str> = parts(address).iter().map(|f| f.name()).collect();
        assert_eq!(names, expected, "parts of {input:?}");
    }
}

#[test]
fn street_and_building_values() {
    let grammar = AddressGrammar::new().unwrap();
    let (_, found) = run(&grammar.extractor().unwrap(), "ул. Ленина, д. 7");
    let address = found[0].fact().unwrap();
    let parts = parts(address);

    assert_eq!(parts[0].get("type"), Some(&text("улица")));
    assert_eq!(parts[0].get("name"), Some(&text("Ленина")));
    assert_eq!(parts[1].get("type"), Some(&text("дом")));
    assert_eq!(parts[1].get("number"), Some(&Value::Int(7)));
}

#[test]
fn hyphenated_station_name_is_normalized() {
    let grammar = AddressGrammar::new().unwrap();
    let (_, found) = run(&grammar.extractor().unwrap(), "м. Юго-Западная");
    let metro = parts(found[0].fact().unwrap())[0].clone();
    assert_eq!(metro.get("name"), Some(&text("юго-западная")));
    assert_eq!(metro.get("type"), Some(&text("метро")));
}

#[test]
fn metro_extension_is_monotonic() {
    let grammar = AddressGrammar::base().unwrap();
    grammar.define_address().unwrap();
    let extractor = grammar.extractor().unwrap();
    let text = "ул. Ленина, д. 7 или метро Щукинская";

    let (_, before) = run(&extractor, text);
    assert_eq!(before.len(), 1);

    grammar.extend_with_metro().unwrap();
    let (_, after) = run(&extractor, text);
    assert_eq!(after.len(), 2);
    assert_eq!(after[0], before[0]);
    assert_eq!(parts(after[1].fact().unwrap())[0].name(), "Metro");
}

#[test]
fn hour_minute_time() {
    let grammar = DateGrammar::new().unwrap();
    let (tokens, found) = run(&grammar.extractor().unwrap(), "15:25");

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].text(&tokens), "15:25");
    let date = found[0].fact().unwrap();
    assert_eq!(date.name(), "Date");
    assert_eq!(date.get_all("time"), &[Value::Int(15), Value::Int(25)]);
    assert_eq!(date.get("current_era"), Some(&Value::Bool(true)));
}

#[test]
fn out_of_range_time_is_not_a_date() {
    let grammar = DateGrammar::new().unwrap();
    let (_, found) = run(&grammar.extractor().unwrap(), "99:99");
    assert!(found.is_empty());
}

#[test]
fn date_examples() {
    let grammar = DateGrammar::new().unwrap();
    let extractor = grammar.extractor().unwrap();

    // (input, matched texts)
    let cases: Vec<(&str, Vec<&str>)> = vec![
        ("пойдем завтра в кино к 15:25", vec!["завтра", "15:25"]),
        ("созвонимся через 2 часа", vec!["через 2 часа"]),
        ("родился 3 марта 2015 года", vec!["3 марта 2015 года"]),
        ("до следующих выходных", vec!["следующих выходных"]),
        ("сегодня в 9:05 или 12:30:15", vec!["сегодня в 9:05", "12:30:15"]),
    ];

    for (input, expected) in cases {
        let (tokens, found) = run(&extractor, input);
        let texts: Vec<String> = found.iter().map(|m| m.text(&tokens)).collect();
        assert_eq!(texts, expected, "matches in {input:?}");
    }
}

#[test]
fn grammars_can_be_shared_across_threads() {
    let grammar = DateGrammar::new().unwrap();
    let extractor = std::sync::Arc::new(grammar.extractor().unwrap());

    let handles: Vec<_> = ["15:25", "через 2 часа"]
        .into_iter()
        .map(|text| {
            let extractor = std::sync::Arc::clone(&extractor);
            std::thread::spawn(move || run(&extractor, text).1.len())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 1);
    }
}
