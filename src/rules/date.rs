//! Russian dates and colloquial times.
//!
//! [`DateGrammar::base`] recognises calendar dates ("03.02.2015",
//! "3 марта 2015 года", "марта 2015", "2015 год", "300 г. до н.э.").
//! [`DateGrammar::extend_with_colloquial_time`] appends clock times and time
//! words ("15:25", "через 2 часа", "25 мин", "следующих выходных", "завтра")
//! to the same alternation, after the calendar forms.
//!
//! All alternatives fold into one `Date` fact:
//!
//! ```text
//! Date(year, month, day, time*, current_era = true)
//! ```
//!
//! `time` is repeatable: "15:25" yields `time = [15, 25]`.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveTime};

use crate::api::Extractor;
use crate::error::Result;
use crate::fact::{Fact, FactSchema, Value, attribute, int};
use crate::grammar::Rule;
use crate::predicate::{Predicate, and, between, dictionary, eq, gte, in_set, lte, normalized};
use crate::rules::tokenizer::normalize;

const MONTH_NAMES: &[&str] = &[
    "январь", "января", "январе", "февраль", "февраля", "феврале", "март", "марта", "марте", "апрель", "апреля",
    "апреле", "май", "мая", "мае", "июнь", "июня", "июне", "июль", "июля", "июле", "август", "августа", "августе",
    "сентябрь", "сентября", "сентябре", "октябрь", "октября", "октябре", "ноябрь", "ноября", "ноябре", "декабрь",
    "декабря", "декабре",
];

// Checked in order; "март" must precede "ма".
const MONTH_STEMS: &[&str] =
    &["январ", "феврал", "март", "апрел", "ма", "июн", "июл", "август", "сентябр", "октябр", "ноябр", "декабр"];

const TIME_WORDS: &[&str] = &[
    "завтра", "сегодня", "вчера", "день", "дня", "днем", "вечер", "вечера", "вечером", "утро", "утра", "утром", "ночь",
    "ночи", "ночью", "сейчас", "через", "один", "одна", "два", "две", "три", "четыре", "пять",
];

/// The date grammar: one `Date` schema and the alternation producing it.
#[derive(Debug, Clone)]
pub struct DateGrammar {
    pub schema: Arc<FactSchema>,
    /// `or![..]` of every date form, interpreted as `Date`. Extendable.
    pub date: Rule,
}

impl DateGrammar {
    /// Calendar dates only.
    pub fn base() -> Result<Self> {
        let schema = FactSchema::builder("Date")
            .attribute("year")
            .attribute("month")
            .attribute("day")
            .repeatable("time")
            .with_default("current_era", true)
            .build()?;

        let day = between(1, 31).interpretation(attribute(&schema, "day")?.custom(int));
        let month = between(1, 12).interpretation(attribute(&schema, "month")?.custom(int));
        let month_name = Rule::leaf(dictionary(MONTH_NAMES.iter().copied()))
            .interpretation(attribute(&schema, "month")?.custom(month_number));
        let year = between(1, 2100).interpretation(attribute(&schema, "year")?.custom(int));

        let dot = eq(".");
        let year_word = or![
            Rule::leaf(dictionary(["год", "года", "году"])),
            rule![normalized("г"), Rule::leaf(dot.clone()).optional()]?,
        ]?;
        let era = rule![normalized("до"), normalized("н"), dot.clone(), normalized("э"), Rule::leaf(dot).optional()]?
            .interpretation(attribute(&schema, "current_era")?.constant(false));
        let full_year = rule![&year, year_word.optional(), era.optional()]?;
        let sep = in_set([".", "/", "-"]);

        let date = or![
            rule![&day, sep.clone(), &month, sep, &year]?,
            rule![&day, &month_name, full_year.optional()]?,
            rule![&month_name, &full_year]?,
            rule![&year, &year_word, era.optional()]?,
            rule![&year, &era]?,
        ]?
        .interpretation(&schema)
        .named("DATE");

        Ok(DateGrammar { schema, date })
    }

    /// Calendar dates followed by the colloquial time forms.
    pub fn new() -> Result<Self> {
        let grammar = Self::base()?;
        grammar.extend_with_colloquial_time()?;
        Ok(grammar)
    }

    /// Append the time forms to the date alternation. Returns the new number
    /// of alternatives.
    pub fn extend_with_colloquial_time(&self) -> Result<usize> {
        let time = attribute(&self.schema, "time")?;
        let hours = and([gte(0), lte(23)]).interpretation(time.custom(int));
        let minutes = and([gte(0), lte(59)]).interpretation(time.custom(int));
        let seconds = and([gte(0), lte(59)]).interpretation(time.custom(int));

        let hours_word = or![rule!["ч", eq(".").optional()]?, dictionary(["час", "часа", "часов", "часу"])]?;
        let minutes_word = or![
            rule!["мин", eq(".").optional()]?,
            rule!["м", eq(".").optional()]?,
            dictionary(["минута", "минуты", "минут", "минуту"]),
        ]?;
        let word_after = Rule::leaf(normalized("через"));
        let word_in = Rule::leaf(normalized("в"));
        let time_words = Rule::leaf(time_words());

        self.date.extend([
            rule![word_after.optional(), hours.optional(), &hours_word]?,
            rule![&hours_word, &word_after, &time_words]?,
            rule![&word_after, &time_words, &hours_word]?,
            rule![word_after.optional(), minutes.optional(), &minutes_word]?,
            rule![&minutes_word, word_after.optional(), minutes.optional()]?,
            rule![normalized("следующих"), normalized("выходных")]?,
            rule![&time_words, &word_in, &hours, ":", &minutes]?,
            rule![&hours, ":", &minutes, normalized(":").optional(), seconds.optional()]?,
            time_words,
        ])
    }

    pub fn rule(&self) -> Rule {
        self.date.clone()
    }

    pub fn extractor(&self) -> Result<Extractor> {
        Extractor::new(self.rule())
    }
}

fn time_words() -> Predicate {
    dictionary(TIME_WORDS.iter().copied())
}

/// Month number (1-12) of a month name in any of the recognised forms.
pub fn month_number(text: &str) -> Option<Value> {
    let text = normalize(text);
    MONTH_STEMS.iter().position(|stem| text.starts_with(stem)).map(|i| Value::Int(i as i64 + 1))
}

/// Calendar values of a `Date` fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDate {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
}

/// Turn a `Date` fact into calendar values.
///
/// A missing year is taken from `today`; a missing day is the first of the
/// month, a missing month January. A year before the current era maps to
/// the proleptic year `1 - year`. `time` is read as `[hour, minute, second]`.
///
/// Returns `None` when the fact carries neither a date part nor a time, or
/// when the parts do not form a valid date or time.
pub fn resolve(fact: &Fact, today: NaiveDate) -> Option<ResolvedDate> {
    let number = |name: &str| fact.get(name).and_then(Value::as_int);
    let (year, month, day) = (number("year"), number("month"), number("day"));
    let current_era = fact.get("current_era").and_then(Value::as_bool).unwrap_or(true);

    let date = if year.is_some() || month.is_some() || day.is_some() {
        let year = match year {
            Some(y) if current_era => i32::try_from(y).ok()?,
            Some(y) => 1i32.checked_sub(i32::try_from(y).ok()?)?,
            None => today.year(),
        };
        let month = u32::try_from(month.unwrap_or(1)).ok()?;
        let day = u32::try_from(day.unwrap_or(1)).ok()?;
        Some(NaiveDate::from_ymd_opt(year, month, day)?)
    } else {
        None
    };

    let parts: Vec<u32> =
        fact.get_all("time").iter().filter_map(Value::as_int).filter_map(|v| u32::try_from(v).ok()).collect();
    let time = match parts.as_slice() {
        [] => None,
        [h] => Some(NaiveTime::from_hms_opt(*h, 0, 0)?),
        [h, m] => Some(NaiveTime::from_hms_opt(*h, *m, 0)?),
        [h, m, s, ..] => Some(NaiveTime::from_hms_opt(*h, *m, *s)?),
    };

    if date.is_none() && time.is_none() {
        return None;
    }
    Some(ResolvedDate { date, time })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::tokenizer::SimpleTokenizer;
    use crate::token::Tokenizer;

    fn dates(grammar: &DateGrammar, text: &str) -> Vec<Fact> {
        let tokens = SimpleTokenizer.tokenize(text);
        grammar.extractor().unwrap().extract(&tokens).into_iter().filter_map(|m| m.fact().cloned()).collect()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn month_names_map_to_numbers() {
        assert_eq!(month_number("Марта"), Some(Value::Int(3)));
        assert_eq!(month_number("мая"), Some(Value::Int(5)));
        assert_eq!(month_number("декабре"), Some(Value::Int(12)));
        assert_eq!(month_number("понедельник"), None);
    }

    #[test]
    fn calendar_forms() {
        let grammar = DateGrammar::base().unwrap();

        let numeric = &dates(&grammar, "родился 03.02.2015")[0];
        assert_eq!(numeric.get("day"), Some(&Value::Int(3)));
        assert_eq!(numeric.get("month"), Some(&Value::Int(2)));
        assert_eq!(numeric.get("year"), Some(&Value::Int(2015)));

        let named = &dates(&grammar, "3 марта 2015 года")[0];
        assert_eq!(named.get("month"), Some(&Value::Int(3)));
        assert_eq!(named.get("year"), Some(&Value::Int(2015)));

        let bc = &dates(&grammar, "в 300 г. до н.э.")[0];
        assert_eq!(bc.get("year"), Some(&Value::Int(300)));
        assert_eq!(bc.get("current_era"), Some(&Value::Bool(false)));
    }

    #[test]
    fn base_grammar_ignores_clock_times() {
        let grammar = DateGrammar::base().unwrap();
        assert!(dates(&grammar, "к 15:25").is_empty());
    }

    #[test]
    fn extension_keeps_calendar_forms_first() {
        let grammar = DateGrammar::base().unwrap();
        let before = grammar.date.alternatives().unwrap().len();
        let after = grammar.extend_with_colloquial_time().unwrap();
        assert_eq!(after, before + 9);

        let named = &dates(&grammar, "3 марта")[0];
        assert_eq!(named.get("day"), Some(&Value::Int(3)));
        assert!(named.get_all("time").is_empty());
    }

    #[test]
    fn colloquial_forms() {
        let grammar = DateGrammar::new().unwrap();

        let in_hours = dates(&grammar, "через 2 часа");
        assert_eq!(in_hours.len(), 1);
        assert_eq!(in_hours[0].get_all("time"), &[Value::Int(2)]);

        let minutes = dates(&grammar, "25 мин.");
        assert_eq!(minutes[0].get_all("time"), &[Value::Int(25)]);

        let full = dates(&grammar, "сегодня в 9:05");
        assert_eq!(full.len(), 1);
        assert_eq!(full[0].get_all("time"), &[Value::Int(9), Value::Int(5)]);

        let seconds = dates(&grammar, "12:30:15");
        assert_eq!(seconds[0].get_all("time"), &[Value::Int(12), Value::Int(30), Value::Int(15)]);

        assert_eq!(dates(&grammar, "до следующих выходных").len(), 1);
    }

    #[test]
    fn resolve_full_date_and_time() {
        let grammar = DateGrammar::new().unwrap();
        let fact = &dates(&grammar, "3 марта 2015 года")[0];
        let resolved = resolve(fact, today()).unwrap();
        assert_eq!(resolved.date, NaiveDate::from_ymd_opt(2015, 3, 3));
        assert_eq!(resolved.time, None);

        let fact = &dates(&grammar, "15:25")[0];
        let resolved = resolve(fact, today()).unwrap();
        assert_eq!(resolved.date, None);
        assert_eq!(resolved.time, NaiveTime::from_hms_opt(15, 25, 0));
    }

    #[test]
    fn resolve_fills_missing_parts() {
        let grammar = DateGrammar::new().unwrap();
        let fact = &dates(&grammar, "5 мая")[0];
        assert_eq!(resolve(fact, today()).unwrap().date, NaiveDate::from_ymd_opt(2024, 5, 5));

        let fact = &dates(&grammar, "300 г. до н.э.")[0];
        assert_eq!(resolve(fact, today()).unwrap().date, NaiveDate::from_ymd_opt(-299, 1, 1));
    }

    #[test]
    fn resolve_rejects_empty_and_invalid_facts() {
        let grammar = DateGrammar::new().unwrap();
        let bare = &dates(&grammar, "завтра")[0];
        assert_eq!(resolve(bare, today()), None);

        let invalid = Fact::new(&grammar.schema).set("day", 31).unwrap().set("month", 2).unwrap();
        assert_eq!(resolve(&invalid, today()), None);

        let ancient = Fact::new(&grammar.schema)
            .set("year", i64::from(i32::MIN))
            .unwrap()
            .set("current_era", false)
            .unwrap();
        assert_eq!(resolve(&ancient, today()), None);
    }
}
