//! Russian street addresses.
//!
//! [`AddressGrammar::base`] builds the reusable pieces: separators, the
//! settlement level that may precede a street, the street level itself, the
//! building and the apartment that may follow. `STREET_LEVEL` is an open
//! alternation; [`AddressGrammar::extend_with_metro`] appends metro stations
//! to it, after which every grammar embedding `STREET_LEVEL` (the `ADDRESS`
//! forward included) also recognises "метро Щукинская".
//!
//! ```text
//! ADDRESS = ( PRE_STREET_LEVEL SEP? )*      -> Address.parts
//!           STREET_LEVEL                    -> Address.parts
//!           ( SEP? DOM )?                   -> Address.parts
//!           ( SEP? POST_STREET_LEVEL )*     -> Address.parts
//! ```

use std::sync::Arc;

use crate::api::Extractor;
use crate::error::Result;
use crate::fact::{FactSchema, attribute, int};
use crate::grammar::{Forward, Rule};
use crate::pipeline::{Pipeline, PipelineKey};
use crate::predicate::{between, caseless, dictionary, eq, in_set, normalized, or, shape};
use crate::rules::tokenizer::SimpleTokenizer;
use crate::token::TokenShape;

/// Stations recognised by the metro extension.
pub const METRO_STATIONS: &[&str] = &[
    "Автозаводская",
    "Щукинская",
    "Академическая",
    "Электрозаводская",
    "Александровский сад",
    "Юго-Западная",
    "Алексеевская",
    "Южная",
    "Алма-Атинская",
    "Ясенево",
];

/// Fact schemas produced by the address grammar.
#[derive(Debug, Clone)]
pub struct AddressSchemas {
    pub street: Arc<FactSchema>,
    pub settlement: Arc<FactSchema>,
    pub building: Arc<FactSchema>,
    pub apartment: Arc<FactSchema>,
    pub metro: Arc<FactSchema>,
    pub address: Arc<FactSchema>,
}

impl AddressSchemas {
    fn new() -> Result<Self> {
        let named = |name: &str| FactSchema::builder(name).attribute("name").attribute("type").build();
        let numbered = |name: &str| FactSchema::builder(name).attribute("number").attribute("type").build();
        Ok(AddressSchemas {
            street: named("Street")?,
            settlement: named("Settlement")?,
            building: numbered("Building")?,
            apartment: numbered("Apartment")?,
            metro: named("Metro")?,
            address: FactSchema::builder("Address").repeatable("parts").build()?,
        })
    }
}

/// The address grammar's named pieces.
///
/// Every field is a shared handle; cloning the struct does not copy rules.
#[derive(Debug, Clone)]
pub struct AddressGrammar {
    pub schemas: AddressSchemas,
    /// `,` or `-` between address parts.
    pub sep: Rule,
    pub dot: Rule,
    /// Settlement ("г. Москва", "посёлок Южный").
    pub pre_street_level: Rule,
    /// Open alternation of street-level places.
    pub street_level: Rule,
    /// Building ("д. 7", "дом 12").
    pub dom: Rule,
    /// Apartment ("кв. 5").
    pub post_street_level: Rule,
    /// Whole address; defined once by [`AddressGrammar::define_address`].
    pub address: Forward,
}

impl AddressGrammar {
    /// Base pieces only: no metro, `ADDRESS` still undefined.
    pub fn base() -> Result<Self> {
        let schemas = AddressSchemas::new()?;
        let sep = Rule::leaf(in_set([",", "-"])).named("SEP");
        let dot = Rule::literal(".").named("DOT");
        let name = title_words()?;

        let settlement_type = attribute(&schemas.settlement, "type")?;
        let settlement_words = or![
            kind_word(&["город", "города", "городе"], &["г"], &dot)?.interpretation(settlement_type.constant("город")),
            kind_word(&["поселок", "поселка", "поселке"], &["пос", "п"], &dot)?
                .interpretation(settlement_type.constant("поселок")),
            kind_word(&["деревня", "деревни", "деревне"], &["дер"], &dot)?
                .interpretation(settlement_type.constant("деревня")),
        ]?;
        let settlement = rule![settlement_words, name.interpretation(attribute(&schemas.settlement, "name")?.raw())]?
            .interpretation(&schemas.settlement);
        let pre_street_level = or![settlement]?.named("PRE_STREET_LEVEL");

        let street = street(&schemas.street, &dot, &name)?;
        let street_level = or![street]?.named("STREET_LEVEL");

        let dom = numbered(&schemas.building, &["дом", "дома", "доме"], &["д"], "дом", &dot)?.named("DOM");
        let apartment = numbered(&schemas.apartment, &["квартира", "квартиры", "квартире"], &["кв"], "квартира", &dot)?;
        let post_street_level = or![apartment]?.named("POST_STREET_LEVEL");

        Ok(AddressGrammar {
            schemas,
            sep,
            dot,
            pre_street_level,
            street_level,
            dom,
            post_street_level,
            address: Forward::new("ADDRESS"),
        })
    }

    /// Base pieces, the metro extension and the assembled `ADDRESS`.
    pub fn new() -> Result<Self> {
        let grammar = Self::base()?;
        grammar.extend_with_metro()?;
        grammar.define_address()?;
        Ok(grammar)
    }

    /// Append metro stations to `STREET_LEVEL` and return the `METRO` rule.
    ///
    /// The station name is the pipeline match's normalized text; the type is
    /// always "метро".
    pub fn extend_with_metro(&self) -> Result<Rule> {
        let metro = &self.schemas.metro;
        let stations = Pipeline::from_text(METRO_STATIONS, &SimpleTokenizer, PipelineKey::Normalized)?;
        let stations = Rule::pipeline(stations).interpretation(attribute(metro, "name")?.normalized());

        let words = or![Rule::leaf(normalized("метро")), rule![caseless("м"), self.dot.optional()]?]?
            .interpretation(attribute(metro, "type")?.constant("метро"));

        let rule = or![rule![words.optional(), &stations]?, rule![&stations, words.optional()]?]?
            .interpretation(metro)
            .named("METRO");
        self.street_level.extend([rule.clone()])?;
        Ok(rule)
    }

    /// Define the `ADDRESS` forward from the current pieces.
    pub fn define_address(&self) -> Result<()> {
        let parts = attribute(&self.schemas.address, "parts")?;
        let part = |rule: &Rule| rule.interpretation(parts.raw());

        let rule = rule![
            rule![part(&self.pre_street_level), self.sep.optional()]?.optional().repeatable(),
            part(&self.street_level),
            rule![self.sep.optional(), part(&self.dom)]?.optional(),
            rule![self.sep.optional(), part(&self.post_street_level)]?.optional().repeatable(),
        ]?
        .interpretation(&self.schemas.address);
        self.address.define(rule)
    }

    /// Root rule referencing `ADDRESS`.
    pub fn rule(&self) -> Rule {
        Rule::forward(&self.address)
    }

    pub fn extractor(&self) -> Result<Extractor> {
        Extractor::new(self.rule())
    }
}

/// Capitalised Cyrillic words, possibly hyphenated: "Ленина", "Юго-Западная".
fn title_words() -> Result<Rule> {
    let title = Rule::leaf(shape(TokenShape::TITLE | TokenShape::CYRILLIC));
    let tail = Rule::leaf(shape(TokenShape::CYRILLIC | TokenShape::ALPHA));
    let word = rule![&title, rule!["-", tail]?.optional()]?;
    word.repeat(1, Some(3))
}

/// A kind word: one of the full forms, or an abbreviation with an optional
/// trailing dot.
fn kind_word(full: &[&str], short: &[&str], dot: &Rule) -> Result<Rule> {
    or![Rule::leaf(dictionary(full.iter().copied())), rule![dictionary(short.iter().copied()), dot.optional()]?]
}

fn street(schema: &Arc<FactSchema>, dot: &Rule, name: &Rule) -> Result<Rule> {
    let kind = attribute(schema, "type")?;
    let typed = |full: &[&str], short: &[&str], value: &str| -> Result<Rule> {
        Ok(kind_word(full, short, dot)?.interpretation(kind.constant(value)))
    };
    let words = or![
        typed(&["улица", "улицы", "улице", "улицу"], &["ул"], "улица")?,
        typed(&["проспект", "проспекта", "проспекте"], &["пр", "просп"], "проспект")?,
        typed(&["переулок", "переулка", "переулке"], &["пер"], "переулок")?,
        typed(&["бульвар", "бульвара", "бульваре"], &["бул"], "бульвар")?,
        typed(&["площадь", "площади"], &["пл"], "площадь")?,
        typed(&["шоссе"], &["ш"], "шоссе")?,
    ]?;
    let name = name.interpretation(attribute(schema, "name")?.raw());

    Ok(or![rule![&words, &name]?, rule![&name, &words]?]?.interpretation(schema).named("STREET"))
}

fn numbered(schema: &Arc<FactSchema>, full: &[&str], short: &[&str], kind: &str, dot: &Rule) -> Result<Rule> {
    let number = attribute(schema, "number")?;
    let digits = between(1, 9999);
    let letter = Rule::leaf(or([eq("а"), eq("б"), eq("в"), eq("к")]));

    Ok(rule![
        kind_word(full, short, dot)?.interpretation(attribute(schema, "type")?.constant(kind)),
        rule![digits.interpretation(number.custom(int)), letter.optional()]?,
    ]?
    .interpretation(schema))
}
