//! Typed facts and their schemas.
//!
//! A [`FactSchema`] names a fact type and its attributes:
//!
//! ```text
//! Date
//!   year         scalar
//!   month        scalar
//!   day          scalar
//!   time         repeatable      (15:25 -> [15, 25])
//!   current_era  scalar, default true
//! ```
//!
//! Grammars bind sub-rules to attributes through an [`Interpretation`]. When a
//! match succeeds the engine folds the bound spans into a [`Fact`].

use std::fmt;
use std::sync::Arc;

use crate::error::{GrammarError, Result};

/// Value stored in a fact attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Int(i64),
    Bool(bool),
    Fact(Box<Fact>),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_fact(&self) -> Option<&Fact> {
        match self {
            Value::Fact(f) => Some(f),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<Fact> for Value {
    fn from(f: Fact) -> Self {
        Value::Fact(Box::new(f))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s:?}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Fact(fact) => write!(f, "{fact}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// Holds at most one value; later writes overwrite earlier ones.
    Scalar,
    /// Holds a sequence; writes append in match order.
    Repeatable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSpec {
    pub name: String,
    pub kind: AttributeKind,
    pub default: Option<Value>,
}

/// Named fact type with an ordered attribute list.
#[derive(Debug, PartialEq, Eq)]
pub struct FactSchema {
    name: String,
    attributes: Vec<AttributeSpec>,
}

impl FactSchema {
    pub fn builder(name: impl Into<String>) -> FactSchemaBuilder {
        FactSchemaBuilder { name: name.into(), attributes: Vec::new() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[AttributeSpec] {
        &self.attributes
    }

    fn position(&self, attribute: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name == attribute)
    }
}

/// Builder for [`FactSchema`]; the finished schema is shared via `Arc`.
#[derive(Debug)]
pub struct FactSchemaBuilder {
    name: String,
    attributes: Vec<AttributeSpec>,
}

impl FactSchemaBuilder {
    pub fn attribute(self, name: impl Into<String>) -> Self {
        self.push(name.into(), AttributeKind::Scalar, None)
    }

    pub fn repeatable(self, name: impl Into<String>) -> Self {
        self.push(name.into(), AttributeKind::Repeatable, None)
    }

    pub fn with_default(self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.push(name.into(), AttributeKind::Scalar, Some(default.into()))
    }

    fn push(mut self, name: String, kind: AttributeKind, default: Option<Value>) -> Self {
        self.attributes.push(AttributeSpec { name, kind, default });
        self
    }

    pub fn build(self) -> Result<Arc<FactSchema>> {
        for (i, attr) in self.attributes.iter().enumerate() {
            if self.attributes[..i].iter().any(|a| a.name == attr.name) {
                return Err(GrammarError::DuplicateAttribute { fact: self.name, attribute: attr.name.clone() });
            }
        }
        Ok(Arc::new(FactSchema { name: self.name, attributes: self.attributes }))
    }
}

/// Handle to one attribute of a schema.
#[derive(Debug, Clone)]
pub struct AttributeRef {
    schema: Arc<FactSchema>,
    index: usize,
}

/// Look up an attribute by name.
pub fn attribute(schema: &Arc<FactSchema>, name: &str) -> Result<AttributeRef> {
    let index = schema.position(name).ok_or_else(|| GrammarError::UnknownAttribute {
        fact: schema.name.clone(),
        attribute: name.to_string(),
    })?;
    Ok(AttributeRef { schema: Arc::clone(schema), index })
}

impl AttributeRef {
    pub fn schema(&self) -> &Arc<FactSchema> {
        &self.schema
    }

    pub fn name(&self) -> &str {
        &self.schema.attributes[self.index].name
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub fn is_repeatable(&self) -> bool {
        self.schema.attributes[self.index].kind == AttributeKind::Repeatable
    }

    /// Bind the raw matched text (or a fact produced directly inside the span).
    pub fn raw(&self) -> Interpretation {
        self.bind(ValueSource::Raw)
    }

    /// Bind the normalized forms of the matched tokens.
    pub fn normalized(&self) -> Interpretation {
        self.bind(ValueSource::Normalized)
    }

    /// Bind a constant regardless of what matched.
    pub fn constant(&self, value: impl Into<Value>) -> Interpretation {
        self.bind(ValueSource::Const(value.into()))
    }

    /// Bind the result of `transform` applied to the raw matched text.
    ///
    /// A `None` result rejects the match candidate.
    pub fn custom<F>(&self, transform: F) -> Interpretation
    where
        F: Fn(&str) -> Option<Value> + Send + Sync + 'static,
    {
        self.bind(ValueSource::Custom(Arc::new(transform)))
    }

    fn bind(&self, source: ValueSource) -> Interpretation {
        Interpretation::Attribute { attribute: self.clone(), source }
    }
}

pub type Transform = Arc<dyn Fn(&str) -> Option<Value> + Send + Sync>;

#[derive(Clone)]
pub enum ValueSource {
    Raw,
    Normalized,
    Const(Value),
    Custom(Transform),
}

impl fmt::Debug for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSource::Raw => f.write_str("Raw"),
            ValueSource::Normalized => f.write_str("Normalized"),
            ValueSource::Const(v) => f.debug_tuple("Const").field(v).finish(),
            ValueSource::Custom(_) => f.write_str("Custom(<function>)"),
        }
    }
}

/// What a matched sub-rule contributes to the enclosing fact.
#[derive(Debug, Clone)]
pub enum Interpretation {
    /// The span becomes a fact of this schema.
    Fact(Arc<FactSchema>),
    /// The span becomes the value of one attribute of the nearest enclosing
    /// fact of the attribute's schema.
    Attribute { attribute: AttributeRef, source: ValueSource },
}

impl From<Arc<FactSchema>> for Interpretation {
    fn from(schema: Arc<FactSchema>) -> Self {
        Interpretation::Fact(schema)
    }
}

impl From<&Arc<FactSchema>> for Interpretation {
    fn from(schema: &Arc<FactSchema>) -> Self {
        Interpretation::Fact(Arc::clone(schema))
    }
}

impl From<AttributeRef> for Interpretation {
    fn from(attribute: AttributeRef) -> Self {
        attribute.raw()
    }
}

impl From<&AttributeRef> for Interpretation {
    fn from(attribute: &AttributeRef) -> Self {
        attribute.raw()
    }
}

// --- Fact instances ---------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Scalar(Option<Value>),
    Repeated(Vec<Value>),
}

/// An interpreted fact: one slot per schema attribute.
#[derive(Clone)]
pub struct Fact {
    schema: Arc<FactSchema>,
    slots: Vec<Slot>,
}

impl Fact {
    /// Empty fact of `schema`; scalar attributes start at their defaults.
    pub fn new(schema: &Arc<FactSchema>) -> Self {
        let slots = schema
            .attributes
            .iter()
            .map(|a| match a.kind {
                AttributeKind::Scalar => Slot::Scalar(a.default.clone()),
                AttributeKind::Repeatable => Slot::Repeated(Vec::new()),
            })
            .collect();
        Fact { schema: Arc::clone(schema), slots }
    }

    pub fn schema(&self) -> &Arc<FactSchema> {
        &self.schema
    }

    pub fn name(&self) -> &str {
        self.schema.name()
    }

    /// Store `value` in the attribute at `index`: overwrite a scalar, append
    /// to a repeatable.
    pub(crate) fn assign(&mut self, index: usize, value: Value) {
        match &mut self.slots[index] {
            Slot::Scalar(slot) => *slot = Some(value),
            Slot::Repeated(values) => values.push(value),
        }
    }

    /// Set an attribute by name (used to build facts by hand, e.g. in tests).
    pub fn set(mut self, attribute: &str, value: impl Into<Value>) -> Result<Self> {
        let index = self.schema.position(attribute).ok_or_else(|| GrammarError::UnknownAttribute {
            fact: self.schema.name.clone(),
            attribute: attribute.to_string(),
        })?;
        self.assign(index, value.into());
        Ok(self)
    }

    /// Scalar value (or first repeated value) of an attribute.
    pub fn get(&self, attribute: &str) -> Option<&Value> {
        match &self.slots[self.schema.position(attribute)?] {
            Slot::Scalar(v) => v.as_ref(),
            Slot::Repeated(values) => values.first(),
        }
    }

    /// All values of an attribute (a scalar yields zero or one).
    pub fn get_all(&self, attribute: &str) -> &[Value] {
        match self.schema.position(attribute).map(|i| &self.slots[i]) {
            Some(Slot::Scalar(Some(v))) => std::slice::from_ref(v),
            Some(Slot::Repeated(values)) => values,
            _ => &[],
        }
    }

    /// `(attribute, values)` pairs in schema order, skipping empty slots.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.schema.attributes.iter().zip(&self.slots).filter_map(|(spec, slot)| match slot {
            Slot::Scalar(Some(v)) => Some((spec.name.as_str(), std::slice::from_ref(v))),
            Slot::Repeated(values) if !values.is_empty() => Some((spec.name.as_str(), values.as_slice())),
            _ => None,
        })
    }
}

impl PartialEq for Fact {
    fn eq(&self, other: &Self) -> bool {
        (Arc::ptr_eq(&self.schema, &other.schema) || self.schema == other.schema) && self.slots == other.slots
    }
}

impl Eq for Fact {}

impl fmt::Debug for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.schema.name());
        for (name, values) in self.iter() {
            match self.schema.attributes.iter().find(|a| a.name == name).map(|a| a.kind) {
                Some(AttributeKind::Repeatable) => s.field(name, &values),
                _ => s.field(name, &values[0]),
            };
        }
        s.finish()
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.schema.name())?;
        for (i, (name, values)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}=")?;
            if values.len() == 1 {
                write!(f, "{}", values[0])?;
            } else {
                f.write_str("[")?;
                for (j, v) in values.iter().enumerate() {
                    if j > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str("]")?;
            }
        }
        f.write_str(")")
    }
}

// --- Common transforms ------------------------------------------------------

/// Parse the matched text as an integer.
pub fn int(text: &str) -> Option<Value> {
    text.trim().parse::<i64>().ok().map(Value::Int)
}
