/// Compile a regex once and hand out a `&'static Regex`.
#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Sequence of rules: `rule![DAY, MONTH, YEAR.optional()]`.
///
/// Each item is anything convertible into a [`Rule`](crate::Rule): a rule, a
/// `&Rule`, a predicate, a `&Forward` or a literal `&str`. Evaluates to
/// `Result<Rule>`.
#[macro_export]
macro_rules! rule {
    ($($item:expr),+ $(,)?) => {
        $crate::Rule::sequence(vec![$($crate::Rule::from($item)),+])
    };
}

/// Ordered choice: `or![NUMERIC_DATE, MONTH_NAME_DATE]`. Evaluates to
/// `Result<Rule>`.
#[macro_export]
macro_rules! or {
    ($($item:expr),+ $(,)?) => {
        $crate::Rule::or(vec![$($crate::Rule::from($item)),+])
    };
}
