//! Column descriptor, type erasure, and functional transforms (spec §4.2),
//! grounded on the design note's `ColumnCapability<Record>` trait over a
//! concrete generic `Column<Record, Input, Output>` struct.

use crate::cell::{BoolExpression, CaseStrategy, Cell, CellKind, Uri};
use crate::style::CellStyle;
use chrono::{DateTime, FixedOffset};

/// One of the seven typed column outputs, one per `CellKind` (spec §3).
/// Carries its own nullable value plus whatever auxiliary configuration
/// (precision, timezone, boolean expression) the matching `CellKind`
/// needs, so transforms can rebuild a default value without losing it.
pub trait ColumnOutput: Clone + Send + Sync + 'static {
    type Value: Clone + Send + Sync + 'static;

    fn value(&self) -> Option<&Self::Value>;

    /// Same auxiliary configuration, replacing the value component.
    fn with_value(&self, value: Self::Value) -> Self;

    fn into_cell_kind(self) -> CellKind;
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextOutput(pub Option<String>);

impl ColumnOutput for TextOutput {
    type Value = String;
    fn value(&self) -> Option<&String> {
        self.0.as_ref()
    }
    fn with_value(&self, value: String) -> Self {
        TextOutput(Some(value))
    }
    fn into_cell_kind(self) -> CellKind {
        CellKind::Text(self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegerOutput(pub Option<i64>);

impl ColumnOutput for IntegerOutput {
    type Value = i64;
    fn value(&self) -> Option<&i64> {
        self.0.as_ref()
    }
    fn with_value(&self, value: i64) -> Self {
        IntegerOutput(Some(value))
    }
    fn into_cell_kind(self) -> CellKind {
        CellKind::Integer(self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberOutput(pub Option<f64>);

impl ColumnOutput for NumberOutput {
    type Value = f64;
    fn value(&self) -> Option<&f64> {
        self.0.as_ref()
    }
    fn with_value(&self, value: f64) -> Self {
        NumberOutput(Some(value))
    }
    fn into_cell_kind(self) -> CellKind {
        CellKind::Number(self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentageOutput {
    pub value: Option<f64>,
    pub precision: u8,
}

impl ColumnOutput for PercentageOutput {
    type Value = f64;
    fn value(&self) -> Option<&f64> {
        self.value.as_ref()
    }
    fn with_value(&self, value: f64) -> Self {
        PercentageOutput {
            value: Some(value),
            precision: self.precision,
        }
    }
    fn into_cell_kind(self) -> CellKind {
        CellKind::Percentage(self.value, self.precision)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateOutput {
    pub value: Option<DateTime<FixedOffset>>,
    pub timezone: FixedOffset,
}

impl ColumnOutput for DateOutput {
    type Value = DateTime<FixedOffset>;
    fn value(&self) -> Option<&DateTime<FixedOffset>> {
        self.value.as_ref()
    }
    fn with_value(&self, value: DateTime<FixedOffset>) -> Self {
        DateOutput {
            value: Some(value),
            timezone: self.timezone,
        }
    }
    fn into_cell_kind(self) -> CellKind {
        CellKind::Date(self.value, self.timezone)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanOutput {
    pub value: Option<bool>,
    pub expression: BoolExpression,
    pub case_strategy: CaseStrategy,
}

impl ColumnOutput for BooleanOutput {
    type Value = bool;
    fn value(&self) -> Option<&bool> {
        self.value.as_ref()
    }
    fn with_value(&self, value: bool) -> Self {
        BooleanOutput {
            value: Some(value),
            expression: self.expression.clone(),
            case_strategy: self.case_strategy,
        }
    }
    fn into_cell_kind(self) -> CellKind {
        CellKind::Boolean(self.value, self.expression, self.case_strategy)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UrlOutput(pub Option<Uri>);

impl ColumnOutput for UrlOutput {
    type Value = Uri;
    fn value(&self) -> Option<&Uri> {
        self.0.as_ref()
    }
    fn with_value(&self, value: Uri) -> Self {
        UrlOutput(Some(value))
    }
    fn into_cell_kind(self) -> CellKind {
        CellKind::Url(self.0)
    }
}

/// `KeepEmpty` passes a missing value through untouched; `DefaultValue`
/// rebuilds the output around `v` while preserving auxiliary config
/// (spec §4.2).
pub enum NilPolicy<V> {
    KeepEmpty,
    DefaultValue(V),
}

struct Conditional<Input, Output> {
    predicate: Box<dyn Fn(&Input) -> bool + Send + Sync>,
    then_fn: Box<dyn Fn(Input) -> Output + Send + Sync>,
    else_fn: Box<dyn Fn(Input) -> Output + Send + Sync>,
}

/// Typed column projection (spec §3): `Record → Input → Output`, with
/// conditional mapping and a nil policy layered on top.
pub struct Column<Record, Input, Output: ColumnOutput> {
    pub name: String,
    pub width: Option<u32>,
    pub body_style: Option<CellStyle>,
    pub header_style: Option<CellStyle>,
    projection: Box<dyn Fn(&Record) -> Input + Send + Sync>,
    mapping: Box<dyn Fn(Input) -> Output + Send + Sync>,
    nil_policy: NilPolicy<Output::Value>,
    conditional: Option<Conditional<Input, Output>>,
    visibility: Box<dyn Fn(&Record) -> bool + Send + Sync>,
}

impl<Record, Input, Output> Column<Record, Input, Output>
where
    Record: 'static,
    Input: 'static,
    Output: ColumnOutput,
{
    pub fn new(
        name: impl Into<String>,
        projection: impl Fn(&Record) -> Input + Send + Sync + 'static,
        mapping: impl Fn(Input) -> Output + Send + Sync + 'static,
    ) -> Self {
        Column {
            name: name.into(),
            width: None,
            body_style: None,
            header_style: None,
            projection: Box::new(projection),
            mapping: Box::new(mapping),
            nil_policy: NilPolicy::KeepEmpty,
            conditional: None,
            visibility: Box::new(|_: &Record| true),
        }
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_body_style(mut self, style: CellStyle) -> Self {
        self.body_style = Some(style);
        self
    }

    pub fn with_header_style(mut self, style: CellStyle) -> Self {
        self.header_style = Some(style);
        self
    }

    pub fn with_default(mut self, default: Output::Value) -> Self {
        self.nil_policy = NilPolicy::DefaultValue(default);
        self
    }

    pub fn visible_when(mut self, predicate: impl Fn(&Record) -> bool + Send + Sync + 'static) -> Self {
        self.visibility = Box::new(predicate);
        self
    }

    pub fn with_conditional(
        mut self,
        predicate: impl Fn(&Input) -> bool + Send + Sync + 'static,
        then_fn: impl Fn(Input) -> Output + Send + Sync + 'static,
        else_fn: impl Fn(Input) -> Output + Send + Sync + 'static,
    ) -> Self {
        self.conditional = Some(Conditional {
            predicate: Box::new(predicate),
            then_fn: Box::new(then_fn),
            else_fn: Box::new(else_fn),
        });
        self
    }

    fn resolve(&self, record: &Record) -> Output {
        let input = (self.projection)(record);
        let mapped = match &self.conditional {
            Some(cond) => {
                if (cond.predicate)(&input) {
                    (cond.then_fn)(input)
                } else {
                    (cond.else_fn)(input)
                }
            }
            None => (self.mapping)(input),
        };
        match &self.nil_policy {
            NilPolicy::KeepEmpty => mapped,
            NilPolicy::DefaultValue(default) => {
                if mapped.value().is_none() {
                    mapped.with_value(default.clone())
                } else {
                    mapped
                }
            }
        }
    }

    /// Moves this column's resolution logic (projection, conditional,
    /// mapping, nil policy) into a boxed closure, handing back the bits a
    /// transform needs to build a new column without re-deriving them
    /// (spec §9: "materializing the policy as a copied struct before
    /// capturing" — here the whole resolver is captured once).
    fn into_resolver_and_meta(
        self,
    ) -> (
        Box<dyn Fn(&Record) -> Output + Send + Sync>,
        Box<dyn Fn(&Record) -> bool + Send + Sync>,
        String,
        Option<u32>,
        Option<CellStyle>,
        Option<CellStyle>,
    ) {
        let Column {
            name,
            width,
            body_style,
            header_style,
            projection,
            mapping,
            nil_policy,
            conditional,
            visibility,
        } = self;

        let resolver: Box<dyn Fn(&Record) -> Output + Send + Sync> = Box::new(move |record: &Record| {
            let input = (projection)(record);
            let mapped = match &conditional {
                Some(cond) => {
                    if (cond.predicate)(&input) {
                        (cond.then_fn)(input)
                    } else {
                        (cond.else_fn)(input)
                    }
                }
                None => (mapping)(input),
            };
            match &nil_policy {
                NilPolicy::KeepEmpty => mapped,
                NilPolicy::DefaultValue(default) => {
                    if mapped.value().is_none() {
                        mapped.with_value(default.clone())
                    } else {
                        mapped
                    }
                }
            }
        });

        (resolver, visibility, name, width, body_style, header_style)
    }
}

/// Record-keyed visibility plus a fully-applied cell generator, type-erased
/// over `Input`/`Output` (spec §9).
pub trait ColumnCapability<Record>: Send + Sync {
    fn name(&self) -> &str;
    fn width(&self) -> Option<u32>;
    fn header_style(&self) -> Option<&CellStyle>;
    fn body_style(&self) -> Option<&CellStyle>;
    fn is_visible(&self, record: &Record) -> bool;
    fn emit(&self, record: &Record, row: u32, col: u32) -> Cell;
}

impl<Record, Input, Output> ColumnCapability<Record> for Column<Record, Input, Output>
where
    Record: 'static,
    Input: 'static,
    Output: ColumnOutput,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn width(&self) -> Option<u32> {
        self.width
    }

    fn header_style(&self) -> Option<&CellStyle> {
        self.header_style.as_ref()
    }

    fn body_style(&self) -> Option<&CellStyle> {
        self.body_style.as_ref()
    }

    fn is_visible(&self, record: &Record) -> bool {
        (self.visibility)(record)
    }

    fn emit(&self, record: &Record, row: u32, col: u32) -> Cell {
        Cell::new(row, col, self.resolve(record).into_cell_kind())
    }
}

pub type AnyColumn<Record> = Box<dyn ColumnCapability<Record>>;

/// Rebuilds `col`'s resolution as the new column's projection, discarding
/// the old mapping/conditional/nil-policy in favor of `retarget_fn`
/// (spec §4.2: "each returns a new Column whose Output kind has changed").
/// Width, styles, and visibility carry over unchanged; the result's nil
/// policy is always `KeepEmpty`, per spec.
fn retarget<Record, Input, Output, NewOutput>(
    col: Column<Record, Input, Output>,
    retarget_fn: impl Fn(Output) -> NewOutput + Send + Sync + 'static,
) -> Column<Record, Output, NewOutput>
where
    Record: 'static,
    Input: 'static,
    Output: ColumnOutput,
    NewOutput: ColumnOutput,
{
    let (resolver, visibility, name, width, body_style, header_style) = col.into_resolver_and_meta();
    Column {
        name,
        width,
        body_style,
        header_style,
        projection: resolver,
        mapping: Box::new(retarget_fn),
        nil_policy: NilPolicy::KeepEmpty,
        conditional: None,
        visibility,
    }
}

macro_rules! transform_pair {
    ($keep_empty:ident, $default:ident, $new_output:ty, $value:ty, $wrap:expr) => {
        /// Overload for a source column whose nil policy is `KeepEmpty`:
        /// the closure receives and returns nullable values.
        pub fn $keep_empty<Record, Input, Output>(
            col: Column<Record, Input, Output>,
            f: impl Fn(Option<Output::Value>) -> Option<$value> + Send + Sync + 'static,
        ) -> Column<Record, Output, $new_output>
        where
            Record: 'static,
            Input: 'static,
            Output: ColumnOutput,
        {
            retarget(col, move |out: Output| $wrap(f(out.value().cloned())))
        }

        /// Overload for a source column whose nil policy is
        /// `DefaultValue`: the closure receives a non-null value.
        pub fn $default<Record, Input, Output>(
            col: Column<Record, Input, Output>,
            f: impl Fn(Output::Value) -> $value + Send + Sync + 'static,
        ) -> Column<Record, Output, $new_output>
        where
            Record: 'static,
            Input: 'static,
            Output: ColumnOutput,
        {
            retarget(col, move |out: Output| $wrap(out.value().cloned().map(&f)))
        }
    };
}

transform_pair!(to_string_keep_empty, to_string_default, TextOutput, String, TextOutput);
transform_pair!(to_int_keep_empty, to_int_default, IntegerOutput, i64, IntegerOutput);
transform_pair!(to_double_keep_empty, to_double_default, NumberOutput, f64, NumberOutput);
transform_pair!(to_url_keep_empty, to_url_default, UrlOutput, Uri, UrlOutput);

pub fn to_percentage_keep_empty<Record, Input, Output>(
    col: Column<Record, Input, Output>,
    precision: u8,
    f: impl Fn(Option<Output::Value>) -> Option<f64> + Send + Sync + 'static,
) -> Column<Record, Output, PercentageOutput>
where
    Record: 'static,
    Input: 'static,
    Output: ColumnOutput,
{
    retarget(col, move |out: Output| PercentageOutput {
        value: f(out.value().cloned()),
        precision,
    })
}

pub fn to_percentage_default<Record, Input, Output>(
    col: Column<Record, Input, Output>,
    precision: u8,
    f: impl Fn(Output::Value) -> f64 + Send + Sync + 'static,
) -> Column<Record, Output, PercentageOutput>
where
    Record: 'static,
    Input: 'static,
    Output: ColumnOutput,
{
    retarget(col, move |out: Output| PercentageOutput {
        value: out.value().cloned().map(&f),
        precision,
    })
}

pub fn to_date_keep_empty<Record, Input, Output>(
    col: Column<Record, Input, Output>,
    timezone: FixedOffset,
    f: impl Fn(Option<Output::Value>) -> Option<DateTime<FixedOffset>> + Send + Sync + 'static,
) -> Column<Record, Output, DateOutput>
where
    Record: 'static,
    Input: 'static,
    Output: ColumnOutput,
{
    retarget(col, move |out: Output| DateOutput {
        value: f(out.value().cloned()),
        timezone,
    })
}

pub fn to_date_default<Record, Input, Output>(
    col: Column<Record, Input, Output>,
    timezone: FixedOffset,
    f: impl Fn(Output::Value) -> DateTime<FixedOffset> + Send + Sync + 'static,
) -> Column<Record, Output, DateOutput>
where
    Record: 'static,
    Input: 'static,
    Output: ColumnOutput,
{
    retarget(col, move |out: Output| DateOutput {
        value: out.value().cloned().map(&f),
        timezone,
    })
}

pub fn to_bool_keep_empty<Record, Input, Output>(
    col: Column<Record, Input, Output>,
    expression: BoolExpression,
    case_strategy: CaseStrategy,
    f: impl Fn(Option<Output::Value>) -> Option<bool> + Send + Sync + 'static,
) -> Column<Record, Output, BooleanOutput>
where
    Record: 'static,
    Input: 'static,
    Output: ColumnOutput,
{
    retarget(col, move |out: Output| BooleanOutput {
        value: f(out.value().cloned()),
        expression: expression.clone(),
        case_strategy,
    })
}

pub fn to_bool_default<Record, Input, Output>(
    col: Column<Record, Input, Output>,
    expression: BoolExpression,
    case_strategy: CaseStrategy,
    f: impl Fn(Output::Value) -> bool + Send + Sync + 'static,
) -> Column<Record, Output, BooleanOutput>
where
    Record: 'static,
    Input: 'static,
    Output: ColumnOutput,
{
    retarget(col, move |out: Output| BooleanOutput {
        value: out.value().cloned().map(&f),
        expression: expression.clone(),
        case_strategy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Person {
        name: String,
        age: i64,
        active: bool,
    }

    #[test]
    fn visibility_suppresses_specific_records() {
        let col = Column::new("name", |p: &Person| p.name.clone(), |s| TextOutput(Some(s)))
            .visible_when(|p: &Person| p.age >= 18);
        let minor = Person { name: "Kid".into(), age: 10, active: true };
        let adult = Person { name: "Adult".into(), age: 30, active: true };
        assert!(!col.is_visible(&minor));
        assert!(col.is_visible(&adult));
    }

    #[test]
    fn default_value_fills_missing_output() {
        let col: Column<Person, i64, IntegerOutput> =
            Column::new("age", |p: &Person| p.age, |_| IntegerOutput(None)).with_default(99);
        let p = Person { name: "X".into(), age: 1, active: true };
        let cell = col.emit(&p, 1, 1);
        assert_eq!(cell.value, CellKind::Integer(Some(99)));
    }

    #[test]
    fn conditional_picks_branch_by_predicate() {
        let col = Column::new(
            "status",
            |p: &Person| p.active,
            |_: bool| TextOutput(None),
        )
        .with_conditional(
            |active: &bool| *active,
            |_| TextOutput(Some("Active".to_string())),
            |_| TextOutput(Some("Inactive".to_string())),
        );
        let p = Person { name: "X".into(), age: 1, active: false };
        let cell = col.emit(&p, 1, 1);
        assert_eq!(cell.value, CellKind::Text(Some("Inactive".to_string())));
    }

    #[test]
    fn to_string_default_transforms_integer_column() {
        let age_col: Column<Person, i64, IntegerOutput> =
            Column::new("age", |p: &Person| p.age, |n| IntegerOutput(Some(n))).with_default(0);
        let text_col = to_int_default(age_col, |n| n);
        let text_col = to_string_default(text_col, |n: i64| format!("{n} years"));
        let p = Person { name: "X".into(), age: 42, active: true };
        let cell = text_col.emit(&p, 1, 1);
        assert_eq!(cell.value, CellKind::Text(Some("42 years".to_string())));
    }
}
