//! The operator catalog.
//!
//! A static table describing every comparison operator the editor accepts:
//! which attribute type it applies to, what value shape it expects and
//! whether it can compare against another column.

use std::fmt;

use crate::metadata::AttributeType;

/// Nominal value type of an operator's operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandType {
    /// The operand must be a literal of this type.
    Fixed(AttributeType),
    /// The operand takes the type of the bound attribute.
    Polymorphic,
}

/// Immutable description of one operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorDescriptor {
    pub symbol: &'static str,
    /// Required attribute type; `None` accepts any attribute.
    pub attribute_type: Option<AttributeType>,
    /// `None` means the operator takes no value.
    pub value_type: Option<OperandType>,
    pub is_multi_valued: bool,
    pub supports_column_comparison: bool,
    /// False for operators the editor accepts but the query serializer rejects.
    pub target_supported: bool,
}

impl OperatorDescriptor {
    const fn new(
        symbol: &'static str,
        attribute_type: Option<AttributeType>,
        value_type: Option<OperandType>,
    ) -> Self {
        OperatorDescriptor {
            symbol,
            attribute_type,
            value_type,
            is_multi_valued: false,
            supports_column_comparison: false,
            target_supported: true,
        }
    }

    const fn multi(mut self) -> Self {
        self.is_multi_valued = true;
        self
    }

    const fn column(mut self) -> Self {
        self.supports_column_comparison = true;
        self
    }

    const fn unsupported(mut self) -> Self {
        self.target_supported = false;
        self
    }

    pub fn takes_value(&self) -> bool {
        self.value_type.is_some()
    }

    /// `like` and `not-like` take a pattern with `[...]` character ranges.
    pub fn is_like_pattern(&self) -> bool {
        matches!(self.symbol, "like" | "not-like")
    }
}

impl fmt::Display for OperatorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol)
    }
}

use AttributeType as A;
use OperandType::{Fixed, Polymorphic};

const ANY: Option<AttributeType> = None;
const NO_VALUE: Option<OperandType> = None;
const POLY: Option<OperandType> = Some(Polymorphic);
const TEXT: Option<OperandType> = Some(Fixed(A::String));
const WHOLE: Option<OperandType> = Some(Fixed(A::Integer));
const DATE: Option<OperandType> = Some(Fixed(A::DateTime));
const GUID: Option<OperandType> = Some(Fixed(A::Uniqueidentifier));
const STRING_ATTR: Option<AttributeType> = Some(A::String);
const DATE_ATTR: Option<AttributeType> = Some(A::DateTime);
const LOOKUP_ATTR: Option<AttributeType> = Some(A::Lookup);

const fn op(
    symbol: &'static str,
    attribute_type: Option<AttributeType>,
    value_type: Option<OperandType>,
) -> OperatorDescriptor {
    OperatorDescriptor::new(symbol, attribute_type, value_type)
}

static OPERATORS: &[OperatorDescriptor] = &[
    // Comparison
    op("eq", ANY, POLY).column(),
    op("ne", ANY, POLY).column(),
    op("neq", ANY, POLY).column(),
    op("gt", ANY, POLY).column(),
    op("ge", ANY, POLY).column(),
    op("lt", ANY, POLY).column(),
    op("le", ANY, POLY).column(),
    op("in", ANY, POLY).multi(),
    op("not-in", ANY, POLY).multi(),
    op("between", ANY, POLY).multi(),
    op("not-between", ANY, POLY).multi(),
    op("null", ANY, NO_VALUE),
    op("not-null", ANY, NO_VALUE),
    op("contain-values", ANY, POLY).multi(),
    op("not-contain-values", ANY, POLY).multi(),
    // Text
    op("like", STRING_ATTR, TEXT),
    op("not-like", STRING_ATTR, TEXT),
    op("begins-with", STRING_ATTR, TEXT),
    op("not-begin-with", STRING_ATTR, TEXT),
    op("ends-with", STRING_ATTR, TEXT),
    op("not-end-with", STRING_ATTR, TEXT),
    op("contains", STRING_ATTR, TEXT).unsupported(),
    op("does-not-contain", STRING_ATTR, TEXT).unsupported(),
    // Relative dates
    op("yesterday", DATE_ATTR, NO_VALUE),
    op("today", DATE_ATTR, NO_VALUE),
    op("tomorrow", DATE_ATTR, NO_VALUE),
    op("last-seven-days", DATE_ATTR, NO_VALUE),
    op("next-seven-days", DATE_ATTR, NO_VALUE),
    op("last-week", DATE_ATTR, NO_VALUE),
    op("this-week", DATE_ATTR, NO_VALUE),
    op("next-week", DATE_ATTR, NO_VALUE),
    op("last-month", DATE_ATTR, NO_VALUE),
    op("this-month", DATE_ATTR, NO_VALUE),
    op("next-month", DATE_ATTR, NO_VALUE),
    op("last-year", DATE_ATTR, NO_VALUE),
    op("this-year", DATE_ATTR, NO_VALUE),
    op("next-year", DATE_ATTR, NO_VALUE),
    op("on", DATE_ATTR, DATE),
    op("on-or-before", DATE_ATTR, DATE),
    op("on-or-after", DATE_ATTR, DATE),
    op("last-x-hours", DATE_ATTR, WHOLE),
    op("next-x-hours", DATE_ATTR, WHOLE),
    op("last-x-days", DATE_ATTR, WHOLE),
    op("next-x-days", DATE_ATTR, WHOLE),
    op("last-x-weeks", DATE_ATTR, WHOLE),
    op("next-x-weeks", DATE_ATTR, WHOLE),
    op("last-x-months", DATE_ATTR, WHOLE),
    op("next-x-months", DATE_ATTR, WHOLE),
    op("last-x-years", DATE_ATTR, WHOLE),
    op("next-x-years", DATE_ATTR, WHOLE),
    op("olderthan-x-minutes", DATE_ATTR, WHOLE),
    op("olderthan-x-hours", DATE_ATTR, WHOLE),
    op("olderthan-x-days", DATE_ATTR, WHOLE),
    op("olderthan-x-weeks", DATE_ATTR, WHOLE),
    op("olderthan-x-months", DATE_ATTR, WHOLE),
    op("olderthan-x-years", DATE_ATTR, WHOLE),
    // Fiscal periods
    op("this-fiscal-year", DATE_ATTR, NO_VALUE),
    op("this-fiscal-period", DATE_ATTR, NO_VALUE),
    op("next-fiscal-year", DATE_ATTR, NO_VALUE),
    op("next-fiscal-period", DATE_ATTR, NO_VALUE),
    op("last-fiscal-year", DATE_ATTR, NO_VALUE),
    op("last-fiscal-period", DATE_ATTR, NO_VALUE),
    op("last-x-fiscal-years", DATE_ATTR, WHOLE),
    op("last-x-fiscal-periods", DATE_ATTR, WHOLE),
    op("next-x-fiscal-years", DATE_ATTR, WHOLE),
    op("next-x-fiscal-periods", DATE_ATTR, WHOLE),
    op("in-fiscal-year", DATE_ATTR, WHOLE),
    op("in-fiscal-period", DATE_ATTR, WHOLE),
    op("in-fiscal-period-and-year", DATE_ATTR, WHOLE).multi(),
    op("in-or-before-fiscal-period-and-year", DATE_ATTR, WHOLE).multi(),
    op("in-or-after-fiscal-period-and-year", DATE_ATTR, WHOLE).multi(),
    // Current user and business
    op("eq-userid", LOOKUP_ATTR, NO_VALUE),
    op("ne-userid", LOOKUP_ATTR, NO_VALUE),
    op("eq-userteams", LOOKUP_ATTR, NO_VALUE),
    op("eq-useroruserteams", LOOKUP_ATTR, NO_VALUE),
    op("eq-useroruserhierarchy", LOOKUP_ATTR, NO_VALUE),
    op("eq-useroruserhierarchyandteams", LOOKUP_ATTR, NO_VALUE),
    op("eq-businessid", LOOKUP_ATTR, NO_VALUE),
    op("ne-businessid", LOOKUP_ATTR, NO_VALUE),
    op("eq-userlanguage", ANY, NO_VALUE),
    // Hierarchy
    op("under", LOOKUP_ATTR, GUID),
    op("eq-or-under", LOOKUP_ATTR, GUID),
    op("not-under", LOOKUP_ATTR, GUID),
    op("above", LOOKUP_ATTR, GUID),
    op("eq-or-above", LOOKUP_ATTR, GUID),
];

/// All operators, in presentation order.
pub fn operators() -> &'static [OperatorDescriptor] {
    OPERATORS
}

/// Look up an operator by its symbol.
pub fn find_operator(symbol: &str) -> Option<&'static OperatorDescriptor> {
    let symbol = symbol.trim();
    OPERATORS.iter().find(|o| o.symbol == symbol)
}

/// Whether an attribute of type `actual` satisfies an operator requiring `required`.
///
/// Equal types are compatible; otherwise only the four listed allowances hold.
pub fn is_type_compatible(required: AttributeType, actual: AttributeType) -> bool {
    required == actual
        || matches!(
            (required, actual),
            (A::String, A::Memo)
                | (A::Lookup, A::Owner)
                | (A::Lookup, A::Customer)
                | (A::Lookup, A::Uniqueidentifier)
        )
}

/// Operators that may be offered for an attribute of the given type.
pub fn operators_for(attribute_type: AttributeType) -> Vec<&'static OperatorDescriptor> {
    OPERATORS
        .iter()
        .filter(|o| match o.attribute_type {
            Some(required) => is_type_compatible(required, attribute_type),
            None => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn symbols_are_unique() {
        let mut seen = HashSet::new();
        for o in operators() {
            assert!(seen.insert(o.symbol), "duplicate operator {}", o.symbol);
        }
    }

    #[test]
    fn multi_valued_operators_take_values() {
        for o in operators().iter().filter(|o| o.is_multi_valued) {
            assert!(o.takes_value(), "{} is multi-valued without a value", o);
        }
    }

    #[test]
    fn column_comparison_only_on_single_valued_polymorphic() {
        for o in operators().iter().filter(|o| o.supports_column_comparison) {
            assert!(!o.is_multi_valued);
            assert_eq!(o.value_type, Some(OperandType::Polymorphic));
        }
    }

    #[test]
    fn only_contains_pair_is_target_unsupported() {
        let unsupported: Vec<_> = operators()
            .iter()
            .filter(|o| !o.target_supported)
            .map(|o| o.symbol)
            .collect();
        assert_eq!(unsupported, vec!["contains", "does-not-contain"]);
    }

    #[test]
    fn find_trims_symbol() {
        assert_eq!(find_operator(" like ").map(|o| o.symbol), Some("like"));
        assert!(find_operator("equals").is_none());
    }

    #[test]
    fn memo_attributes_get_text_operators() {
        let symbols: Vec<_> = operators_for(A::Memo).iter().map(|o| o.symbol).collect();
        assert!(symbols.contains(&"like"));
        assert!(symbols.contains(&"eq"));
        assert!(!symbols.contains(&"on"));
    }

    #[test]
    fn owner_attributes_get_user_operators() {
        let symbols: Vec<_> = operators_for(A::Owner).iter().map(|o| o.symbol).collect();
        assert!(symbols.contains(&"eq-userid"));
        assert!(!symbols.contains(&"begins-with"));
    }
}
