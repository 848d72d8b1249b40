//! Table-wide checks over the operator catalog and every attribute type.

use qtree_core::validate::{validate_compatibility, validate_value, validate_value_sources};
use qtree_core::{
    find_operator, operators, AttributeDescriptor, AttributeType, Condition, ConditionCheck,
    ConditionEngine, DocumentTree, IssueKind, QueryDocument,
};

const GUID: &str = "6f9619ff-8b86-d011-b42d-00c04fc964ff";

fn attr(t: AttributeType) -> AttributeDescriptor {
    AttributeDescriptor::new("field", t).in_entity("account")
}

#[test]
fn no_value_operators_reject_any_literal() {
    let mut tested = 0usize;
    for op in operators().iter().filter(|o| !o.takes_value()) {
        let bound = op.attribute_type.map(attr);
        assert!(
            validate_value(op, bound.as_ref(), "", "", 0).is_none(),
            "{} with blank value",
            op
        );
        let issue = validate_value(op, bound.as_ref(), "x", "", 0)
            .unwrap_or_else(|| panic!("{} accepted a literal", op));
        assert_eq!(issue.kind, IssueKind::UnexpectedValue, "{}", op);
        tested += 1;
    }
    assert!(tested > 20, "only {} no-value operators", tested);
}

#[test]
fn compatibility_over_every_type_pair() {
    use AttributeType as A;
    for op in operators() {
        let Some(required) = op.attribute_type else {
            for t in A::ALL {
                assert!(validate_compatibility(op, Some(&attr(t)), 1).is_none());
            }
            continue;
        };
        for t in A::ALL {
            let allowed = required == t
                || matches!(
                    (required, t),
                    (A::String, A::Memo)
                        | (A::Lookup, A::Owner)
                        | (A::Lookup, A::Customer)
                        | (A::Lookup, A::Uniqueidentifier)
                );
            let issue = validate_compatibility(op, Some(&attr(t)), 1);
            assert_eq!(issue.is_none(), allowed, "{} on {}", op, t);
            if let Some(issue) = issue {
                assert_eq!(issue.kind, IssueKind::OperatorAttributeTypeMismatch);
            }
        }
    }
}

#[test]
fn guid_values_for_every_guid_like_type() {
    let eq = find_operator("eq").unwrap();
    for t in AttributeType::ALL.into_iter().filter(|t| t.is_guid_like()) {
        let a = attr(t);
        assert!(validate_value(eq, Some(&a), GUID, "", 0).is_none(), "{}", t);
        assert!(validate_value(eq, Some(&a), &GUID.to_uppercase(), "", 0).is_none());
        let issue = validate_value(eq, Some(&a), "not-a-guid", "", 0).unwrap();
        assert_eq!(issue.kind, IssueKind::InvalidGuid);
        assert!(issue.message.contains("00000000-0000-0000-0000-000000000000"));
        let urn = format!("urn:uuid:{}", GUID);
        assert_eq!(
            validate_value(eq, Some(&a), &urn, "", 0).map(|i| i.kind),
            Some(IssueKind::InvalidGuid)
        );
    }
}

#[test]
fn conflicting_sources_in_either_order() {
    assert_eq!(
        validate_value_sources("1", "other").unwrap().kind,
        IssueKind::ConflictingValueSources
    );
    for op in operators() {
        let issue = validate_value(op, None, "  1 ", "otherfield", 0)
            .unwrap_or_else(|| panic!("{} allowed two value sources", op));
        assert_eq!(issue.kind, IssueKind::ConflictingValueSources);
    }
    assert!(validate_value_sources("", "otherfield").is_none());
    assert!(validate_value_sources("1", "  ").is_none());
}

#[test]
fn like_family_checks_brackets() {
    let memo = attr(AttributeType::Memo);
    for symbol in ["like", "not-like"] {
        let op = find_operator(symbol).unwrap();
        assert_eq!(
            validate_value(op, Some(&memo), "a[b", "", 0).unwrap().kind,
            IssueKind::UnbalancedPattern
        );
        assert!(validate_value(op, Some(&memo), "a[[]b", "", 0).is_none());
        assert!(validate_value(op, Some(&memo), "%[a-c]%", "", 0).is_none());
    }
    let begins = find_operator("begins-with").unwrap();
    assert!(validate_value(begins, Some(&memo), "a[b", "", 0).is_none());
}

#[test]
fn integer_boundaries_follow_attribute_width() {
    let eq = find_operator("eq").unwrap();
    let int = attr(AttributeType::Integer);
    let big = attr(AttributeType::BigInt);
    assert!(validate_value(eq, Some(&int), "2147483647", "", 0).is_none());
    assert_eq!(
        validate_value(eq, Some(&int), "2147483648", "", 0).unwrap().kind,
        IssueKind::InvalidInteger
    );
    assert!(validate_value(eq, Some(&big), "2147483648", "", 0).is_none());
}

#[test]
fn save_splits_pending_list_once() {
    let attrs = vec![AttributeDescriptor::new("statecode", AttributeType::State)];
    let mut doc = QueryDocument::new("account");
    let filter = doc.add_filter(doc.root_entity());
    let node = doc.add_condition(filter, Condition::new("statecode", "in", "0, 1"));
    let engine = ConditionEngine::default();

    let mut condition = doc.condition(node).cloned().unwrap();
    let commit = engine
        .commit(&mut doc, node, &mut condition, Some(&attrs))
        .unwrap();
    assert_eq!(commit.created_values, 2);
    *doc.condition_mut(node).unwrap() = condition.clone();

    let again = engine
        .commit(&mut doc, node, &mut condition, Some(&attrs))
        .unwrap();
    assert_eq!(again.created_values, 0);
    assert_eq!(doc.value_children(node), vec!["0", "1"]);

    let values = doc.value_children(node);
    let report = engine.validate(&ConditionCheck {
        condition: doc.condition(node).unwrap(),
        attributes: Some(&attrs),
        values: &values,
        strict: true,
    });
    assert!(report.is_clean(), "{:?}", report);
}
