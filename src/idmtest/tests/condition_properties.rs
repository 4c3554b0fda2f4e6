//! Property tests for condition parsing and ACL evaluation

use idmtest::{parse_condition, AccessEvaluator, Identity, IdmError, Operation, UserDirectory};
use proptest::prelude::*;
use std::sync::Arc;

proptest! {
    #[test]
    fn test_valid_domain_parses(domain in "[a-z0-9][a-z0-9-]{0,20}") {
        let condition = format!("is-authenticated-user @{}", domain);
        let parsed = parse_condition(&condition).unwrap();

        prop_assert_eq!(parsed.operation(), Operation::IsAuthenticatedUser);
        prop_assert_eq!(parsed.domain(), domain.as_str());
        prop_assert_eq!(parsed.to_string(), condition);
    }

    #[test]
    fn test_leading_hyphen_domain_rejected(rest in "[a-z0-9-]{0,20}") {
        let domain = format!("-{}", rest);
        let condition = format!("is-authenticated-user @{}", domain);

        prop_assert_eq!(parse_condition(&condition), Err(IdmError::InvalidDomain(domain)));
    }

    #[test]
    fn test_unmarked_trailing_token_unknown(token in "[^@ ][a-z0-9-]{0,20}") {
        let condition = format!("is-authenticated-user {}", token);

        prop_assert_eq!(
            parse_condition(&condition),
            Err(IdmError::UnknownCaveat(condition.clone()))
        );
    }

    #[test]
    fn test_parse_deterministic(condition in ".{0,40}") {
        prop_assert_eq!(parse_condition(&condition), parse_condition(&condition));
    }

    #[test]
    fn test_allow_matches_set_intersection(
        groups in prop::collection::vec("[a-e]", 0..5),
        acl in prop::collection::vec("[a-e]", 0..5),
    ) {
        let directory = Arc::new(UserDirectory::new());
        directory.register("user", groups.clone());
        let evaluator = AccessEvaluator::new(directory);

        let expected = acl.iter().any(|entry| groups.contains(entry));
        let allowed = evaluator.allow(&Identity::new("user"), &acl).unwrap();

        prop_assert_eq!(allowed, expected);
        prop_assert_eq!(evaluator.allow(&Identity::new("user"), &acl).unwrap(), allowed);
    }
}
