//! Property tests for role authorization and token expiry.

#![allow(clippy::unwrap_used)]

use chrono::{DateTime, Duration, Utc};
use eventhub_auth::mocks::FixedClock;
use eventhub_auth::{
    AuthError, AuthenticatedUser, Role, SessionConfig, SessionTokenCodec, UserId, authorize,
};
use proptest::prelude::*;
use std::sync::Arc;

fn any_role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Student), Just(Role::Admin)]
}

fn user(role: Role) -> AuthenticatedUser {
    AuthenticatedUser {
        id: UserId::new(),
        username: "prop".to_string(),
        email: "prop@example.com".to_string(),
        role,
    }
}

proptest! {
    // Admit iff the role is in the permitted set.
    #[test]
    fn authorize_admits_only_permitted_roles(
        permitted in prop::collection::vec(any_role(), 0..3),
        role in any_role(),
    ) {
        let admitted = authorize(&permitted, Some(&user(role))).is_ok();
        prop_assert_eq!(admitted, permitted.contains(&role));
    }

    // Without an identity nothing is ever admitted.
    #[test]
    fn authorize_never_admits_anonymous(permitted in prop::collection::vec(any_role(), 0..3)) {
        let err = authorize(&permitted, None).unwrap_err();
        prop_assert_eq!(err, AuthError::Forbidden { role: "unknown".to_string() });
    }

    // A token issued at T is accepted on [T, T + 1h) and rejected after.
    #[test]
    fn token_valid_for_exactly_one_hour(
        issued_secs in 1_600_000_000i64..1_900_000_000i64,
        offset_secs in 0i64..7_200,
    ) {
        let issued_at = DateTime::<Utc>::from_timestamp(issued_secs, 0).unwrap();
        let clock = Arc::new(FixedClock::new(issued_at));
        let codec = SessionTokenCodec::with_clock(
            &SessionConfig::new("prop-secret".to_string()),
            clock.clone(),
        );
        let token = codec.issue(UserId::new()).unwrap();

        clock.advance(Duration::seconds(offset_secs));
        let result = codec.verify(&token.token);

        if offset_secs < 3_600 {
            prop_assert!(result.is_ok());
        } else {
            prop_assert_eq!(result.unwrap_err(), AuthError::TokenExpired);
        }
    }
}
