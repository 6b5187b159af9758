use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ophir_auth_simple::{
    check, decode, encode, is_valid, Token, MAX_CLOCK_SKEW_MILLIS, SESSION_TTL_MILLIS,
};
use ophir_core::models::Role;
use proptest::prelude::*;
use proptest::test_runner::Config;

fn role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Admin), Just(Role::Dev)]
}

proptest! {
    #![proptest_config(Config::with_cases(256))]
    #[test]
    fn encode_decode_roundtrip(
        email in "[a-z0-9._%+-]{1,24}@[a-z0-9-]{1,16}\\.[a-z]{2,6}",
        role in role(),
        issued in 0_i64..4_102_444_800_000_i64
    ) {
        let decoded = decode(&encode(&email, role, issued).expect("encodes")).expect("decodes");
        prop_assert_eq!(decoded, Token::Versioned { email, role, issued_at_millis: issued });
    }

    #[test]
    fn ttl_window(
        role in role(),
        issued in 0_i64..4_102_444_800_000_i64
    ) {
        let token = encode("ops@ophirestate.com", role, issued).expect("encodes");
        prop_assert!(is_valid(&token, issued + SESSION_TTL_MILLIS - 1));
        prop_assert!(!is_valid(&token, issued + SESSION_TTL_MILLIS + 1));
    }

    #[test]
    fn any_issued_at_is_judged_without_overflow(
        issued in any::<i64>(),
        now in prop_oneof![Just(i64::MIN), Just(i64::MAX), Just(0_i64), any::<i64>()]
    ) {
        let token = STANDARD.encode(format!("a@b.co:admin:{issued}"));
        let age = i128::from(now) - i128::from(issued);
        let expected = age >= -i128::from(MAX_CLOCK_SKEW_MILLIS)
            && age <= i128::from(SESSION_TTL_MILLIS);
        prop_assert_eq!(is_valid(&token, now), expected);
    }

    #[test]
    fn emails_with_a_colon_are_never_encoded(
        local in "[a-z]{1,8}",
        rest in "[a-z]{1,8}@[a-z]{1,8}\\.fr"
    ) {
        let email = format!("{local}:{rest}");
        prop_assert!(encode(&email, Role::Admin, 0).is_err());
    }

    #[test]
    fn arbitrary_input_never_panics(raw in ".{0,64}") {
        let _ = decode(&raw);
        let _ = check(&raw, 0);
    }
}
