//! Property-based tests for credential decryption and variable parsing.
//!
//! Test coverage:
//! - Any short UTF-8 secret encrypted with the public half decrypts back.
//! - Target environment parsing ignores case and surrounding whitespace.
//! - Recognized-variable detection never enables sync from optional variables.

use proptest::prelude::*;

use confsync_config::constants::{ENV_HOSTNAME, OPTIONAL_VARS};
use confsync_config::{ConfigLoader, TargetEnvironment, testing};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_encrypted_values_decrypt(plaintext in "[a-zA-Z0-9 _=:/.-]{0,120}") {
        let store = testing::credential_store();
        let ciphertext = testing::encrypt_with_test_key(&plaintext);
        prop_assert_eq!(store.decrypt(&ciphertext).unwrap(), plaintext);
    }

    #[test]
    fn prop_environment_parse_ignores_case(
        index in 0usize..3,
        upper in proptest::collection::vec(any::<bool>(), 11),
        pad in " {0,3}",
    ) {
        let env = TargetEnvironment::ALL[index];
        let mixed: String = env
            .as_str()
            .chars()
            .zip(upper.iter().cycle())
            .map(|(c, up)| if *up { c.to_ascii_uppercase() } else { c })
            .collect();
        let parsed: TargetEnvironment = format!("{pad}{mixed}{pad}").parse().unwrap();
        prop_assert_eq!(parsed, env);
    }

    #[test]
    fn prop_optional_variables_never_enable(
        picks in proptest::collection::vec(any::<bool>(), OPTIONAL_VARS.len()),
        value in "[a-z0-9]{1,8}",
    ) {
        let mut loader = ConfigLoader::new().with_var(ENV_HOSTNAME, value.clone());
        for (name, pick) in OPTIONAL_VARS.iter().zip(picks) {
            if pick {
                loader = loader.with_var(name, value.clone());
            }
        }
        prop_assert!(!loader.build().unwrap().is_enabled());
    }
}
