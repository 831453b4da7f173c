use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use idf_verification::DisclosurePolicy;
use serde_json::{Value, json};

/// Public signal positions produced by the disclosure circuit.
pub const SIGNAL_NULLIFIER: usize = 0;
pub const SIGNAL_SCOPE: usize = 1;
pub const SIGNAL_OLDER_THAN: usize = 2;
pub const SIGNAL_NATIONALITY: usize = 3;
const SIGNAL_COUNT: usize = 4;

#[derive(Debug, Clone)]
pub struct VerificationOutcome {
    pub is_valid: bool,
    pub credential_subject: Value,
    pub details: Value,
}

/// Checks a proof and its public signals. `Err` means the input could not be
/// evaluated at all; a well-formed proof that fails policy is `Ok` with
/// `is_valid == false`.
#[async_trait]
pub trait ProofBackend: Send + Sync {
    async fn verify(
        &self,
        user_id: Option<&str>,
        proof: &Value,
        public_signals: &[String],
    ) -> Result<VerificationOutcome>;
}

/// Validates Groth16 proof shape and the disclosed attributes against a
/// [`DisclosurePolicy`]. Pairing checks belong to an external verifier.
pub struct StructuralGroth16Backend {
    policy: DisclosurePolicy,
}

impl StructuralGroth16Backend {
    pub fn new(policy: DisclosurePolicy) -> Self {
        Self { policy }
    }
}

/// Circuit encoding of a scope string: 64-bit FNV-1a, in decimal.
pub fn scope_signal(scope: &str) -> String {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in scope.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    hash.to_string()
}

/// Circuit encoding of an alpha-3 country code: its ASCII bytes read as a
/// big-endian integer, in decimal.
pub fn country_signal(code: &str) -> String {
    code.bytes()
        .fold(0u64, |acc, b| (acc << 8) | u64::from(b))
        .to_string()
}

fn decode_country(signal: &str) -> Option<String> {
    let mut packed: u64 = signal.parse().ok()?;
    let mut bytes = Vec::new();
    while packed > 0 {
        bytes.push((packed & 0xff) as u8);
        packed >>= 8;
    }
    bytes.reverse();
    let code = String::from_utf8(bytes).ok()?;
    (code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase())).then_some(code)
}

fn is_field_element(value: &Value) -> bool {
    value
        .as_str()
        .is_some_and(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()))
}

fn check_point(proof: &Value, key: &str, len: usize) -> Result<()> {
    let coords = proof
        .get(key)
        .and_then(Value::as_array)
        .with_context(|| format!("proof is missing {key}"))?;
    if coords.len() != len {
        bail!("{key} must have {len} coordinates");
    }
    Ok(())
}

fn check_groth16_shape(proof: &Value) -> Result<()> {
    if !proof.is_object() {
        bail!("proof must be a JSON object");
    }
    if let Some(protocol) = proof.get("protocol").and_then(Value::as_str) {
        if protocol != "groth16" {
            bail!("unsupported proof protocol: {protocol}");
        }
    }

    check_point(proof, "pi_a", 3)?;
    check_point(proof, "pi_b", 3)?;
    check_point(proof, "pi_c", 3)?;

    let g1_ok = ["pi_a", "pi_c"].iter().all(|key| {
        proof[*key]
            .as_array()
            .is_some_and(|c| c.iter().all(is_field_element))
    });
    let g2_ok = proof["pi_b"].as_array().is_some_and(|rows| {
        rows.iter().all(|row| {
            row.as_array()
                .is_some_and(|pair| pair.len() == 2 && pair.iter().all(is_field_element))
        })
    });
    if !g1_ok || !g2_ok {
        bail!("proof coordinates must be decimal field elements");
    }
    Ok(())
}

#[async_trait]
impl ProofBackend for StructuralGroth16Backend {
    async fn verify(
        &self,
        user_id: Option<&str>,
        proof: &Value,
        public_signals: &[String],
    ) -> Result<VerificationOutcome> {
        check_groth16_shape(proof)?;
        if public_signals.len() < SIGNAL_COUNT {
            bail!(
                "expected at least {SIGNAL_COUNT} public signals, got {}",
                public_signals.len()
            );
        }
        if let Some(bad) = public_signals
            .iter()
            .find(|s| s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()))
        {
            bail!("public signal is not a field element: {bad}");
        }

        let scope_ok = public_signals[SIGNAL_SCOPE] == scope_signal(&self.policy.scope);
        let older_than: Option<u32> = public_signals[SIGNAL_OLDER_THAN].parse().ok();
        let age_ok = older_than.is_some_and(|age| age >= u32::from(self.policy.minimum_age));
        let nationality = decode_country(&public_signals[SIGNAL_NATIONALITY]);
        let nationality_ok = nationality
            .as_deref()
            .is_some_and(|code| !self.policy.is_excluded(code));

        let is_valid = scope_ok && age_ok && nationality_ok;
        tracing::debug!(scope_ok, age_ok, nationality_ok, "structural proof check");

        Ok(VerificationOutcome {
            is_valid,
            credential_subject: json!({
                "userId": user_id,
                "nullifier": public_signals[SIGNAL_NULLIFIER],
                "olderThan": older_than,
                "nationality": nationality,
            }),
            details: json!({
                "isValidProof": true,
                "isValidScope": scope_ok,
                "isValidOlderThan": age_ok,
                "isValidNationality": nationality_ok,
            }),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_proof() -> Value {
        json!({
            "protocol": "groth16",
            "pi_a": ["1", "2", "1"],
            "pi_b": [["3", "4"], ["5", "6"], ["1", "0"]],
            "pi_c": ["7", "8", "1"],
        })
    }

    pub(crate) fn signals(scope: &str, age: &str, country: &str) -> Vec<String> {
        vec![
            "12345".to_owned(),
            scope_signal(scope),
            age.to_owned(),
            country_signal(country),
        ]
    }

    fn backend() -> StructuralGroth16Backend {
        StructuralGroth16Backend::new(DisclosurePolicy::default())
    }

    #[tokio::test]
    async fn accepts_matching_disclosures() -> Result<()> {
        let outcome = backend()
            .verify(
                Some("5f0c1a4e-2b7d-4a8e-9c3f-6d1e2f3a4b5c"),
                &sample_proof(),
                &signals("identifi-wallet-app", "21", "DEU"),
            )
            .await?;
        assert!(outcome.is_valid);
        assert_eq!(outcome.credential_subject["nationality"], "DEU");
        assert_eq!(outcome.credential_subject["olderThan"], 21);
        Ok(())
    }

    #[tokio::test]
    async fn policy_violations_are_invalid_not_errors() -> Result<()> {
        let b = backend();
        let young = b
            .verify(None, &sample_proof(), &signals("identifi-wallet-app", "18", "DEU"))
            .await?;
        assert!(!young.is_valid);
        assert_eq!(young.details["isValidOlderThan"], false);

        let excluded = b
            .verify(None, &sample_proof(), &signals("identifi-wallet-app", "30", "FRA"))
            .await?;
        assert!(!excluded.is_valid);
        assert_eq!(excluded.details["isValidNationality"], false);

        let wrong_scope = b
            .verify(None, &sample_proof(), &signals("other-app", "30", "DEU"))
            .await?;
        assert_eq!(wrong_scope.details["isValidScope"], false);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_input_is_an_error() {
        let b = backend();
        let good_signals = signals("identifi-wallet-app", "21", "DEU");

        assert!(b.verify(None, &json!({"pi_a": []}), &good_signals).await.is_err());
        assert!(b.verify(None, &json!("proof"), &good_signals).await.is_err());

        let mut plonk = sample_proof();
        plonk["protocol"] = json!("plonk");
        assert!(b.verify(None, &plonk, &good_signals).await.is_err());

        assert!(b.verify(None, &sample_proof(), &good_signals[..2]).await.is_err());
        let mut bad = good_signals.clone();
        bad[0] = "0xff".to_owned();
        assert!(b.verify(None, &sample_proof(), &bad).await.is_err());
    }

    #[test]
    fn country_encoding_roundtrip() {
        assert_eq!(country_signal("DEU"), "4474197");
        assert_eq!(decode_country("4474197").as_deref(), Some("DEU"));
        assert_eq!(decode_country("0"), None);
    }
}
