//! Sensitive-field classification: a layered pattern table grouped by
//! class, each entry with a prior. A field lands in exactly one class;
//! ties go to the highest prior.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityClass {
    Pii,
    Credentials,
    Financial,
    Health,
}

impl SensitivityClass {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pii => "pii",
            Self::Credentials => "credentials",
            Self::Financial => "financial",
            Self::Health => "health",
        }
    }

    /// Ordering for max-sensitivity aggregation: credentials dominate.
    pub fn severity(&self) -> u8 {
        match self {
            Self::Credentials => 4,
            Self::Financial => 3,
            Self::Health => 3,
            Self::Pii => 2,
        }
    }
}

impl std::fmt::Display for SensitivityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

struct LayerEntry {
    keywords: &'static [&'static str],
    class: SensitivityClass,
    prior: f64,
}

/// Suffixes that usually mean metadata about the thing, not the thing:
/// `password_updated_at` is a timestamp, not a credential.
const SUPPRESSING_SUFFIXES: &[&str] = &[
    "_at", "_count", "_id", "_type", "_format", "_length", "_hint", "_enabled",
];

pub struct SensitiveFieldClassifier {
    layers: Vec<LayerEntry>,
}

impl SensitiveFieldClassifier {
    pub fn new() -> Self {
        Self {
            layers: vec![
                // Credentials - highest priors; leaks are immediately abusable.
                LayerEntry {
                    keywords: &[
                        "password", "passwd", "secret", "api_key", "apikey", "private_key",
                        "access_token", "refresh_token", "auth_token", "credential",
                        "client_secret", "otp", "totp",
                    ],
                    class: SensitivityClass::Credentials,
                    prior: 0.95,
                },
                LayerEntry {
                    keywords: &["token", "salt", "hash", "pin"],
                    class: SensitivityClass::Credentials,
                    prior: 0.70,
                },
                // Financial.
                LayerEntry {
                    keywords: &[
                        "credit_card", "card_number", "cardnumber", "cvv", "cvc", "iban",
                        "account_number", "routing_number",
                    ],
                    class: SensitivityClass::Financial,
                    prior: 0.95,
                },
                LayerEntry {
                    keywords: &["salary", "balance", "invoice", "payment", "tax"],
                    class: SensitivityClass::Financial,
                    prior: 0.65,
                },
                // Health.
                LayerEntry {
                    keywords: &[
                        "diagnosis", "prescription", "medical_record", "blood_type",
                        "allergy", "allergies", "condition",
                    ],
                    class: SensitivityClass::Health,
                    prior: 0.85,
                },
                // PII.
                LayerEntry {
                    keywords: &[
                        "ssn", "social_security", "passport", "national_id", "drivers_license",
                        "tax_id",
                    ],
                    class: SensitivityClass::Pii,
                    prior: 0.95,
                },
                LayerEntry {
                    keywords: &[
                        "email", "phone", "mobile", "address", "birth_date", "birthdate",
                        "date_of_birth", "dob", "first_name", "last_name", "full_name",
                        "zip_code", "postal_code", "ip_address", "geolocation", "latitude",
                        "longitude",
                    ],
                    class: SensitivityClass::Pii,
                    prior: 0.75,
                },
            ],
        }
    }

    /// Classify a field name. Every matching layer competes; the highest
    /// prior wins, so a field is never in two classes.
    pub fn classify(&self, field: &str) -> Option<(SensitivityClass, f64)> {
        let normalized = normalize(field);

        let mut best: Option<(SensitivityClass, f64)> = None;
        for layer in &self.layers {
            if layer.keywords.iter().any(|kw| normalized.contains(kw)) {
                let mut confidence = layer.prior;
                if SUPPRESSING_SUFFIXES
                    .iter()
                    .any(|suffix| normalized.ends_with(suffix))
                {
                    confidence *= 0.4;
                }
                if best.map(|(_, c)| confidence > c).unwrap_or(true) {
                    best = Some((layer.class, confidence));
                }
            }
        }
        best.filter(|(_, confidence)| *confidence >= 0.30)
    }
}

impl Default for SensitiveFieldClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Fold camelCase into snake_case so one keyword table covers both.
fn normalize(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 4);
    for (i, c) in field.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_beat_pii_on_ties() {
        let classifier = SensitiveFieldClassifier::new();
        // "email_password" matches both email (PII 0.75) and password
        // (Credentials 0.95): single class, highest prior.
        let (class, confidence) = classifier.classify("email_password").unwrap();
        assert_eq!(class, SensitivityClass::Credentials);
        assert!(confidence > 0.9);
    }

    #[test]
    fn camel_case_is_normalized() {
        let classifier = SensitiveFieldClassifier::new();
        let (class, _) = classifier.classify("dateOfBirth").unwrap();
        assert_eq!(class, SensitivityClass::Pii);
    }

    #[test]
    fn metadata_suffixes_suppress() {
        let classifier = SensitiveFieldClassifier::new();
        // password_updated_at is a timestamp; suppression should push the
        // confidence below a raw credential hit.
        let direct = classifier.classify("password").unwrap().1;
        let suffixed = classifier.classify("password_updated_at").unwrap().1;
        assert!(suffixed < direct);
    }

    #[test]
    fn benign_fields_are_unclassified() {
        let classifier = SensitiveFieldClassifier::new();
        assert!(classifier.classify("created_at").is_none());
        assert!(classifier.classify("title").is_none());
        assert!(classifier.classify("quantity").is_none());
    }
}
