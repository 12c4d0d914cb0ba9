//! Test fixtures and constants.

use fieldseal::{field, Document, RuleRegistry};
use serde::{Deserialize, Serialize};

/// A valid base64 AES-256 key (bytes 0..32).
pub const AES_KEY: &str = "AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8=";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
}

/// Document without its own key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: u64,
    pub name: String,
    pub phone: String,
    pub address: Address,
}

impl Document for Person {}

/// Document with a per-document key and optional fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub notes: Option<String>,
    pub address: Option<Address>,
}

impl Document for Patient {
    fn encryption_key(&self) -> Option<String> {
        Some(self.id.clone())
    }
}

/// Document type that never gets rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub number: u64,
    pub total: String,
}

impl Document for Invoice {}

pub fn john_doe() -> Person {
    Person {
        id: 1,
        name: "John Doe".to_string(),
        phone: "111-111".to_string(),
        address: Address {
            street: "123 Main St".to_string(),
            city: "Anytown".to_string(),
        },
    }
}

pub fn patient(id: &str) -> Patient {
    Patient {
        id: id.to_string(),
        name: "Jane Roe".to_string(),
        notes: Some("allergic to penicillin".to_string()),
        address: Some(Address {
            street: "9 Elm Rd".to_string(),
            city: "Springfield".to_string(),
        }),
    }
}

pub fn invoice() -> Invoice {
    Invoice {
        number: 42,
        total: "99.50".to_string(),
    }
}

/// Rules `name`, `phone`, `address.street` on `Person`.
pub fn person_rules() -> RuleRegistry {
    let mut rules = RuleRegistry::new();
    rules
        .add_rule(field!(Person.name))
        .add_rule(field!(Person.phone))
        .add_rule(field!(Person.address).then(field!(Address.street)));
    rules
}

/// Rules `name`, `notes`, `address.street` on `Patient`.
pub fn patient_rules() -> RuleRegistry {
    let mut rules = RuleRegistry::new();
    rules
        .add_rule(field!(Patient.name))
        .add_rule(field!(Patient.notes))
        .add_rule(field!(Patient.address?).then(field!(Address.street)));
    rules
}

pub fn aes_config() -> String {
    format!("[cipher]\nbackend = \"aes\"\n\n[aes]\nkey = \"{}\"\n", AES_KEY)
}
