//! End-to-end walkthrough on a sample `Person`.
//!
//! Registers `name`, `phone` and `address.street` as protected, stores a
//! person, reads it back, then drops the person's key and reads again.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cli::{config_path, output};
use crate::core::cipher::{self, AgeService, EncryptionService};
use crate::core::config::Config;
use crate::core::document::Document;
use crate::core::runtime::block_on;
use crate::core::serializer::{JsonSerializer, Serializer};
use crate::core::setup::StoreOptions;
use crate::error::Result;
use crate::field;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub address: Address,
}

impl Document for Person {
    fn encryption_key(&self) -> Option<String> {
        Some(self.id.to_string())
    }
}

pub fn execute(config: Option<PathBuf>) -> Result<()> {
    let path = config_path(config);
    let service: Arc<dyn EncryptionService> = if path.exists() {
        cipher::from_config(&Config::load(&path)?)?
    } else {
        output::warn(&format!(
            "{} not found, using an ephemeral age key",
            path.display()
        ));
        Arc::new(AgeService::generate())
    };

    let mut options = StoreOptions::new(JsonSerializer::new().pretty());
    options.use_field_encryption(Arc::clone(&service))?;
    options
        .schema_for::<Person>()?
        .protect(field!(Person.name))
        .protect(field!(Person.phone))
        .protect(field!(Person.address).then(field!(Address.street)));
    let serializer = options.build()?;

    let person = Person {
        id: Uuid::new_v4(),
        name: "John Doe".to_string(),
        phone: "111-111".to_string(),
        address: Address {
            street: "123 Main St".to_string(),
            city: "Anytown".to_string(),
        },
    };

    output::section("Stored");
    output::kv("backend", service.name());
    let stored = serializer.to_json_blocking(&person)?;
    println!("{}", stored);

    output::section("Loaded");
    let loaded: Person = serializer.from_json_blocking(&stored)?;
    print_person(&loaded);
    if loaded == person {
        output::success("all fields restored");
    }

    output::section("After dropping the person's key");
    let key = person.id.to_string();
    block_on(service.drop_key(&key))??;
    let shredded: Person = serializer.from_json_blocking(&stored)?;
    print_person(&shredded);
    if shredded.name == person.name {
        output::dimmed(&format!(
            "{} has no per-document keys, data is still readable",
            service.name()
        ));
    } else {
        output::success("protected fields are unreadable");
    }

    Ok(())
}

fn print_person(person: &Person) {
    output::kv("name   ", &person.name);
    output::kv("phone  ", &person.phone);
    output::kv("street ", &person.address.street);
    output::kv("city   ", &person.address.city);
}
