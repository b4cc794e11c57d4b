//! Schema validator
//!
//! Rules are applied in order and the first failing rule stops further
//! checks for that record:
//!
//! 1. every required field is present
//! 2. every field coerces to its kind
//! 3. the primary key is unique within the batch
//! 4. a claim's pharmacy is among the batch's valid pharmacies (when enabled)
//!
//! Keys are registered only for records that pass every rule.

use super::schema::{self, FieldSpec};
use super::violation::{QuarantinedRecord, ValidationResult, Violation};
use crate::domain::{
    ClaimRecord, EntityRecord, EntityType, PharmacyId, PharmacyRecord, RawRecord, RecordOrigin,
    RevertRecord,
};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

/// A record type the validator can produce
pub trait Entity: Sized + Into<EntityRecord> {
    const ENTITY_TYPE: EntityType;
    /// Field holding the primary key
    const KEY_FIELD: FieldSpec;

    /// Coerce a record whose required fields are all present (rule 2)
    fn coerce(raw: &RawRecord) -> Result<Self, Vec<Violation>>;

    /// Primary key value
    fn key(&self) -> &str;

    /// Pharmacy this record must reference, if any
    fn pharmacy_reference(&self) -> Option<&PharmacyId> {
        None
    }
}

fn keep<T>(violations: &mut Vec<Violation>, result: Result<T, Violation>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(violation) => {
            violations.push(violation);
            None
        }
    }
}

impl Entity for PharmacyRecord {
    const ENTITY_TYPE: EntityType = EntityType::Pharmacy;
    const KEY_FIELD: FieldSpec = schema::PHARMACY_ID;

    fn coerce(raw: &RawRecord) -> Result<Self, Vec<Violation>> {
        let mut violations = Vec::new();
        let pharmacy_id = keep(&mut violations, schema::identifier(raw, &schema::PHARMACY_ID));
        let chain = keep(&mut violations, schema::text(raw, &schema::CHAIN));

        match (pharmacy_id, chain) {
            (Some(pharmacy_id), Some(chain)) => Ok(Self { pharmacy_id, chain }),
            _ => Err(violations),
        }
    }

    fn key(&self) -> &str {
        self.pharmacy_id.as_str()
    }
}

impl Entity for ClaimRecord {
    const ENTITY_TYPE: EntityType = EntityType::Claim;
    const KEY_FIELD: FieldSpec = schema::CLAIM_ID;

    fn coerce(raw: &RawRecord) -> Result<Self, Vec<Violation>> {
        let mut violations = Vec::new();
        let claim_id = keep(&mut violations, schema::identifier(raw, &schema::CLAIM_ID));
        let pharmacy_id = keep(
            &mut violations,
            schema::identifier(raw, &schema::CLAIM_PHARMACY_ID),
        );
        let drug_product_id = keep(
            &mut violations,
            schema::identifier(raw, &schema::DRUG_PRODUCT_ID),
        );
        let quantity = keep(&mut violations, schema::quantity(raw, &schema::QUANTITY));
        let price = keep(&mut violations, schema::price(raw, &schema::PRICE));
        let timestamp = keep(&mut violations, schema::timestamp(raw, &schema::TIMESTAMP));

        match (claim_id, pharmacy_id, drug_product_id, quantity, price, timestamp) {
            (
                Some(claim_id),
                Some(pharmacy_id),
                Some(drug_product_id),
                Some(quantity),
                Some(price),
                Some(timestamp),
            ) => {
                // analyses multiply price by quantity
                if price.checked_mul(Decimal::from(quantity)).is_none() {
                    return Err(vec![Violation::TypeMismatch {
                        field: schema::PRICE.name,
                        expected: "price * quantity within decimal range",
                    }]);
                }
                Ok(Self {
                    claim_id,
                    pharmacy_id,
                    drug_product_id,
                    quantity,
                    price,
                    timestamp,
                })
            }
            _ => Err(violations),
        }
    }

    fn key(&self) -> &str {
        self.claim_id.as_str()
    }

    fn pharmacy_reference(&self) -> Option<&PharmacyId> {
        Some(&self.pharmacy_id)
    }
}

impl Entity for RevertRecord {
    const ENTITY_TYPE: EntityType = EntityType::Revert;
    const KEY_FIELD: FieldSpec = schema::REVERT_ID;

    fn coerce(raw: &RawRecord) -> Result<Self, Vec<Violation>> {
        let mut violations = Vec::new();
        let revert_id = keep(&mut violations, schema::identifier(raw, &schema::REVERT_ID));
        let claim_id = keep(
            &mut violations,
            schema::identifier(raw, &schema::REVERT_CLAIM_ID),
        );
        let timestamp = keep(&mut violations, schema::timestamp(raw, &schema::TIMESTAMP));

        match (revert_id, claim_id, timestamp) {
            (Some(revert_id), Some(claim_id), Some(timestamp)) => Ok(Self {
                revert_id,
                claim_id,
                timestamp,
            }),
            _ => Err(violations),
        }
    }

    fn key(&self) -> &str {
        self.revert_id.as_str()
    }
}

/// Rules 1 and 2 for a single record; no batch context
pub fn check_as<T: Entity>(raw: &RawRecord) -> Result<T, Vec<Violation>> {
    schema::check_presence(raw, T::ENTITY_TYPE)?;
    T::coerce(raw)
}

/// Primary keys accepted so far, per entity type
#[derive(Debug, Default, Clone)]
pub struct KeyRegistry {
    seen: HashMap<EntityType, HashSet<String>>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, entity_type: EntityType, key: &str) -> bool {
        self.seen
            .get(&entity_type)
            .is_some_and(|keys| keys.contains(key))
    }

    /// Returns `false` if the key was already registered
    pub fn register(&mut self, entity_type: EntityType, key: &str) -> bool {
        self.seen
            .entry(entity_type)
            .or_default()
            .insert(key.to_string())
    }

    pub fn len(&self, entity_type: EntityType) -> usize {
        self.seen.get(&entity_type).map_or(0, HashSet::len)
    }
}

/// Valid records and quarantined ones from a batch
#[derive(Debug, Clone)]
pub struct Partition<T> {
    pub valid: Vec<T>,
    pub quarantined: Vec<QuarantinedRecord>,
}

impl<T> Partition<T> {
    /// Records seen in total
    pub fn total(&self) -> usize {
        self.valid.len() + self.quarantined.len()
    }
}

impl<T> Default for Partition<T> {
    fn default() -> Self {
        Self {
            valid: Vec::new(),
            quarantined: Vec::new(),
        }
    }
}

/// Batch-scoped validator
///
/// Holds the key registry for the current batch and, once pharmacies are
/// known, the set claims must reference.
#[derive(Debug, Default)]
pub struct SchemaValidator {
    keys: KeyRegistry,
    known_pharmacies: Option<HashSet<PharmacyId>>,
}

impl SchemaValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require claims to reference one of `pharmacies`
    pub fn require_pharmacies(&mut self, pharmacies: impl IntoIterator<Item = PharmacyId>) {
        self.known_pharmacies = Some(pharmacies.into_iter().collect());
    }

    /// Keys accepted so far
    pub fn keys(&self) -> &KeyRegistry {
        &self.keys
    }

    /// Run all rules for one record of type `T`
    pub fn validate_as<T: Entity>(&mut self, raw: &RawRecord) -> Result<T, Vec<Violation>> {
        let record = check_as::<T>(raw)?;

        if self.keys.contains(T::ENTITY_TYPE, record.key()) {
            return Err(vec![Violation::DuplicateKey {
                field: T::KEY_FIELD.name,
                value: record.key().to_string(),
            }]);
        }

        if let (Some(known), Some(pharmacy_id)) =
            (&self.known_pharmacies, record.pharmacy_reference())
        {
            if !known.contains(pharmacy_id) {
                return Err(vec![Violation::UnknownReference {
                    field: schema::CLAIM_PHARMACY_ID.name,
                    value: pharmacy_id.to_string(),
                }]);
            }
        }

        self.keys.register(T::ENTITY_TYPE, record.key());
        Ok(record)
    }

    /// Run all rules for one record of a runtime-chosen entity type
    pub fn validate(&mut self, raw: RawRecord, entity_type: EntityType) -> ValidationResult {
        let outcome = match entity_type {
            EntityType::Pharmacy => self.validate_as::<PharmacyRecord>(&raw).map(Into::into),
            EntityType::Claim => self.validate_as::<ClaimRecord>(&raw).map(Into::into),
            EntityType::Revert => self.validate_as::<RevertRecord>(&raw).map(Into::into),
        };

        match outcome {
            Ok(record) => ValidationResult {
                entity_type,
                raw,
                record: Some(record),
                violations: Vec::new(),
            },
            Err(violations) => ValidationResult {
                entity_type,
                raw,
                record: None,
                violations,
            },
        }
    }

    /// Validate records in input order, partitioning them into valid and quarantined
    pub fn validate_batch<T, I>(&mut self, records: I) -> Partition<T>
    where
        T: Entity,
        I: IntoIterator<Item = (RecordOrigin, RawRecord)>,
    {
        let mut partition = Partition::default();

        for (origin, raw) in records {
            match self.validate_as::<T>(&raw) {
                Ok(record) => partition.valid.push(record),
                Err(violations) => {
                    let reasons: Vec<String> = violations.iter().map(ToString::to_string).collect();
                    tracing::debug!(
                        entity = %T::ENTITY_TYPE,
                        source = %origin.source,
                        row = origin.row,
                        violations = ?reasons,
                        "Record quarantined"
                    );
                    partition.quarantined.push(QuarantinedRecord {
                        entity_type: T::ENTITY_TYPE,
                        origin,
                        record: raw,
                        violations,
                    });
                }
            }
        }

        tracing::info!(
            entity = %T::ENTITY_TYPE,
            valid = partition.valid.len(),
            quarantined = partition.quarantined.len(),
            "Validated batch"
        );

        partition
    }
}
