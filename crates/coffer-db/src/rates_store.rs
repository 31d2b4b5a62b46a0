//! The rates document: a JSON object holding `interest_rate` and
//! `tax_rate` alongside any other settings the operator keeps there.
//!
//! The document is read fresh on every call so edits made while the
//! service runs take effect at the next sweep. Writes update only the two
//! rate keys and leave every other key as found.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Map, Number, Value};

use coffer_ledger::{RatesStore, StoreError};
use coffer_types::MaintenanceRates;

use crate::file::{read_optional, write_json_atomic};

/// Key of the interest rate in the rates document.
pub const INTEREST_RATE_KEY: &str = "interest_rate";

/// Key of the tax rate in the rates document.
pub const TAX_RATE_KEY: &str = "tax_rate";

/// [`RatesStore`] backed by a JSON file.
#[derive(Debug, Clone)]
pub struct JsonRatesStore {
    path: PathBuf,
}

impl JsonRatesStore {
    /// Bind a store to `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_object(&self) -> Result<Map<String, Value>, StoreError> {
        let Some(text) = read_optional(&self.path)? else {
            return Ok(Map::new());
        };
        if text.trim().is_empty() {
            return Ok(Map::new());
        }
        let value: Value = serde_json::from_str(&text).map_err(|source| StoreError::Serialization {
            path: self.path.clone(),
            source,
        })?;
        match value {
            Value::Object(map) => Ok(map),
            other => Err(StoreError::InvalidValue {
                path: self.path.clone(),
                field: "<root>".to_owned(),
                reason: format!("expected an object, found {other}"),
            }),
        }
    }

    fn rate(&self, object: &Map<String, Value>, key: &str, default: Decimal) -> Result<Decimal, StoreError> {
        let Some(value) = object.get(key) else {
            return Ok(default);
        };
        let invalid = |reason: String| StoreError::InvalidValue {
            path: self.path.clone(),
            field: key.to_owned(),
            reason,
        };
        let Value::Number(number) = value else {
            return Err(invalid(format!("expected a number, found {value}")));
        };
        let text = number.to_string();
        let rate = Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .map_err(|err| invalid(err.to_string()))?;
        if MaintenanceRates::is_valid_rate(rate) {
            Ok(rate)
        } else {
            Err(invalid(format!("{rate} is outside [0, 1]")))
        }
    }

    fn number(&self, key: &str, rate: Decimal) -> Result<Value, StoreError> {
        rate.to_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| StoreError::InvalidValue {
                path: self.path.clone(),
                field: key.to_owned(),
                reason: format!("{rate} is not representable as a JSON number"),
            })
    }
}

impl RatesStore for JsonRatesStore {
    fn load_rates(&self) -> Result<MaintenanceRates, StoreError> {
        let object = self.read_object()?;
        let defaults = MaintenanceRates::default();
        Ok(MaintenanceRates {
            interest_rate: self.rate(&object, INTEREST_RATE_KEY, defaults.interest_rate)?,
            tax_rate: self.rate(&object, TAX_RATE_KEY, defaults.tax_rate)?,
        })
    }

    fn save_rates(&self, rates: &MaintenanceRates) -> Result<(), StoreError> {
        let mut object = self.read_object()?;
        object.insert(
            INTEREST_RATE_KEY.to_owned(),
            self.number(INTEREST_RATE_KEY, rates.interest_rate)?,
        );
        object.insert(TAX_RATE_KEY.to_owned(), self.number(TAX_RATE_KEY, rates.tax_rate)?);
        write_json_atomic(&self.path, &object)?;
        tracing::info!(
            path = %self.path.display(),
            interest_rate = %rates.interest_rate,
            tax_rate = %rates.tax_rate,
            "maintenance rates saved"
        );
        Ok(())
    }
}
