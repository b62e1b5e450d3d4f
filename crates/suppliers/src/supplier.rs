use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

use supplydesk_core::{Entity, SupplierId};

/// Maximum length of a supplier's display name.
pub const NAME_MAX_LEN: usize = 200;

/// `NAME_MAX_LEN` as the `u64` the `validator` length rule expects.
const NAME_MAX_LEN_U64: u64 = NAME_MAX_LEN as u64;

/// Tax document: 11 digits (CPF, individuals) or 14 digits (CNPJ, companies).
pub static DOCUMENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[0-9]{11}|[0-9]{14})$").expect("document regex is valid"));

/// A persisted supplier record.
///
/// The id is assigned by the server on create and never changes afterwards.
/// Updates replace every other field wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Supplier {
    pub id: SupplierId,

    #[validate(
        custom(function = "not_blank"),
        length(max = NAME_MAX_LEN_U64, message = "name must be at most 200 characters")
    )]
    pub name: String,

    #[validate(
        length(min = 1, message = "document is required"),
        regex(
            path = *DOCUMENT_REGEX,
            message = "document must have 11 (CPF) or 14 (CNPJ) digits"
        )
    )]
    pub document: String,

    pub active: bool,
}

impl Entity for Supplier {
    type Id = SupplierId;

    const NAME: &'static str = "supplier";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Incoming supplier payload (create/update body).
///
/// Missing and `null` fields deserialize to empty values so the field rules,
/// not the JSON decoder, report them. Any `id` in the body is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierDraft {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub document: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub active: bool,
}

impl SupplierDraft {
    /// Attach an identifier, producing the record shape the store persists.
    pub fn into_supplier(self, id: SupplierId) -> Supplier {
        Supplier {
            id,
            name: self.name,
            document: self.document,
            active: self.active,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some(Cow::Borrowed("name is required"));
        return Err(err);
    }
    Ok(())
}
