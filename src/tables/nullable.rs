//! Fields of nullable columns in Insert and Update records.
//!
//! `None` leaves the field out of the payload, `Some(None)` sends an explicit
//! `null` and `Some(Some(v))` sends the value. Plain `Option` deserialization
//! folds `null` into `None`, so such fields use [`deserialize`]:
//!
//! ```ignore
//! #[serde(
//!     default,
//!     skip_serializing_if = "Option::is_none",
//!     deserialize_with = "crate::tables::nullable::deserialize"
//! )]
//! pub sds_url: Nullable<String>,
//! ```

use serde::{Deserialize, Deserializer};

pub type Nullable<T> = Option<Option<T>>;

/// Maps a present field to `Some`, keeping `null` as `Some(None)`
pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Nullable<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
