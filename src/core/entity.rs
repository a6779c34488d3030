//! Entity trait implemented by every record type

use crate::core::schema::EntitySchema;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A record type served through the generic access layer.
///
/// The trait carries only metadata; reads and writes go through
/// [`EntityAccess`](crate::core::access::EntityAccess), which is the same
/// code for every entity. Implement it with
/// [`define_entity!`](crate::define_entity) rather than by hand.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The plural resource name used in URLs and as store key (e.g. "committees")
    fn resource_name() -> &'static str;

    /// The singular resource name (e.g. "committee")
    fn resource_name_singular() -> &'static str;

    /// Column names, including `id`, `created_at` and `updated_at`
    fn field_names() -> &'static [&'static str];

    /// Built-in schema: access policies, default sort, aliases, validation
    fn schema() -> EntitySchema;
}
