//! Macros for reducing boilerplate when defining entities

/// Declare an entity struct together with its `Entity` implementation
///
/// The struct gets the common `id`, `created_at` and `updated_at` columns in
/// addition to the listed fields. Every field defaults when absent from a
/// row, and empty keys and timestamps are left out when serializing so a
/// value built with `..Default::default()` can be sent as a create body.
///
/// The optional `schema` clause receives the base schema (name, singular,
/// fields) and returns the configured one.
///
/// # Example
///
/// ```rust,ignore
/// define_entity! {
///     Committee("committee", "committees") {
///         name: String,
///         sort_order: i64,
///     }
///     schema |s| s.default_sort(vec![SortKey::asc("sort_order")])
/// }
/// ```
#[macro_export]
macro_rules! define_entity {
    (
        $(#[$meta:meta])*
        $type:ident ($singular:literal, $plural:literal) {
            $( $(#[$field_meta:meta])* $field:ident : $field_type:ty ),* $(,)?
        }
        $( schema |$schema:ident| $configure:expr )?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(default)]
        pub struct $type {
            /// Primary key, assigned by the store when empty
            #[serde(skip_serializing_if = "String::is_empty")]
            pub id: String,

            $(
                $(#[$field_meta])*
                pub $field: $field_type,
            )*

            #[serde(skip_serializing_if = "Option::is_none")]
            pub created_at: Option<::chrono::DateTime<::chrono::Utc>>,

            #[serde(skip_serializing_if = "Option::is_none")]
            pub updated_at: Option<::chrono::DateTime<::chrono::Utc>>,
        }

        impl $crate::core::entity::Entity for $type {
            fn resource_name() -> &'static str {
                $plural
            }

            fn resource_name_singular() -> &'static str {
                $singular
            }

            fn field_names() -> &'static [&'static str] {
                &["id", $( stringify!($field), )* "created_at", "updated_at"]
            }

            fn schema() -> $crate::core::schema::EntitySchema {
                let schema = $crate::core::schema::EntitySchema::new($plural, $singular)
                    .fields(<Self as $crate::core::entity::Entity>::field_names().iter().copied());
                $(
                    let schema = {
                        let $schema = schema;
                        $configure
                    };
                )?
                schema
            }
        }
    };
}
