mod record;

use proc_macro::TokenStream;

// ============================================================================
// #[derive(Record)]
// ============================================================================

/// Derive macro that implements `home_inventory::Record` for a row struct.
///
/// The table name comes from `#[record(table = "...")]` on the struct and
/// defaults to the snake_case struct name plus `s`. Primary key columns are
/// the fields marked `#[record(key)]`, in declaration order; a struct with no
/// marked field falls back to a field named `id`.
///
/// Several key fields produce a tuple key. Adding `fold_case` to a `String`
/// key field stores that column lowercased in the key, so two rows whose
/// values differ only by case collide.
///
/// ```ignore
/// #[derive(Clone, Record)]
/// #[record(table = "inventory_members")]
/// pub struct InventoryMember {
///     #[record(key)]
///     pub inventory_id: Uuid,
///     #[record(key, fold_case)]
///     pub user_id: String,
///     pub member_since: DateTime<Utc>,
/// }
/// // Key = (Uuid, String)
/// ```
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive_record(input)
}
