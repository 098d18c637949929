//! Macros for building parameter maps with less boilerplate

/// Build a [`Params`] map; values go through `ParamValue::from`.
///
/// # Example
///
/// ```rust
/// use jmap_batch_core::{params, Invocation};
/// use serde_json::json;
///
/// let query = Invocation::new("Email/query", params! {
///     "accountId" => "u1",
///     "filter" => json!({"inMailbox": "inbox"}),
/// });
/// let get = Invocation::new("Email/get", params! {
///     "accountId" => "u1",
///     "ids" => &query / "ids",
/// });
/// assert_eq!(get.references().count(), 1);
/// ```
#[macro_export]
macro_rules! params {
    {} => {
        $crate::Params::new()
    };
    { $($key:expr => $value:expr),+ $(,)? } => {{
        let mut params = $crate::Params::new();
        $(
            params.insert(
                ::std::string::ToString::to_string(&$key),
                $crate::ParamValue::from($value),
            );
        )+
        params
    }};
}
