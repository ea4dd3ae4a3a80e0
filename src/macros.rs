/// Builds a [`Value`](crate::Value) from a JSON-like literal.
///
/// Tables are written `{ "key": value, ... }` and arrays `[a, b, ...]`. Any
/// other token is converted with `Value::from`.
///
/// ```rust
/// use tidy_toml::{toml, Value};
///
/// let server = toml!({
///     "host": "localhost",
///     "ports": [8080, 8081],
///     "tls": { "enabled": true }
/// });
///
/// let table = server.as_table().unwrap();
/// assert_eq!(table.get("host"), Some(&Value::from("localhost")));
/// assert_eq!(table.get_path(&["tls", "enabled"]), Some(&Value::from(true)));
/// ```
#[macro_export]
macro_rules! toml {
    (true) => {
        $crate::Value::Boolean(true)
    };

    (false) => {
        $crate::Value::Boolean(false)
    };

    ([]) => {
        $crate::Value::Array(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(vec![$($crate::toml!($elem)),*])
    };

    ({}) => {
        $crate::Value::Table($crate::Table::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut table = $crate::Table::new();
        $(
            table.insert($key.to_string(), $crate::toml!($value));
        )*
        $crate::Value::Table(table)
    }};

    ($other:expr) => {
        $crate::Value::from($other)
    };
}
