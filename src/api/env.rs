pub const LAUNDRY_API_TOKEN: &str = "LAUNDRY_API_TOKEN";

#[macro_export]
macro_rules! warn_if_env_var_is_missing {
    ($var:expr, $message:expr) => {
        if std::env::var($var).is_err() {
            tracing::warn!(
                "The `{}` environment variable isn't set. {}",
                $var,
                $message
            );
        }
    };
}
