#[macro_export]
/// Helper to pull the final token out of a [crate::bail_error] invocation; that token is the error message.
macro_rules! last {
  ([$single:tt] $($rest:tt)*) => {
    $single // base case
  };
  ([$first:tt $($rest:tt)*] $($reversed:tt)*) => {
    $crate::last!([$($rest)*] $first $($reversed)*)  // recursion
  };
}

#[macro_export]
/// Log an error event with its structured fields, then bail with the message.
///
/// # Example
/// ```
/// use drover_library::bail_error;
///
/// fn fails() -> anyhow::Result<()> {
///   let tid = "test".to_string();
///   bail_error!(tid=%tid, "The heartbeat cannot continue");
/// }
/// assert_eq!(fails().err().unwrap().to_string(), "The heartbeat cannot continue");
/// ```
macro_rules! bail_error {
  ($($arg:tt)+) => {
    {
      tracing::error!($($arg)+);
      anyhow::bail!($crate::last!([$($arg)+]))
    }
  };
}
