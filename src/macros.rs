/// Fails compilation if the given trait can't be turned into a trait object.
#[macro_export(local_inner_macros)]
macro_rules! assert_trait_is_object_safe {
  ($($trait:tt)+) => {
    const _: Option<&dyn $($trait)+> = None;
  };
}

