pub mod impl_fake;
#[cfg(test)]
pub mod impl_scripted;
#[cfg(feature = "tract")]
pub mod impl_tract;
pub mod interface;
