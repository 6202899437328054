pub mod impl_fake;
#[cfg(test)]
pub mod impl_recording;
pub mod impl_svg;
pub mod interface;
