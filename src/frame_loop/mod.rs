pub mod glyphs;
pub mod overlay;
pub mod run;
#[cfg(test)]
mod tests;
