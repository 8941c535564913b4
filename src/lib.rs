pub mod bind;
pub mod col;
pub mod constant;
pub mod error;
pub mod native;
pub mod row;
pub mod sync;
pub mod value;

#[cfg(feature = "tokio")]
pub mod tokio;

#[cfg(test)]
pub(crate) mod testing;
