//! Domain models for denormalized reference records

mod attachment;
mod collection;
mod creator;
mod record;
mod tag;

pub use attachment::Attachment;
pub use collection::CollectionRef;
pub use creator::Creator;
pub use record::AggregateRecord;
pub use tag::TagRef;
